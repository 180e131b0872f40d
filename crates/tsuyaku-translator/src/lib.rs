use std::collections::HashMap;
use std::sync::Arc;

use tsuyaku_config::Config;
use tsuyaku_types::{Backend, RequestId, TranslationResult};

pub mod deepl;
pub mod openai;

pub use deepl::DeeplClient;
pub use openai::{OpenAiTextClient, OpenAiVisionClient, substitute_text};

#[cfg(test)]
mod tests;

pub const KEY_NOT_SET: &str = "API key not set";
pub const CREDENTIALS_NOT_SET: &str = "API key or endpoint not set";
pub const FETCH_ERROR: &str = "Error fetching translation";

/// What a backend is asked to translate
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    /// `data:image/png;base64,...`
    Image { data_url: String },
}

impl Payload {
    fn kind(&self) -> &'static str {
        match self {
            Payload::Text(_) => "text",
            Payload::Image { .. } => "image",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub text: bool,
    pub image: bool,
}

impl Capabilities {
    pub const TEXT: Self = Self {
        text: true,
        image: false,
    };
    pub const IMAGE: Self = Self {
        text: false,
        image: true,
    };

    pub fn accepts(&self, payload: &Payload) -> bool {
        match payload {
            Payload::Text(_) => self.text,
            Payload::Image { .. } => self.image,
        }
    }
}

/// Normalized backend output; failures are carried as display text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub backend: Backend,
    pub text: String,
}

impl Translation {
    pub fn new(backend: Backend, text: impl Into<String>) -> Self {
        Self {
            backend,
            text: text.into(),
        }
    }

    pub fn into_result(self, id: RequestId) -> TranslationResult {
        TranslationResult::new(id, self.backend, self.text)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("{0}")]
    ConfigMissing(&'static str),

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("Unexpected response: {0}")]
    MalformedResponse(String),

    #[error("{backend} does not accept {kind} input")]
    UnsupportedPayload {
        backend: Backend,
        kind: &'static str,
    },
}

impl TranslateError {
    /// Text shown in the pane. Transport, status and shape failures share one
    /// message; the distinction only reaches the logs.
    pub fn display_text(&self) -> String {
        match self {
            TranslateError::ConfigMissing(msg) => msg.to_string(),
            TranslateError::Transport(_)
            | TranslateError::Status(_)
            | TranslateError::MalformedResponse(_) => FETCH_ERROR.to_string(),
            TranslateError::UnsupportedPayload { .. } => self.to_string(),
        }
    }
}

/// Stateless request builder for one remote provider
#[async_trait::async_trait]
pub trait BackendClient: Send + Sync {
    fn backend(&self) -> Backend;

    fn capabilities(&self) -> Capabilities;

    /// Raw call; may fail
    async fn request(&self, payload: &Payload, config: &Config) -> Result<String, TranslateError>;

    /// Never fails: every error becomes display text tagged with this backend
    async fn translate(&self, payload: &Payload, config: &Config) -> Translation {
        let backend = self.backend();

        if !self.capabilities().accepts(payload) {
            let err = TranslateError::UnsupportedPayload {
                backend,
                kind: payload.kind(),
            };
            tracing::warn!("{err}");
            return Translation::new(backend, err.display_text());
        }

        match self.request(payload, config).await {
            Ok(text) => {
                tracing::debug!("{backend} returned {} chars", text.len());
                Translation::new(backend, text)
            }
            Err(e) => {
                tracing::warn!("{backend} translation failed: {e}");
                Translation::new(backend, e.display_text())
            }
        }
    }
}

/// Client lookup by backend
#[derive(Clone, Default)]
pub struct Backends {
    clients: HashMap<Backend, Arc<dyn BackendClient>>,
}

impl Backends {
    pub fn new() -> Self {
        Self::default()
    }

    /// DeepL, OpenAI text and OpenAI vision over one shared HTTP client
    pub fn standard(http: reqwest::Client) -> Self {
        Self::new()
            .with(DeeplClient::new(http.clone()))
            .with(OpenAiTextClient::new(http.clone()))
            .with(OpenAiVisionClient::new(http))
    }

    pub fn with(mut self, client: impl BackendClient + 'static) -> Self {
        self.clients.insert(client.backend(), Arc::new(client));
        self
    }

    pub fn get(&self, backend: Backend) -> Option<Arc<dyn BackendClient>> {
        self.clients.get(&backend).cloned()
    }
}
