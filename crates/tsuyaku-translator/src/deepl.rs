use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tsuyaku_config::Config;
use tsuyaku_types::Backend;

use crate::{BackendClient, Capabilities, KEY_NOT_SET, Payload, TranslateError};

#[derive(Clone)]
pub struct DeeplClient {
    client: reqwest::Client,
}

impl DeeplClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[derive(Serialize)]
struct DeeplRequest<'a> {
    text: [&'a str; 1],
    target_lang: &'a str,
}

#[derive(Deserialize)]
struct DeeplResponse {
    translations: Vec<DeeplTranslation>,
}

#[derive(Deserialize)]
struct DeeplTranslation {
    text: String,
}

#[async_trait]
impl BackendClient for DeeplClient {
    fn backend(&self) -> Backend {
        Backend::DeepL
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::TEXT
    }

    async fn request(&self, payload: &Payload, config: &Config) -> Result<String, TranslateError> {
        let Payload::Text(text) = payload else {
            return Err(TranslateError::UnsupportedPayload {
                backend: Backend::DeepL,
                kind: "image",
            });
        };

        let deepl = &config.deepl;
        if !deepl.has_key() {
            return Err(TranslateError::ConfigMissing(KEY_NOT_SET));
        }

        let response = self
            .client
            .post(&deepl.api_url)
            .header("Authorization", format!("DeepL-Auth-Key {}", deepl.api_key))
            .json(&DeeplRequest {
                text: [text.as_str()],
                target_lang: &deepl.target_lang,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TranslateError::Status(response.status()));
        }

        let body = response.text().await?;
        let parsed: DeeplResponse = serde_json::from_str(&body)
            .map_err(|e| TranslateError::MalformedResponse(format!("Failed to parse response: {e}")))?;

        parsed
            .translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .ok_or_else(|| TranslateError::MalformedResponse("No translation in response".to_string()))
    }
}
