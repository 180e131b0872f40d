use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use self::deepl::DeeplConfig;
use self::openai::OpenAiConfig;

pub mod deepl;
pub mod openai;
pub mod store;

pub use store::{ConfigStore, JsonConfigStore, SharedConfig};

fn default_request_timeout_secs() -> u64 {
    30
}

/// Credentials, prompts and model selection for the translation backends.
///
/// Owned by the store; the dispatcher takes a fresh snapshot per request.
#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub deepl: DeeplConfig,
    pub openai: OpenAiConfig,
    /// Deadline for a single request, capture through backend response
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            deepl: DeeplConfig::default(),
            openai: OpenAiConfig::default(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let request_timeout_secs = env::var("TSUYAKU_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_request_timeout_secs);

        Config {
            deepl: DeeplConfig::from_env(),
            openai: OpenAiConfig::from_env(),
            request_timeout_secs,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "deepl": { "api_key": "k" }, "openai": { "model": "gpt" } }"#)
                .unwrap();

        assert_eq!(config.deepl.api_key, "k");
        assert_eq!(config.deepl.api_url, "https://api-free.deepl.com/v2/translate");
        assert_eq!(config.deepl.target_lang, "EN");
        assert_eq!(config.openai.model, "gpt");
        assert!(config.openai.api_key.is_empty());
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let config = Config {
            request_timeout_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
    }
}
