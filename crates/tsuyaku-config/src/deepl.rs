use std::env;

use serde::{Deserialize, Serialize};

fn default_api_url() -> String {
    "https://api-free.deepl.com/v2/translate".to_string()
}

fn default_target_lang() -> String {
    "EN".to_string()
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DeeplConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_target_lang")]
    pub target_lang: String,
}

impl Default for DeeplConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: default_api_url(),
            target_lang: default_target_lang(),
        }
    }
}

impl DeeplConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: env::var("TSUYAKU_DEEPL_KEY").unwrap_or_default(),
            api_url: env::var("TSUYAKU_DEEPL_URL").unwrap_or_else(|_| default_api_url()),
            target_lang: env::var("TSUYAKU_TARGET_LANG").unwrap_or_else(|_| default_target_lang()),
        }
    }

    pub fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}
