use std::env;

use serde::{Deserialize, Serialize};

/// Placeholder replaced with the selected text in the text prompt
pub const TEXT_PLACEHOLDER: &str = "{{text}}";

pub const DEFAULT_TEXT_PROMPT: &str = "Translate the given text into English. If it already is English, translate it into German instead. If the input consists of a single English word, output a short list of German words that best approximate the English meaning.\nOutput nothing but the translated text. Input text: {{text}}";

pub const DEFAULT_IMAGE_PROMPT: &str = "Translate all text, no matter what language, in this image to English. If some text is already in English, keep it as is. If it isn't in English, provide a transcription ahead of the translation.
Present the translation in a well-organized and structured format that makes it easy to understand the correspondence between your response and the original image.
For text formatting, use HTML tags. Your entire response should be valid HTML.
Do not output any needless commentary or summary. Only perform the stated task and nothing else.";

/// Any OpenAI-compatible chat-completion endpoint
#[derive(Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_key: String,
    /// Full chat-completion URL
    pub endpoint: String,
    /// Omitted from the request body when empty
    pub model: String,
    /// Empty means [`DEFAULT_TEXT_PROMPT`]
    pub text_prompt: String,
    /// Empty means [`DEFAULT_IMAGE_PROMPT`]
    pub image_prompt: String,
}

impl OpenAiConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: env::var("TSUYAKU_OPENAI_KEY").unwrap_or_default(),
            endpoint: env::var("TSUYAKU_OPENAI_ENDPOINT").unwrap_or_default(),
            model: env::var("TSUYAKU_OPENAI_MODEL").unwrap_or_default(),
            text_prompt: env::var("TSUYAKU_TEXT_PROMPT").unwrap_or_default(),
            image_prompt: env::var("TSUYAKU_IMAGE_PROMPT").unwrap_or_default(),
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.endpoint.trim().is_empty()
    }

    pub fn text_prompt(&self) -> &str {
        if self.text_prompt.trim().is_empty() {
            DEFAULT_TEXT_PROMPT
        } else {
            &self.text_prompt
        }
    }

    pub fn image_prompt(&self) -> &str {
        if self.image_prompt.trim().is_empty() {
            DEFAULT_IMAGE_PROMPT
        } else {
            &self.image_prompt
        }
    }

    pub fn model(&self) -> Option<&str> {
        let model = self.model.trim();
        (!model.is_empty()).then_some(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_prompts_fall_back_to_defaults() {
        let config = OpenAiConfig {
            text_prompt: "   ".into(),
            ..OpenAiConfig::default()
        };
        assert_eq!(config.text_prompt(), DEFAULT_TEXT_PROMPT);
        assert_eq!(config.image_prompt(), DEFAULT_IMAGE_PROMPT);
        assert!(DEFAULT_TEXT_PROMPT.contains(TEXT_PLACEHOLDER));
    }

    #[test]
    fn credentials_need_key_and_endpoint() {
        let mut config = OpenAiConfig {
            api_key: "sk".into(),
            ..OpenAiConfig::default()
        };
        assert!(!config.has_credentials());
        config.endpoint = "http://localhost/v1/chat/completions".into();
        assert!(config.has_credentials());
        assert_eq!(config.model(), None);
    }
}
