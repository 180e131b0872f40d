use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tsuyaku_config::Config;
use tsuyaku_config::openai::{OpenAiConfig, TEXT_PLACEHOLDER};
use tsuyaku_types::Backend;

use crate::{BackendClient, CREDENTIALS_NOT_SET, Capabilities, Payload, TranslateError};

/// Replace every `{{text}}` in the template with the literal selection
pub fn substitute_text(template: &str, text: &str) -> String {
    template.replace(TEXT_PLACEHOLDER, text)
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning: Option<Reasoning>,
    messages: Vec<ChatMessage<'a>>,
}

/// Asks the provider to skip extended reasoning
#[derive(Serialize)]
struct Reasoning {
    effort: &'static str,
    exclude: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: MessageContent<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

async fn send_chat(
    client: &reqwest::Client,
    openai: &OpenAiConfig,
    request: &ChatRequest<'_>,
) -> Result<String, TranslateError> {
    let response = client
        .post(&openai.endpoint)
        .bearer_auth(&openai.api_key)
        .json(request)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(TranslateError::Status(response.status()));
    }

    let body = response.text().await?;
    let parsed: ChatResponse = serde_json::from_str(&body)
        .map_err(|e| TranslateError::MalformedResponse(format!("Failed to parse response: {e}")))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| TranslateError::MalformedResponse("No message content in response".to_string()))
}

fn require_credentials(openai: &OpenAiConfig) -> Result<(), TranslateError> {
    if openai.has_credentials() {
        Ok(())
    } else {
        Err(TranslateError::ConfigMissing(CREDENTIALS_NOT_SET))
    }
}

/// Chat-completion translation of selected text
#[derive(Clone)]
pub struct OpenAiTextClient {
    client: reqwest::Client,
}

impl OpenAiTextClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BackendClient for OpenAiTextClient {
    fn backend(&self) -> Backend {
        Backend::OpenAiText
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::TEXT
    }

    async fn request(&self, payload: &Payload, config: &Config) -> Result<String, TranslateError> {
        let Payload::Text(text) = payload else {
            return Err(TranslateError::UnsupportedPayload {
                backend: Backend::OpenAiText,
                kind: "image",
            });
        };

        let openai = &config.openai;
        require_credentials(openai)?;

        let prompt = substitute_text(openai.text_prompt(), text);
        let request = ChatRequest {
            model: openai.model(),
            reasoning: Some(Reasoning {
                effort: "none",
                exclude: true,
            }),
            messages: vec![ChatMessage {
                role: "user",
                content: MessageContent::Text(&prompt),
            }],
        };

        send_chat(&self.client, openai, &request).await
    }
}

/// Chat-completion over a prompt plus one embedded image; answers in HTML
#[derive(Clone)]
pub struct OpenAiVisionClient {
    client: reqwest::Client,
}

impl OpenAiVisionClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BackendClient for OpenAiVisionClient {
    fn backend(&self) -> Backend {
        Backend::OpenAiVision
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::IMAGE
    }

    async fn request(&self, payload: &Payload, config: &Config) -> Result<String, TranslateError> {
        let Payload::Image { data_url } = payload else {
            return Err(TranslateError::UnsupportedPayload {
                backend: Backend::OpenAiVision,
                kind: "text",
            });
        };

        let openai = &config.openai;
        require_credentials(openai)?;

        let request = ChatRequest {
            model: openai.model(),
            reasoning: None,
            messages: vec![ChatMessage {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::Text {
                        text: openai.image_prompt(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                ]),
            }],
        };

        send_chat(&self.client, openai, &request).await
    }
}
