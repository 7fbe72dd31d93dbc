//! LLM (OpenAI) chat completion client
//!
//! Generates a fresh study message on every invocation from a fixed prompt.

use async_trait::async_trait;
use openai_api_rs::v1::chat_completion::MessageRole;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::MessageSource;
use crate::core::models::Message;
use crate::errors::BotError;

pub const SYSTEM_PROMPT: &str = "You are chat bot that should help user with \"AWS Certified Solutions Architect - Associate\" certification preparation. \
The user will ask you for the next random fact about AWS and you should generate a summary of some AWS Service, \
deep detail/fact about AWS Service, nice to know feature or anything else that is required to pass certification exam. \
Response should be structured and formatted so it could be send to WhatsApp/Telegram chat. \
At the end of the message it would be nice to have links to documentation/blog post/any other document to see details. \
DO NOT format answer with Markdown since it is not well supported in target chat apps.";

pub const USER_PROMPT: &str = "give me next message";

const TEMPERATURE: f64 = 1.0;
const TOP_P: f64 = 1.0;
const FREQUENCY_PENALTY: f64 = 0.0;
const PRESENCE_PENALTY: f64 = 0.0;
const MAX_COMPLETION_TOKENS: u32 = 2048;

#[derive(Debug, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<RequestMessage>,
    pub response_format: ResponseFormat,
    pub temperature: f64,
    pub max_completion_tokens: u32,
    pub top_p: f64,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
}

#[derive(Debug, Serialize)]
pub struct RequestMessage {
    pub role: MessageRole,
    pub content: Vec<ContentPart>,
}

impl RequestMessage {
    fn text(role: MessageRole, text: &str) -> Self {
        Self {
            role,
            content: vec![ContentPart {
                kind: "text",
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContentPart {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Token accounting; only logged, so every field may be absent.
#[derive(Debug, Default, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: Option<u32>,
    #[serde(default)]
    pub completion_tokens: Option<u32>,
    #[serde(default)]
    pub total_tokens: Option<u32>,
}

impl CompletionResponse {
    /// Text of the first choice, if the API produced one.
    pub fn first_text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
    }
}

pub fn build_request(model: &str) -> CompletionRequest {
    CompletionRequest {
        model: model.to_string(),
        messages: vec![
            RequestMessage::text(MessageRole::system, SYSTEM_PROMPT),
            RequestMessage::text(MessageRole::user, USER_PROMPT),
        ],
        response_format: ResponseFormat { kind: "text" },
        temperature: TEMPERATURE,
        max_completion_tokens: MAX_COMPLETION_TOKENS,
        top_p: TOP_P,
        frequency_penalty: FREQUENCY_PENALTY,
        presence_penalty: PRESENCE_PENALTY,
    }
}

/// Chat completion client used as a `MessageSource`.
pub struct CompletionClient {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl CompletionClient {
    pub fn new(http: Client, api_key: String, model: String, base_url: String) -> Self {
        Self {
            http,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    /// Calls the completion endpoint once with the fixed study prompt.
    ///
    /// # Errors
    ///
    /// Returns `BotError::HttpError` on transport failure and
    /// `BotError::CompletionError` on a non-200 status or a malformed body.
    pub async fn complete(&self) -> Result<CompletionResponse, BotError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let auth = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|e| BotError::ConfigError(format!("invalid OpenAI API key: {e}")))?;
        headers.insert(AUTHORIZATION, auth);

        info!("Requesting completion from model {}", self.model);

        let response = self
            .http
            .post(self.endpoint())
            .headers(headers)
            .json(&build_request(&self.model))
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            return Err(BotError::CompletionError(format!(
                "unexpected response status {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        let body = response.text().await?;
        serde_json::from_str::<CompletionResponse>(&body).map_err(|e| {
            BotError::CompletionError(format!("Failed to parse completion response: {e}"))
        })
    }
}

#[async_trait]
impl MessageSource for CompletionClient {
    async fn next_message(&self) -> Result<Option<Message>, BotError> {
        let response = self.complete().await?;

        if let Some(usage) = &response.usage {
            info!(
                prompt_tokens = ?usage.prompt_tokens,
                completion_tokens = ?usage.completion_tokens,
                total_tokens = ?usage.total_tokens,
                "Completion token usage"
            );
        }

        match response.first_text() {
            Some(text) => Ok(Some(Message::generated(text))),
            None => {
                warn!(
                    choices = response.choices.len(),
                    model = response.model.as_deref().unwrap_or("unknown"),
                    "Completion response contained no message"
                );
                Ok(None)
            }
        }
    }
}
