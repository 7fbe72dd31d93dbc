//! Telegram Bot API client module

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use tracing::{error, warn};

use crate::errors::BotError;

/// Delivers text to a chat destination.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, chat_id: &str, text: &str) -> Result<(), BotError>;
}

#[derive(Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
}

pub struct TelegramClient {
    http: Client,
    token: String,
    base_url: String,
}

impl TelegramClient {
    pub fn new(http: Client, token: String, base_url: String) -> Self {
        Self {
            http,
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    /// # Errors
    ///
    /// Returns `BotError::HttpError` on transport failure and
    /// `BotError::TelegramError` for any status other than 200.
    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), BotError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let resp = self
            .http
            .post(self.api_url("sendMessage"))
            .headers(headers)
            .json(&SendMessageRequest { chat_id, text })
            .send()
            .await?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            warn!(status_code = status.as_u16(), "unexpected status code");
            let body = match resp.text().await {
                Ok(body) => {
                    warn!(body = %body, "response body");
                    body
                }
                Err(e) => {
                    error!("read response body: {}", e.without_url());
                    String::new()
                }
            };
            return Err(BotError::TelegramError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn send(&self, chat_id: &str, text: &str) -> Result<(), BotError> {
        self.send_message(chat_id, text).await
    }
}
