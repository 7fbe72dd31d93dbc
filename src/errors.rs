use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Failed to load message corpus: {0}")]
    CorpusError(String),

    #[error("Message corpus is empty")]
    EmptyCorpus,

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Failed to access completion API: {0}")]
    CompletionError(String),

    #[error("Telegram API returned status {status}: {body}")]
    TelegramError { status: u16, body: String },
}

impl From<reqwest::Error> for BotError {
    fn from(error: reqwest::Error) -> Self {
        // reqwest embeds the request URL in its messages, and the Telegram
        // URL carries the bot token.
        BotError::HttpError(error.without_url().to_string())
    }
}
