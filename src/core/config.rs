use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::errors::BotError;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com";

/// Which `MessageSource` implementation feeds the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKind {
    #[default]
    Corpus,
    Completion,
}

impl FromStr for SourceKind {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "corpus" => Ok(Self::Corpus),
            "completion" | "openai" => Ok(Self::Completion),
            other => Err(BotError::ConfigError(format!(
                "MESSAGE_SOURCE: unknown source {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub is_dev: bool,
    pub telegram_token: String,
    pub telegram_chat_id: String,
    pub telegram_api_base: String,
    pub source: SourceKind,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_api_base: String,
    /// Overrides the bundled corpus with files read from this directory.
    pub messages_dir: Option<PathBuf>,
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns `BotError::ConfigError` listing every missing required variable.
    pub fn from_env() -> Result<Self, BotError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Empty values count as missing.
    ///
    /// # Errors
    ///
    /// Returns `BotError::ConfigError` listing every missing required variable,
    /// or naming an unrecognised `MESSAGE_SOURCE`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BotError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let is_dev = get("ENV").is_some_and(|v| v == "dev");
        let source = match get("MESSAGE_SOURCE") {
            Some(raw) => raw.parse()?,
            None => SourceKind::default(),
        };

        let telegram_token = get("TELEGRAM_TOKEN");
        let telegram_chat_id = get("TELEGRAM_CHAT_ID");
        let openai_api_key = get("OPENAI_API_KEY");

        let mut missing = Vec::new();
        if telegram_token.is_none() {
            missing.push("TELEGRAM_TOKEN");
        }
        if telegram_chat_id.is_none() {
            missing.push("TELEGRAM_CHAT_ID");
        }
        if source == SourceKind::Completion && openai_api_key.is_none() {
            missing.push("OPENAI_API_KEY");
        }

        let (Some(telegram_token), Some(telegram_chat_id)) = (telegram_token, telegram_chat_id)
        else {
            return Err(missing_error(&missing));
        };
        if !missing.is_empty() {
            return Err(missing_error(&missing));
        }

        Ok(Self {
            is_dev,
            telegram_token,
            telegram_chat_id,
            telegram_api_base: get("TELEGRAM_API_BASE")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string()),
            source,
            openai_api_key,
            openai_model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            openai_api_base: get("OPENAI_API_BASE")
                .unwrap_or_else(|| DEFAULT_OPENAI_API_BASE.to_string()),
            messages_dir: get("MESSAGES_DIR").map(PathBuf::from),
        })
    }
}

fn missing_error(missing: &[&str]) -> BotError {
    BotError::ConfigError(format!(
        "missing required parameters: {}",
        missing.join(", ")
    ))
}
