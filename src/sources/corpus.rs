//! Bundled corpus of prepared messages
//!
//! The corpus is the `messages/` tree embedded at build time, or a directory of
//! Markdown files read once at startup. Each invocation picks one entry
//! uniformly at random using the OS CSPRNG.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use rand::rngs::OsRng;
use tracing::{debug, info};

use super::MessageSource;
use crate::core::models::Message;
use crate::errors::BotError;

const MESSAGE_EXTENSION: &str = ".md";

/// `(relative path, contents)` of every `.md` file under `messages/`, sorted by path.
static BUNDLED_MESSAGES: &[(&str, &str)] =
    include!(concat!(env!("OUT_DIR"), "/bundled_messages.rs"));

#[derive(Debug, Clone, Default)]
pub struct Corpus {
    messages: Vec<Message>,
}

impl Corpus {
    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// Corpus compiled into the binary.
    pub fn bundled() -> Self {
        let messages = BUNDLED_MESSAGES
            .iter()
            .map(|(path, text)| Message::new(*path, *text))
            .collect::<Vec<_>>();
        info!("Loaded {} bundled messages", messages.len());
        Self { messages }
    }

    /// Recursively reads every `.md` file under `root`.
    ///
    /// Paths are stored relative to `root` with `/` separators and the
    /// entries are sorted by path.
    ///
    /// # Errors
    ///
    /// Returns `BotError::CorpusError` if any directory or file cannot be read.
    pub fn load(root: &Path) -> Result<Self, BotError> {
        let mut messages = Vec::new();
        walk(root, root, &mut messages)?;
        messages.sort_by(|a, b| a.path.cmp(&b.path));

        info!(
            "Loaded {} messages from corpus at {}",
            messages.len(),
            root.display()
        );
        Ok(Self { messages })
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// # Errors
    ///
    /// Returns `BotError::EmptyCorpus` when there is nothing to pick from.
    pub fn random_message(&self) -> Result<Message, BotError> {
        if self.messages.is_empty() {
            return Err(BotError::EmptyCorpus);
        }
        let index = OsRng.gen_range(0..self.messages.len());
        Ok(self.messages[index].clone())
    }
}

fn walk(root: &Path, dir: &Path, out: &mut Vec<Message>) -> Result<(), BotError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| BotError::CorpusError(format!("read dir {}: {e}", dir.display())))?;

    for entry in entries {
        let entry = entry
            .map_err(|e| BotError::CorpusError(format!("read dir {}: {e}", dir.display())))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|e| BotError::CorpusError(format!("stat {}: {e}", path.display())))?;

        if file_type.is_dir() {
            walk(root, &path, out)?;
            continue;
        }

        let is_message = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(MESSAGE_EXTENSION));
        if !is_message {
            debug!("Skipping non-message file {}", path.display());
            continue;
        }

        let text = fs::read_to_string(&path)
            .map_err(|e| BotError::CorpusError(format!("read file {}: {e}", path.display())))?;
        out.push(Message::new(relative_path(root, &path), text));
    }

    Ok(())
}

fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// `MessageSource` backed by a preloaded corpus.
#[derive(Debug, Clone)]
pub struct CorpusSource {
    corpus: Arc<Corpus>,
}

impl CorpusSource {
    pub fn new(corpus: Arc<Corpus>) -> Self {
        Self { corpus }
    }
}

#[async_trait]
impl MessageSource for CorpusSource {
    async fn next_message(&self) -> Result<Option<Message>, BotError> {
        self.corpus.random_message().map(Some)
    }
}
