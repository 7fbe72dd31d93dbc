//! Message sources: where the text for each invocation comes from

use async_trait::async_trait;

use crate::core::models::Message;
use crate::errors::BotError;

pub mod completion;
pub mod corpus;

pub use completion::CompletionClient;
pub use corpus::{Corpus, CorpusSource};

/// Produces the message for one invocation.
///
/// `Ok(None)` means there is nothing to send this time, which is not an error.
#[async_trait]
pub trait MessageSource: Send + Sync {
    async fn next_message(&self) -> Result<Option<Message>, BotError>;
}
