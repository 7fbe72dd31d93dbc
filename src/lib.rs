/// cert-prep-bot - a scheduled Telegram bot that posts one certification study
/// message per invocation.
///
/// Each run picks a message from one of two sources and forwards it to a fixed
/// Telegram chat:
/// 1. A bundled corpus of Markdown notes, sampled uniformly at random
/// 2. A freshly generated note from the OpenAI chat completions API
///
/// # Architecture
///
/// The system uses:
/// - AWS Lambda (scheduled trigger) for serverless execution
/// - reqwest for the Telegram and OpenAI HTTP integrations
/// - Tokio for async runtime
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use cert_prep_bot::clients::TelegramClient;
/// use cert_prep_bot::core::models::Message;
/// use cert_prep_bot::sources::{Corpus, CorpusSource};
/// use cert_prep_bot::worker::InvocationHandler;
///
/// #[tokio::main]
/// async fn main() {
///     cert_prep_bot::setup_logging();
///
///     let corpus = Arc::new(Corpus::from_messages(vec![Message::new(
///         "s3/storage-classes.md",
///         "S3 Glacier Instant Retrieval offers millisecond access.",
///     )]));
///     let telegram = TelegramClient::new(
///         reqwest::Client::new(),
///         "dummy_token".to_string(),
///         "https://api.telegram.org".to_string(),
///     );
///
///     let handler = InvocationHandler::new(
///         Arc::new(CorpusSource::new(corpus)),
///         Arc::new(telegram),
///         "dummy_chat_id".to_string(),
///     );
///     let outcome = handler.handle_request().await;
///     println!("{outcome:?}");
/// }
/// ```
pub mod clients;
pub mod core;
pub mod errors;
pub mod sources;
pub mod worker;

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// Sets up tracing-subscriber with a JSON formatter suitable for `CloudWatch`
/// Logs. The level defaults to `info` and can be overridden with `RUST_LOG`.
/// Calling it more than once is a no-op.
///
/// # Example
///
/// ```
/// cert_prep_bot::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
