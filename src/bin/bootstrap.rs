// Lambda bootstrap entry point. With ENV=dev the handler runs once and exits.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use cert_prep_bot::clients::TelegramClient;
use cert_prep_bot::core::config::{AppConfig, SourceKind};
use cert_prep_bot::sources::{CompletionClient, Corpus, CorpusSource, MessageSource};
use cert_prep_bot::worker::InvocationHandler;
use cert_prep_bot::worker::handler::INVOCATION_TIMEOUT;
use lambda_runtime::{Error, LambdaEvent, service_fn};
use reqwest::Client as HttpClient;
use serde_json::Value;
use tracing::{error, info};

const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

fn build_source(config: &AppConfig, http: &HttpClient) -> anyhow::Result<Arc<dyn MessageSource>> {
    match config.source {
        SourceKind::Corpus => {
            let corpus = match &config.messages_dir {
                Some(dir) => Corpus::load(dir)
                    .with_context(|| format!("load corpus from {}", dir.display()))?,
                None => Corpus::bundled(),
            };
            anyhow::ensure!(!corpus.is_empty(), "message corpus is empty");
            Ok(Arc::new(CorpusSource::new(Arc::new(corpus))))
        }
        SourceKind::Completion => {
            let api_key = config
                .openai_api_key
                .clone()
                .context("OPENAI_API_KEY is required for the completion source")?;
            Ok(Arc::new(CompletionClient::new(
                http.clone(),
                api_key,
                config.openai_model.clone(),
                config.openai_api_base.clone(),
            )))
        }
    }
}

fn build_handler(config: &AppConfig) -> anyhow::Result<InvocationHandler> {
    let http = HttpClient::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .context("build HTTP client")?;

    let source = build_source(config, &http)?;
    let telegram = TelegramClient::new(
        http,
        config.telegram_token.clone(),
        config.telegram_api_base.clone(),
    );

    Ok(InvocationHandler::new(
        source,
        Arc::new(telegram),
        config.telegram_chat_id.clone(),
    ))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    cert_prep_bot::setup_logging();
    info!("lambda started");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("failed to get config: {}", e);
            std::process::exit(1);
        }
    };

    let handler = match build_handler(&config) {
        Ok(handler) => Arc::new(handler),
        Err(e) => {
            error!("failed to create message source: {:#}", e);
            std::process::exit(1);
        }
    };

    if config.is_dev {
        let outcome = handler.handle_with_deadline(INVOCATION_TIMEOUT).await;
        info!(?outcome, "dev invocation finished");
        return Ok(());
    }

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let handler = Arc::clone(&handler);
        async move { handler.function_handler(event).await }
    }))
    .await
}
