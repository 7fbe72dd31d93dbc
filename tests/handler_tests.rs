use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use cert_prep_bot::clients::{Notifier, TelegramClient};
use cert_prep_bot::core::models::Message;
use cert_prep_bot::errors::BotError;
use cert_prep_bot::sources::{CompletionClient, Corpus, CorpusSource, MessageSource};
use cert_prep_bot::worker::{InvocationHandler, InvocationOutcome};
use lambda_runtime::{Context, LambdaEvent};
use mockito::{Matcher, Server};
use serde_json::json;

enum Scripted {
    Message(Message),
    Nothing,
    Fail,
}

struct ScriptedSource(Scripted);

#[async_trait]
impl MessageSource for ScriptedSource {
    async fn next_message(&self) -> Result<Option<Message>, BotError> {
        match &self.0 {
            Scripted::Message(msg) => Ok(Some(msg.clone())),
            Scripted::Nothing => Ok(None),
            Scripted::Fail => Err(BotError::CompletionError("upstream down".to_string())),
        }
    }
}

/// Records every send; fails the first `failures` calls.
#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
    failures: usize,
}

impl RecordingNotifier {
    fn failing(failures: usize) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failures,
        }
    }

    fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, chat_id: &str, text: &str) -> Result<(), BotError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push((chat_id.to_string(), text.to_string()));
        if sent.len() <= self.failures {
            return Err(BotError::TelegramError {
                status: 500,
                body: "internal".to_string(),
            });
        }
        Ok(())
    }
}

struct SlowSource;

#[async_trait]
impl MessageSource for SlowSource {
    async fn next_message(&self) -> Result<Option<Message>, BotError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(Some(Message::generated("late")))
    }
}

fn handler_with(
    source: impl MessageSource + 'static,
    notifier: Arc<RecordingNotifier>,
) -> InvocationHandler {
    InvocationHandler::new(Arc::new(source), notifier, "chat-1".to_string())
}

#[tokio::test]
async fn test_message_is_delivered_with_header() {
    let notifier = Arc::new(RecordingNotifier::default());
    let handler = handler_with(
        ScriptedSource(Scripted::Message(Message::new("a.md", "Hello"))),
        notifier.clone(),
    );

    let outcome = handler.handle_request().await;

    assert_eq!(outcome, InvocationOutcome::Delivered);
    assert_eq!(
        notifier.sent(),
        vec![("chat-1".to_string(), "===============\nHello".to_string())]
    );
}

#[tokio::test]
async fn test_no_message_means_no_send() {
    let notifier = Arc::new(RecordingNotifier::default());
    let handler = handler_with(ScriptedSource(Scripted::Nothing), notifier.clone());

    let outcome = handler.handle_request().await;

    assert_eq!(outcome, InvocationOutcome::NothingToSend);
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn test_fetch_error_continues_with_empty_message() {
    let notifier = Arc::new(RecordingNotifier::default());
    let handler = handler_with(ScriptedSource(Scripted::Fail), notifier.clone());

    let outcome = handler.handle_request().await;

    assert_eq!(outcome, InvocationOutcome::Delivered);
    assert_eq!(notifier.sent()[0].1, "===============\n");
}

#[tokio::test]
async fn test_send_failure_triggers_exactly_one_follow_up() {
    // Both the original send and the follow-up fail
    let notifier = Arc::new(RecordingNotifier::failing(2));
    let handler = handler_with(
        ScriptedSource(Scripted::Message(Message::new("a.md", "Hello"))),
        notifier.clone(),
    );

    let outcome = handler.handle_request().await;

    assert_eq!(outcome, InvocationOutcome::DeliveryFailed);
    let sent = notifier.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(
        sent[1].1,
        "Failed to send message for path a.md: Telegram API returned status 500: internal"
    );
}

#[tokio::test]
async fn test_follow_up_names_generated_messages() {
    let notifier = Arc::new(RecordingNotifier::failing(1));
    let handler = handler_with(
        ScriptedSource(Scripted::Message(Message::generated("fact"))),
        notifier.clone(),
    );

    let outcome = handler.handle_request().await;

    assert_eq!(outcome, InvocationOutcome::DeliveryFailed);
    let sent = notifier.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent[1].1.starts_with("Failed to send message for path <generated>:"));
}

#[tokio::test]
async fn test_deadline_bounds_the_invocation() {
    let notifier = Arc::new(RecordingNotifier::default());
    let handler = handler_with(SlowSource, notifier.clone());

    let outcome = handler
        .handle_with_deadline(Duration::from_millis(50))
        .await;

    assert_eq!(outcome, InvocationOutcome::TimedOut);
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn test_telegram_500_sends_one_diagnostic_follow_up() {
    let mut server = Server::new_async().await;
    let original = server
        .mock("POST", "/bottok/sendMessage")
        .match_body(Matcher::PartialJson(json!({
            "chat_id": "chat-1",
            "text": "===============\nHello"
        })))
        .with_status(500)
        .with_body("boom")
        .expect(1)
        .create_async()
        .await;
    let follow_up = server
        .mock("POST", "/bottok/sendMessage")
        .match_body(Matcher::PartialJson(json!({
            "chat_id": "chat-1",
            "text": "Failed to send message for path a.md: Telegram API returned status 500: boom"
        })))
        .with_status(500)
        .expect(1)
        .create_async()
        .await;

    let corpus = Arc::new(Corpus::from_messages(vec![Message::new("a.md", "Hello")]));
    let telegram = TelegramClient::new(reqwest::Client::new(), "tok".to_string(), server.url());
    let handler = InvocationHandler::new(
        Arc::new(CorpusSource::new(corpus)),
        Arc::new(telegram),
        "chat-1".to_string(),
    );

    let outcome = handler.handle_request().await;

    assert_eq!(outcome, InvocationOutcome::DeliveryFailed);
    original.assert_async().await;
    follow_up.assert_async().await;
}

#[tokio::test]
async fn test_empty_completion_sends_nothing() {
    let mut server = Server::new_async().await;
    let _completion = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices": []}"#)
        .create_async()
        .await;
    let telegram_mock = server
        .mock("POST", Matcher::Regex(r"^/bot.*/sendMessage$".to_string()))
        .expect(0)
        .create_async()
        .await;

    let http = reqwest::Client::new();
    let completion = CompletionClient::new(
        http.clone(),
        "sk-test".to_string(),
        "gpt-4o".to_string(),
        server.url(),
    );
    let telegram = TelegramClient::new(http, "tok".to_string(), server.url());
    let handler = InvocationHandler::new(
        Arc::new(completion),
        Arc::new(telegram),
        "chat-1".to_string(),
    );

    let outcome = handler.handle_request().await;

    assert_eq!(outcome, InvocationOutcome::NothingToSend);
    telegram_mock.assert_async().await;
}

fn scheduled_event(deadline_in: Duration) -> LambdaEvent<serde_json::Value> {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64;
    let mut context = Context::default();
    context.request_id = "req-1".to_string();
    context.deadline = now_ms + deadline_in.as_millis() as u64;
    LambdaEvent::new(json!({"source": "aws.events"}), context)
}

#[tokio::test]
async fn test_lambda_entry_respects_context_deadline() {
    let notifier = Arc::new(RecordingNotifier::default());
    let handler = handler_with(SlowSource, notifier.clone());

    let started = Instant::now();
    let result = handler
        .function_handler(scheduled_event(Duration::from_millis(300)))
        .await;

    assert!(result.is_ok());
    assert!(
        started.elapsed() < Duration::from_secs(5),
        "took {:?}",
        started.elapsed()
    );
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn test_lambda_entry_reports_success_when_delivery_fails() {
    let notifier = Arc::new(RecordingNotifier::failing(2));
    let handler = handler_with(ScriptedSource(Scripted::Fail), notifier.clone());

    let result = handler
        .function_handler(scheduled_event(Duration::from_secs(10)))
        .await;

    assert!(result.is_ok());
    assert_eq!(notifier.sent().len(), 2);
}
