use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use super::deliver;
use crate::clients::Notifier;
use crate::core::models::Message;
use crate::sources::MessageSource;

/// Upper bound for one invocation, including both HTTP calls.
pub const INVOCATION_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationOutcome {
    Delivered,
    NothingToSend,
    DeliveryFailed,
    TimedOut,
}

/// Runs Message Source -> Notifier once per trigger.
pub struct InvocationHandler {
    source: Arc<dyn MessageSource>,
    notifier: Arc<dyn Notifier>,
    chat_id: String,
}

impl InvocationHandler {
    pub fn new(
        source: Arc<dyn MessageSource>,
        notifier: Arc<dyn Notifier>,
        chat_id: String,
    ) -> Self {
        Self {
            source,
            notifier,
            chat_id,
        }
    }

    /// Fetches one message and delivers it. Never fails: every downstream
    /// error is logged and folded into the returned outcome.
    pub async fn handle_request(&self) -> InvocationOutcome {
        let span = info_span!("invocation", correlation_id = %Uuid::new_v4());
        async {
            info!("handle request");

            let message = match self.source.next_message().await {
                Ok(Some(message)) => message,
                Ok(None) => {
                    info!("no message produced, nothing to send");
                    return InvocationOutcome::NothingToSend;
                }
                Err(e) => {
                    error!(error = %e, "failed to get message");
                    Message::default()
                }
            };

            let outcome =
                match deliver::deliver_message(self.notifier.as_ref(), &self.chat_id, &message)
                    .await
                {
                    Ok(()) => InvocationOutcome::Delivered,
                    Err(_) => InvocationOutcome::DeliveryFailed,
                };

            info!("request handled");
            outcome
        }
        .instrument(span)
        .await
    }

    /// Same as `handle_request`, bounded by `limit`.
    pub async fn handle_with_deadline(&self, limit: Duration) -> InvocationOutcome {
        match tokio::time::timeout(limit, self.handle_request()).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(timeout_ms = limit.as_millis() as u64, "invocation timed out");
                InvocationOutcome::TimedOut
            }
        }
    }

    /// Lambda entry point for scheduled events. The payload is ignored.
    ///
    /// # Errors
    ///
    /// Never returns an error; failures are logged.
    pub async fn function_handler(&self, event: LambdaEvent<Value>) -> Result<(), Error> {
        info!(request_id = %event.context.request_id, "scheduled invocation received");
        let limit = remaining_time(event.context.deadline).min(INVOCATION_TIMEOUT);
        let outcome = self.handle_with_deadline(limit).await;
        info!(?outcome, "invocation finished");
        Ok(())
    }
}

/// Time left until a deadline given in milliseconds since the Unix epoch.
pub fn remaining_time(deadline_ms: u64) -> Duration {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64);
    Duration::from_millis(deadline_ms.saturating_sub(now_ms))
}
