use tracing::{error, info};

use crate::clients::Notifier;
use crate::core::models::Message;
use crate::errors::BotError;

/// Separator placed above every delivered message.
pub const MESSAGE_HEADER: &str = "===============";

pub fn format_outgoing(message: &Message) -> String {
    format!("{MESSAGE_HEADER}\n{}", message.text)
}

pub fn format_failure_notice(message: &Message, err: &BotError) -> String {
    format!(
        "Failed to send message for path {}: {}",
        message.display_path(),
        err
    )
}

/// Sends `message`; on failure posts exactly one diagnostic follow-up.
///
/// The follow-up's own result is only logged.
///
/// # Errors
///
/// Returns the original send error after the follow-up has been attempted.
pub async fn deliver_message(
    notifier: &dyn Notifier,
    chat_id: &str,
    message: &Message,
) -> Result<(), BotError> {
    #[cfg(feature = "debug-logs")]
    info!("Outgoing message text:\n{}", message.text);

    match notifier.send(chat_id, &format_outgoing(message)).await {
        Ok(()) => {
            info!(path = message.display_path(), "message sent");
            Ok(())
        }
        Err(e) => {
            error!(path = message.display_path(), error = %e, "failed to send message");
            if let Err(follow_up_err) = notifier
                .send(chat_id, &format_failure_notice(message, &e))
                .await
            {
                error!(error = %follow_up_err, "failed to send failure notice");
            }
            Err(e)
        }
    }
}
