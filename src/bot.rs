//! Long-polling loop connecting Telegram to the search dialogue.
//!
//! Updates are processed strictly one at a time. A failed `getUpdates` or
//! `sendMessage` call is logged and never stops the loop; only Ctrl-C does.

use std::time::Duration;

use anyhow::Result;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::hh::VacancySource;
use crate::session::Conversation;
use crate::telegram::{SendMessage, TelegramClient, Update};

/// Pause after a failed `getUpdates` call before polling again.
const POLL_ERROR_PAUSE: Duration = Duration::from_secs(1);

/// Routes one update through the dialogue and sends the reply.
///
/// Returns the offset that acknowledges this update.
pub async fn process_update<S: VacancySource>(
    telegram: &TelegramClient,
    conversation: &mut Conversation<S>,
    update: Update,
) -> i64 {
    let next_offset = update.update_id + 1;

    let Some(message) = update.message else {
        return next_offset;
    };
    let Some(text) = message.text else {
        debug!(message_id = message.message_id, "skipping non-text message");
        return next_offset;
    };

    let chat_id = message.chat.id;
    let reply = conversation.handle(chat_id, &text).await;
    debug!(
        chat_id,
        message_id = message.message_id,
        state = %conversation.state(chat_id),
        "message handled"
    );

    if let Err(e) = telegram
        .send_message(&SendMessage::from_reply(chat_id, &reply))
        .await
    {
        error!(chat_id, error = %e, "failed to send reply");
    }

    next_offset
}

/// Polls until Ctrl-C.
pub async fn run<S: VacancySource>(
    telegram: TelegramClient,
    mut conversation: Conversation<S>,
    poll_timeout_secs: u64,
) -> Result<()> {
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut offset: Option<i64> = None;
    info!("bot is polling for updates");

    loop {
        let polled = tokio::select! {
            _ = &mut shutdown => {
                info!(sessions = conversation.active_sessions(), "shutting down");
                break;
            }
            polled = telegram.get_updates(offset, poll_timeout_secs) => polled,
        };

        let updates = match polled {
            Ok(updates) => updates,
            Err(e) => {
                error!(error = %e, "getUpdates failed");
                sleep(POLL_ERROR_PAUSE).await;
                continue;
            }
        };

        for update in updates {
            offset = Some(process_update(&telegram, &mut conversation, update).await);
        }
    }

    Ok(())
}
