// src/control/poller.rs
use std::time::Duration;
use tokio::task::JoinHandle;

use super::{Controller, IncomingMessage, UserId};
use crate::notify::telegram::{TelegramClient, Update};
use crate::notify::ChatId;

const LONG_POLL_SECS: u64 = 30;
const RETRY_DELAY: Duration = Duration::from_secs(5);

pub fn to_incoming(update: Update) -> Option<IncomingMessage> {
    let msg = update.message?;
    let text = msg.text?;
    Some(IncomingMessage {
        chat: ChatId::from(msg.chat.id),
        sender: msg.from.map(|u| UserId(u.id)),
        text,
    })
}

/// Long-poll Telegram for updates. Each message is handled in its own task,
/// so a running scan never holds up other commands.
pub fn spawn_update_poller(client: TelegramClient, controller: Controller) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut offset: i64 = 0;
        tracing::info!("update poller started");
        loop {
            let updates = match client.get_updates(offset, LONG_POLL_SECS).await {
                Ok(u) => u,
                Err(e) => {
                    tracing::warn!(error = %e, "getUpdates failed; retrying");
                    tokio::time::sleep(RETRY_DELAY).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);
                let Some(msg) = to_incoming(update) else {
                    continue;
                };
                let c = controller.clone();
                tokio::spawn(async move {
                    if let Err(e) = c.handle(&msg).await {
                        c.report_failure(&msg, &e).await;
                    }
                });
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_updates_become_messages() {
        let raw = r#"{"update_id":3,"message":{"chat":{"id":-100},"from":{"id":9},"text":"📊 Dashboard"}}"#;
        let u: Update = serde_json::from_str(raw).unwrap();
        let m = to_incoming(u).unwrap();
        assert_eq!(m.chat, ChatId::new("-100"));
        assert_eq!(m.sender, Some(UserId(9)));
        assert_eq!(m.text, "📊 Dashboard");
    }

    #[test]
    fn non_text_updates_are_dropped() {
        let raw = r#"{"update_id":4,"message":{"chat":{"id":1}}}"#;
        let u: Update = serde_json::from_str(raw).unwrap();
        assert!(to_incoming(u).is_none());
        let u: Update = serde_json::from_str(r#"{"update_id":5}"#).unwrap();
        assert!(to_incoming(u).is_none());
    }
}
