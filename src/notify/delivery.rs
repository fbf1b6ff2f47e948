// src/notify/delivery.rs
use metrics::counter;
use std::time::Duration;

use super::{ChatId, Messenger, OutgoingMessage};
use crate::state::BotState;

/// Per-destination result of one delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: Vec<ChatId>,
    pub failed: Vec<(ChatId, String)>,
}

impl DeliveryReport {
    pub fn any_delivered(&self) -> bool {
        !self.delivered.is_empty()
    }
}

/// Send `text` (Markdown) to every active destination, in order.
/// A failing destination is logged and skipped; its counter is left alone.
/// `send_delay` separates consecutive send attempts.
pub async fn deliver(
    messenger: &dyn Messenger,
    state: &BotState,
    text: &str,
    send_delay: Duration,
) -> DeliveryReport {
    let msg = OutgoingMessage::markdown(text);
    let mut report = DeliveryReport::default();

    for (i, dest) in state.active_destinations().into_iter().enumerate() {
        if i > 0 && !send_delay.is_zero() {
            tokio::time::sleep(send_delay).await;
        }
        match messenger.send(&dest.id, &msg).await {
            Ok(()) => {
                state.record_destination_post(&dest.id);
                counter!("messages_sent_total").increment(1);
                tracing::info!(destination = %dest.display_name, "posted");
                report.delivered.push(dest.id);
            }
            Err(e) => {
                counter!("delivery_errors_total").increment(1);
                tracing::warn!(destination = %dest.display_name, error = %e, "delivery failed");
                report.failed.push((dest.id, e.to_string()));
            }
        }
    }
    report
}
