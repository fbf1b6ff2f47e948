// src/lib.rs
// Public library surface for integration tests (and the binary).

pub mod api;
pub mod config;
pub mod control;
pub mod dedup;
pub mod format;
pub mod ingest;
pub mod notify;
pub mod pipeline;
pub mod scheduler;
pub mod state;
pub mod telemetry;
pub mod text;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::pipeline::{Pipeline, ScanOutcome, ScanReport};
pub use crate::state::{BotState, Destination};

use crate::config::Settings;

/// Destinations for a fresh process: the primary channel plus any extras.
pub fn initial_destinations(settings: &Settings) -> Vec<Destination> {
    let mut out = vec![Destination::new(
        settings.primary_channel.clone(),
        "Main Channel",
    )];
    for (i, id) in settings.extra_channels.iter().enumerate() {
        out.push(Destination::new(id.clone(), format!("Channel {}", i + 2)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ChatId;

    fn settings(extra: Option<&str>) -> Settings {
        Settings::from_lookup(|k| match k {
            "BOT_TOKEN" => Some("123456:abc".into()),
            "CHANNEL_ID" => Some("@main".into()),
            "ADMIN_USER_ID" => Some("42".into()),
            "EXTRA_CHANNEL_IDS" => extra.map(str::to_string),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn primary_channel_comes_first_then_numbered_extras() {
        let dests = initial_destinations(&settings(Some("@second, -1001234")));
        let got: Vec<_> = dests
            .iter()
            .map(|d| (d.id.as_str(), d.display_name.as_str(), d.active))
            .collect();
        assert_eq!(
            got,
            vec![
                ("@main", "Main Channel", true),
                ("@second", "Channel 2", true),
                ("-1001234", "Channel 3", true),
            ]
        );
        assert!(dests.iter().all(|d| d.total_posts_sent == 0));
    }

    #[test]
    fn without_extras_only_the_primary_channel() {
        let dests = initial_destinations(&settings(None));
        assert_eq!(dests.len(), 1);
        assert_eq!(dests[0].id, ChatId::new("@main"));
    }
}
