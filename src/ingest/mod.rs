// src/ingest/mod.rs
pub mod rss;
pub mod types;

use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use std::time::Duration;

use crate::dedup::DedupStore;
use crate::ingest::types::{Category, FeedItem, FeedSource, FeedSpec, Opportunity};
use crate::text::{derive_identifier, format_date_label, strip_and_normalize};

pub const DEFAULT_ITEMS_PER_FEED: usize = 3;
pub const DEFAULT_FEED_TIMEOUT: Duration = Duration::from_secs(20);

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_fetch_total", "Feed fetch attempts.");
        describe_counter!(
            "feed_fetch_errors_total",
            "Feed fetches that failed or timed out."
        );
        describe_counter!(
            "feed_items_skipped_total",
            "Feed items dropped as already posted or without a link."
        );
        describe_histogram!("feed_parse_ms", "Feed parse time in milliseconds.");
    });
}

/// Result of fetching one feed. Failures are data, not errors: the scan goes on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Fetch worked; the list may be empty when nothing new was found.
    Items(Vec<Opportunity>),
    Failed { reason: String },
    TimedOut,
}

impl FetchOutcome {
    pub fn is_failure(&self) -> bool {
        !matches!(self, FetchOutcome::Items(_))
    }

    pub fn into_items(self) -> Vec<Opportunity> {
        match self {
            FetchOutcome::Items(v) => v,
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FetchLimits {
    pub items_per_feed: usize,
    pub timeout: Duration,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            items_per_feed: DEFAULT_ITEMS_PER_FEED,
            timeout: DEFAULT_FEED_TIMEOUT,
        }
    }
}

/// Map a raw item to an opportunity. Items without link or guid are dropped.
pub fn to_opportunity(item: &FeedItem, feed: &FeedSpec, category: Category) -> Option<Opportunity> {
    let link = item.permalink()?.to_string();
    Some(Opportunity {
        id: derive_identifier(&link),
        title: strip_and_normalize(item.title.as_deref().unwrap_or_default()),
        description: strip_and_normalize(item.description.as_deref().unwrap_or_default()),
        published_label: format_date_label(item.pub_date.as_deref()),
        source_name: feed.name.clone(),
        category,
        link,
    })
}

/// Fetch one feed under the time budget, keep the first `items_per_feed`
/// items in feed order and drop the ones already in `seen`.
/// Never returns an error; does not touch `seen`.
pub async fn fetch_opportunities(
    source: &dyn FeedSource,
    feed: &FeedSpec,
    category: Category,
    seen: &DedupStore,
    limits: FetchLimits,
) -> FetchOutcome {
    ensure_metrics_described();
    counter!("feed_fetch_total").increment(1);
    tracing::info!(source = %feed.name, %category, "fetching feed");

    let items = match tokio::time::timeout(limits.timeout, source.fetch_items(feed)).await {
        Ok(Ok(items)) => items,
        Ok(Err(e)) => {
            tracing::warn!(source = %feed.name, error = ?e, "feed failed, skipping");
            counter!("feed_fetch_errors_total").increment(1);
            return FetchOutcome::Failed {
                reason: format!("{e:#}"),
            };
        }
        Err(_) => {
            tracing::warn!(
                source = %feed.name,
                timeout_secs = limits.timeout.as_secs(),
                "feed timed out, skipping"
            );
            counter!("feed_fetch_errors_total").increment(1);
            return FetchOutcome::TimedOut;
        }
    };

    let mut fresh: Vec<Opportunity> = Vec::new();
    let mut skipped = 0u64;
    for item in items.iter().take(limits.items_per_feed) {
        match to_opportunity(item, feed, category) {
            Some(opp) if !seen.contains(&opp.id) && !fresh.iter().any(|o| o.id == opp.id) => {
                fresh.push(opp)
            }
            _ => skipped += 1,
        }
    }
    counter!("feed_items_skipped_total").increment(skipped);

    tracing::info!(source = %feed.name, new = fresh.len(), "feed fetched");
    FetchOutcome::Items(fresh)
}
