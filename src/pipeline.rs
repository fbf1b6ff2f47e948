// src/pipeline.rs
//! # Discovery pipeline
//! categories -> feeds -> new items -> format -> deliver -> mark seen -> count.
//!
//! An item is marked seen after delivery was attempted, even when every
//! destination failed: a lost post is preferred over a repeated one.

use chrono::Utc;
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use std::sync::Arc;

use crate::config::{Pacing, SourceRegistry};
use crate::format::{format_opportunity, with_branding};
use crate::ingest::types::FeedSource;
use crate::ingest::{fetch_opportunities, FetchLimits};
use crate::notify::{deliver, Messenger};
use crate::state::BotState;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("scans_total", "Completed discovery scans.");
        describe_counter!(
            "opportunities_posted_total",
            "Opportunities pushed through delivery."
        );
        describe_counter!("messages_sent_total", "Successful channel sends.");
        describe_counter!("delivery_errors_total", "Failed channel sends.");
        describe_gauge!("scan_last_run_ts", "Unix ts of the last finished scan.");
    });
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Opportunities pushed through delivery in this scan.
    pub posted: u64,
    /// Of those, how many reached no destination at all.
    pub undelivered: u64,
    pub failed_sources: Vec<String>,
    /// Running total after the scan.
    pub total_posted: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Completed(ScanReport),
    AlreadyRunning,
}

#[derive(Clone)]
pub struct Pipeline {
    feeds: Arc<dyn FeedSource>,
    messenger: Arc<dyn Messenger>,
    registry: Arc<SourceRegistry>,
    state: Arc<BotState>,
    limits: FetchLimits,
    pacing: Pacing,
}

impl Pipeline {
    pub fn new(
        feeds: Arc<dyn FeedSource>,
        messenger: Arc<dyn Messenger>,
        registry: Arc<SourceRegistry>,
        state: Arc<BotState>,
    ) -> Self {
        Self {
            feeds,
            messenger,
            registry,
            state,
            limits: FetchLimits::default(),
            pacing: Pacing::default(),
        }
    }

    pub fn with_limits(mut self, limits: FetchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn state(&self) -> &Arc<BotState> {
        &self.state
    }

    pub fn registry(&self) -> &Arc<SourceRegistry> {
        &self.registry
    }

    /// One full pass over every category and feed, in configured order.
    /// Only one scan runs at a time; a concurrent call returns `AlreadyRunning`.
    pub async fn run_scan(&self) -> ScanOutcome {
        ensure_metrics_described();
        let Some(_guard) = self.state.try_begin_scan() else {
            tracing::warn!("scan requested while another is running; skipped");
            return ScanOutcome::AlreadyRunning;
        };

        tracing::info!(feeds = self.registry.feed_count(), "scan started");
        let mut report = ScanReport::default();
        let mut first = true;

        for (category, feeds) in self.registry.categories() {
            tracing::debug!(%category, "scanning category");
            for feed in feeds {
                let outcome = fetch_opportunities(
                    self.feeds.as_ref(),
                    feed,
                    *category,
                    &self.state.dedup,
                    self.limits,
                )
                .await;
                if outcome.is_failure() {
                    report.failed_sources.push(feed.name.clone());
                }

                for opp in outcome.into_items() {
                    if !first && !self.pacing.item_delay.is_zero() {
                        tokio::time::sleep(self.pacing.item_delay).await;
                    }
                    first = false;

                    let message = with_branding(&format_opportunity(&opp));
                    let delivery = deliver(
                        self.messenger.as_ref(),
                        &self.state,
                        &message,
                        self.pacing.send_delay,
                    )
                    .await;
                    if !delivery.any_delivered() {
                        report.undelivered += 1;
                        tracing::warn!(id = %opp.id, title = %opp.title, "no destination accepted the post");
                    }

                    self.state.dedup.insert(&opp.id);
                    self.state.record_post(opp.category);
                    counter!("opportunities_posted_total").increment(1);
                    report.posted += 1;
                }
            }
        }

        let now = Utc::now();
        self.state.record_scan(now);
        counter!("scans_total").increment(1);
        gauge!("scan_last_run_ts").set(now.timestamp() as f64);

        report.total_posted = self.state.total_posted();
        tracing::info!(
            posted = report.posted,
            undelivered = report.undelivered,
            failed_sources = report.failed_sources.len(),
            total = report.total_posted,
            "scan complete"
        );
        ScanOutcome::Completed(report)
    }
}
