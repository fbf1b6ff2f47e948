// src/scheduler.rs
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::pipeline::{Pipeline, ScanOutcome};

/// One scheduler tick: scan unless paused. Returns None when skipped.
pub async fn scheduled_tick(pipeline: &Pipeline) -> Option<ScanOutcome> {
    if pipeline.state().is_paused() {
        tracing::debug!("scheduled scan skipped: paused");
        return None;
    }
    tracing::info!("scheduled scan");
    Some(pipeline.run_scan().await)
}

/// Fixed-interval background scans. The first tick fires one interval after start.
pub fn spawn_scan_scheduler(pipeline: Pipeline, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let start = tokio::time::Instant::now() + every;
        let mut ticker = tokio::time::interval_at(start, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            // Own task: a panicking scan must not kill the scheduler.
            let p = pipeline.clone();
            if let Err(e) = tokio::spawn(async move { scheduled_tick(&p).await }).await {
                tracing::error!(error = %e, "scheduled scan aborted");
            }
        }
    })
}

/// Keep a sleeping free-tier host awake by hitting our own health endpoint.
pub fn spawn_self_ping(client: reqwest::Client, base_url: String, every: Duration) -> JoinHandle<()> {
    let url = format!("{}/health", base_url.trim_end_matches('/'));
    tokio::spawn(async move {
        let start = tokio::time::Instant::now() + every;
        let mut ticker = tokio::time::interval_at(start, every);
        loop {
            ticker.tick().await;
            match client.get(&url).send().await {
                Ok(resp) => tracing::debug!(status = %resp.status(), "self-ping"),
                Err(e) => tracing::warn!(error = %e, "self-ping failed"),
            }
        }
    })
}
