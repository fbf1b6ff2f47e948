// tests/scheduler_tick.rs
mod common;

use common::*;
use opportunities_bot::scheduler::{scheduled_tick, spawn_scan_scheduler};
use opportunities_bot::ScanOutcome;
use std::time::Duration;

#[tokio::test]
async fn paused_tick_skips_the_scan() {
    let h = harness(
        standard_registry(),
        FixtureFeeds::standard(),
        RecordingMessenger::default(),
        channels(&["@main"]),
    );
    h.state.pause();
    assert!(scheduled_tick(&h.pipeline).await.is_none());
    assert_eq!(h.feeds.call_count(), 0);

    h.state.resume();
    match scheduled_tick(&h.pipeline).await {
        Some(ScanOutcome::Completed(r)) => assert_eq!(r.posted, 5),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn scheduler_waits_one_interval_before_first_scan() {
    let h = harness(
        standard_registry(),
        FixtureFeeds::standard(),
        RecordingMessenger::default(),
        channels(&["@main"]),
    );
    let every = Duration::from_secs(30 * 60);
    let task = spawn_scan_scheduler(h.pipeline.clone(), every);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(h.state.stats().scans_today, 0);

    tokio::time::sleep(every).await;
    assert_eq!(h.state.stats().scans_today, 1);
    assert_eq!(h.state.total_posted(), 5);

    task.abort();
}
