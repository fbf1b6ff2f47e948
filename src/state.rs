// src/state.rs
//! Process-wide bot state, owned explicitly and shared via `Arc<BotState>`.
//! Locks are only taken for short synchronous mutations, never across `.await`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use crate::dedup::DedupStore;
use crate::ingest::types::Category;
use crate::notify::ChatId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Destination {
    pub id: ChatId,
    pub display_name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub total_posts_sent: u64,
}

impl Destination {
    pub fn new(id: ChatId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            active: true,
            created_at: Utc::now(),
            total_posts_sent: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OperationalState {
    pub paused: bool,
    pub paused_at: Option<DateTime<Utc>>,
    pub resumed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total_posted: u64,
    pub per_category: BTreeMap<Category, u64>,
    pub last_scan: Option<DateTime<Utc>>,
    pub scans_today: u32,
    #[serde(skip)]
    scans_day: Option<NaiveDate>,
}

impl Stats {
    pub fn posted_in(&self, category: Category) -> u64 {
        self.per_category.get(&category).copied().unwrap_or(0)
    }

    fn record_post(&mut self, category: Category) {
        self.total_posted += 1;
        *self.per_category.entry(category).or_insert(0) += 1;
    }

    /// The daily scan counter restarts when the UTC date changes.
    fn record_scan(&mut self, at: DateTime<Utc>) {
        let day = at.date_naive();
        if self.scans_day != Some(day) {
            self.scans_day = Some(day);
            self.scans_today = 0;
        }
        self.scans_today += 1;
        self.last_scan = Some(at);
    }
}

#[derive(Debug)]
pub struct BotState {
    pub dedup: DedupStore,
    stats: Mutex<Stats>,
    ops: Mutex<OperationalState>,
    destinations: Mutex<Vec<Destination>>,
    scanning: AtomicBool,
    started_at: Instant,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|p| p.into_inner())
}

impl BotState {
    pub fn new(destinations: Vec<Destination>) -> Self {
        Self {
            dedup: DedupStore::new(),
            stats: Mutex::new(Stats::default()),
            ops: Mutex::new(OperationalState::default()),
            destinations: Mutex::new(destinations),
            scanning: AtomicBool::new(false),
            started_at: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    // --- operational flags ---

    pub fn is_paused(&self) -> bool {
        lock(&self.ops).paused
    }

    pub fn pause(&self) {
        let mut ops = lock(&self.ops);
        ops.paused = true;
        ops.paused_at = Some(Utc::now());
        tracing::info!("bot paused");
    }

    pub fn resume(&self) {
        let mut ops = lock(&self.ops);
        ops.paused = false;
        ops.resumed_at = Some(Utc::now());
        tracing::info!("bot resumed");
    }

    pub fn operational(&self) -> OperationalState {
        lock(&self.ops).clone()
    }

    // --- stats ---

    pub fn stats(&self) -> Stats {
        lock(&self.stats).clone()
    }

    pub fn total_posted(&self) -> u64 {
        lock(&self.stats).total_posted
    }

    pub fn record_post(&self, category: Category) {
        lock(&self.stats).record_post(category);
    }

    pub fn record_scan(&self, at: DateTime<Utc>) {
        lock(&self.stats).record_scan(at);
    }

    // --- destinations ---

    pub fn destinations(&self) -> Vec<Destination> {
        lock(&self.destinations).clone()
    }

    pub fn active_destinations(&self) -> Vec<Destination> {
        lock(&self.destinations)
            .iter()
            .filter(|d| d.active)
            .cloned()
            .collect()
    }

    /// Returns false when no destination has that id.
    pub fn set_destination_active(&self, id: &ChatId, active: bool) -> bool {
        let mut dests = lock(&self.destinations);
        match dests.iter_mut().find(|d| &d.id == id) {
            Some(d) => {
                d.active = active;
                true
            }
            None => false,
        }
    }

    pub fn record_destination_post(&self, id: &ChatId) {
        if let Some(d) = lock(&self.destinations).iter_mut().find(|d| &d.id == id) {
            d.total_posts_sent += 1;
        }
    }

    // --- scan guard ---

    /// Claim the single scan slot. `None` when a scan is already running.
    pub fn try_begin_scan(&self) -> Option<ScanGuard<'_>> {
        self.scanning
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ScanGuard { state: self })
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::Acquire)
    }
}

/// Releases the scan slot on drop, including on panic.
#[derive(Debug)]
pub struct ScanGuard<'a> {
    state: &'a BotState,
}

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        self.state.scanning.store(false, Ordering::Release);
    }
}
