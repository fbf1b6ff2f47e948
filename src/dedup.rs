// src/dedup.rs
//! Set of opportunity identifiers already posted during this process run.
//! Grows monotonically; nothing is persisted.

use std::collections::HashSet;
use std::sync::RwLock;

#[derive(Debug, Default)]
pub struct DedupStore {
    seen: RwLock<HashSet<String>>,
}

impl DedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen
            .read()
            .map(|s| s.contains(id))
            .unwrap_or_else(|poisoned| poisoned.into_inner().contains(id))
    }

    /// Returns true when the id was not present before.
    pub fn insert(&self, id: &str) -> bool {
        let mut guard = self.seen.write().unwrap_or_else(|p| p.into_inner());
        guard.insert(id.to_string())
    }

    pub fn len(&self) -> usize {
        self.seen.read().map(|s| s.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
