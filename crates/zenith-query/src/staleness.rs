//! Staleness tracking for cached queries.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::key::QueryKey;

/// Tracks when each query was last fetched.
///
/// A key with no fetch record is stale. Staleness never removes data; it
/// only decides whether the next access triggers a refresh.
#[derive(Debug)]
pub struct StaleTracker {
    fetched_at: HashMap<QueryKey, Instant>,
    stale_time: Duration,
}

impl StaleTracker {
    pub fn new(stale_time: Duration) -> Self {
        Self {
            fetched_at: HashMap::new(),
            stale_time,
        }
    }

    /// Record a successful fetch (restarts the freshness window).
    pub fn mark_fetched(&mut self, key: &QueryKey) {
        self.fetched_at.insert(key.clone(), Instant::now());
    }

    /// Force `key` stale without dropping its data.
    pub fn mark_stale(&mut self, key: &QueryKey) {
        self.fetched_at.remove(key);
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        match self.fetched_at.get(key) {
            None => true,
            Some(at) => at.elapsed() >= self.stale_time,
        }
    }

    /// How long ago `key` was fetched.
    pub fn age(&self, key: &QueryKey) -> Option<Duration> {
        self.fetched_at.get(key).map(|at| at.elapsed())
    }

    pub fn remove(&mut self, key: &QueryKey) {
        self.fetched_at.remove(key);
    }

    /// Number of keys with a fetch record.
    pub fn len(&self) -> usize {
        self.fetched_at.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fetched_at.is_empty()
    }

    pub fn clear(&mut self) {
        self.fetched_at.clear();
    }

    pub fn stale_time(&self) -> Duration {
        self.stale_time
    }
}
