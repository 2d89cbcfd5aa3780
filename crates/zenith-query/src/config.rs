//! Query cache policy.

use std::time::Duration;

/// How long fetched data counts as fresh.
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(5 * 60);

/// Retries after the first failed attempt.
pub const DEFAULT_RETRY: u32 = 1;

/// Delay before the first retry; doubles per attempt.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Upper bound on the retry delay.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Maximum number of cached queries before LRU eviction.
pub const DEFAULT_MAX_ENTRIES: usize = 1_000;

/// Policy applied to every query in a [`QueryCache`](crate::QueryCache).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPolicy {
    /// Mark everything stale when the front end regains focus.
    pub refetch_on_focus: bool,

    /// Number of retries after a failed fetch.
    pub retry: u32,

    /// Age after which cached data is refreshed on next access.
    /// Stale data is not evicted.
    pub stale_time: Duration,

    /// Base delay between retries.
    pub retry_delay: Duration,

    /// Capacity of the cache.
    pub max_entries: usize,
}

impl Default for QueryPolicy {
    fn default() -> Self {
        Self {
            refetch_on_focus: false,
            retry: DEFAULT_RETRY,
            stale_time: DEFAULT_STALE_TIME,
            retry_delay: DEFAULT_RETRY_DELAY,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl QueryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_refetch_on_focus(mut self, enabled: bool) -> Self {
        self.refetch_on_focus = enabled;
        self
    }

    pub fn with_retry(mut self, retry: u32) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }

    /// Delay before retry number `attempt` (zero-based).
    pub fn retry_delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.retry_delay
            .checked_mul(factor)
            .unwrap_or(MAX_RETRY_DELAY)
            .min(MAX_RETRY_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = QueryPolicy::default();
        assert!(!policy.refetch_on_focus);
        assert_eq!(policy.retry, 1);
        assert_eq!(policy.stale_time, Duration::from_secs(300));
    }

    #[test]
    fn test_retry_delay_doubles_and_caps() {
        let policy = QueryPolicy::default();
        assert_eq!(policy.retry_delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.retry_delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.retry_delay_for(4), Duration::from_secs(16));
        assert_eq!(policy.retry_delay_for(5), MAX_RETRY_DELAY);
        assert_eq!(policy.retry_delay_for(40), MAX_RETRY_DELAY);
    }
}
