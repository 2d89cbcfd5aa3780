//! Query cache with stale-while-refresh reads and bounded retry.

use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, trace, warn};

use crate::config::QueryPolicy;
use crate::error::{QueryError, Retryable};
use crate::key::QueryKey;
use crate::staleness::StaleTracker;

/// Cached data for one query.
#[derive(Debug, Clone)]
struct CacheEntry {
    data: Value,
    /// Generation the data was fetched under.
    epoch: u64,
    /// A background refresh is in flight.
    refreshing: bool,
}

struct CacheInner {
    lru: LruCache<QueryKey, CacheEntry>,
    staleness: StaleTracker,
}

enum Lookup {
    Fresh(Value),
    Stale { data: Value, start_refresh: bool },
    Miss,
}

/// Cache for read queries, governed by one [`QueryPolicy`].
///
/// Cloning shares the underlying cache.
///
/// Entries carry the generation they were fetched under. [`reset`] moves
/// the cache to a new generation, after which older entries read as misses
/// and fetches started before the reset are not stored.
///
/// [`reset`]: QueryCache::reset
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<RwLock<CacheInner>>,
    epoch: Arc<AtomicU64>,
    policy: QueryPolicy,
}

impl QueryCache {
    pub fn new(policy: QueryPolicy) -> Self {
        let cap = NonZeroUsize::new(policy.max_entries).unwrap_or(NonZeroUsize::MIN);
        let inner = CacheInner {
            lru: LruCache::new(cap),
            staleness: StaleTracker::new(policy.stale_time),
        };
        Self {
            inner: Arc::new(RwLock::new(inner)),
            epoch: Arc::new(AtomicU64::new(0)),
            policy,
        }
    }

    pub fn policy(&self) -> &QueryPolicy {
        &self.policy
    }

    /// Current cache generation.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Run a query through the cache.
    ///
    /// - fresh data is returned without calling `fetcher`
    /// - stale data is returned immediately and one background refresh is
    ///   started (concurrent stale reads share it)
    /// - on a miss `fetcher` is awaited, with the policy's retries
    pub async fn fetch<T, E, F, Fut>(&self, key: &QueryKey, fetcher: F) -> Result<T, QueryError<E>>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        E: Retryable + std::fmt::Display + Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        match self.lookup(key).await {
            Lookup::Fresh(data) => {
                trace!(key = %key, "Query cache hit");
                Ok(serde_json::from_value(data)?)
            }
            Lookup::Stale {
                data,
                start_refresh,
            } => {
                if start_refresh {
                    debug!(key = %key, "Serving stale data, refreshing in background");
                    self.spawn_refresh(key.clone(), fetcher);
                }
                Ok(serde_json::from_value(data)?)
            }
            Lookup::Miss => {
                debug!(key = %key, "Query cache miss");
                let epoch = self.epoch();
                let value = run_with_retry(&self.policy, &fetcher)
                    .await
                    .map_err(QueryError::Fetch)?;
                self.store(key, serde_json::to_value(&value)?, epoch).await;
                Ok(value)
            }
        }
    }

    async fn lookup(&self, key: &QueryKey) -> Lookup {
        let epoch = self.epoch();
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        if inner.lru.peek(key).is_some_and(|entry| entry.epoch != epoch) {
            trace!(key = %key, "Dropping query data from an earlier generation");
            inner.lru.pop(key);
            inner.staleness.remove(key);
        }

        let stale = inner.staleness.is_stale(key);
        match inner.lru.get_mut(key) {
            None => Lookup::Miss,
            Some(entry) if !stale => Lookup::Fresh(entry.data.clone()),
            Some(entry) => {
                let start_refresh = !entry.refreshing;
                entry.refreshing = true;
                Lookup::Stale {
                    data: entry.data.clone(),
                    start_refresh,
                }
            }
        }
    }

    fn spawn_refresh<T, E, F, Fut>(&self, key: QueryKey, fetcher: F)
    where
        T: Serialize + Send + 'static,
        E: Retryable + std::fmt::Display + Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let cache = self.clone();
        let epoch = self.epoch();
        tokio::spawn(async move {
            let refreshed = run_with_retry(&cache.policy, &fetcher)
                .await
                .map_err(|e| e.to_string())
                .and_then(|value| serde_json::to_value(&value).map_err(|e| e.to_string()));

            match refreshed {
                Ok(data) => cache.store(&key, data, epoch).await,
                Err(e) => {
                    warn!(key = %key, error = %e, "Background refresh failed, keeping stale data");
                    let mut inner = cache.inner.write().await;
                    if let Some(entry) = inner.lru.peek_mut(&key) {
                        entry.refreshing = false;
                    }
                }
            }
        });
    }

    /// Store `data` fetched under generation `epoch`.
    ///
    /// Data from an earlier generation is discarded.
    async fn store(&self, key: &QueryKey, data: Value, epoch: u64) {
        let mut inner = self.inner.write().await;
        if epoch != self.epoch() {
            debug!(key = %key, "Discarding query result fetched before a reset");
            return;
        }
        let entry = CacheEntry {
            data,
            epoch,
            refreshing: false,
        };
        if let Some((evicted, _)) = inner.lru.push(key.clone(), entry)
            && &evicted != key
        {
            debug!(key = %evicted, "Evicting least recently used query");
            inner.staleness.remove(&evicted);
        }
        inner.staleness.mark_fetched(key);
        trace!(key = %key, cache_size = inner.lru.len(), "Query data stored");
    }

    /// Seed the cache with data fetched elsewhere (e.g. a mutation response).
    pub async fn set<T: Serialize>(&self, key: &QueryKey, value: &T) -> Result<(), serde_json::Error> {
        let epoch = self.epoch();
        self.store(key, serde_json::to_value(value)?, epoch).await;
        Ok(())
    }

    /// Cached data for `key`, fresh or stale, without fetching.
    pub async fn peek<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let epoch = self.epoch();
        let inner = self.inner.read().await;
        inner
            .lru
            .peek(key)
            .filter(|entry| entry.epoch == epoch)
            .and_then(|entry| serde_json::from_value(entry.data.clone()).ok())
    }

    pub async fn is_stale(&self, key: &QueryKey) -> bool {
        self.inner.read().await.staleness.is_stale(key)
    }

    /// Mark `key` stale so the next read refreshes it.
    pub async fn invalidate(&self, key: &QueryKey) {
        let mut inner = self.inner.write().await;
        inner.staleness.mark_stale(key);
        debug!(key = %key, "Query invalidated");
    }

    /// Mark every query for `resource` stale. Returns how many were marked.
    pub async fn invalidate_resource(&self, resource: &str) -> usize {
        let epoch = self.epoch();
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        let keys: Vec<QueryKey> = inner
            .lru
            .iter()
            .filter(|(key, entry)| entry.epoch == epoch && key.resource() == resource)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &keys {
            inner.staleness.mark_stale(key);
        }
        debug!(resource = %resource, count = keys.len(), "Resource queries invalidated");
        keys.len()
    }

    /// Hook for the front end regaining focus.
    ///
    /// Marks everything stale only if the policy asks for it. Returns how
    /// many queries were marked.
    pub async fn on_focus_regained(&self) -> usize {
        if !self.policy.refetch_on_focus {
            trace!("Focus regained, refetch on focus disabled");
            return 0;
        }
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        let count = inner.lru.len();
        inner.staleness.clear();
        debug!(count = count, "Focus regained, all queries marked stale");
        count
    }

    /// Start a new generation without waiting for the cache lock.
    ///
    /// Everything cached so far becomes unreachable, and fetches already in
    /// flight will not store their results. Usable from synchronous code
    /// such as gateway stages.
    pub fn reset(&self) -> u64 {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut inner) = self.inner.try_write() {
            inner.lru.clear();
            inner.staleness.clear();
        }
        debug!(epoch = epoch, "Query cache reset");
        epoch
    }

    /// Drop all cached data and start a new generation.
    pub async fn clear(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let mut inner = self.inner.write().await;
        inner.lru.clear();
        inner.staleness.clear();
    }

    /// Number of queries cached in the current generation.
    pub async fn len(&self) -> usize {
        let epoch = self.epoch();
        let inner = self.inner.read().await;
        inner.lru.iter().filter(|(_, entry)| entry.epoch == epoch).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn stats(&self) -> CacheStats {
        let epoch = self.epoch();
        let inner = self.inner.read().await;
        let live: Vec<&QueryKey> = inner
            .lru
            .iter()
            .filter(|(_, entry)| entry.epoch == epoch)
            .map(|(key, _)| key)
            .collect();
        let stale = live
            .iter()
            .filter(|key| inner.staleness.is_stale(key))
            .count();
        CacheStats {
            size: live.len(),
            capacity: self.policy.max_entries,
            stale,
        }
    }
}

async fn run_with_retry<T, E, F, Fut>(policy: &QueryPolicy, fetcher: &F) -> Result<T, E>
where
    E: Retryable + std::fmt::Display,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        match fetcher().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < policy.retry && e.is_retryable() => {
                let delay = policy.retry_delay_for(attempt);
                debug!(attempt = attempt + 1, delay_ms = delay.as_millis() as u64, error = %e, "Query failed, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of cached queries.
    pub size: usize,
    /// Maximum number of cached queries.
    pub capacity: usize,
    /// Cached queries whose data is stale.
    pub stale: usize,
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[derive(Debug)]
    enum TestError {
        Transient,
        Rejected,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                TestError::Transient => write!(f, "transient"),
                TestError::Rejected => write!(f, "rejected"),
            }
        }
    }

    impl Retryable for TestError {
        fn is_retryable(&self) -> bool {
            matches!(self, TestError::Transient)
        }
    }

    fn policy() -> QueryPolicy {
        QueryPolicy::default().with_retry_delay(Duration::from_millis(10))
    }

    /// Fetcher returning the call number, counting calls.
    fn counting(
        calls: &Arc<AtomicUsize>,
    ) -> impl Fn() -> std::future::Ready<Result<usize, TestError>> + Send + Sync + 'static {
        let calls = calls.clone();
        move || std::future::ready(Ok(calls.fetch_add(1, Ordering::SeqCst) + 1))
    }

    /// Fetcher that fails with `error` for the first `failures` calls.
    fn flaky(
        calls: &Arc<AtomicUsize>,
        failures: usize,
        error: fn() -> TestError,
    ) -> impl Fn() -> std::future::Ready<Result<usize, TestError>> + Send + Sync + 'static {
        let calls = calls.clone();
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n <= failures {
                std::future::ready(Err(error()))
            } else {
                std::future::ready(Ok(n))
            }
        }
    }

    async fn wait_for_refresh(cache: &QueryCache, key: &QueryKey, expected: usize) {
        for _ in 0..100 {
            if cache.peek::<usize>(key).await == Some(expected) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        panic!("background refresh did not land");
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_data_is_not_refetched() {
        let cache = QueryCache::new(policy());
        let key = QueryKey::new("projects");
        let calls = Arc::new(AtomicUsize::new(0));

        let first: usize = cache.fetch(&key, counting(&calls)).await.unwrap();
        tokio::time::advance(Duration::from_secs(299)).await;
        let second: usize = cache.fetch(&key, counting(&calls)).await.unwrap();

        assert_eq!((first, second), (1, 1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_data_served_then_refreshed() {
        let cache = QueryCache::new(policy());
        let key = QueryKey::new("projects");
        let calls = Arc::new(AtomicUsize::new(0));

        let _: usize = cache.fetch(&key, counting(&calls)).await.unwrap();
        tokio::time::advance(Duration::from_secs(301)).await;
        assert!(cache.is_stale(&key).await);

        let stale: usize = cache.fetch(&key, counting(&calls)).await.unwrap();
        assert_eq!(stale, 1);

        wait_for_refresh(&cache, &key, 2).await;
        assert!(!cache.is_stale(&key).await);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_stale_reads_share_one_refresh() {
        let cache = QueryCache::new(policy());
        let key = QueryKey::new("deployments");
        let calls = Arc::new(AtomicUsize::new(0));

        let _: usize = cache.fetch(&key, counting(&calls)).await.unwrap();
        cache.invalidate(&key).await;

        for _ in 0..5 {
            let _: usize = cache.fetch(&key, counting(&calls)).await.unwrap();
        }
        wait_for_refresh(&cache, &key, 2).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_data_is_not_evicted() {
        let cache = QueryCache::new(policy());
        let key = QueryKey::new("models");
        let calls = Arc::new(AtomicUsize::new(0));

        let _: usize = cache.fetch(&key, counting(&calls)).await.unwrap();
        tokio::time::advance(Duration::from_secs(3600)).await;

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.peek::<usize>(&key).await, Some(1));
        assert_eq!(cache.stats().await.stale, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_once_on_transient_failure() {
        let cache = QueryCache::new(policy());
        let key = QueryKey::new("projects");
        let calls = Arc::new(AtomicUsize::new(0));

        let value: usize = cache
            .fetch(&key, flaky(&calls, 1, || TestError::Transient))
            .await
            .unwrap();

        assert_eq!(value, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_one_retry() {
        let cache = QueryCache::new(policy());
        let key = QueryKey::new("projects");
        let calls = Arc::new(AtomicUsize::new(0));

        let result: Result<usize, _> = cache
            .fetch(&key, flaky(&calls, 5, || TestError::Transient))
            .await;

        assert!(matches!(
            result,
            Err(QueryError::Fetch(TestError::Transient))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error_is_not_retried() {
        let cache = QueryCache::new(policy());
        let key = QueryKey::new("projects");
        let calls = Arc::new(AtomicUsize::new(0));

        let result: Result<usize, _> = cache
            .fetch(&key, flaky(&calls, 5, || TestError::Rejected))
            .await;

        assert!(matches!(result, Err(QueryError::Fetch(TestError::Rejected))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_background_refresh_keeps_stale_data() {
        let cache = QueryCache::new(policy());
        let key = QueryKey::new("agents");
        cache.set(&key, &7usize).await.unwrap();
        cache.invalidate(&key).await;

        let calls = Arc::new(AtomicUsize::new(0));
        let value: usize = cache
            .fetch(&key, flaky(&calls, 5, || TestError::Transient))
            .await
            .unwrap();
        assert_eq!(value, 7);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.peek::<usize>(&key).await, Some(7));

        // The failed refresh released its slot, so the next read retries.
        let _: usize = cache
            .fetch(&key, flaky(&calls, 0, || TestError::Transient))
            .await
            .unwrap();
        wait_for_refresh(&cache, &key, 3).await;
    }

    #[tokio::test]
    async fn test_focus_regain_is_noop_by_default() {
        let cache = QueryCache::new(policy());
        let key = QueryKey::new("projects");
        cache.set(&key, &1usize).await.unwrap();

        assert_eq!(cache.on_focus_regained().await, 0);
        assert!(!cache.is_stale(&key).await);
    }

    #[tokio::test]
    async fn test_focus_regain_marks_stale_when_enabled() {
        let cache = QueryCache::new(policy().with_refetch_on_focus(true));
        let key = QueryKey::new("projects");
        cache.set(&key, &1usize).await.unwrap();

        assert_eq!(cache.on_focus_regained().await, 1);
        assert!(cache.is_stale(&key).await);
    }

    #[tokio::test]
    async fn test_invalidate_resource_only_touches_matching_keys() {
        let cache = QueryCache::new(policy());
        let a = QueryKey::new("experiments").param("project_id", 1);
        let b = QueryKey::new("experiments").param("project_id", 2);
        let c = QueryKey::new("models").param("project_id", 1);
        for key in [&a, &b, &c] {
            cache.set(key, &0usize).await.unwrap();
        }

        assert_eq!(cache.invalidate_resource("experiments").await, 2);
        assert!(cache.is_stale(&a).await);
        assert!(cache.is_stale(&b).await);
        assert!(!cache.is_stale(&c).await);
    }

    #[tokio::test]
    async fn test_lru_capacity() {
        let cache = QueryCache::new(policy().with_max_entries(2));
        for id in 0..3 {
            cache
                .set(&QueryKey::new("projects").param("id", id), &id)
                .await
                .unwrap();
        }

        let stats = cache.stats().await;
        assert_eq!(stats.size, 2);
        assert_eq!(stats.capacity, 2);
        assert!(
            cache
                .peek::<i32>(&QueryKey::new("projects").param("id", 0))
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_reset_makes_cached_data_unreachable() {
        let cache = QueryCache::new(policy());
        let key = QueryKey::new("projects");
        let calls = Arc::new(AtomicUsize::new(0));

        let first: usize = cache.fetch(&key, counting(&calls)).await.unwrap();
        assert_eq!(cache.reset(), 1);

        assert!(cache.is_empty().await);
        assert_eq!(cache.peek::<usize>(&key).await, None);
        let second: usize = cache.fetch(&key, counting(&calls)).await.unwrap();
        assert_eq!((first, second), (1, 2));
    }

    #[tokio::test]
    async fn test_reset_while_locked_still_hides_old_data() {
        let cache = QueryCache::new(policy());
        let key = QueryKey::new("projects");
        cache.set(&key, &1usize).await.unwrap();

        let held = cache.inner.read().await;
        cache.reset();
        drop(held);

        assert_eq!(cache.peek::<usize>(&key).await, None);
        assert_eq!(cache.stats().await.size, 0);
        let calls = Arc::new(AtomicUsize::new(0));
        let value: usize = cache.fetch(&key, counting(&calls)).await.unwrap();
        assert_eq!(value, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_started_before_clear_is_discarded() {
        let cache = QueryCache::new(policy());
        let key = QueryKey::new("projects");
        cache.set(&key, &1usize).await.unwrap();
        cache.invalidate(&key).await;

        let slow = || async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<usize, TestError>(99)
        };
        let stale: usize = cache.fetch(&key, slow).await.unwrap();
        assert_eq!(stale, 1);

        cache.clear().await;
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(cache.peek::<usize>(&key).await, None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_codec_error_on_type_mismatch() {
        let cache = QueryCache::new(policy());
        let key = QueryKey::new("projects");
        cache.set(&key, &"not a number").await.unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let result: Result<usize, _> = cache.fetch(&key, counting(&calls)).await;
        assert!(matches!(result, Err(QueryError::Codec(_))));
    }
}
