//! Query cache for read operations issued through the Zenith gateway.
//!
//! One [`QueryPolicy`] is chosen when the [`QueryCache`] is built and applies
//! to every query from then on:
//! - data is fresh for `stale_time` (five minutes), then served stale while
//!   a single background refresh runs
//! - failed fetches are retried `retry` times (once), unless the error says
//!   it is not worth retrying
//! - regaining focus does not refetch anything
//!
//! # Example
//!
//! ```rust,ignore
//! use zenith_query::{QueryCache, QueryKey, QueryPolicy};
//!
//! let cache = QueryCache::new(QueryPolicy::default());
//! let key = QueryKey::new("projects");
//! let projects: Vec<Project> = cache.fetch(&key, move || list_projects()).await?;
//! ```

mod cache;
mod config;
mod error;
mod key;
mod staleness;

pub use cache::{CacheStats, QueryCache};
pub use config::{
    DEFAULT_MAX_ENTRIES, DEFAULT_RETRY, DEFAULT_RETRY_DELAY, DEFAULT_STALE_TIME,
    MAX_RETRY_DELAY, QueryPolicy,
};
pub use error::{QueryError, Retryable};
pub use key::QueryKey;
pub use staleness::StaleTracker;
