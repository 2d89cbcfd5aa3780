//! Error types for query execution.

/// Classifies fetch errors for the retry loop.
pub trait Retryable {
    /// Whether another attempt could plausibly succeed.
    fn is_retryable(&self) -> bool;
}

/// Error returned by [`QueryCache::fetch`](crate::QueryCache::fetch).
#[derive(Debug, thiserror::Error)]
pub enum QueryError<E> {
    /// The fetcher failed (after any retries).
    #[error("{0}")]
    Fetch(E),

    /// Cached data could not be converted to or from the requested type.
    #[error("query data codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl<E> QueryError<E> {
    /// The fetcher's error, if that is what failed.
    pub fn fetch_error(&self) -> Option<&E> {
        match self {
            QueryError::Fetch(e) => Some(e),
            QueryError::Codec(_) => None,
        }
    }
}
