//! Error types for session persistence.

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors raised while persisting or loading session state.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Filesystem operation on a storage key failed.
    #[error("failed to {action} session storage '{key}': {source}")]
    Io {
        action: &'static str,
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Session could not be encoded or decoded.
    #[error("session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Storage backend refused the operation.
    #[error("session persistence failed: {0}")]
    Persistence(String),
}
