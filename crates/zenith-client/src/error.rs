//! Client error types.

use thiserror::Error;
use zenith_query::{QueryError, Retryable};

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error detail from server.
        message: String,
    },

    /// Credential missing, invalid or expired (HTTP 401).
    ///
    /// By the time a caller sees this the session has been cleared.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session could not be persisted.
    #[error("Session error: {0}")]
    Session(#[from] zenith_session::SessionError),
}

impl Error {
    /// Build an error from a non-success status and its body.
    pub(crate) fn from_status(status: u16, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<ErrorResponse>(body)
            .map(|err| err.message())
            .unwrap_or_else(|_| format!("HTTP {}", status));

        match status {
            401 => Error::Unauthorized(message),
            404 => Error::NotFound(message),
            _ => Error::Api { status, message },
        }
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_)) || matches!(self, Error::Api { status: 404, .. })
    }

    /// Check if this is a credential rejection.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Unauthorized(_)) || matches!(self, Error::Api { status: 401, .. })
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Api { status, .. } if *status >= 500)
    }
}

impl Retryable for Error {
    /// Everything except credential rejections and local misconfiguration.
    fn is_retryable(&self) -> bool {
        !self.is_auth_error() && !matches!(self, Error::Config(_) | Error::InvalidUrl(_))
    }
}

impl From<QueryError<Error>> for Error {
    fn from(err: QueryError<Error>) -> Self {
        match err {
            QueryError::Fetch(e) => e,
            QueryError::Codec(e) => Error::Json(e),
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error body returned by the server: `{"detail": ...}`.
///
/// `detail` is a string for handled errors and a list of objects for
/// validation failures.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorResponse {
    pub detail: serde_json::Value,
}

impl ErrorResponse {
    fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.get("msg")
                        .and_then(|m| m.as_str())
                        .map(str::to_string)
                        .unwrap_or_else(|| item.to_string())
                })
                .collect::<Vec<_>>()
                .join("; "),
            other => other.to_string(),
        }
    }
}
