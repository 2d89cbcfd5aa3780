//! Health API.

use crate::client::ZenithClient;
use crate::error::Result;
use crate::types::HealthResponse;

/// Health API client.
///
/// The health endpoint lives at the server root and needs no credential.
pub struct HealthApi {
    client: ZenithClient,
}

impl HealthApi {
    pub(crate) fn new(client: ZenithClient) -> Self {
        Self { client }
    }

    /// Check basic health.
    pub async fn check(&self) -> Result<HealthResponse> {
        self.client.gateway().get_root("health").await
    }

    /// Simple connectivity check - returns true if server is reachable.
    pub async fn is_healthy(&self) -> bool {
        self.client.gateway().get_root::<HealthResponse>("health").await.is_ok()
    }
}
