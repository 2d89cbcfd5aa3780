//! Deployment monitoring API.

use serde::Serialize;
use serde_json::Value;

use crate::client::ZenithClient;
use crate::error::Result;

/// Optional time bounds for a metrics query (ISO 8601).
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsWindow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

#[derive(Serialize)]
struct DriftRequest<'a> {
    reference_data: &'a Value,
    current_data: &'a Value,
}

#[derive(Serialize)]
struct TracesQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
}

/// Monitoring API client.
///
/// Reports are passed through as JSON; their shape depends on the
/// monitoring backend.
pub struct MonitoringApi {
    client: ZenithClient,
}

impl MonitoringApi {
    pub(crate) fn new(client: ZenithClient) -> Self {
        Self { client }
    }

    pub async fn metrics(&self, deployment_id: u64, window: MetricsWindow) -> Result<Value> {
        self.client
            .get_with_query(
                &format!("monitoring/deployments/{}/metrics", deployment_id),
                &window,
            )
            .await
    }

    /// Compare current inputs against a reference sample.
    pub async fn check_drift(
        &self,
        deployment_id: u64,
        reference_data: &Value,
        current_data: &Value,
    ) -> Result<Value> {
        self.client
            .post(
                &format!("monitoring/deployments/{}/drift", deployment_id),
                &DriftRequest {
                    reference_data,
                    current_data,
                },
            )
            .await
    }

    /// Recent request traces; the server defaults to 100.
    pub async fn traces(&self, deployment_id: u64, limit: Option<u32>) -> Result<Value> {
        self.client
            .get_with_query(
                &format!("monitoring/deployments/{}/traces", deployment_id),
                &TracesQuery { limit },
            )
            .await
    }
}
