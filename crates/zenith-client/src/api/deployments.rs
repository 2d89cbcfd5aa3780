//! Deployments API.

use serde_json::Value;

use crate::client::ZenithClient;
use crate::error::Result;
use crate::types::{CreateDeploymentRequest, Deployment};

/// Deployments API client.
pub struct DeploymentsApi {
    client: ZenithClient,
}

impl DeploymentsApi {
    pub(crate) fn new(client: ZenithClient) -> Self {
        Self { client }
    }

    /// List all deployments.
    pub async fn list(&self) -> Result<Vec<Deployment>> {
        self.client.get("deployments").await
    }

    /// Deploy a model version.
    pub async fn create(&self, request: CreateDeploymentRequest) -> Result<Deployment> {
        self.client.post("deployments", &request).await
    }

    /// Get a deployment by ID.
    pub async fn get(&self, id: u64) -> Result<Deployment> {
        self.client.get(&format!("deployments/{}", id)).await
    }

    /// Run inference against a deployment.
    ///
    /// Inputs and predictions are model-specific JSON.
    pub async fn predict(&self, id: u64, inputs: &Value) -> Result<Value> {
        self.client
            .post(&format!("deployments/{}/predict", id), inputs)
            .await
    }

    /// Tear down a deployment.
    pub async fn delete(&self, id: u64) -> Result<()> {
        self.client.delete(&format!("deployments/{}", id)).await
    }
}
