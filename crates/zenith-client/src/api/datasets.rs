//! Datasets API.

use super::ProjectFilter;
use crate::client::ZenithClient;
use crate::error::Result;
use crate::types::Dataset;

/// Datasets API client.
pub struct DatasetsApi {
    client: ZenithClient,
}

impl DatasetsApi {
    pub(crate) fn new(client: ZenithClient) -> Self {
        Self { client }
    }

    /// List datasets in a project.
    pub async fn list(&self, project_id: u64) -> Result<Vec<Dataset>> {
        self.client
            .get_with_query("datasets", &ProjectFilter { project_id })
            .await
    }

    /// Get a dataset by ID.
    pub async fn get(&self, id: u64) -> Result<Dataset> {
        self.client.get(&format!("datasets/{}", id)).await
    }
}
