//! Model registry API.

use serde::{Deserialize, Serialize};

use super::ProjectFilter;
use crate::client::ZenithClient;
use crate::error::Result;
use crate::types::{CreateModelRequest, CreateModelVersionRequest, Model, ModelStage, ModelVersion};

#[derive(Serialize)]
struct PromoteRequest {
    stage: ModelStage,
}

/// Server acknowledgement of a promotion.
#[derive(Debug, Clone, Deserialize)]
pub struct PromoteResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Models API client.
pub struct ModelsApi {
    client: ZenithClient,
}

impl ModelsApi {
    pub(crate) fn new(client: ZenithClient) -> Self {
        Self { client }
    }

    /// List registered models in a project.
    pub async fn list(&self, project_id: u64) -> Result<Vec<Model>> {
        self.client
            .get_with_query("models", &ProjectFilter { project_id })
            .await
    }

    /// Register a model.
    pub async fn create(&self, request: CreateModelRequest) -> Result<Model> {
        self.client.post("models", &request).await
    }

    /// Register a new version of a model.
    pub async fn create_version(&self, request: CreateModelVersionRequest) -> Result<ModelVersion> {
        self.client.post("models/versions", &request).await
    }

    pub async fn list_versions(&self, model_id: u64) -> Result<Vec<ModelVersion>> {
        self.client
            .get(&format!("models/{}/versions", model_id))
            .await
    }

    /// Move a version to another registry stage.
    pub async fn promote_version(&self, version_id: u64, stage: ModelStage) -> Result<PromoteResponse> {
        self.client
            .post(
                &format!("models/versions/{}/promote", version_id),
                &PromoteRequest { stage },
            )
            .await
    }
}
