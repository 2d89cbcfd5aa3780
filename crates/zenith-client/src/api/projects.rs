//! Projects API.

use crate::client::ZenithClient;
use crate::error::Result;
use crate::types::{CreateProjectRequest, Project, UpdateProjectRequest};

/// Projects API client.
pub struct ProjectsApi {
    client: ZenithClient,
}

impl ProjectsApi {
    pub(crate) fn new(client: ZenithClient) -> Self {
        Self { client }
    }

    /// List all projects visible to the current user.
    pub async fn list(&self) -> Result<Vec<Project>> {
        self.client.get("projects").await
    }

    /// Get a project by ID.
    pub async fn get(&self, id: u64) -> Result<Project> {
        self.client.get(&format!("projects/{}", id)).await
    }

    /// Create a new project.
    pub async fn create(&self, request: CreateProjectRequest) -> Result<Project> {
        self.client.post("projects", &request).await
    }

    /// Create a project with just a name.
    pub async fn create_simple(&self, name: impl Into<String>) -> Result<Project> {
        self.create(CreateProjectRequest {
            name: name.into(),
            description: None,
        })
        .await
    }

    /// Update a project.
    pub async fn update(&self, id: u64, request: UpdateProjectRequest) -> Result<Project> {
        self.client.put(&format!("projects/{}", id), &request).await
    }

    /// Delete a project.
    pub async fn delete(&self, id: u64) -> Result<()> {
        self.client.delete(&format!("projects/{}", id)).await
    }
}
