//! Prompt templates API.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use super::ProjectFilter;
use crate::client::ZenithClient;
use crate::error::Result;
use crate::types::{
    CreatePromptRequest, CreatePromptVersionRequest, PromptTemplate, PromptTestResponse,
    PromptVersion,
};

#[derive(Serialize)]
struct TestRequest<'a> {
    version: &'a str,
    variables: &'a HashMap<String, Value>,
}

/// Prompts API client.
pub struct PromptsApi {
    client: ZenithClient,
}

impl PromptsApi {
    pub(crate) fn new(client: ZenithClient) -> Self {
        Self { client }
    }

    /// List prompt templates in a project.
    pub async fn list(&self, project_id: u64) -> Result<Vec<PromptTemplate>> {
        self.client
            .get_with_query("prompts", &ProjectFilter { project_id })
            .await
    }

    pub async fn create(&self, request: CreatePromptRequest) -> Result<PromptTemplate> {
        self.client.post("prompts", &request).await
    }

    /// Add a version to a template.
    pub async fn create_version(
        &self,
        template_id: u64,
        request: CreatePromptVersionRequest,
    ) -> Result<PromptVersion> {
        self.client
            .post(&format!("prompts/{}/versions", template_id), &request)
            .await
    }

    pub async fn list_versions(&self, template_id: u64) -> Result<Vec<PromptVersion>> {
        self.client
            .get(&format!("prompts/{}/versions", template_id))
            .await
    }

    /// Render a version with `variables` substituted.
    pub async fn test(
        &self,
        template_id: u64,
        version: &str,
        variables: &HashMap<String, Value>,
    ) -> Result<PromptTestResponse> {
        self.client
            .post(
                &format!("prompts/{}/test", template_id),
                &TestRequest { version, variables },
            )
            .await
    }
}
