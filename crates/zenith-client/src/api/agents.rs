//! Agents API.

use serde_json::Value;

use super::ProjectFilter;
use crate::client::ZenithClient;
use crate::error::Result;
use crate::types::{Agent, AgentExecution, CreateAgentRequest};

/// Agents API client.
pub struct AgentsApi {
    client: ZenithClient,
}

impl AgentsApi {
    pub(crate) fn new(client: ZenithClient) -> Self {
        Self { client }
    }

    /// List agents in a project.
    pub async fn list(&self, project_id: u64) -> Result<Vec<Agent>> {
        self.client
            .get_with_query("agents", &ProjectFilter { project_id })
            .await
    }

    pub async fn create(&self, request: CreateAgentRequest) -> Result<Agent> {
        self.client.post("agents", &request).await
    }

    /// Run an agent on `input`.
    pub async fn execute(&self, agent_id: u64, input: &Value) -> Result<AgentExecution> {
        self.client
            .post(&format!("agents/{}/execute", agent_id), input)
            .await
    }

    /// Past executions of an agent.
    pub async fn list_executions(&self, agent_id: u64) -> Result<Vec<AgentExecution>> {
        self.client
            .get(&format!("agents/{}/executions", agent_id))
            .await
    }
}
