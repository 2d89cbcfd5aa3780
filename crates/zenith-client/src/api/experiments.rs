//! Experiments and runs API.

use serde::Deserialize;

use super::ProjectFilter;
use crate::client::ZenithClient;
use crate::error::Result;
use crate::types::{
    CreateExperimentRequest, CreateRunRequest, Experiment, Metric, MetricLog, ParameterLog, Run,
    UpdateRunRequest,
};

/// Acknowledgement for batch logging calls.
#[derive(Debug, Clone, Deserialize)]
pub struct LogResponse {
    pub status: String,
    pub count: usize,
}

/// Experiments API client.
pub struct ExperimentsApi {
    client: ZenithClient,
}

impl ExperimentsApi {
    pub(crate) fn new(client: ZenithClient) -> Self {
        Self { client }
    }

    /// List experiments in a project.
    pub async fn list(&self, project_id: u64) -> Result<Vec<Experiment>> {
        self.client
            .get_with_query("experiments", &ProjectFilter { project_id })
            .await
    }

    /// Create an experiment.
    pub async fn create(&self, request: CreateExperimentRequest) -> Result<Experiment> {
        self.client.post("experiments", &request).await
    }

    /// Start a run under an experiment.
    pub async fn create_run(&self, request: CreateRunRequest) -> Result<Run> {
        self.client.post("experiments/runs", &request).await
    }

    /// Get a run by ID.
    pub async fn get_run(&self, run_id: u64) -> Result<Run> {
        self.client.get(&format!("experiments/runs/{}", run_id)).await
    }

    /// Update a run's status or metadata.
    pub async fn update_run(&self, run_id: u64, request: UpdateRunRequest) -> Result<Run> {
        self.client
            .put(&format!("experiments/runs/{}", run_id), &request)
            .await
    }

    /// Log a batch of metrics against a run.
    pub async fn log_metrics(&self, run_id: u64, metrics: &[MetricLog]) -> Result<LogResponse> {
        self.client
            .post(&format!("experiments/runs/{}/metrics", run_id), metrics)
            .await
    }

    /// Log a batch of parameters against a run.
    pub async fn log_parameters(
        &self,
        run_id: u64,
        parameters: &[ParameterLog],
    ) -> Result<LogResponse> {
        self.client
            .post(&format!("experiments/runs/{}/parameters", run_id), parameters)
            .await
    }

    /// All metrics logged for a run.
    pub async fn get_metrics(&self, run_id: u64) -> Result<Vec<Metric>> {
        self.client
            .get(&format!("experiments/runs/{}/metrics", run_id))
            .await
    }
}
