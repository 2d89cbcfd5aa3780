//! API endpoint implementations.

mod agents;
mod auth;
mod datasets;
mod deployments;
mod experiments;
mod health;
mod models;
mod monitoring;
mod projects;
mod prompts;

pub use agents::AgentsApi;
pub use auth::AuthApi;
pub use datasets::DatasetsApi;
pub use deployments::DeploymentsApi;
pub use experiments::{ExperimentsApi, LogResponse};
pub use health::HealthApi;
pub use models::{ModelsApi, PromoteResponse};
pub use monitoring::{MetricsWindow, MonitoringApi};
pub use projects::ProjectsApi;
pub use prompts::PromptsApi;

/// `?project_id=N`, the filter every per-project listing takes.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub(crate) struct ProjectFilter {
    pub project_id: u64,
}
