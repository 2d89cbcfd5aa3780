//! HTTP client SDK for the Zenith ML platform.
//!
//! Every backend call goes through one [`Gateway`]. Its request stage
//! attaches the bearer token held by the session's [`CredentialStore`]; its
//! response stage clears that store and redirects to login when the server
//! rejects the credential.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use zenith_client::{FileStorage, CredentialStore, ZenithClient, Result};
//!
//! # async fn example() -> Result<()> {
//! let store = CredentialStore::restore(Arc::new(FileStorage::new("/tmp/zenith")));
//! let client = ZenithClient::builder()
//!     .base_url("http://localhost:8000")
//!     .credential_store(store)
//!     .build()?;
//!
//! if client.store().needs_reconfirmation() {
//!     client.auth().reconfirm().await?;
//! }
//! if !client.guard().check("/projects").is_redirect() {
//!     for project in client.projects().list().await? {
//!         println!("{}: {}", project.id, project.name);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **Auth**: login, register, current user, reconfirm, logout
//! - **Projects**: CRUD
//! - **Datasets**: list, get
//! - **Experiments**: experiments, runs, metrics and parameters
//! - **Models**: registry, versions, promotion
//! - **Deployments**: CRUD and inference
//! - **Monitoring**: metrics, drift, traces
//! - **Agents**: create, execute, execution history
//! - **Prompts**: templates, versions, rendering
//! - **Health**: server health checks

pub mod api;
pub mod client;
pub mod error;
pub mod gateway;
pub mod stages;
pub mod types;

pub use client::{ClientBuilder, DEFAULT_SERVER, ZenithClient};
pub use error::{Error, Result};
pub use gateway::{
    Gateway, GatewayBuilder, InboundResponse, OutboundRequest, RequestBody, RequestStage,
    ResponseStage, Transport,
};
pub use stages::{BearerAuth, RejectionHandler};
pub use types::*;

pub use api::{LogResponse, MetricsWindow, PromoteResponse};

// Session and cache types callers need to wire a client.
pub use zenith_query::{CacheStats, QueryKey, QueryPolicy};
pub use zenith_session::{
    AuthStatus, CredentialStore, FileStorage, GuardDecision, MemoryStorage, Navigator,
    NoopNavigator, RecordingNavigator, SessionGuard, SharedNavigator,
};
