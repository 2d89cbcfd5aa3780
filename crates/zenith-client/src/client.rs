//! Main client implementation.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;
use zenith_query::{QueryCache, QueryKey, QueryPolicy};
use zenith_session::{
    CredentialStore, MemoryStorage, NoopNavigator, SessionGuard, SharedNavigator, SharedStorage,
};

use crate::api::{
    AgentsApi, AuthApi, DatasetsApi, DeploymentsApi, ExperimentsApi, HealthApi, ModelsApi,
    MonitoringApi, ProjectsApi, PromptsApi,
};
use crate::error::Result;
use crate::gateway::{DEFAULT_TIMEOUT, Gateway, OutboundRequest, Transport};
use crate::stages::{BearerAuth, RejectionHandler};

/// Default server when none is configured.
pub const DEFAULT_SERVER: &str = "http://localhost:8000";

/// Zenith API client.
///
/// Bundles the request gateway with the credential store it authorizes
/// from, the session guard reading that store, and the shared query cache.
///
/// # Example
///
/// ```no_run
/// use zenith_client::ZenithClient;
///
/// # async fn example() -> zenith_client::Result<()> {
/// let client = ZenithClient::builder()
///     .base_url("http://localhost:8000")
///     .build()?;
///
/// client.auth().login("alice", "secret").await?;
/// let projects = client.projects().list().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ZenithClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    gateway: Gateway,
    store: CredentialStore,
    guard: SessionGuard,
    queries: QueryCache,
}

impl std::fmt::Debug for ZenithClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZenithClient")
            .field("gateway", &self.inner.gateway)
            .field("store", &self.inner.store)
            .finish()
    }
}

impl ZenithClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client with default settings pointing to localhost.
    pub fn localhost() -> Result<Self> {
        Self::builder().base_url(DEFAULT_SERVER).build()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        self.inner.gateway.base_url()
    }

    pub fn gateway(&self) -> &Gateway {
        &self.inner.gateway
    }

    /// The credential store every request authorizes from.
    pub fn store(&self) -> &CredentialStore {
        &self.inner.store
    }

    pub fn guard(&self) -> &SessionGuard {
        &self.inner.guard
    }

    pub fn queries(&self) -> &QueryCache {
        &self.inner.queries
    }

    /// Run a read through the query cache.
    ///
    /// The fetcher receives a clone of this client so it can issue the
    /// actual call from a background refresh.
    pub async fn query<T, F, Fut>(&self, key: &QueryKey, fetcher: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: Fn(ZenithClient) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let client = self.clone();
        let value = self
            .inner
            .queries
            .fetch(key, move || fetcher(client.clone()))
            .await?;
        Ok(value)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the auth API.
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    /// Access the projects API.
    pub fn projects(&self) -> ProjectsApi {
        ProjectsApi::new(self.clone())
    }

    /// Access the datasets API.
    pub fn datasets(&self) -> DatasetsApi {
        DatasetsApi::new(self.clone())
    }

    /// Access the experiments API.
    pub fn experiments(&self) -> ExperimentsApi {
        ExperimentsApi::new(self.clone())
    }

    /// Access the models API.
    pub fn models(&self) -> ModelsApi {
        ModelsApi::new(self.clone())
    }

    /// Access the deployments API.
    pub fn deployments(&self) -> DeploymentsApi {
        DeploymentsApi::new(self.clone())
    }

    /// Access the monitoring API.
    pub fn monitoring(&self) -> MonitoringApi {
        MonitoringApi::new(self.clone())
    }

    /// Access the agents API.
    pub fn agents(&self) -> AgentsApi {
        AgentsApi::new(self.clone())
    }

    /// Access the prompts API.
    pub fn prompts(&self) -> PromptsApi {
        PromptsApi::new(self.clone())
    }

    /// Access the health API.
    pub fn health(&self) -> HealthApi {
        HealthApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.inner.gateway.get(path).await
    }

    pub(crate) async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.inner.gateway.get_with_query(path, query).await
    }

    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.inner.gateway.post(path, body).await
    }

    pub(crate) async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.inner.gateway.put(path, body).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        self.inner.gateway.delete(path).await
    }

    pub(crate) async fn execute_json<T: DeserializeOwned>(
        &self,
        request: OutboundRequest,
    ) -> Result<T> {
        self.inner.gateway.execute_json(request).await
    }
}

/// Builder for creating a [`ZenithClient`].
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    timeout: Duration,
    user_agent: Option<String>,
    store: Option<CredentialStore>,
    navigator: Option<SharedNavigator>,
    policy: QueryPolicy,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            store: None,
            navigator: None,
            policy: QueryPolicy::default(),
            transport: None,
        }
    }

    /// Set the server root URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Use a fresh credential store over `storage`.
    pub fn storage(mut self, storage: SharedStorage) -> Self {
        self.store = Some(CredentialStore::new(storage));
        self
    }

    /// Use an existing credential store, e.g. one built by
    /// [`CredentialStore::restore`].
    pub fn credential_store(mut self, store: CredentialStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Where to send the user when the server rejects the credential.
    pub fn navigator(mut self, navigator: SharedNavigator) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Set the query cache policy.
    pub fn query_policy(mut self, policy: QueryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the HTTP transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<ZenithClient> {
        let store = self
            .store
            .unwrap_or_else(|| CredentialStore::new(Arc::new(MemoryStorage::new())));
        let navigator = self
            .navigator
            .unwrap_or_else(|| Arc::new(NoopNavigator));

        let queries = QueryCache::new(self.policy);

        let mut gateway = Gateway::builder()
            .timeout(self.timeout)
            .request_stage(Arc::new(BearerAuth::new(store.clone())))
            .response_stage(Arc::new(
                RejectionHandler::new(store.clone(), navigator).with_queries(queries.clone()),
            ));
        if let Some(url) = self.base_url {
            gateway = gateway.base_url(url);
        }
        if let Some(agent) = self.user_agent {
            gateway = gateway.user_agent(agent);
        }
        if let Some(transport) = self.transport {
            gateway = gateway.transport(transport);
        }

        Ok(ZenithClient {
            inner: Arc::new(ClientInner {
                gateway: gateway.build()?,
                guard: SessionGuard::new(store.clone()),
                store,
                queries,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
