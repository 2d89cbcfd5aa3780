//! Request gateway: the single path every backend call takes.
//!
//! A call is an [`OutboundRequest`]. Before it is sent, each registered
//! [`RequestStage`] transforms it in order. The [`Transport`] sends it and
//! hands back any HTTP status as an [`InboundResponse`]; non-success statuses
//! become typed errors. Each [`ResponseStage`] then sees the outcome, in
//! order, and may replace it.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::{Error, Result};

/// Default timeout for requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Path prefix for API resources.
pub const API_PREFIX: &str = "api/v1/";

// ─────────────────────────────────────────────────────────────────────────────
// Requests and responses
// ─────────────────────────────────────────────────────────────────────────────

/// Request body encodings.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
}

/// A backend call in flight, before it reaches the wire.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    /// Path relative to the API prefix, e.g. `projects/3`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
}

impl OutboundRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach query parameters from a serializable struct or map.
    ///
    /// `None` fields are skipped; scalars are rendered without quotes.
    pub fn with_query<Q: Serialize + ?Sized>(mut self, query: &Q) -> Result<Self> {
        match serde_json::to_value(query)? {
            serde_json::Value::Object(map) => {
                for (name, value) in map {
                    let rendered = match value {
                        serde_json::Value::Null => continue,
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    self.query.push((name, rendered));
                }
                Ok(self)
            }
            serde_json::Value::Null => Ok(self),
            _ => Err(Error::Config(
                "query parameters must serialize to an object".to_string(),
            )),
        }
    }

    /// Attach a JSON body.
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(RequestBody::Json(serde_json::to_value(body)?));
        Ok(self)
    }

    /// Attach a form-encoded body.
    pub fn with_form(mut self, fields: &[(&str, &str)]) -> Self {
        self.body = Some(RequestBody::Form(
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ));
        self
    }

    /// Set a header, replacing any previous value.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Authorize with an explicit token instead of the stored one.
    pub fn with_bearer(self, token: &str) -> Result<Self> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| Error::Config("Invalid auth token".to_string()))?;
        value.set_sensitive(true);
        Ok(self.with_header(AUTHORIZATION, value))
    }
}

/// A response as received, any status.
#[derive(Debug, Clone)]
pub struct InboundResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl InboundResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Decode the body as JSON. An empty body decodes as `null`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        if self.body.is_empty() {
            return Ok(serde_json::from_value(serde_json::Value::Null)?);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Stages and transport
// ─────────────────────────────────────────────────────────────────────────────

/// Transforms a request before it is sent.
pub trait RequestStage: Send + Sync + fmt::Debug {
    fn on_request(&self, request: OutboundRequest) -> OutboundRequest;
}

/// Inspects, and may replace, the outcome of a request.
pub trait ResponseStage: Send + Sync + fmt::Debug {
    fn on_response(&self, outcome: Result<InboundResponse>) -> Result<InboundResponse>;
}

/// Sends a fully prepared request.
///
/// Implementations return `Ok` for every HTTP status; only failures to get
/// a response at all are errors.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    async fn send(
        &self,
        url: Url,
        request: OutboundRequest,
        timeout: Duration,
    ) -> Result<InboundResponse>;
}

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        url: Url,
        request: OutboundRequest,
        timeout: Duration,
    ) -> Result<InboundResponse> {
        let mut builder = self
            .http
            .request(request.method, url)
            .headers(request.headers)
            .timeout(timeout);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        builder = match request.body {
            Some(RequestBody::Json(value)) => builder.json(&value),
            Some(RequestBody::Form(fields)) => builder.form(&fields),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(InboundResponse {
            status,
            headers,
            body,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Gateway
// ─────────────────────────────────────────────────────────────────────────────

struct GatewayInner {
    transport: Arc<dyn Transport>,
    base_url: Url,
    timeout: Duration,
    request_stages: Vec<Arc<dyn RequestStage>>,
    response_stages: Vec<Arc<dyn ResponseStage>>,
}

/// The configured HTTP client all backend calls pass through.
///
/// Cloning is cheap and shares configuration.
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<GatewayInner>,
}

impl fmt::Debug for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway")
            .field("base_url", &self.inner.base_url.as_str())
            .field("timeout", &self.inner.timeout)
            .field("request_stages", &self.inner.request_stages)
            .field("response_stages", &self.inner.response_stages)
            .finish()
    }
}

impl Gateway {
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::new()
    }

    /// Server root, always ending in `/`.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build a URL for an API path.
    pub fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner
            .base_url
            .join(&format!("{}{}", API_PREFIX, path))
            .map_err(Error::from)
    }

    /// Send a request through every stage.
    pub async fn execute(&self, request: OutboundRequest) -> Result<InboundResponse> {
        let request = self
            .inner
            .request_stages
            .iter()
            .fold(request, |request, stage| stage.on_request(request));

        let url = self.url(&request.path)?;
        let method = request.method.clone();
        trace!(method = %method, url = %url, "Sending request");

        let outcome = match self
            .inner
            .transport
            .send(url.clone(), request, self.inner.timeout)
            .await
        {
            Ok(response) if response.status.is_success() => Ok(response),
            Ok(response) => {
                debug!(method = %method, url = %url, status = response.status.as_u16(), "Request failed");
                Err(Error::from_status(response.status.as_u16(), &response.body))
            }
            Err(e) => Err(e),
        };

        self.inner
            .response_stages
            .iter()
            .fold(outcome, |outcome, stage| stage.on_response(outcome))
    }

    /// Send a request and decode the JSON response.
    pub async fn execute_json<T: DeserializeOwned>(&self, request: OutboundRequest) -> Result<T> {
        self.execute(request).await?.json()
    }

    /// Make a GET request.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute_json(OutboundRequest::get(path)).await
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.execute_json(OutboundRequest::get(path).with_query(query)?)
            .await
    }

    /// Make a POST request with a JSON body.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute_json(OutboundRequest::post(path).with_json(body)?)
            .await
    }

    /// Make a POST request with a form-encoded body.
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        fields: &[(&str, &str)],
    ) -> Result<T> {
        self.execute_json(OutboundRequest::post(path).with_form(fields))
            .await
    }

    /// Make a PUT request.
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute_json(OutboundRequest::put(path).with_json(body)?)
            .await
    }

    /// Make a DELETE request, ignoring any response body.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.execute(OutboundRequest::delete(path)).await?;
        Ok(())
    }

    /// GET a path at the server root, outside the API prefix.
    ///
    /// Bypasses every stage: no credential is attached and a rejection does
    /// not touch the session.
    pub async fn get_root<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.inner.base_url.join(path.trim_start_matches('/'))?;
        let response = self
            .inner
            .transport
            .send(url, OutboundRequest::get(path), self.inner.timeout)
            .await?;
        if !response.status.is_success() {
            return Err(Error::from_status(response.status.as_u16(), &response.body));
        }
        response.json()
    }
}

/// Builder for a [`Gateway`].
#[derive(Debug)]
pub struct GatewayBuilder {
    base_url: Option<String>,
    timeout: Duration,
    user_agent: Option<String>,
    transport: Option<Arc<dyn Transport>>,
    request_stages: Vec<Arc<dyn RequestStage>>,
    response_stages: Vec<Arc<dyn ResponseStage>>,
}

impl GatewayBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            transport: None,
            request_stages: Vec::new(),
            response_stages: Vec::new(),
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

    /// Replace the HTTP transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Append a request stage; stages run in registration order.
    pub fn request_stage(mut self, stage: Arc<dyn RequestStage>) -> Self {
        self.request_stages.push(stage);
        self
    }

    /// Append a response stage; stages run in registration order.
    pub fn response_stage(mut self, stage: Arc<dyn ResponseStage>) -> Self {
        self.response_stages.push(stage);
        self
    }

    pub fn build(self) -> Result<Gateway> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        // Parse and normalize base URL
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let user_agent = self
                    .user_agent
                    .unwrap_or_else(|| format!("zenith-client/{}", env!("CARGO_PKG_VERSION")));
                Arc::new(ReqwestTransport::new(&user_agent)?)
            }
        };

        Ok(Gateway {
            inner: Arc::new(GatewayInner {
                transport,
                base_url,
                timeout: self.timeout,
                request_stages: self.request_stages,
                response_stages: self.response_stages,
            }),
        })
    }
}

impl Default for GatewayBuilder {
    fn default() -> Self {
        Self::new()
    }
}
