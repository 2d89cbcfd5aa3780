//! Gateway stages that tie requests to the session.

use reqwest::header::{AUTHORIZATION, HeaderValue};
use tracing::{debug, warn};
use zenith_query::QueryCache;
use zenith_session::{CredentialStore, SharedNavigator};

use crate::error::Result;
use crate::gateway::{InboundResponse, OutboundRequest, RequestStage, ResponseStage};

/// Adds `Authorization: Bearer <token>` from the credential store.
///
/// Requests go out unmodified when no token is held, and an explicit
/// `Authorization` header already on the request is left alone.
#[derive(Debug, Clone)]
pub struct BearerAuth {
    store: CredentialStore,
}

impl BearerAuth {
    pub fn new(store: CredentialStore) -> Self {
        Self { store }
    }
}

impl RequestStage for BearerAuth {
    fn on_request(&self, mut request: OutboundRequest) -> OutboundRequest {
        if request.headers.contains_key(AUTHORIZATION) {
            return request;
        }
        let Some(token) = self.store.token() else {
            return request;
        };
        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers.insert(AUTHORIZATION, value);
            }
            Err(_) => warn!("Stored token is not a valid header value, sending unauthenticated"),
        }
        request
    }
}

/// Clears the session and returns the user to login on a 401.
///
/// The error itself is passed on unchanged so the caller never mistakes it
/// for success. Only the call that actually clears a credential triggers
/// the redirect and resets the query cache, if one is attached; later
/// rejections find the store empty and do nothing beyond returning their
/// error.
#[derive(Clone)]
pub struct RejectionHandler {
    store: CredentialStore,
    navigator: SharedNavigator,
    queries: Option<QueryCache>,
}

impl std::fmt::Debug for RejectionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RejectionHandler")
            .field("store", &self.store)
            .field("resets_queries", &self.queries.is_some())
            .finish()
    }
}

impl RejectionHandler {
    pub fn new(store: CredentialStore, navigator: SharedNavigator) -> Self {
        Self {
            store,
            navigator,
            queries: None,
        }
    }

    /// Also reset `queries` when a rejection clears the session.
    pub fn with_queries(mut self, queries: QueryCache) -> Self {
        self.queries = Some(queries);
        self
    }
}

impl ResponseStage for RejectionHandler {
    fn on_response(&self, outcome: Result<InboundResponse>) -> Result<InboundResponse> {
        if let Err(e) = &outcome
            && e.is_auth_error()
        {
            if self.store.logout() {
                warn!("Credential rejected by server, session cleared");
                if let Some(queries) = &self.queries {
                    queries.reset();
                }
                self.navigator.redirect_to_login();
            } else {
                debug!("Credential rejected with no session held");
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reqwest::StatusCode;
    use zenith_query::{QueryKey, QueryPolicy};
    use zenith_session::{AuthStatus, MemoryStorage, RecordingNavigator, User};

    use super::*;
    use crate::error::Error;

    fn store() -> CredentialStore {
        CredentialStore::new(Arc::new(MemoryStorage::new()))
    }

    fn rejected() -> Result<InboundResponse> {
        Err(Error::Unauthorized("Could not validate credentials".into()))
    }

    #[test]
    fn test_bearer_added_when_token_present() {
        let store = store();
        store.set_token("tok123").unwrap();

        let request = BearerAuth::new(store).on_request(OutboundRequest::get("projects"));

        assert_eq!(request.headers.get(AUTHORIZATION).unwrap(), "Bearer tok123");
        assert!(request.headers.get(AUTHORIZATION).unwrap().is_sensitive());
    }

    #[test]
    fn test_request_unmodified_without_token() {
        let original = OutboundRequest::post("auth/login").with_form(&[("username", "alice")]);
        let request = BearerAuth::new(store()).on_request(original.clone());

        assert_eq!(request.headers, original.headers);
        assert_eq!(request.body, original.body);
        assert_eq!(request.path, original.path);
    }

    #[test]
    fn test_explicit_authorization_is_kept() {
        let store = store();
        store.set_token("stored").unwrap();

        let request = OutboundRequest::get("auth/me").with_bearer("fresh").unwrap();
        let request = BearerAuth::new(store).on_request(request);

        assert_eq!(request.headers.get(AUTHORIZATION).unwrap(), "Bearer fresh");
    }

    #[test]
    fn test_rejection_clears_session_and_redirects() {
        let store = store();
        store.establish(User::new(1, "alice", ""), "tok").unwrap();
        let navigator = Arc::new(RecordingNavigator::new());
        let stage = RejectionHandler::new(store.clone(), navigator.clone());

        let outcome = stage.on_response(rejected());

        assert!(matches!(outcome, Err(Error::Unauthorized(_))));
        assert_eq!(store.status(), AuthStatus::Anonymous);
        assert!(store.snapshot().is_empty());
        assert_eq!(navigator.redirect_count(), 1);
    }

    #[test]
    fn test_repeated_rejection_redirects_once() {
        let store = store();
        store.establish(User::new(1, "alice", ""), "tok").unwrap();
        let navigator = Arc::new(RecordingNavigator::new());
        let stage = RejectionHandler::new(store.clone(), navigator.clone());

        for _ in 0..4 {
            assert!(stage.on_response(rejected()).is_err());
        }

        assert_eq!(navigator.redirect_count(), 1);
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_rejection_resets_cached_queries() {
        let store = store();
        store.establish(User::new(1, "alice", ""), "tok").unwrap();
        let queries = QueryCache::new(QueryPolicy::default());
        let key = QueryKey::new("projects");
        queries.set(&key, &"alice-data").await.unwrap();
        let stage = RejectionHandler::new(store.clone(), Arc::new(RecordingNavigator::new()))
            .with_queries(queries.clone());

        assert!(stage.on_response(rejected()).is_err());

        assert!(queries.is_empty().await);
        assert_eq!(queries.peek::<String>(&key).await, None);
    }

    #[tokio::test]
    async fn test_rejection_without_session_keeps_queries() {
        let queries = QueryCache::new(QueryPolicy::default());
        queries.set(&QueryKey::new("projects"), &1u32).await.unwrap();
        let stage = RejectionHandler::new(store(), Arc::new(RecordingNavigator::new()))
            .with_queries(queries.clone());

        assert!(stage.on_response(rejected()).is_err());

        assert_eq!(queries.epoch(), 0);
        assert_eq!(queries.len().await, 1);
    }

    #[test]
    fn test_other_errors_pass_through() {
        let store = store();
        store.establish(User::new(1, "alice", ""), "tok").unwrap();
        let navigator = Arc::new(RecordingNavigator::new());
        let stage = RejectionHandler::new(store.clone(), navigator.clone());

        let outcome = stage.on_response(Err(Error::Api {
            status: 500,
            message: "boom".into(),
        }));
        assert!(matches!(outcome, Err(Error::Api { status: 500, .. })));

        let ok = stage.on_response(Ok(InboundResponse::new(StatusCode::OK, "{}")));
        assert!(ok.is_ok());

        assert!(store.is_authenticated());
        assert_eq!(navigator.redirect_count(), 0);
    }
}
