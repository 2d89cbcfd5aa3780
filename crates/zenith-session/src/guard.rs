//! Route gating on authentication status.

use crate::store::CredentialStore;

/// Login entry point; the only public route.
pub const LOGIN_ROUTE: &str = "/login";

/// Routes behind the guard.
pub const PROTECTED_ROUTES: &[&str] = &[
    "/",
    "/projects",
    "/datasets",
    "/experiments",
    "/models",
    "/deployments",
    "/monitoring",
    "/agents",
];

/// Outcome of a guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Show the requested content.
    Render,
    /// Send the user elsewhere.
    Redirect { to: &'static str },
}

impl GuardDecision {
    pub fn is_redirect(self) -> bool {
        matches!(self, GuardDecision::Redirect { .. })
    }
}

/// Gates protected routes on the credential store's status.
///
/// Holds nothing but a store handle; every check reads the store afresh.
/// A user who never logged in and one whose token was rejected look the
/// same here.
#[derive(Debug, Clone)]
pub struct SessionGuard {
    store: CredentialStore,
}

impl SessionGuard {
    pub fn new(store: CredentialStore) -> Self {
        Self { store }
    }

    /// Whether `path` is reachable without a session.
    pub fn is_public(path: &str) -> bool {
        let path = normalize(path);
        path == LOGIN_ROUTE || path.starts_with("/login/")
    }

    /// Decide what to do with a navigation to `path`.
    pub fn check(&self, path: &str) -> GuardDecision {
        if Self::is_public(path) || self.store.is_authenticated() {
            GuardDecision::Render
        } else {
            tracing::debug!(path = %path, "Guard redirecting to login");
            GuardDecision::Redirect { to: LOGIN_ROUTE }
        }
    }
}

fn normalize(path: &str) -> &str {
    let trimmed = path.split(['?', '#']).next().unwrap_or(path);
    if trimmed.len() > 1 {
        trimmed.trim_end_matches('/')
    } else {
        trimmed
    }
}
