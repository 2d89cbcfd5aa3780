//! Session data model.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role tag attached to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    Viewer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::User => write!(f, "user"),
            Role::Viewer => write!(f, "viewer"),
        }
    }
}

/// Identity of the authenticated user, as returned by `/auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::User
}

impl User {
    /// Create a user with the default role.
    pub fn new(id: u64, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            username: username.into(),
            role: Role::User,
        }
    }

    /// Set the role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

/// Authentication status as seen by the session guard.
///
/// There is no intermediate "authenticating" state: the store only ever
/// publishes one of these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AuthStatus {
    #[default]
    Anonymous,
    Authenticated,
}

impl AuthStatus {
    pub fn is_authenticated(self) -> bool {
        matches!(self, AuthStatus::Authenticated)
    }
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthStatus::Anonymous => write!(f, "anonymous"),
            AuthStatus::Authenticated => write!(f, "authenticated"),
        }
    }
}

/// In-memory session state.
///
/// `is_authenticated` is derived from the two fields, so a session can never
/// claim authentication while either half is missing.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<String>,
}

impl Session {
    /// A session holding both identity and credential.
    pub fn authenticated(user: User, token: impl Into<String>) -> Self {
        Self {
            user: Some(user),
            token: Some(token.into()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.user.is_none() && self.token.is_none()
    }

    pub fn status(&self) -> AuthStatus {
        if self.is_authenticated() {
            AuthStatus::Authenticated
        } else {
            AuthStatus::Anonymous
        }
    }
}

// Hand-written so the token never ends up in logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("is_authenticated", &self.is_authenticated())
            .finish()
    }
}

/// On-disk layout of the session under [`STORAGE_KEY`](crate::STORAGE_KEY).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub is_authenticated: bool,
}

impl From<&Session> for PersistedSession {
    fn from(session: &Session) -> Self {
        Self {
            user: session.user.clone(),
            token: session.token.clone(),
            is_authenticated: session.is_authenticated(),
        }
    }
}
