//! Authentication API.

use tracing::{debug, info};

use crate::client::ZenithClient;
use crate::error::Result;
use crate::gateway::OutboundRequest;
use crate::types::{RegisterRequest, TokenResponse, User};

/// Authentication API client.
///
/// Owns the transitions of the credential store that start from the
/// server: login, identity reconfirmation and logout.
pub struct AuthApi {
    client: ZenithClient,
}

impl AuthApi {
    pub(crate) fn new(client: ZenithClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for a token and establish the session.
    ///
    /// The identity check authorizes with the new token explicitly, so
    /// nothing is written to the store until both the token and the user
    /// are known. They are then recorded in one write, and cached query
    /// data from any earlier session is dropped.
    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        let token: TokenResponse = self
            .client
            .gateway()
            .post_form(
                "auth/login",
                &[("username", username), ("password", password)],
            )
            .await?;
        debug!(token_type = %token.token_type, "Token issued");

        let identity = OutboundRequest::get("auth/me").with_bearer(&token.access_token)?;
        let user: User = self.client.execute_json(identity).await?;

        self.client.store().establish(user.clone(), token.access_token)?;
        self.client.queries().clear().await;
        info!(user_id = user.id, username = %user.username, "Logged in");
        Ok(user)
    }

    /// Fetch the profile for the current token.
    pub async fn me(&self) -> Result<User> {
        self.client.get("auth/me").await
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, request: RegisterRequest) -> Result<User> {
        self.client.post("auth/register", &request).await
    }

    /// Re-establish identity for a restored token.
    ///
    /// Returns `None` when there is no token to confirm, or when the session
    /// changed while the profile was in flight. A rejected token has already
    /// cleared the session by the time the error is returned.
    pub async fn reconfirm(&self) -> Result<Option<User>> {
        let Some(token) = self.client.store().token() else {
            return Ok(None);
        };
        let user = self.me().await?;
        if self.client.store().confirm_user(&token, user.clone())? {
            info!(user_id = user.id, "Session reconfirmed");
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Clear the session and drop cached query data.
    ///
    /// Returns whether a session was held.
    pub async fn logout(&self) -> bool {
        let cleared = self.client.store().logout();
        self.client.queries().clear().await;
        cleared
    }
}
