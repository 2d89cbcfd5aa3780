//! The credential store.
//!
//! Holds the current [`Session`] in memory and mirrors it into a
//! [`SessionStorage`] under [`STORAGE_KEY`]. Mutations take the write lock,
//! persist the complete next state, and only then publish it, so any reader
//! that sees a token in memory can rely on storage holding it too.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::storage::SharedStorage;
use crate::types::{AuthStatus, PersistedSession, Session, User};

/// Storage key holding the serialized session.
pub const STORAGE_KEY: &str = "auth-storage";

struct StoreInner {
    state: RwLock<Session>,
    storage: SharedStorage,
    status_tx: watch::Sender<AuthStatus>,
}

/// Shared handle to the session state.
///
/// Cloning is cheap; every clone sees the same session.
#[derive(Clone)]
pub struct CredentialStore {
    inner: Arc<StoreInner>,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("session", &*self.inner.state.read())
            .field("storage", &self.inner.storage)
            .finish()
    }
}

impl CredentialStore {
    /// Create an empty store backed by `storage`.
    ///
    /// Nothing is read from storage; use [`restore`](Self::restore) at
    /// startup.
    pub fn new(storage: SharedStorage) -> Self {
        Self::with_session(storage, Session::default())
    }

    /// Rebuild the store from whatever a previous process persisted.
    ///
    /// Only the token is seeded. The user stays absent, so the store is
    /// not authenticated until identity is reconfirmed with
    /// [`confirm_user`](Self::confirm_user). Unreadable or corrupt entries are
    /// discarded.
    pub fn restore(storage: SharedStorage) -> Self {
        let token = match storage.read(STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<PersistedSession>(&raw) {
                Ok(persisted) => persisted.token,
                Err(e) => {
                    warn!(error = %e, "Discarding corrupt persisted session");
                    if let Err(e) = storage.remove(STORAGE_KEY) {
                        warn!(error = %e, "Failed to remove corrupt persisted session");
                    }
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted session");
                None
            }
        };

        if token.is_some() {
            info!("Restored persisted token, identity not yet confirmed");
        } else {
            debug!("No persisted session to restore");
        }

        Self::with_session(storage, Session { user: None, token })
    }

    fn with_session(storage: SharedStorage, session: Session) -> Self {
        let (status_tx, _) = watch::channel(session.status());
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(session),
                storage,
                status_tx,
            }),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    /// Copy of the current session.
    pub fn snapshot(&self) -> Session {
        self.inner.state.read().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.inner.state.read().token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.inner.state.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.read().is_authenticated()
    }

    pub fn status(&self) -> AuthStatus {
        self.inner.state.read().status()
    }

    /// True when a token is held but the identity behind it is unknown.
    pub fn needs_reconfirmation(&self) -> bool {
        let state = self.inner.state.read();
        state.token.is_some() && state.user.is_none()
    }

    /// Watch authentication status transitions.
    ///
    /// A value is published only when the status actually changes.
    pub fn subscribe(&self) -> watch::Receiver<AuthStatus> {
        self.inner.status_tx.subscribe()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Record the user identity, keeping the current token.
    ///
    /// If storage rejects the write the session is cleared and the error
    /// returned.
    pub fn set_user(&self, user: User) -> Result<()> {
        let mut state = self.inner.state.write();
        let next = Session {
            user: Some(user),
            token: state.token.clone(),
        };
        self.commit(&mut state, next)
    }

    /// Attach `user` to the session only if it still holds `token`.
    ///
    /// Used after an identity fetch: if the session was cleared or replaced
    /// while the fetch was in flight, the identity belongs to a credential
    /// that is gone and is dropped. Returns whether the user was recorded.
    pub fn confirm_user(&self, token: &str, user: User) -> Result<bool> {
        let mut state = self.inner.state.write();
        if state.token.as_deref() != Some(token) {
            debug!("Session changed during identity fetch, discarding identity");
            return Ok(false);
        }
        let next = Session {
            user: Some(user),
            token: state.token.clone(),
        };
        self.commit(&mut state, next).map(|()| true)
    }

    /// Persist `token`, then publish it in memory.
    ///
    /// If storage rejects the write the session is cleared and the error
    /// returned.
    pub fn set_token(&self, token: impl Into<String>) -> Result<()> {
        let mut state = self.inner.state.write();
        let next = Session {
            user: state.user.clone(),
            token: Some(token.into()),
        };
        self.commit(&mut state, next)
    }

    /// Record user and token together in a single persisted write.
    pub fn establish(&self, user: User, token: impl Into<String>) -> Result<()> {
        let mut state = self.inner.state.write();
        self.commit(&mut state, Session::authenticated(user, token))
    }

    /// Clear the session in memory and in storage.
    ///
    /// Never fails. Returns `true` if anything was cleared, `false` if the
    /// store was already empty.
    pub fn logout(&self) -> bool {
        let mut state = self.inner.state.write();
        let cleared = self.clear_locked(&mut state);
        if cleared {
            info!("Session cleared");
        }
        cleared
    }

    fn commit(&self, state: &mut Session, next: Session) -> Result<()> {
        let persisted = serde_json::to_string(&PersistedSession::from(&next));
        let written = persisted
            .map_err(Into::into)
            .and_then(|raw| self.inner.storage.write(STORAGE_KEY, &raw));

        match written {
            Ok(()) => {
                *state = next;
                self.publish(state);
                debug!(status = %state.status(), "Session updated");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Session persistence failed, clearing session");
                self.clear_locked(state);
                Err(e)
            }
        }
    }

    fn clear_locked(&self, state: &mut Session) -> bool {
        if let Err(e) = self.inner.storage.remove(STORAGE_KEY) {
            warn!(error = %e, "Failed to remove persisted session");
        }
        let cleared = !state.is_empty();
        *state = Session::default();
        self.publish(state);
        cleared
    }

    fn publish(&self, state: &Session) {
        let status = state.status();
        self.inner.status_tx.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
    }
}
