//! Session state for the Zenith client.
//!
//! This crate owns everything that decides whether the current user is
//! authenticated:
//!
//! - [`store`] - the [`CredentialStore`], single source of truth for the
//!   user identity and access token, persisted through a storage adapter
//! - [`storage`] - the [`SessionStorage`] adapter trait with file-backed and
//!   in-memory implementations
//! - [`guard`] - the [`SessionGuard`] that gates protected routes
//! - [`navigator`] - the [`Navigator`] seam used to force a return to login
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use zenith_session::{CredentialStore, FileStorage, SessionGuard};
//!
//! let storage = Arc::new(FileStorage::new("/home/me/.config/zenith"));
//! let store = CredentialStore::restore(storage);
//! let guard = SessionGuard::new(store.clone());
//!
//! if guard.check("/projects").is_redirect() {
//!     println!("please log in");
//! }
//! ```

pub mod error;
pub mod guard;
pub mod navigator;
pub mod storage;
pub mod store;
pub mod types;

pub use error::{Result, SessionError};
pub use guard::{GuardDecision, LOGIN_ROUTE, PROTECTED_ROUTES, SessionGuard};
pub use navigator::{Navigator, NoopNavigator, RecordingNavigator, SharedNavigator};
pub use storage::{FileStorage, MemoryStorage, SessionStorage, SharedStorage};
pub use store::{CredentialStore, STORAGE_KEY};
pub use types::{AuthStatus, PersistedSession, Role, Session, User};
