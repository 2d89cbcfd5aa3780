//! Navigation seam for forced returns to the login entry point.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Something that can send the user back to the login route.
///
/// The gateway calls this after a credential rejection has cleared the
/// session. Front ends decide what "navigate" means: a browser redirect,
/// a CLI hint, a TUI screen change.
pub trait Navigator: Send + Sync + std::fmt::Debug {
    fn redirect_to_login(&self);
}

/// Shared navigator handle.
pub type SharedNavigator = Arc<dyn Navigator>;

/// Navigator that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn redirect_to_login(&self) {}
}

/// Navigator that counts redirects (for testing).
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    redirects: AtomicUsize,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn redirect_count(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Navigator for RecordingNavigator {
    fn redirect_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}
