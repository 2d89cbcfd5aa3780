//! Terminal stand-in for the login redirect.

use std::sync::atomic::{AtomicBool, Ordering};

use console::Style;
use zenith_client::Navigator;

/// Tells the user to sign in again after the server rejects the session.
///
/// A terminal has no login page to navigate to, so the redirect becomes a
/// hint on stderr, printed at most once per process.
#[derive(Debug, Default)]
pub struct CliNavigator {
    announced: AtomicBool,
}

impl CliNavigator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Navigator for CliNavigator {
    fn redirect_to_login(&self) {
        if self.announced.swap(true, Ordering::SeqCst) {
            return;
        }
        let yellow = Style::new().yellow();
        eprintln!(
            "{} Session expired. Run `zenith login` to sign in again.",
            yellow.apply_to("!")
        );
    }
}
