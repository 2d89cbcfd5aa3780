//! CLI command handlers.

pub mod auth;
pub mod config;
pub mod dashboard;
pub mod deployments;
pub mod projects;
pub mod resources;
pub mod status;

use anyhow::{Result, bail};
use console::Style;
use serde::Serialize;
use zenith_client::{GuardDecision, ZenithClient};
use zenith_config::ServerSource;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Client wired to the restored session.
    pub client: ZenithClient,
    /// Server URL in use.
    pub server_url: String,
    /// Where the server URL came from.
    pub server_source: ServerSource,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Consult the session guard before showing a protected route.
    ///
    /// A redirect ends the command with a hint instead of calling the
    /// server without a session.
    pub fn require_session(&self, route: &str) -> Result<()> {
        match self.client.guard().check(route) {
            GuardDecision::Render => Ok(()),
            GuardDecision::Redirect { to } => {
                let dim = Style::new().dim();
                eprintln!("Not logged in. Run `zenith login` first.");
                if self.verbose {
                    eprintln!("{}", dim.apply_to(format!("({} requires {})", route, to)));
                }
                bail!("authentication required")
            }
        }
    }

    /// Print a value as pretty JSON.
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

/// Print a section header.
pub fn header(title: &str) {
    let dim = Style::new().dim();
    println!("{}", console::style(title).bold());
    println!("{}", dim.apply_to("─".repeat(50)));
}

/// Shorten `s` to at most `max` characters.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer description", 10), "a longe...");
        assert_eq!(truncate("ünïcödé text", 8), "ünïcö...");
    }
}
