//! Status command - shows server health and session state.

use anyhow::Result;
use console::{Style, style};
use serde::Serialize;
use zenith_client::{AuthStatus, GuardDecision, Role};

use super::Context;

/// Status response for JSON output.
#[derive(Debug, Serialize)]
struct StatusOutput {
    server_url: String,
    server_source: String,
    reachable: bool,
    version: Option<String>,
    authenticated: bool,
    username: Option<String>,
    role: Option<Role>,
}

/// Run the status command.
pub async fn run(ctx: &Context) -> Result<()> {
    let health = ctx.client.health().check().await;
    let session = ctx.client.store().snapshot();
    let status = session.status();

    if ctx.json_output {
        let output = StatusOutput {
            server_url: ctx.server_url.clone(),
            server_source: ctx.server_source.to_string(),
            reachable: health.is_ok(),
            version: health.as_ref().ok().map(|h| h.version.clone()),
            authenticated: status == AuthStatus::Authenticated,
            username: session.user.as_ref().map(|u| u.username.clone()),
            role: session.user.as_ref().map(|u| u.role),
        };
        return ctx.print_json(&output);
    }

    let green = Style::new().green();
    let red = Style::new().red();
    let dim = Style::new().dim();

    println!();
    println!("{}", style("Zenith Status").bold());
    println!("{}", dim.apply_to("─".repeat(40)));
    println!();
    println!(
        "  {} {} {}",
        dim.apply_to("Server:"),
        ctx.server_url,
        dim.apply_to(format!("({})", ctx.server_source))
    );
    match &health {
        Ok(h) => {
            println!("  {} {}", dim.apply_to("Health:"), green.apply_to("● reachable"));
            println!("  {} {}", dim.apply_to("Version:"), h.version);
        }
        Err(e) => {
            println!("  {} {}", dim.apply_to("Health:"), red.apply_to("● unreachable"));
            if ctx.verbose {
                println!("  {} {}", dim.apply_to("Error:"), e);
            }
        }
    }

    println!();
    match (&session.user, ctx.client.guard().check("/")) {
        (Some(user), GuardDecision::Render) => {
            println!(
                "  {} {} {}",
                dim.apply_to("Session:"),
                green.apply_to(format!("signed in as {}", user.username)),
                dim.apply_to(format!("({}, {})", user.role, user.email))
            );
        }
        _ if session.token.is_some() => {
            println!(
                "  {} {}",
                dim.apply_to("Session:"),
                red.apply_to("stored, but could not be confirmed")
            );
        }
        _ => {
            println!("  {} not logged in", dim.apply_to("Session:"));
            println!();
            println!("  {}", dim.apply_to("Sign in with: zenith login"));
        }
    }
    println!();

    Ok(())
}
