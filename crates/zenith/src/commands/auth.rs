//! Login and logout.

use std::io::{BufRead, Write};

use anyhow::{Result, bail};
use clap::Args;
use console::Style;
use serde::Serialize;

use super::Context;

/// Arguments for the login command.
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Username (prompted when omitted)
    #[arg(short, long)]
    pub username: Option<String>,

    /// Read the password from stdin instead of prompting
    #[arg(long)]
    pub password_stdin: bool,
}

#[derive(Debug, Serialize)]
struct LoginOutput<'a> {
    authenticated: bool,
    username: &'a str,
    user_id: u64,
    server_url: &'a str,
}

/// Run the login command.
pub async fn login(args: LoginArgs, ctx: &Context) -> Result<()> {
    let username = match args.username {
        Some(name) => name,
        None => prompt_line("Username: ")?,
    };
    if username.is_empty() {
        bail!("username is required");
    }

    let password = if args.password_stdin {
        read_stdin_line()?
    } else {
        rpassword::prompt_password("Password: ")?
    };

    if ctx.client.store().token().is_some() {
        // Replacing a session; drop whatever the old one cached
        ctx.client.auth().logout().await;
    }

    match ctx.client.auth().login(&username, &password).await {
        Ok(user) => {
            if ctx.json_output {
                ctx.print_json(&LoginOutput {
                    authenticated: true,
                    username: &user.username,
                    user_id: user.id,
                    server_url: &ctx.server_url,
                })?;
            } else {
                let green = Style::new().green();
                let dim = Style::new().dim();
                println!(
                    "{} Logged in as {} {}",
                    green.apply_to("✓"),
                    user.username,
                    dim.apply_to(format!("({})", user.role))
                );
            }
            Ok(())
        }
        Err(e) if e.is_auth_error() => bail!("Login failed: incorrect username or password"),
        Err(e) => Err(e.into()),
    }
}

/// Run the logout command.
pub async fn logout(ctx: &Context) -> Result<()> {
    let cleared = ctx.client.auth().logout().await;
    if ctx.json_output {
        ctx.print_json(&serde_json::json!({ "logged_out": cleared }))?;
    } else if cleared {
        println!("Logged out.");
    } else {
        println!("No session to clear.");
    }
    Ok(())
}

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    std::io::stdout().flush()?;
    read_stdin_line()
}

fn read_stdin_line() -> Result<String> {
    let mut input = String::new();
    std::io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}
