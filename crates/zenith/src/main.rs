//! Zenith - command-line client for the Zenith ML platform
//!
//! Main entry point for the Zenith CLI.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, warn};
use zenith_client::{CredentialStore, FileStorage, ZenithClient};

mod commands;
mod navigator;

use commands::{auth, config, dashboard, deployments, projects, resources, status};
use navigator::CliNavigator;

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Zenith - command-line client for the Zenith ML platform
#[derive(Parser)]
#[command(name = "zenith")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Server URL (default: http://localhost:8000)
    #[arg(long, global = true, env = "ZENITH_API_URL")]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session
    Login(auth::LoginArgs),

    /// Sign out and forget the stored session
    Logout,

    /// Show server health and session state
    Status,

    /// Manage projects
    Projects(projects::ProjectsArgs),

    /// List experiments in a project
    Experiments(resources::ResourceArgs),

    /// List registered models in a project
    Models(resources::ResourceArgs),

    /// Inspect deployments
    Deployments(deployments::DeploymentsArgs),

    /// List agents in a project
    Agents(resources::ResourceArgs),

    /// List prompt templates in a project
    Prompts(resources::ResourceArgs),

    /// List datasets in a project
    Datasets(resources::ResourceArgs),

    /// Poll projects and deployments through the query cache
    Dashboard(dashboard::DashboardArgs),

    /// View or edit the client configuration
    Config(config::ConfigArgs),
}

impl Commands {
    /// Whether a restored session should be reconfirmed before running.
    fn uses_session(&self) -> bool {
        !matches!(
            self,
            Commands::Login(_) | Commands::Logout | Commands::Config(_)
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing: console (human-readable) + rotating JSON file
    let filter = if cli.verbose {
        "zenith=debug,zenith_client=debug,zenith_session=debug,zenith_query=debug,info"
    } else {
        "zenith=info,zenith_client=warn,zenith_session=warn,zenith_query=warn,warn"
    };

    let log_dir = zenith_config::xdg_config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "zenith.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "zenith=trace,zenith_client=trace,zenith_session=trace,zenith_query=trace,info",
                )),
        )
        .init();

    let command = match cli.command {
        Commands::Config(args) => return config::run(args, cli.server.as_deref(), cli.json).await,
        other => other,
    };

    // Resolve settings: flag/env, then client.yaml, then defaults
    let settings = zenith_config::load_client_config()?.resolve(cli.server.as_deref())?;
    debug!(server = %settings.server, source = %settings.source, "Resolved server");

    let storage = Arc::new(FileStorage::new(&settings.data_dir));
    let client = ZenithClient::builder()
        .base_url(settings.server.clone())
        .timeout(settings.timeout)
        .credential_store(CredentialStore::restore(storage))
        .navigator(Arc::new(CliNavigator::new()))
        .build()
        .context("Failed to create client")?;

    if command.uses_session() && client.store().needs_reconfirmation() {
        match client.auth().reconfirm().await {
            Ok(Some(user)) => debug!(user = %user.username, "Session restored"),
            Ok(None) => {}
            // The navigator has already told the user
            Err(e) if e.is_auth_error() => {}
            Err(e) => warn!(error = %e, "Could not reconfirm session"),
        }
    }

    // Create context for commands
    let ctx = commands::Context {
        client,
        server_url: settings.server,
        server_source: settings.source,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    // Dispatch to command handlers
    match command {
        Commands::Login(args) => auth::login(args, &ctx).await,
        Commands::Logout => auth::logout(&ctx).await,
        Commands::Status => status::run(&ctx).await,
        Commands::Projects(args) => projects::run(args, &ctx).await,
        Commands::Experiments(args) => {
            resources::run(resources::Resource::Experiments, args, &ctx).await
        }
        Commands::Models(args) => resources::run(resources::Resource::Models, args, &ctx).await,
        Commands::Deployments(args) => deployments::run(args, &ctx).await,
        Commands::Agents(args) => resources::run(resources::Resource::Agents, args, &ctx).await,
        Commands::Prompts(args) => resources::run(resources::Resource::Prompts, args, &ctx).await,
        Commands::Datasets(args) => {
            resources::run(resources::Resource::Datasets, args, &ctx).await
        }
        Commands::Dashboard(args) => dashboard::run(args, &ctx).await,
        // Handled before the client is built
        Commands::Config(_) => Ok(()),
    }
}
