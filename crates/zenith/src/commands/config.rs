//! Config command - view and edit client.yaml.

use std::path::PathBuf;

use anyhow::{Result, anyhow, bail};
use clap::{Args, Subcommand};
use console::Style;
use serde::Serialize;
use tracing::info;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective settings and where they came from
    Show,

    /// Update client.yaml
    Set {
        /// Server root URL (e.g., https://zenith.example.com)
        #[arg(long)]
        server: Option<String>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Directory holding the stored session
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Show configuration file path
    Path,
}

#[derive(Debug, Serialize)]
struct ShowOutput {
    config_file: Option<String>,
    server: String,
    server_source: String,
    timeout_secs: u64,
    data_dir: String,
}

/// Run the config command.
///
/// Runs before the client is built, so a broken file can still be fixed.
pub async fn run(args: ConfigArgs, server_override: Option<&str>, json: bool) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(server_override, json),
        ConfigCommand::Set {
            server,
            timeout,
            data_dir,
        } => cmd_set(server, timeout, data_dir),
        ConfigCommand::Path => cmd_path(),
    }
}

fn cmd_show(server_override: Option<&str>, json: bool) -> Result<()> {
    let path = zenith_config::client_config_path();
    let resolved = zenith_config::load_client_config()?.resolve(server_override)?;

    let output = ShowOutput {
        config_file: path
            .as_ref()
            .filter(|p| p.exists())
            .map(|p| p.display().to_string()),
        server: resolved.server,
        server_source: resolved.source.to_string(),
        timeout_secs: resolved.timeout.as_secs(),
        data_dir: resolved.data_dir.display().to_string(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    match &output.config_file {
        Some(file) => println!("{} {}", dim.apply_to("Config file:"), file),
        None => println!("{} none (using defaults)", dim.apply_to("Config file:")),
    }
    println!(
        "{} {} {}",
        dim.apply_to("Server:     "),
        output.server,
        dim.apply_to(format!("({})", output.server_source))
    );
    println!("{} {}s", dim.apply_to("Timeout:    "), output.timeout_secs);
    println!("{} {}", dim.apply_to("Data dir:   "), output.data_dir);
    Ok(())
}

fn cmd_set(server: Option<String>, timeout: Option<u64>, data_dir: Option<PathBuf>) -> Result<()> {
    if server.is_none() && timeout.is_none() && data_dir.is_none() {
        bail!("Nothing to set. Pass --server, --timeout or --data-dir");
    }

    let path = zenith_config::client_config_path()
        .ok_or_else(|| anyhow!("Could not determine config directory"))?;
    let mut config = zenith_config::load_client_config_from(Some(&path))?;

    if let Some(server) = server {
        config = config.with_server(server);
    }
    if let Some(timeout) = timeout {
        config = config.with_timeout(timeout);
    }
    if let Some(dir) = data_dir {
        config = config.with_data_dir(dir);
    }

    // Refuse to write a file the next run could not use
    config.resolve(None)?;

    zenith_config::save_client_config_to(&config, &path)?;
    info!(path = %path.display(), "Client config saved");
    println!("Saved {}", path.display());
    Ok(())
}

fn cmd_path() -> Result<()> {
    if let Some(path) = zenith_config::client_config_path() {
        println!("{}", path.display());
    } else {
        eprintln!("Could not determine config directory");
    }
    Ok(())
}
