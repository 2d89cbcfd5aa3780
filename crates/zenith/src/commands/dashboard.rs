//! Dashboard command - periodic overview served from the query cache.

use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use clap::Args;
use console::Style;
use serde::Serialize;
use tracing::debug;
use zenith_client::{Deployment, DeploymentStatus, Project, QueryKey};

use super::deployments::status_label;
use super::{Context, header};

/// Arguments for the dashboard command.
#[derive(Args, Debug)]
pub struct DashboardArgs {
    /// Seconds between refreshes
    #[arg(short, long, default_value = "30")]
    pub interval: u64,

    /// Number of refreshes to show (0 = until interrupted)
    #[arg(short, long, default_value = "1")]
    pub rounds: u32,
}

/// One snapshot of the overview.
#[derive(Debug, Serialize)]
struct Snapshot {
    round: u32,
    at: String,
    projects: usize,
    deployments: usize,
    running: usize,
    failed: usize,
    cache: zenith_client::CacheStats,
}

/// Run the dashboard command.
pub async fn run(args: DashboardArgs, ctx: &Context) -> Result<()> {
    ctx.require_session("/")?;
    let interval = Duration::from_secs(args.interval.max(1));

    let mut round = 1;
    loop {
        let projects: Vec<Project> = ctx
            .client
            .query(&QueryKey::new("projects"), |c| async move {
                c.projects().list().await
            })
            .await?;
        let deployments: Vec<Deployment> = ctx
            .client
            .query(&QueryKey::new("deployments"), |c| async move {
                c.deployments().list().await
            })
            .await?;

        let stats = ctx.client.queries().stats().await;
        debug!(round, size = stats.size, stale = stats.stale, "Dashboard refreshed");

        let snapshot = Snapshot {
            round,
            at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            projects: projects.len(),
            deployments: deployments.len(),
            running: count(&deployments, DeploymentStatus::Running),
            failed: count(&deployments, DeploymentStatus::Failed),
            cache: stats,
        };

        if ctx.json_output {
            println!("{}", serde_json::to_string(&snapshot)?);
        } else {
            render(&snapshot, &projects, &deployments, ctx.verbose);
        }

        if args.rounds != 0 && round >= args.rounds {
            break;
        }
        round += 1;

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}

fn count(deployments: &[Deployment], status: DeploymentStatus) -> usize {
    deployments.iter().filter(|d| d.status == status).count()
}

fn render(snapshot: &Snapshot, projects: &[Project], deployments: &[Deployment], verbose: bool) {
    let dim = Style::new().dim();

    println!();
    header(&format!("Zenith Dashboard  {}", dim.apply_to(&snapshot.at)));
    println!(
        "  {} {}   {} {}   {} {}   {} {}",
        dim.apply_to("Projects:"),
        snapshot.projects,
        dim.apply_to("Deployments:"),
        snapshot.deployments,
        dim.apply_to("Running:"),
        snapshot.running,
        dim.apply_to("Failed:"),
        snapshot.failed
    );

    if !projects.is_empty() {
        println!();
        println!("  {}", dim.apply_to("Recent projects"));
        for project in projects.iter().rev().take(5) {
            println!("    {} {}", dim.apply_to(format!("[{}]", project.id)), project.name);
        }
    }

    if !deployments.is_empty() {
        println!();
        println!("  {}", dim.apply_to("Deployments"));
        for deployment in deployments.iter().take(10) {
            println!("    {}  {}", status_label(deployment.status), deployment.name);
        }
    }

    if verbose {
        println!();
        println!(
            "  {}",
            dim.apply_to(format!(
                "cache: {}/{} entries, {} stale",
                snapshot.cache.size, snapshot.cache.capacity, snapshot.cache.stale
            ))
        );
    }
}
