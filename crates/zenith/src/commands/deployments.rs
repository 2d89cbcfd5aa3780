//! Deployments command.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::Style;
use zenith_client::{Deployment, DeploymentStatus};

use super::{Context, header};

/// Arguments for the deployments command.
#[derive(Args, Debug)]
pub struct DeploymentsArgs {
    #[command(subcommand)]
    pub command: DeploymentsCommand,
}

#[derive(Subcommand, Debug)]
pub enum DeploymentsCommand {
    /// List all deployments
    List,

    /// Show a specific deployment
    Get {
        /// Deployment ID
        id: u64,
    },
}

/// Run the deployments command.
pub async fn run(args: DeploymentsArgs, ctx: &Context) -> Result<()> {
    ctx.require_session("/deployments")?;
    let api = ctx.client.deployments();
    let dim = Style::new().dim();

    match args.command {
        DeploymentsCommand::List => {
            let deployments = api.list().await?;
            if ctx.json_output {
                return ctx.print_json(&deployments);
            }
            header("Deployments");
            if deployments.is_empty() {
                println!("{}", dim.apply_to("No deployments found"));
            }
            for deployment in &deployments {
                println!(
                    "{} {}  {}",
                    dim.apply_to(format!("[{}]", deployment.id)),
                    deployment.name,
                    status_label(deployment.status)
                );
            }
        }
        DeploymentsCommand::Get { id } => {
            let deployment = api.get(id).await?;
            if ctx.json_output {
                return ctx.print_json(&deployment);
            }
            print_detail(&deployment);
        }
    }

    Ok(())
}

fn print_detail(deployment: &Deployment) {
    let dim = Style::new().dim();
    header(&deployment.name);
    println!("  {} {}", dim.apply_to("ID:"), deployment.id);
    println!("  {} {}", dim.apply_to("Status:"), status_label(deployment.status));
    println!(
        "  {} {}",
        dim.apply_to("Model version:"),
        deployment.model_version_id
    );
    if let Some(endpoint) = &deployment.endpoint_url {
        println!("  {} {}", dim.apply_to("Endpoint:"), endpoint);
    }
    if let Some(created) = &deployment.created_at {
        println!("  {} {}", dim.apply_to("Created:"), created);
    }
}

/// Colored status marker.
pub fn status_label(status: DeploymentStatus) -> String {
    let style = match status {
        DeploymentStatus::Running => Style::new().green(),
        DeploymentStatus::Failed => Style::new().red(),
        DeploymentStatus::Pending | DeploymentStatus::Deploying => Style::new().yellow(),
        DeploymentStatus::Stopped => Style::new().dim(),
    };
    style.apply_to(format!("● {}", status)).to_string()
}
