//! Read-only listings of per-project resources.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::Style;

use super::{Context, header, truncate};

/// Resource kinds listed by project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Experiments,
    Models,
    Agents,
    Prompts,
    Datasets,
}

impl Resource {
    /// Route the session guard checks for this resource.
    fn route(self) -> &'static str {
        match self {
            Resource::Experiments => "/experiments",
            Resource::Models => "/models",
            // Agents and prompts share the agents page
            Resource::Agents | Resource::Prompts => "/agents",
            Resource::Datasets => "/datasets",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Resource::Experiments => "Experiments",
            Resource::Models => "Models",
            Resource::Agents => "Agents",
            Resource::Prompts => "Prompt Templates",
            Resource::Datasets => "Datasets",
        }
    }
}

/// Arguments for a resource listing.
#[derive(Args, Debug)]
pub struct ResourceArgs {
    #[command(subcommand)]
    pub command: ResourceCommand,
}

#[derive(Subcommand, Debug)]
pub enum ResourceCommand {
    /// List entries in a project
    List {
        /// Project ID
        #[arg(short, long)]
        project: u64,
    },
}

/// One printable row.
struct Row {
    id: u64,
    name: String,
    detail: String,
}

/// Run a resource listing.
pub async fn run(resource: Resource, args: ResourceArgs, ctx: &Context) -> Result<()> {
    ctx.require_session(resource.route())?;
    let ResourceCommand::List { project } = args.command;
    let client = &ctx.client;

    let (json, rows): (serde_json::Value, Vec<Row>) = match resource {
        Resource::Experiments => {
            let items = client.experiments().list(project).await?;
            let rows = items
                .iter()
                .map(|e| Row {
                    id: e.id,
                    name: e.name.clone(),
                    detail: e.description.clone().unwrap_or_default(),
                })
                .collect();
            (serde_json::to_value(&items)?, rows)
        }
        Resource::Models => {
            let items = client.models().list(project).await?;
            let rows = items
                .iter()
                .map(|m| Row {
                    id: m.id,
                    name: m.name.clone(),
                    detail: m.description.clone().unwrap_or_default(),
                })
                .collect();
            (serde_json::to_value(&items)?, rows)
        }
        Resource::Agents => {
            let items = client.agents().list(project).await?;
            let rows = items
                .iter()
                .map(|a| Row {
                    id: a.id,
                    name: a.name.clone(),
                    detail: a.agent_type.clone(),
                })
                .collect();
            (serde_json::to_value(&items)?, rows)
        }
        Resource::Prompts => {
            let items = client.prompts().list(project).await?;
            let rows = items
                .iter()
                .map(|p| Row {
                    id: p.id,
                    name: p.name.clone(),
                    detail: p.description.clone().unwrap_or_default(),
                })
                .collect();
            (serde_json::to_value(&items)?, rows)
        }
        Resource::Datasets => {
            let items = client.datasets().list(project).await?;
            let rows = items
                .iter()
                .map(|d| Row {
                    id: d.id,
                    name: d.name.clone(),
                    detail: d.version.clone().unwrap_or_default(),
                })
                .collect();
            (serde_json::to_value(&items)?, rows)
        }
    };

    if ctx.json_output {
        return ctx.print_json(&json);
    }

    let dim = Style::new().dim();
    header(&format!("{} (project {})", resource.title(), project));
    if rows.is_empty() {
        println!("{}", dim.apply_to("Nothing found"));
    }
    for row in rows {
        println!(
            "{} {}  {}",
            dim.apply_to(format!("[{}]", row.id)),
            row.name,
            dim.apply_to(truncate(&row.detail, 50))
        );
    }
    Ok(())
}
