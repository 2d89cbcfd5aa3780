//! Projects command - project management.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::Style;
use zenith_client::CreateProjectRequest;

use super::{Context, header, truncate};

/// Arguments for the projects command.
#[derive(Args, Debug)]
pub struct ProjectsArgs {
    #[command(subcommand)]
    pub command: ProjectsCommand,
}

#[derive(Subcommand, Debug)]
pub enum ProjectsCommand {
    /// List all projects
    List,

    /// Show a specific project
    Get {
        /// Project ID
        id: u64,
    },

    /// Create a project
    Create {
        /// Project name
        name: String,

        /// Optional description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete a project
    Delete {
        /// Project ID
        id: u64,
    },
}

/// Run the projects command.
pub async fn run(args: ProjectsArgs, ctx: &Context) -> Result<()> {
    ctx.require_session("/projects")?;
    let api = ctx.client.projects();
    let dim = Style::new().dim();
    let green = Style::new().green();

    match args.command {
        ProjectsCommand::List => {
            let projects = api.list().await?;
            if ctx.json_output {
                return ctx.print_json(&projects);
            }
            header("Projects");
            if projects.is_empty() {
                println!("{}", dim.apply_to("No projects found"));
            }
            for project in &projects {
                println!(
                    "{} {}  {}",
                    dim.apply_to(format!("[{}]", project.id)),
                    project.name,
                    dim.apply_to(truncate(project.description.as_deref().unwrap_or(""), 50))
                );
            }
        }
        ProjectsCommand::Get { id } => {
            let project = api.get(id).await?;
            if ctx.json_output {
                return ctx.print_json(&project);
            }
            header(&project.name);
            println!("  {} {}", dim.apply_to("ID:"), project.id);
            if let Some(description) = &project.description {
                println!("  {} {}", dim.apply_to("Description:"), description);
            }
            if let Some(created) = &project.created_at {
                println!("  {} {}", dim.apply_to("Created:"), created);
            }
        }
        ProjectsCommand::Create { name, description } => {
            let project = api
                .create(CreateProjectRequest { name, description })
                .await?;
            if ctx.json_output {
                return ctx.print_json(&project);
            }
            println!(
                "{} Project created: {} {}",
                green.apply_to("✓"),
                project.name,
                dim.apply_to(format!("[{}]", project.id))
            );
        }
        ProjectsCommand::Delete { id } => {
            api.delete(id).await?;
            if ctx.json_output {
                return ctx.print_json(&serde_json::json!({ "deleted": id }));
            }
            println!("{} Project {} deleted", green.apply_to("✓"), id);
        }
    }

    Ok(())
}
