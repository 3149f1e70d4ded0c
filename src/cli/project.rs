//
//  gitlab-client
//  cli/project.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Project commands
//!
//! Projects are addressed by numeric id or by full path
//! (`group/subgroup/project`). `view`, `edit` and `delete` take the project
//! as an argument and fall back to `--project` / `GLC_PROJECT`.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::api::{
    CreateProject, ProjectListOptions, ProjectOrderBy, ProjectRef, SortOrder, UpdateProject,
    Visibility,
};

use super::{CommandContext, GlobalOptions};

/// Manage projects
#[derive(Args, Debug)]
pub struct ProjectCommand {
    #[command(subcommand)]
    pub command: ProjectSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ProjectSubcommand {
    /// List projects
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// View project details
    View(ViewArgs),

    /// Create a project
    Create(CreateArgs),

    /// Edit a project
    Edit(EditArgs),

    /// Delete a project
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only projects you own
    #[arg(long)]
    pub owned: bool,

    /// Only projects you are a member of
    #[arg(long)]
    pub membership: bool,

    /// Filter by name
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Filter by visibility
    #[arg(long, value_enum)]
    pub visibility: Option<Visibility>,

    /// Include archived projects
    #[arg(long)]
    pub archived: bool,

    /// Order projects by
    #[arg(long, value_enum)]
    pub order_by: Option<ProjectOrderBy>,

    /// Sort direction
    #[arg(long, value_enum)]
    pub sort: Option<SortOrder>,

    /// Maximum number of projects to list
    #[arg(long, short = 'l', default_value = "30")]
    pub limit: u32,
}

#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Project ID or path
    pub project: Option<String>,

    /// Open in browser
    #[arg(long, short = 'w')]
    pub web: bool,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Project name
    pub name: String,

    /// URL path of the project; derived from the name when omitted
    #[arg(long)]
    pub path: Option<String>,

    /// Group or namespace ID to create the project in
    #[arg(long)]
    pub namespace_id: Option<u64>,

    /// Project description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Project visibility
    #[arg(long, value_enum)]
    pub visibility: Option<Visibility>,

    /// Create an initial commit with a README
    #[arg(long)]
    pub readme: bool,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Project ID or path
    pub project: Option<String>,

    /// New name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// New description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// New visibility
    #[arg(long, value_enum)]
    pub visibility: Option<Visibility>,

    /// New default branch
    #[arg(long)]
    pub default_branch: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Project ID or path
    pub project: Option<String>,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub confirm: bool,
}

impl ProjectCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let ctx = CommandContext::resolve(global)?;
        let result = self.dispatch(&ctx, global).await;
        ctx.finish(result)
    }

    async fn dispatch(&self, ctx: &CommandContext, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            ProjectSubcommand::List(args) => list(ctx, args).await,
            ProjectSubcommand::View(args) => view(ctx, args, global).await,
            ProjectSubcommand::Create(args) => create(ctx, args).await,
            ProjectSubcommand::Edit(args) => edit(ctx, args, global).await,
            ProjectSubcommand::Delete(args) => delete(ctx, args, global).await,
        }
    }
}

/// The positional project, or the global `--project`.
fn project_arg(project: Option<&str>, global: &GlobalOptions) -> Result<ProjectRef> {
    match project.map(str::trim).filter(|p| !p.is_empty()) {
        Some(project) => Ok(ProjectRef::from(project)),
        None => global.require_project(),
    }
}

async fn list(ctx: &CommandContext, args: &ListArgs) -> Result<()> {
    let options = ProjectListOptions {
        search: args.search.clone(),
        owned: args.owned,
        membership: args.membership,
        visibility: args.visibility,
        archived: if args.archived { None } else { Some(false) },
        order_by: args.order_by,
        sort: args.sort,
    };
    let page = ctx
        .client
        .list_projects_page(&options, 1, args.limit.max(1))
        .await?;
    ctx.output.write_list(&page.items)?;

    if page.has_next() {
        ctx.output
            .write_info(&format!("Showing the first {} projects. Use --limit to see more.", page.items.len()));
    }
    Ok(())
}

async fn view(ctx: &CommandContext, args: &ViewArgs, global: &GlobalOptions) -> Result<()> {
    let project = project_arg(args.project.as_deref(), global)?;
    let project = ctx
        .client
        .get_optional_project(&project)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Project '{}' not found", project))?;

    if args.web {
        ctx.output.write_info(&format!("Opening {} in your browser", project.web_url));
        webbrowser::open(&project.web_url)
            .with_context(|| format!("Failed to open {}", project.web_url))?;
        return Ok(());
    }
    ctx.output.write(&project)
}

async fn create(ctx: &CommandContext, args: &CreateArgs) -> Result<()> {
    let params = CreateProject {
        name: Some(args.name.clone()),
        path: args.path.clone(),
        namespace_id: args.namespace_id,
        description: args.description.clone(),
        visibility: args.visibility,
        initialize_with_readme: args.readme,
        ..CreateProject::default()
    };
    let project = ctx.client.create_project(&params).await?;

    if ctx.output.is_json() {
        return ctx.output.write(&project);
    }
    ctx.output.write_success(&format!("Created project {}", project.path_with_namespace));
    ctx.output.write_info(&format!("  {}", project.web_url));
    Ok(())
}

async fn edit(ctx: &CommandContext, args: &EditArgs, global: &GlobalOptions) -> Result<()> {
    let project = project_arg(args.project.as_deref(), global)?;
    let params = UpdateProject {
        name: args.name.clone(),
        description: args.description.clone(),
        visibility: args.visibility,
        default_branch: args.default_branch.clone(),
        ..UpdateProject::default()
    };
    let updated = ctx.client.update_project(&project, &params).await?;

    if ctx.output.is_json() {
        return ctx.output.write(&updated);
    }
    ctx.output.write_success(&format!("Updated project {}", updated.path_with_namespace));
    Ok(())
}

async fn delete(ctx: &CommandContext, args: &DeleteArgs, global: &GlobalOptions) -> Result<()> {
    let project = project_arg(args.project.as_deref(), global)?;
    let message = format!("Delete project {}? This cannot be undone.", project);
    if !global.confirm(&message, args.confirm)? {
        ctx.output.write_info("Cancelled");
        return Ok(());
    }

    ctx.client.delete_project(&project).await?;
    ctx.output.write_success(&format!("Scheduled project {} for deletion", project));
    Ok(())
}
