//
//  gitlab-client
//  cli/release.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Release commands

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::api::{CreateRelease, ProjectRef, ReleaseListOptions, ReleaseOrderBy, SortOrder, UpdateRelease};
use crate::interactive::prompt_editor;

use super::{CommandContext, GlobalOptions};

/// Manage releases
#[derive(Args, Debug)]
pub struct ReleaseCommand {
    #[command(subcommand)]
    pub command: ReleaseSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ReleaseSubcommand {
    /// List releases
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// View a release
    View(ViewArgs),

    /// Create a release
    Create(CreateArgs),

    /// Edit a release
    Edit(EditArgs),

    /// Delete a release (the tag is kept)
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Order releases by release or creation date
    #[arg(long, value_enum)]
    pub order_by: Option<ReleaseOrderBy>,

    /// Sort direction
    #[arg(long, value_enum)]
    pub sort: Option<SortOrder>,
}

#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Tag the release is attached to
    pub tag: String,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Tag to release; created from --ref when it does not exist
    pub tag: String,

    /// Release title
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Release notes (Markdown)
    #[arg(long, conflicts_with = "notes_file")]
    pub notes: Option<String>,

    /// Read release notes from a file
    #[arg(long, short = 'F')]
    pub notes_file: Option<PathBuf>,

    /// Branch or commit to create the tag from
    #[arg(long = "ref", short = 'r')]
    pub git_ref: Option<String>,

    /// Milestone titles to associate with the release
    #[arg(long = "milestone")]
    pub milestones: Vec<String>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Tag the release is attached to
    pub tag: String,

    /// New release title
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// New release notes
    #[arg(long, conflicts_with = "notes_file")]
    pub notes: Option<String>,

    /// Read new release notes from a file
    #[arg(long, short = 'F')]
    pub notes_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Tag the release is attached to
    pub tag: String,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub confirm: bool,
}

impl ReleaseCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let project = global.require_project()?;
        let ctx = CommandContext::resolve(global)?;
        let result = self.dispatch(&ctx, &project, global).await;
        ctx.finish(result)
    }

    async fn dispatch(
        &self,
        ctx: &CommandContext,
        project: &ProjectRef,
        global: &GlobalOptions,
    ) -> Result<()> {
        match &self.command {
            ReleaseSubcommand::List(args) => list(ctx, project, args).await,
            ReleaseSubcommand::View(args) => view(ctx, project, args).await,
            ReleaseSubcommand::Create(args) => create(ctx, project, args, global).await,
            ReleaseSubcommand::Edit(args) => edit(ctx, project, args).await,
            ReleaseSubcommand::Delete(args) => delete(ctx, project, args, global).await,
        }
    }
}

async fn list(ctx: &CommandContext, project: &ProjectRef, args: &ListArgs) -> Result<()> {
    let options = ReleaseListOptions {
        order_by: args.order_by,
        sort: args.sort,
    };
    let releases = ctx.client.list_releases(project, &options).await?;
    ctx.output.write_list(&releases)
}

async fn view(ctx: &CommandContext, project: &ProjectRef, args: &ViewArgs) -> Result<()> {
    match ctx.client.get_optional_release(project, &args.tag).await? {
        Some(release) => ctx.output.write(&release),
        None => anyhow::bail!("No release for tag '{}' in {}", args.tag, project),
    }
}

async fn create(
    ctx: &CommandContext,
    project: &ProjectRef,
    args: &CreateArgs,
    global: &GlobalOptions,
) -> Result<()> {
    let mut description = read_notes(args.notes.as_deref(), args.notes_file.as_ref())?;
    if description.is_none() && global.can_prompt() {
        description = prompt_editor(None)?;
    }

    let params = CreateRelease {
        tag_name: args.tag.clone(),
        name: args.name.clone(),
        description,
        git_ref: args.git_ref.clone(),
        milestones: args.milestones.clone(),
        ..CreateRelease::default()
    };
    let release = ctx.client.create_release(project, &params).await?;

    if ctx.output.is_json() {
        return ctx.output.write(&release);
    }
    ctx.output.write_success(&format!("Created release {}", release.tag_name));
    Ok(())
}

async fn edit(ctx: &CommandContext, project: &ProjectRef, args: &EditArgs) -> Result<()> {
    let params = UpdateRelease {
        name: args.name.clone(),
        description: read_notes(args.notes.as_deref(), args.notes_file.as_ref())?,
        ..UpdateRelease::default()
    };
    let release = ctx.client.update_release(project, &args.tag, &params).await?;

    if ctx.output.is_json() {
        return ctx.output.write(&release);
    }
    ctx.output.write_success(&format!("Updated release {}", release.tag_name));
    Ok(())
}

async fn delete(
    ctx: &CommandContext,
    project: &ProjectRef,
    args: &DeleteArgs,
    global: &GlobalOptions,
) -> Result<()> {
    if !global.confirm(&format!("Delete the release for '{}'?", args.tag), args.confirm)? {
        ctx.output.write_info("Cancelled");
        return Ok(());
    }

    let release = ctx.client.delete_release(project, &args.tag).await?;
    ctx.output.write_success(&format!("Deleted release {}", release.tag_name));
    Ok(())
}

/// Notes from `--notes`, or the contents of `--notes-file`.
fn read_notes(notes: Option<&str>, notes_file: Option<&PathBuf>) -> Result<Option<String>> {
    if let Some(notes) = notes {
        return Ok(Some(notes.to_string()));
    }
    match notes_file {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read notes from {}", path.display()))?;
            Ok(Some(text))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_notes_prefers_inline_text() {
        let notes = read_notes(Some("Inline"), None).unwrap();
        assert_eq!(notes.as_deref(), Some("Inline"));
        assert!(read_notes(None, None).unwrap().is_none());
    }

    #[test]
    fn test_read_notes_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "## Changes\n\n- Fixed things").unwrap();

        let notes = read_notes(None, Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(notes.as_deref(), Some("## Changes\n\n- Fixed things"));
    }

    #[test]
    fn test_read_notes_missing_file() {
        let path = PathBuf::from("/nonexistent/notes.md");
        assert!(read_notes(None, Some(&path)).is_err());
    }
}
