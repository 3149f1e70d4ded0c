//
//  gitlab-client
//  cli/tag.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Tag commands
//!
//! Covers repository tags and the protected tag rules that decide who may
//! create them. Every subcommand works on the project given by `--project`.

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::api::{AccessLevel, ProjectRef, SortOrder, TagListOptions, TagOrderBy};

use super::{collect_limited, CommandContext, GlobalOptions};

/// Manage repository tags
#[derive(Args, Debug)]
pub struct TagCommand {
    #[command(subcommand)]
    pub command: TagSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum TagSubcommand {
    /// List tags
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// View a tag
    View(ViewArgs),

    /// Create a tag
    Create(CreateArgs),

    /// Delete a tag
    Delete(DeleteArgs),

    /// List protected tags
    Protected,

    /// Protect a tag or wildcard such as `v*`
    Protect(ProtectArgs),

    /// Remove protection from a tag or wildcard
    Unprotect(UnprotectArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Order tags by name, update time or semantic version
    #[arg(long, value_enum)]
    pub order_by: Option<TagOrderBy>,

    /// Sort direction
    #[arg(long, value_enum)]
    pub sort: Option<SortOrder>,

    /// Filter by name; `^term` matches a prefix and `term$` a suffix
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Maximum number of tags to list
    #[arg(long, short = 'l', default_value = "30")]
    pub limit: usize,
}

#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Tag name
    pub name: String,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Tag name
    pub name: String,

    /// Branch name or commit SHA to tag
    #[arg(long = "ref", short = 'r')]
    pub git_ref: String,

    /// Message for an annotated tag
    #[arg(long, short = 'm')]
    pub message: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Tag name
    pub name: String,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub confirm: bool,
}

#[derive(Args, Debug)]
pub struct ProtectArgs {
    /// Tag name or wildcard
    pub name: String,

    /// Minimum role allowed to create matching tags
    #[arg(long, short = 'a', default_value = "maintainer")]
    pub access_level: AccessLevel,
}

#[derive(Args, Debug)]
pub struct UnprotectArgs {
    /// Tag name or wildcard
    pub name: String,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub confirm: bool,
}

impl TagCommand {
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
            TagSubcommand::List(args) => list(ctx, project, args).await,
            TagSubcommand::View(args) => view(ctx, project, args).await,
            TagSubcommand::Create(args) => create(ctx, project, args).await,
            TagSubcommand::Delete(args) => delete(ctx, project, args, global).await,
            TagSubcommand::Protected => protected(ctx, project).await,
            TagSubcommand::Protect(args) => protect(ctx, project, args).await,
            TagSubcommand::Unprotect(args) => unprotect(ctx, project, args, global).await,
        }
    }
}

async fn list(ctx: &CommandContext, project: &ProjectRef, args: &ListArgs) -> Result<()> {
    let options = TagListOptions {
        order_by: args.order_by,
        sort: args.sort,
        search: args.search.clone(),
    };
    let pager = ctx.client.tags_pager(project, &options);
    let tags = collect_limited(pager, Some(args.limit)).await?;
    ctx.output.write_list(&tags)
}

async fn view(ctx: &CommandContext, project: &ProjectRef, args: &ViewArgs) -> Result<()> {
    match ctx.client.get_optional_tag(project, &args.name).await? {
        Some(tag) => ctx.output.write(&tag),
        None => anyhow::bail!("Tag '{}' not found in {}", args.name, project),
    }
}

async fn create(ctx: &CommandContext, project: &ProjectRef, args: &CreateArgs) -> Result<()> {
    let tag = ctx
        .client
        .create_tag(project, &args.name, &args.git_ref, args.message.as_deref())
        .await?;

    if ctx.output.is_json() {
        return ctx.output.write(&tag);
    }
    ctx.output
        .write_success(&format!("Created tag {} at {}", tag.name, tag.commit.short_id));
    Ok(())
}

async fn delete(
    ctx: &CommandContext,
    project: &ProjectRef,
    args: &DeleteArgs,
    global: &GlobalOptions,
) -> Result<()> {
    if !global.confirm(&format!("Delete tag '{}' from {}?", args.name, project), args.confirm)? {
        ctx.output.write_info("Cancelled");
        return Ok(());
    }

    ctx.client.delete_tag(project, &args.name).await?;
    ctx.output.write_success(&format!("Deleted tag {}", args.name));
    Ok(())
}

async fn protected(ctx: &CommandContext, project: &ProjectRef) -> Result<()> {
    let tags = ctx.client.list_protected_tags(project).await?;
    ctx.output.write_list(&tags)
}

async fn protect(ctx: &CommandContext, project: &ProjectRef, args: &ProtectArgs) -> Result<()> {
    let tag = ctx
        .client
        .protect_tag(project, &args.name, args.access_level)
        .await?;

    if ctx.output.is_json() {
        return ctx.output.write(&tag);
    }
    ctx.output.write_success(&format!(
        "Protected {} (create: {} and above)",
        tag.name, args.access_level
    ));
    Ok(())
}

async fn unprotect(
    ctx: &CommandContext,
    project: &ProjectRef,
    args: &UnprotectArgs,
    global: &GlobalOptions,
) -> Result<()> {
    if !global.confirm(&format!("Remove protection from '{}'?", args.name), args.confirm)? {
        ctx.output.write_info("Cancelled");
        return Ok(());
    }

    ctx.client.unprotect_tag(project, &args.name).await?;
    ctx.output.write_success(&format!("Removed protection from {}", args.name));
    Ok(())
}
