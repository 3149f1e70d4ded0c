//
//  gitlab-client
//  cli/user.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! User commands
//!
//! Creating, blocking and deleting users requires an administrator token.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use crate::api::{CreateUser, User, UserListOptions};
use crate::interactive::prompt_password;

use super::{CommandContext, GlobalOptions};

/// Manage users
#[derive(Args, Debug)]
pub struct UserCommand {
    #[command(subcommand)]
    pub command: UserSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum UserSubcommand {
    /// Show the authenticated user
    Me,

    /// View a user by username or ID
    View(ViewArgs),

    /// List users
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Create a user (admin)
    Create(CreateArgs),

    /// Block a user (admin)
    Block(UserIdArgs),

    /// Unblock a user (admin)
    Unblock(UserIdArgs),

    /// Delete a user (admin)
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Username or numeric user ID
    pub user: String,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Filter by name, username or email
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Only active users
    #[arg(long, conflicts_with = "blocked")]
    pub active: bool,

    /// Only blocked users
    #[arg(long)]
    pub blocked: bool,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Username
    pub username: String,

    /// Email address
    #[arg(long, short = 'e')]
    pub email: String,

    /// Display name; defaults to the username
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Prompt for an initial password instead of emailing a reset link
    #[arg(long)]
    pub password: bool,

    /// Skip email confirmation
    #[arg(long)]
    pub skip_confirmation: bool,

    /// Make the user an administrator
    #[arg(long)]
    pub admin: bool,
}

#[derive(Args, Debug)]
pub struct UserIdArgs {
    /// Numeric user ID
    pub id: u64,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Numeric user ID
    pub id: u64,

    /// Also delete contributions and personal projects
    #[arg(long)]
    pub hard: bool,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub confirm: bool,
}

impl UserCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let ctx = CommandContext::resolve(global)?;
        let result = self.dispatch(&ctx, global).await;
        ctx.finish(result)
    }

    async fn dispatch(&self, ctx: &CommandContext, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            UserSubcommand::Me => {
                let user = ctx.client.current_user().await?;
                ctx.output.write(&user)
            }
            UserSubcommand::View(args) => view(ctx, args).await,
            UserSubcommand::List(args) => list(ctx, args).await,
            UserSubcommand::Create(args) => create(ctx, args, global).await,
            UserSubcommand::Block(args) => {
                ctx.client.block_user(args.id).await?;
                ctx.output.write_success(&format!("Blocked user {}", args.id));
                Ok(())
            }
            UserSubcommand::Unblock(args) => {
                ctx.client.unblock_user(args.id).await?;
                ctx.output.write_success(&format!("Unblocked user {}", args.id));
                Ok(())
            }
            UserSubcommand::Delete(args) => delete(ctx, args, global).await,
        }
    }
}

async fn find(ctx: &CommandContext, user: &str) -> Result<Option<User>> {
    let user = user.trim().trim_start_matches('@');
    let found = match user.parse::<u64>() {
        Ok(id) => ctx.client.get_optional_user(id).await?,
        Err(_) => ctx.client.find_user(user).await?,
    };
    Ok(found)
}

async fn view(ctx: &CommandContext, args: &ViewArgs) -> Result<()> {
    match find(ctx, &args.user).await? {
        Some(user) => ctx.output.write(&user),
        None => bail!("User '{}' not found", args.user),
    }
}

async fn list(ctx: &CommandContext, args: &ListArgs) -> Result<()> {
    let options = UserListOptions {
        search: args.search.clone(),
        active: args.active,
        blocked: args.blocked,
    };
    let users = ctx.client.list_users(&options).await?;
    ctx.output.write_list(&users)
}

async fn create(ctx: &CommandContext, args: &CreateArgs, global: &GlobalOptions) -> Result<()> {
    let password = if args.password {
        if !global.can_prompt() {
            bail!("--password needs an interactive terminal");
        }
        Some(prompt_password("Initial password")?)
    } else {
        None
    };

    let params = CreateUser {
        email: args.email.clone(),
        username: args.username.clone(),
        name: args.name.clone().unwrap_or_else(|| args.username.clone()),
        reset_password: password.is_none(),
        password,
        skip_confirmation: args.skip_confirmation,
        admin: args.admin.then_some(true),
    };
    let user = ctx.client.create_user(&params).await?;

    if ctx.output.is_json() {
        return ctx.output.write(&user);
    }
    ctx.output
        .write_success(&format!("Created user {} (ID {})", user.username, user.id));
    Ok(())
}

async fn delete(ctx: &CommandContext, args: &DeleteArgs, global: &GlobalOptions) -> Result<()> {
    let message = if args.hard {
        format!("Delete user {} and all of their contributions?", args.id)
    } else {
        format!("Delete user {}?", args.id)
    };
    if !global.confirm(&message, args.confirm)? {
        ctx.output.write_info("Cancelled");
        return Ok(());
    }

    ctx.client.delete_user(args.id, args.hard).await?;
    ctx.output.write_success(&format!("Deleted user {}", args.id));
    Ok(())
}
