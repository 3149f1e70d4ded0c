//
//  gitlab-client
//  cli/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI command definitions using clap derive macros

mod api;
mod auth;
mod completion;
mod config;
mod context;
mod project;
mod release;
mod tag;
mod user;

pub use api::ApiCommand;
pub use auth::AuthCommand;
pub use completion::CompletionCommand;
pub use config::ConfigCommand;
pub use context::{build_client, client_builder, collect_limited, persist_if_refreshed, CommandContext};
pub use project::ProjectCommand;
pub use release::ReleaseCommand;
pub use tag::TagCommand;
pub use user::UserCommand;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::api::ProjectRef;
use crate::interactive::{is_interactive, prompt_confirm};

/// glc - Work with GitLab from the command line
#[derive(Parser, Debug)]
#[command(
    name = "glc",
    version,
    about = "Work with GitLab from the command line",
    long_about = "glc is a CLI for GitLab.com and self-managed GitLab instances.\n\n\
                  It manages tags, releases, protected tags, projects and users through the REST API.",
    propagate_version = true,
    after_help = "Use 'glc <command> --help' for more information about a command."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// GitLab host, e.g. gitlab.example.com (defaults to core.default_host, then gitlab.com)
    #[arg(long, global = true, env = "GLC_HOST")]
    pub host: Option<String>,

    /// Personal access token to use instead of the stored credential
    #[arg(long, global = true, env = "GLC_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Project ID or path (group/project)
    #[arg(long, short = 'p', global = true, env = "GLC_PROJECT")]
    pub project: Option<String>,

    /// Output format as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable interactive prompts
    #[arg(
        long,
        global = true,
        env = "GLC_NO_PROMPT",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_prompt: bool,
}

impl GlobalOptions {
    /// The `--project` value, required by tag and release commands.
    pub fn require_project(&self) -> Result<ProjectRef> {
        match self.project.as_deref().map(str::trim) {
            Some(project) if !project.is_empty() => Ok(ProjectRef::from(project)),
            _ => anyhow::bail!("No project given. Pass --project <id|group/project> or set GLC_PROJECT."),
        }
    }

    /// Whether prompting the user is allowed.
    pub fn can_prompt(&self) -> bool {
        !self.no_prompt && is_interactive()
    }

    /// Asks for confirmation before a destructive action.
    ///
    /// `--confirm` skips the prompt; without a terminal the action is refused.
    pub fn confirm(&self, message: &str, confirmed: bool) -> Result<bool> {
        if confirmed {
            return Ok(true);
        }
        if !self.can_prompt() {
            anyhow::bail!("Refusing to continue without a prompt. Pass --confirm to proceed.");
        }
        prompt_confirm(message, false)
    }
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authenticate with GitLab
    #[command(visible_alias = "login")]
    Auth(AuthCommand),

    /// Manage repository tags and tag protection
    Tag(TagCommand),

    /// Manage releases
    Release(ReleaseCommand),

    /// Manage projects
    #[command(visible_alias = "proj")]
    Project(ProjectCommand),

    /// Manage users
    User(UserCommand),

    /// Make API requests
    Api(ApiCommand),

    /// Manage CLI configuration
    Config(ConfigCommand),

    /// Generate shell completion scripts
    Completion(CompletionCommand),

    /// Print version information
    Version,
}
