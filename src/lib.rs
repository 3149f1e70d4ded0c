//
//  gitlab-client
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # GitLab Client Library
//!
//! A typed client for the GitLab REST API v4 and the library behind the `glc`
//! command-line tool.
//!
//! ## Overview
//!
//! A [`GitLabClient`](api::GitLabClient) holds one authenticated
//! [`Session`](auth::Session). Every request carries the session's current
//! credential:
//!
//! - **Personal access token**: sent as `PRIVATE-TOKEN`
//! - **OAuth2 token**: sent as `Authorization: Bearer`, refreshed with the
//!   refresh token when the server answers 401, then the request is retried
//!   exactly once
//! - **Username and password**: exchanged for an OAuth2 token at login
//!
//! ## Module Structure
//!
//! - [`api`]: The client, transport, errors, pagination and resource endpoints
//!   (tags, protected tags, releases, projects, users, version)
//! - [`auth`]: Credentials, OAuth2 tokens, the refresher and keyring storage
//! - [`config`]: Configuration file management
//! - [`output`]: Table and JSON output for the CLI
//! - [`interactive`]: Prompts and selectors
//! - [`cli`]: Command definitions for `glc`
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use gitlab_client::api::{CreateRelease, GitLabClient};
//! use gitlab_client::auth::SecretValue;
//!
//! # async fn run() -> Result<(), gitlab_client::api::ApiError> {
//! let client = GitLabClient::oauth2_login(
//!     "https://gitlab.example.com",
//!     "jdoe",
//!     &SecretValue::new("hunter2"),
//! )
//! .await?;
//!
//! let tag = client.create_tag("group/app", "v1.2.0", "main", None).await?;
//! client
//!     .create_release("group/app", &CreateRelease::new(&tag.name).name("1.2.0"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions.
pub mod cli;

/// GitLab REST API v4 client.
///
/// The client handles credential injection, the refresh-and-retry policy
/// for OAuth2 sessions, pagination and error decoding.
pub mod api;

/// Credentials, OAuth2 token lifecycle and credential storage.
pub mod auth;

/// Configuration file management.
///
/// The configuration lives in platform-specific locations:
/// - Linux: `~/.config/glc/config.toml`
/// - macOS: `~/Library/Application Support/glc/config.toml`
/// - Windows: `%APPDATA%\glc\config\config.toml`
pub mod config;

/// Output formatting (table and JSON).
pub mod output;

/// Interactive terminal UI components.
pub mod interactive;

/// Re-export of the main CLI struct.
///
/// ```rust,no_run
/// use clap::Parser;
/// use gitlab_client::Cli;
///
/// let cli = Cli::parse();
/// ```
pub use cli::Cli;

/// Re-export of the configuration struct.
pub use config::Config;

/// Name of the CLI binary, used for the config directory and User-Agent.
pub const APP_NAME: &str = "glc";

/// Crate version from Cargo.toml.
///
/// ```rust
/// use gitlab_client::VERSION;
///
/// println!("glc version {}", VERSION);
/// ```
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit codes for the CLI.
///
/// - `0`: Success
/// - `1-3`: General errors and usage issues
/// - `4-7`: Authentication-related issues
/// - `8-15`: Resource-related issues
/// - `32+`: External service issues
pub mod exit_codes {
    /// The command completed without errors.
    pub const SUCCESS: i32 = 0;

    /// An unspecified error occurred; details are on stderr.
    pub const ERROR: i32 = 1;

    /// Invalid arguments or options.
    pub const USAGE: i32 = 2;

    /// Not logged in, or the credential was rejected and could not be
    /// refreshed. Run `glc auth login`.
    pub const AUTH_ERROR: i32 = 4;

    /// The resource does not exist or is not visible to the user.
    pub const NOT_FOUND: i32 = 8;

    /// GitLab rejected the request because of rate limiting (HTTP 429).
    pub const RATE_LIMIT: i32 = 32;
}
