//
//  gitlab-client
//  cli/auth.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Authentication commands.
//!
//! `glc auth login` stores either a personal access token or an OAuth2 token
//! obtained with username and password. OAuth2 tokens are refreshed
//! automatically by every command; `glc auth refresh` forces one.

use std::io::BufRead;

use anyhow::{bail, Context, Result};
use chrono::{TimeZone, Utc};
use clap::{Args, Subcommand};
use zeroize::Zeroize;

use crate::auth::{
    mask_secret, now_epoch_seconds, Credential, KeyringStore, SecretValue, StoredCredential,
};
use crate::config::{AuthMethod, Config, HostConfig};
use crate::interactive::{prompt_input, prompt_input_with_default, prompt_password, select_with_default};

use super::{build_client, client_builder, persist_if_refreshed, GlobalOptions};

#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthSubcommand {
    /// Log in to a GitLab host
    Login(LoginArgs),

    /// Log out of a GitLab host
    Logout(LogoutArgs),

    /// Show authentication status for configured hosts
    Status(StatusArgs),

    /// Refresh the stored OAuth2 token
    Refresh,

    /// Print the stored token for a host
    Token,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Read a personal access token from standard input
    #[arg(long, conflicts_with = "username")]
    pub with_token: bool,

    /// Log in with username and password (OAuth2 password grant)
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    /// Read the password from standard input
    #[arg(long, requires = "username")]
    pub password_stdin: bool,

    /// OAuth application ID sent with the password grant and refreshes
    #[arg(long)]
    pub client_id: Option<String>,

    /// OAuth2 scopes to request, space separated (default: all scopes of the application)
    #[arg(long)]
    pub scope: Option<String>,

    /// Accept invalid TLS certificates from this host
    #[arg(long)]
    pub ignore_cert_errors: bool,
}

#[derive(Args, Debug)]
pub struct LogoutArgs {
    /// Log out of every configured host
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Show a masked version of the token
    #[arg(long, short = 't')]
    pub show_token: bool,
}

impl AuthCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            AuthSubcommand::Login(args) => login(args, global).await,
            AuthSubcommand::Logout(args) => logout(args, global),
            AuthSubcommand::Status(args) => status(args, global).await,
            AuthSubcommand::Refresh => refresh(global).await,
            AuthSubcommand::Token => token(global),
        }
    }
}

async fn login(args: &LoginArgs, global: &GlobalOptions) -> Result<()> {
    let mut config = Config::load()?;

    let host = match &global.host {
        Some(host) => config.resolve_host(Some(host)),
        None if global.can_prompt() => {
            let default = config.resolve_host(None);
            config.resolve_host(Some(&prompt_input_with_default("GitLab host", &default)?))
        }
        None => config.resolve_host(None),
    };

    let mut host_config = config
        .host_config(&host)
        .cloned()
        .unwrap_or_else(|| HostConfig::new(&host));
    if args.ignore_cert_errors {
        host_config.ignore_cert_errors = true;
    }
    if let Some(client_id) = &args.client_id {
        host_config.client_id = Some(client_id.clone());
    }

    let method = if args.with_token {
        AuthMethod::Token
    } else if args.username.is_some() {
        AuthMethod::OAuth2
    } else if global.can_prompt() {
        let choices = ["Personal access token", "Username and password (OAuth2)"];
        match select_with_default("How would you like to log in?", &choices, 0)? {
            0 => AuthMethod::Token,
            _ => AuthMethod::OAuth2,
        }
    } else {
        bail!("No login method given. Use --with-token or --username.");
    };

    let client = match method {
        AuthMethod::Token => {
            let token = if args.with_token {
                read_secret_from_stdin().context("Failed to read token from stdin")?
            } else {
                println!();
                println!("Create a token at {}/-/user_settings/personal_access_tokens", host_config.base_url());
                println!("with the 'api' scope, then paste it below.");
                println!();
                prompt_password("Personal access token")?
            };
            if token.is_empty() {
                bail!("Token must not be empty");
            }
            client_builder(&config, &host_config)
                .credential(Credential::PersonalAccessToken(token))
                .build()?
        }
        AuthMethod::OAuth2 => {
            let username = match &args.username {
                Some(username) => username.clone(),
                None => prompt_input("Username")?,
            };
            let password = if args.password_stdin {
                read_secret_from_stdin().context("Failed to read password from stdin")?
            } else {
                prompt_password("Password")?
            };
            client_builder(&config, &host_config)
                .login_with_password(&username, &password, args.scope.as_deref())
                .await
                .with_context(|| format!("Login to {} failed", host))?
        }
    };

    let user = client
        .current_user()
        .await
        .with_context(|| format!("Could not verify credentials with {}", host))?;

    let stored = StoredCredential::from_credential(&client.session().credential())
        .ok_or_else(|| anyhow::anyhow!("Credential cannot be stored"))?;
    KeyringStore::new().store(&host, &stored)?;

    host_config.user = Some(user.username.clone());
    host_config.auth_method = method;
    config.upsert_host(host_config);
    config.save()?;

    println!("✓ Logged in to {} as {}", host, user.username);
    Ok(())
}

fn logout(args: &LogoutArgs, global: &GlobalOptions) -> Result<()> {
    let keyring = KeyringStore::new();
    let mut config = Config::load()?;

    let hosts: Vec<String> = if args.all {
        config.hosts.keys().cloned().collect()
    } else {
        vec![config.resolve_host(global.host.as_deref())]
    };

    if hosts.is_empty() {
        println!("Not logged in to any hosts");
        return Ok(());
    }

    for host in &hosts {
        keyring.delete(host)?;
        config.remove_host(host);
        println!("✓ Logged out of {}", host);
    }
    config.save()?;
    Ok(())
}

async fn status(args: &StatusArgs, global: &GlobalOptions) -> Result<()> {
    let keyring = KeyringStore::new();
    let config = Config::load()?;

    let hosts: Vec<String> = match &global.host {
        Some(host) => vec![config.resolve_host(Some(host))],
        None => config.hosts.keys().cloned().collect(),
    };

    if hosts.is_empty() {
        println!("Not logged in to any GitLab hosts");
        println!();
        println!("Run 'glc auth login' to authenticate");
        return Ok(());
    }

    for host in hosts {
        println!("{}", host);

        let Some(stored) = keyring.get(&host)? else {
            println!("  Status: Not logged in");
            println!();
            continue;
        };

        println!("  Method: {}", stored.kind());
        let client = build_client(&config, &host, stored.into_credential())?;
        let generation = client.session().generation();

        match client.current_user().await {
            Ok(user) => {
                println!("  Logged in as: {}", user.username);
                println!("  Status: Active");
            }
            Err(e) => println!("  Status: Invalid ({})", e),
        }

        if let Some(token) = client.oauth2_token() {
            match token.expires_at() {
                Some(at) if token.is_expired_now() => {
                    println!("  Expires: {} (expired)", format_epoch(at))
                }
                Some(at) => println!("  Expires: {}", format_epoch(at)),
                None => println!("  Expires: never"),
            }
        }
        if args.show_token {
            if let Some(token) = client.auth_token() {
                println!("  Token: {}", mask_secret(&token));
            }
        }
        println!();

        persist_if_refreshed(&host, &client, generation, true)?;
    }

    Ok(())
}

async fn refresh(global: &GlobalOptions) -> Result<()> {
    let config = Config::load()?;
    let host = config.resolve_host(global.host.as_deref());

    let stored = KeyringStore::new()
        .get(&host)?
        .ok_or_else(|| anyhow::anyhow!("Not logged in to {}. Run 'glc auth login' first.", host))?;
    if !matches!(stored, StoredCredential::OAuth2 { .. }) {
        bail!("{} uses a {}, which cannot be refreshed", host, stored.kind());
    }

    let client = build_client(&config, &host, stored.into_credential())?;
    let generation = client.session().generation();

    println!("Refreshing token...");
    let token = client
        .refresh_access_token()
        .await
        .context("Refresh failed. Run 'glc auth login' again.")?;
    persist_if_refreshed(&host, &client, generation, true)?;

    println!("✓ Token refreshed for {}", host);
    if let Some(at) = token.expires_at() {
        let remaining = (at - now_epoch_seconds()).max(0);
        println!(
            "  New token expires in {} hours {} minutes",
            remaining / 3600,
            (remaining % 3600) / 60
        );
    }
    Ok(())
}

fn token(global: &GlobalOptions) -> Result<()> {
    let config = Config::load()?;
    let host = config.resolve_host(global.host.as_deref());

    let stored = KeyringStore::new()
        .get(&host)?
        .ok_or_else(|| anyhow::anyhow!("No token found for {}", host))?;

    let secret = match &stored {
        StoredCredential::PersonalAccessToken { token } => token,
        StoredCredential::OAuth2 { token } => &token.access_token,
    };

    // Printed bare for piping into other tools.
    println!("{}", secret.reveal());
    Ok(())
}

/// Reads one line from stdin as a secret.
fn read_secret_from_stdin() -> Result<SecretValue> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let secret = SecretValue::new(line.trim());
    line.zeroize();
    Ok(secret)
}

fn format_epoch(seconds: i64) -> String {
    match Utc.timestamp_opt(seconds, 0).single() {
        Some(at) => at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => seconds.to_string(),
    }
}
