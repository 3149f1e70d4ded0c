//
//  gitlab-client
//  cli/config.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI configuration commands
//!
//! Reads and writes the core settings in `config.toml`. Per-host entries are
//! managed by `glc auth login` and `glc auth logout`.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use console::style;

use crate::config::{Config, CONFIG_KEYS};

use super::GlobalOptions;

#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Print the value of a setting
    Get(GetArgs),

    /// Change a setting
    Set(SetArgs),

    /// List settings and configured hosts
    #[command(visible_alias = "ls")]
    List,

    /// Print the path of the configuration file
    Path,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// One of: default_host, per_page, timeout_secs
    pub key: String,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// One of: default_host, per_page, timeout_secs
    pub key: String,

    /// New value
    pub value: String,
}

impl ConfigCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            ConfigSubcommand::Get(args) => get(args, global),
            ConfigSubcommand::Set(args) => set(args, global),
            ConfigSubcommand::List => list(global),
            ConfigSubcommand::Path => path(global),
        }
    }
}

fn get(args: &GetArgs, global: &GlobalOptions) -> Result<()> {
    if !CONFIG_KEYS.contains(&args.key.as_str()) {
        bail!(
            "Unknown config key '{}'. Valid keys: {}",
            args.key,
            CONFIG_KEYS.join(", ")
        );
    }

    let config = Config::load()?;
    let value = config.get(&args.key);

    if global.json {
        let result = serde_json::json!({
            "key": args.key,
            "value": value,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if let Some(v) = value {
        println!("{}", v);
    }
    Ok(())
}

fn set(args: &SetArgs, global: &GlobalOptions) -> Result<()> {
    let mut config = Config::load()?;
    config.set(&args.key, &args.value)?;
    config.save()?;

    let value = config.get(&args.key);
    if global.json {
        let result = serde_json::json!({
            "success": true,
            "key": args.key,
            "value": value,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "{} Set {} = {}",
            style("✓").green(),
            style(&args.key).cyan(),
            value.unwrap_or_default()
        );
    }
    Ok(())
}

fn list(global: &GlobalOptions) -> Result<()> {
    let config = Config::load()?;

    if global.json {
        let core: serde_json::Map<String, serde_json::Value> = config
            .list()
            .into_iter()
            .map(|(key, value)| (key.to_string(), serde_json::Value::String(value)))
            .collect();
        let result = serde_json::json!({
            "core": core,
            "hosts": config.hosts,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("{}", style("Core Configuration").bold());
    println!("{}", "-".repeat(50));
    for (key, value) in config.list() {
        println!("  {:<16} {}", style(key).cyan(), value);
    }

    if !config.hosts.is_empty() {
        println!();
        println!("{}", style("Hosts").bold());
        println!("{}", "-".repeat(50));
        for (host, host_config) in &config.hosts {
            println!("  {}", style(host).cyan());
            println!("    {:<18} {}", "auth_method", host_config.auth_method);
            if let Some(user) = &host_config.user {
                println!("    {:<18} {}", "user", user);
            }
            if let Some(client_id) = &host_config.client_id {
                println!("    {:<18} {}", "client_id", client_id);
            }
            if host_config.ignore_cert_errors {
                println!("    {:<18} true", "ignore_cert_errors");
            }
        }
    }
    Ok(())
}

fn path(global: &GlobalOptions) -> Result<()> {
    let path = Config::config_path()?;
    if global.json {
        let result = serde_json::json!({ "path": path });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", path.display());
    }
    Ok(())
}
