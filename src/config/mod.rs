//
//  gitlab-client
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration Module
//!
//! Loads and saves the `glc` configuration, a TOML file stored in the
//! platform-specific configuration directory.
//!
//! ## Configuration File Location
//!
//! - **Linux**: `~/.config/glc/config.toml`
//! - **macOS**: `~/Library/Application Support/glc/config.toml`
//! - **Windows**: `C:\Users\<User>\AppData\Roaming\glc\config.toml`
//!
//! ## Example Configuration File
//!
//! ```toml
//! [core]
//! default_host = "gitlab.example.com"
//! per_page = 50
//! timeout_secs = 30
//!
//! [hosts."gitlab.example.com"]
//! host = "gitlab.example.com"
//! user = "root"
//! auth_method = "oauth2"
//! ignore_cert_errors = true
//! ```
//!
//! Tokens are never written here; they live in the system keyring (see
//! [`KeyringStore`](crate::auth::KeyringStore)).
//!
//! ## Usage
//!
//! ```rust,no_run
//! use gitlab_client::config::Config;
//!
//! let mut config = Config::load()?;
//! config.set("per_page", "50")?;
//! config.save()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

mod file;
mod hosts;

pub use file::*;
pub use hosts::*;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::api::common::{DEFAULT_PER_PAGE, MAX_PER_PAGE};

/// Keys accepted by [`Config::get`] and [`Config::set`].
pub const CONFIG_KEYS: &[&str] = &["default_host", "per_page", "timeout_secs"];

/// Global configuration for `glc`.
///
/// All fields use `#[serde(default)]` so a partial file loads cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub core: CoreConfig,

    /// Per-host settings keyed by normalized host name.
    #[serde(default)]
    pub hosts: BTreeMap<String, HostConfig>,
}

/// Settings that apply to every command.
///
/// | Field | Default |
/// |-------|---------|
/// | `default_host` | `None` (falls back to `gitlab.com`) |
/// | `per_page` | `20` |
/// | `timeout_secs` | `None` (no client timeout) |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Host used when `--host` and `GLC_HOST` are absent.
    #[serde(default)]
    pub default_host: Option<String>,

    /// Page size for list commands, clamped to 1..=100.
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Request timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            default_host: None,
            per_page: default_per_page(),
            timeout_secs: None,
        }
    }
}

impl CoreConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// How `glc` authenticates against a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// Personal, project or group access token.
    #[default]
    Token,
    /// OAuth2 token obtained with username and password.
    #[serde(rename = "oauth2")]
    #[value(name = "oauth2")]
    OAuth2,
}

impl std::fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Token => f.write_str("token"),
            Self::OAuth2 => f.write_str("oauth2"),
        }
    }
}

/// Settings for one GitLab instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HostConfig {
    /// Normalized host name, optionally with a scheme for plain-HTTP
    /// servers (`http://localhost:8080`).
    #[serde(default)]
    pub host: String,

    /// The username the stored credential belongs to.
    #[serde(default)]
    pub user: Option<String>,

    #[serde(default)]
    pub auth_method: AuthMethod,

    /// OAuth application id sent with password and refresh grants.
    #[serde(default)]
    pub client_id: Option<String>,

    /// Accept invalid TLS certificates (self-signed test instances).
    #[serde(default)]
    pub ignore_cert_errors: bool,
}

impl HostConfig {
    pub fn new(host: &str) -> Self {
        Self {
            host: normalize_host(host),
            ..Self::default()
        }
    }

    /// The server root URL for this host.
    pub fn base_url(&self) -> String {
        base_url_for(&self.host)
    }
}

impl Config {
    /// Loads configuration from the default location; a missing file yields
    /// the defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Loads configuration from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !config_exists(path) {
            return Ok(Self::default());
        }
        let content = read_config_file(path)?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Saves the configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Saves the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        write_config_file(path, &content)
    }

    /// Returns the path to the configuration file. The file may not exist.
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", crate::APP_NAME)
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Returns the settings for `host`, normalizing the key first.
    pub fn host_config(&self, host: &str) -> Option<&HostConfig> {
        self.hosts.get(&normalize_host(host))
    }

    /// Inserts or replaces the settings for a host.
    pub fn upsert_host(&mut self, host_config: HostConfig) {
        self.hosts
            .insert(normalize_host(&host_config.host), host_config);
    }

    /// Removes a host, returning its settings.
    pub fn remove_host(&mut self, host: &str) -> Option<HostConfig> {
        self.hosts.remove(&normalize_host(host))
    }

    /// Resolves the host to use: the explicit value, then `core.default_host`,
    /// then [`DEFAULT_HOST`].
    pub fn resolve_host(&self, explicit: Option<&str>) -> String {
        explicit
            .map(normalize_host)
            .or_else(|| self.core.default_host.as_deref().map(normalize_host))
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
    }

    /// Gets a core setting by key.
    ///
    /// ```rust
    /// use gitlab_client::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.get("per_page"), Some("20".to_string()));
    /// assert_eq!(config.get("default_host"), None);
    /// assert_eq!(config.get("unknown_key"), None);
    /// ```
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "default_host" => self.core.default_host.clone(),
            "per_page" => Some(self.core.per_page.to_string()),
            "timeout_secs" => self.core.timeout_secs.map(|t| t.to_string()),
            _ => None,
        }
    }

    /// Sets a core setting by key, validating the value.
    ///
    /// Changes are only persisted by [`Config::save`].
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "default_host" => {
                let host = normalize_host(value);
                if host.is_empty() {
                    bail!("default_host must not be empty");
                }
                self.core.default_host = Some(host);
            }
            "per_page" => {
                let per_page: u32 = value
                    .parse()
                    .with_context(|| format!("per_page must be a number, got '{}'", value))?;
                if !(1..=MAX_PER_PAGE).contains(&per_page) {
                    bail!("per_page must be between 1 and {}", MAX_PER_PAGE);
                }
                self.core.per_page = per_page;
            }
            "timeout_secs" => {
                let secs: u64 = value
                    .parse()
                    .with_context(|| format!("timeout_secs must be a number, got '{}'", value))?;
                self.core.timeout_secs = (secs > 0).then_some(secs);
            }
            other => bail!(
                "Unknown config key '{}'. Valid keys: {}",
                other,
                CONFIG_KEYS.join(", ")
            ),
        }
        Ok(())
    }

    /// Every core setting as `(key, value)`, unset values omitted.
    pub fn list(&self) -> Vec<(&'static str, String)> {
        CONFIG_KEYS
            .iter()
            .filter_map(|key| self.get(key).map(|value| (*key, value)))
            .collect()
    }
}
