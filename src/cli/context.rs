//
//  gitlab-client
//  cli/context.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Per-command client setup.
//!
//! Resolves the host, loads the credential and builds a [`GitLabClient`] for
//! a command. When the command finishes, an OAuth2 token that was refreshed
//! during the run is written back to the keyring.
//!
//! Credential lookup order:
//!
//! 1. `--token` / `GLC_TOKEN` (personal access token, never persisted)
//! 2. The keyring entry for the host

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use crate::api::{ClientBuilder, GitLabClient, Pager};
use crate::auth::{Credential, KeyringStore, OAuthApp, SecretValue, StoredCredential};
use crate::config::{base_url_for, Config, HostConfig};
use crate::output::OutputWriter;

use super::GlobalOptions;

/// Everything a resource command needs to talk to one host.
pub struct CommandContext {
    pub config: Config,
    pub host: String,
    pub client: GitLabClient,
    pub output: OutputWriter,
    initial_generation: u64,
    from_keyring: bool,
}

impl CommandContext {
    /// Loads config and credentials for the command's host.
    pub fn resolve(global: &GlobalOptions) -> Result<Self> {
        let config = Config::load()?;
        let host = config.resolve_host(global.host.as_deref());

        let (credential, from_keyring) = match global.token.as_deref() {
            Some(token) if !token.trim().is_empty() => (
                Credential::PersonalAccessToken(SecretValue::new(token.trim())),
                false,
            ),
            _ => {
                let stored = KeyringStore::new().get(&host)?.ok_or_else(|| {
                    anyhow::anyhow!(
                        "Not logged in to {}. Run 'glc auth login --host {}' or set GLC_TOKEN.",
                        host,
                        host
                    )
                })?;
                (stored.into_credential(), true)
            }
        };

        let client = build_client(&config, &host, credential)?;
        tracing::debug!(host = %host, kind = client.session().credential().kind(), "Resolved credential");

        Ok(Self {
            initial_generation: client.session().generation(),
            config,
            host,
            client,
            output: OutputWriter::from_json_flag(global.json),
            from_keyring,
        })
    }

    /// Writes a token refreshed during the command back to the keyring,
    /// then returns the command's own result.
    ///
    /// The token is saved even when the command failed, since the old
    /// refresh token may already be revoked.
    pub fn finish(&self, result: Result<()>) -> Result<()> {
        if let Err(e) = persist_if_refreshed(
            &self.host,
            &self.client,
            self.initial_generation,
            self.from_keyring,
        ) {
            self.output.write_warning(&format!("{:#}", e));
        }
        result
    }
}

/// Builds a client for `host` from its config entry.
pub fn build_client(config: &Config, host: &str, credential: Credential) -> Result<GitLabClient> {
    let host_config = config
        .host_config(host)
        .cloned()
        .unwrap_or_else(|| HostConfig::new(host));

    client_builder(config, &host_config)
        .credential(credential)
        .build()
        .with_context(|| format!("Failed to create client for {}", host))
}

/// A builder carrying the transport settings for a host, without a
/// credential.
pub fn client_builder(config: &Config, host_config: &HostConfig) -> ClientBuilder {
    let mut builder = GitLabClient::builder(base_url_for(&host_config.host))
        .per_page(config.core.per_page)
        .ignore_cert_errors(host_config.ignore_cert_errors);
    if let Some(timeout) = config.core.timeout() {
        builder = builder.timeout(timeout);
    }
    if let Some(client_id) = &host_config.client_id {
        builder = builder.oauth_app(OAuthApp::with_client_id(client_id.clone()));
    }
    builder
}

/// Stores the client's credential if its generation moved past
/// `initial_generation`.
pub fn persist_if_refreshed(
    host: &str,
    client: &GitLabClient,
    initial_generation: u64,
    from_keyring: bool,
) -> Result<()> {
    if !from_keyring || client.session().generation() == initial_generation {
        return Ok(());
    }

    if let Some(stored) = StoredCredential::from_credential(&client.session().credential()) {
        KeyringStore::new()
            .store(host, &stored)
            .context("Failed to save refreshed token")?;
        tracing::info!(host, "Saved refreshed OAuth2 token");
    }
    Ok(())
}

/// Reads pages until `limit` items are collected, or every page when
/// `limit` is `None`.
pub async fn collect_limited<T: DeserializeOwned>(
    mut pager: Pager<T>,
    limit: Option<usize>,
) -> Result<Vec<T>> {
    let mut items = Vec::new();
    while let Some(page) = pager.next().await? {
        items.extend(page.items);
        if let Some(limit) = limit {
            if items.len() >= limit {
                items.truncate(limit);
                break;
            }
        }
    }
    Ok(items)
}
