//
//  gitlab-client
//  auth/keyring.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Secure Credential Storage Module
//!
//! Stores `glc` credentials in the system's native keyring/keychain.
//!
//! ## Platform Support
//!
//! - **macOS**: Keychain Services
//! - **Linux**: Secret Service API (GNOME Keyring, KWallet)
//! - **Windows**: Windows Credential Manager
//!
//! ## Storage Model
//!
//! - **Service**: `gitlab-client`
//! - **Username/Key**: The configured host name
//! - **Password/Value**: A [`StoredCredential`] serialized as JSON
//!
//! Username/password credentials are never stored; `glc auth login` with a
//! password exchanges it for an OAuth2 token first.
//!
//! ## Example
//!
//! ```rust,no_run
//! use gitlab_client::auth::{KeyringStore, SecretValue, StoredCredential};
//!
//! fn remember() -> anyhow::Result<()> {
//!     let store = KeyringStore::new();
//!     store.store("gitlab.com", &StoredCredential::PersonalAccessToken {
//!         token: SecretValue::new("glpat-xxxx"),
//!     })?;
//!
//!     if let Some(credential) = store.get("gitlab.com")? {
//!         println!("Found a {} credential", credential.kind());
//!     }
//!     Ok(())
//! }
//! ```

use anyhow::{Context, Result};
use keyring::Entry;
use serde::{Deserialize, Serialize};

use super::{serialize_secret, Credential, OAuth2Token, SecretValue};

/// The service name used to identify this application in the system keyring.
const SERVICE_NAME: &str = "gitlab-client";

/// The persisted form of a [`Credential`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoredCredential {
    PersonalAccessToken {
        #[serde(serialize_with = "serialize_secret")]
        token: SecretValue,
    },
    OAuth2 {
        token: OAuth2Token,
    },
}

impl StoredCredential {
    /// Converts a live credential; `None` for username/password.
    pub fn from_credential(credential: &Credential) -> Option<Self> {
        match credential {
            Credential::PersonalAccessToken(token) => Some(Self::PersonalAccessToken {
                token: token.clone(),
            }),
            Credential::OAuth2(token) => Some(Self::OAuth2 {
                token: token.clone(),
            }),
            Credential::UsernamePassword { .. } => None,
        }
    }

    pub fn into_credential(self) -> Credential {
        match self {
            Self::PersonalAccessToken { token } => Credential::PersonalAccessToken(token),
            Self::OAuth2 { token } => Credential::OAuth2(token),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::PersonalAccessToken { .. } => "personal access token",
            Self::OAuth2 { .. } => "OAuth2",
        }
    }

    fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize credential")
    }

    fn from_json(value: &str) -> Result<Self> {
        serde_json::from_str(value).context("Stored credential is corrupted; run `glc auth login` again")
    }
}

/// Credential storage in the system's native keyring service.
///
/// # Notes
///
/// - The keyring may require user interaction (password, biometrics) on first access.
/// - On Linux, a secret service daemon (GNOME Keyring, KWallet) must be running.
pub struct KeyringStore {
    service: String,
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyringStore {
    /// Creates a keyring store. No keyring access happens until a method is
    /// called.
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    /// Stores a credential for `host`, replacing any existing entry.
    pub fn store(&self, host: &str, credential: &StoredCredential) -> Result<()> {
        let entry = Entry::new(&self.service, host)?;
        entry.set_password(&credential.to_json()?)?;
        tracing::debug!(host, kind = credential.kind(), "Stored credential in keyring");
        Ok(())
    }

    /// Retrieves the credential for `host`, or `None` if there is no entry.
    pub fn get(&self, host: &str) -> Result<Option<StoredCredential>> {
        let entry = Entry::new(&self.service, host)?;
        match entry.get_password() {
            Ok(value) => StoredCredential::from_json(&value).map(Some),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes the credential for `host`. Deleting a missing entry succeeds.
    pub fn delete(&self, host: &str) -> Result<()> {
        let entry = Entry::new(&self.service, host)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_personal_token_json() {
        let stored = StoredCredential::PersonalAccessToken {
            token: SecretValue::new("glpat-abc"),
        };
        let json = stored.to_json().unwrap();
        assert!(json.contains(r#""type":"personal_access_token""#));
        assert_eq!(StoredCredential::from_json(&json).unwrap(), stored);
    }

    #[test]
    fn test_oauth2_token_survives_storage() {
        let token = OAuth2Token {
            access_token: SecretValue::new("access"),
            refresh_token: Some(SecretValue::new("refresh")),
            token_type: "Bearer".to_string(),
            expires_in: Some(7200),
            created_at: 1_700_000_000,
            scope: Some("api".to_string()),
        };
        let stored = StoredCredential::from_credential(&Credential::OAuth2(token.clone())).unwrap();
        let restored = StoredCredential::from_json(&stored.to_json().unwrap()).unwrap();

        match restored.into_credential() {
            Credential::OAuth2(restored) => assert_eq!(restored, token),
            other => panic!("unexpected credential: {:?}", other.kind()),
        }
    }

    #[test]
    fn test_password_credentials_are_not_stored() {
        let credential = Credential::UsernamePassword {
            username: "root".to_string(),
            password: SecretValue::new("pw"),
        };
        assert!(StoredCredential::from_credential(&credential).is_none());
    }

    #[test]
    fn test_corrupted_entry_is_an_error() {
        assert!(StoredCredential::from_json("not json").is_err());
    }
}
