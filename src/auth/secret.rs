//
//  gitlab-client
//  auth/secret.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Secret Values
//!
//! Passwords and tokens are held in [`SecretValue`], a thin wrapper over
//! [`secrecy::SecretString`]. The backing buffer is zeroized when the value is
//! dropped or explicitly [cleared](SecretValue::clear), and the `Debug`
//! representation never contains the secret itself.
//!
//! ## Example
//!
//! ```rust
//! use gitlab_client::auth::SecretValue;
//!
//! let mut password = SecretValue::new("hunter2");
//! assert_eq!(password.reveal(), "hunter2");
//! assert_eq!(format!("{:?}", password), "SecretValue([REDACTED])");
//!
//! password.clear();
//! assert!(password.is_empty());
//! ```

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serializer};

/// An opaque holder for credential material.
///
/// The only way to read the value is [`reveal`](Self::reveal), which keeps
/// every read site greppable. Cloning copies the secret into a fresh
/// zeroizing buffer.
pub struct SecretValue {
    inner: SecretString,
}

impl SecretValue {
    /// Wraps a secret string.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            inner: SecretString::from(value.into()),
        }
    }

    /// Returns the secret as a string slice.
    ///
    /// The returned slice must not be logged or stored in a plain `String`
    /// that outlives the request it is used for.
    pub fn reveal(&self) -> &str {
        self.inner.expose_secret()
    }

    /// Returns `true` if the secret is the empty string.
    pub fn is_empty(&self) -> bool {
        self.reveal().is_empty()
    }

    /// Zeroizes the current value and replaces it with an empty secret.
    pub fn clear(&mut self) {
        // Dropping the old SecretString zeroizes its buffer.
        self.inner = SecretString::from(String::new());
    }
}

impl Clone for SecretValue {
    fn clone(&self) -> Self {
        Self::new(self.reveal())
    }
}

impl PartialEq for SecretValue {
    fn eq(&self, other: &Self) -> bool {
        self.reveal() == other.reveal()
    }
}

impl Eq for SecretValue {}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretValue([REDACTED])")
    }
}

impl From<String> for SecretValue {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecretValue {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Serializes a secret in clear text.
///
/// `SecretValue` does not implement `Serialize`; fields that
/// must be persisted (keyring entries, token responses) opt in with
/// `#[serde(serialize_with = "serialize_secret")]`.
pub fn serialize_secret<S>(secret: &SecretValue, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(secret.reveal())
}

/// Optional counterpart of [`serialize_secret`].
pub fn serialize_optional_secret<S>(
    secret: &Option<SecretValue>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match secret {
        Some(secret) => serializer.serialize_some(secret.reveal()),
        None => serializer.serialize_none(),
    }
}

/// Masks a secret for display, keeping the first and last four characters.
///
/// Short secrets are fully masked.
pub fn mask_secret(secret: &SecretValue) -> String {
    let value = secret.reveal();
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}
