//
//  gitlab-client
//  auth/token.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # OAuth2 Tokens
//!
//! This module holds the OAuth2 token model and its expiry rules.
//!
//! GitLab's token endpoint answers with:
//!
//! ```json
//! {
//!   "access_token": "de6780bc506a0446309bd9362820ba8aed28aa506c71eedbe1c5c4f9dd350e54",
//!   "token_type": "Bearer",
//!   "expires_in": 7200,
//!   "refresh_token": "8257e65c97202ed1726cf9571600918f3bffb2544b26e00a61df9897668c33a1",
//!   "scope": "api",
//!   "created_at": 1607635748
//! }
//! ```
//!
//! [`OAuthTokenResponse`] mirrors that body on the wire; [`OAuth2Token`] is the
//! in-memory form kept by a [`Session`](super::Session), with the access and
//! refresh tokens wrapped in [`SecretValue`].
//!
//! ## Expiry
//!
//! A token expires at `created_at + expires_in` (seconds since the Unix epoch).
//! It is considered expired only once "now" is strictly after that instant, so
//! a token checked at exactly its expiry second is still valid. Tokens without
//! `expires_in` never expire.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::secret::{serialize_optional_secret, serialize_secret, SecretValue};

/// Token type GitLab issues for OAuth2 access tokens.
pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// Returns the current time as whole seconds since the Unix epoch.
pub fn now_epoch_seconds() -> i64 {
    Utc::now().timestamp()
}

/// Returns the absolute expiry instant for a token, if it has one.
fn expiry_instant(created_at: i64, expires_in: Option<u64>) -> Option<i64> {
    let expires_in = expires_in?;
    let expires_in = i64::try_from(expires_in).unwrap_or(i64::MAX);
    Some(created_at.saturating_add(expires_in))
}

/// Checks whether `token` is expired at `now` (epoch seconds).
///
/// This is a pure function: it never reads the clock, so callers decide what
/// "now" means. It is monotonic in `now`: once it returns `true` for some
/// instant it returns `true` for every later one.
///
/// # Returns
///
/// - `false` when the token has no `expires_in`
/// - `true` iff `now > created_at + expires_in`
///
/// # Example
///
/// ```rust
/// use gitlab_client::auth::{is_expired, OAuth2Token, SecretValue};
///
/// let token = OAuth2Token {
///     access_token: SecretValue::new("access"),
///     refresh_token: None,
///     token_type: "Bearer".to_string(),
///     expires_in: Some(7200),
///     created_at: 1_000_000,
///     scope: None,
/// };
///
/// assert!(!is_expired(&token, 1_007_200)); // exactly at expiry
/// assert!(is_expired(&token, 1_007_201));
/// ```
pub fn is_expired(token: &OAuth2Token, now: i64) -> bool {
    match token.expires_at() {
        Some(expires_at) => now > expires_at,
        None => false,
    }
}

/// An OAuth2 access token held by a session.
///
/// # Fields
///
/// - `access_token`: Bearer credential attached to API requests.
/// - `refresh_token`: Used to obtain a new access token without the password.
/// - `token_type`: Usually `"Bearer"`.
/// - `expires_in`: Lifetime in seconds; `None` means the token never expires.
/// - `created_at`: Issue time in epoch seconds.
/// - `scope`: Space separated scopes granted by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth2Token {
    /// The access token presented as `Authorization: Bearer <token>`.
    #[serde(serialize_with = "serialize_secret")]
    pub access_token: SecretValue,

    /// The refresh token, when the server issued one.
    #[serde(default, serialize_with = "serialize_optional_secret")]
    pub refresh_token: Option<SecretValue>,

    /// The token type reported by the server.
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Token lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,

    /// Issue time in seconds since the Unix epoch.
    pub created_at: i64,

    /// Granted scopes.
    #[serde(default)]
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    DEFAULT_TOKEN_TYPE.to_string()
}

impl OAuth2Token {
    /// Returns the absolute expiry instant (epoch seconds), or `None` if the
    /// token never expires.
    pub fn expires_at(&self) -> Option<i64> {
        expiry_instant(self.created_at, self.expires_in)
    }

    /// Checks expiry against the current wall clock.
    pub fn is_expired_now(&self) -> bool {
        is_expired(self, now_epoch_seconds())
    }

    /// Returns `true` if the token carries a non-empty refresh token.
    pub fn can_refresh(&self) -> bool {
        self.refresh_token
            .as_ref()
            .is_some_and(|token| !token.is_empty())
    }

    /// Rewrites the issue time so the token reads as expired at `now`.
    ///
    /// Used by [`Session::expire_token_for_testing`](super::Session::expire_token_for_testing)
    /// to drive the refresh path deterministically.
    pub fn force_expired(&mut self, now: i64) {
        self.expires_in = Some(0);
        self.created_at = now.saturating_sub(1);
    }

    /// Builds a token from a token endpoint response.
    ///
    /// `now` is used as `created_at` when the response does not carry one.
    /// When the response omits a refresh token, `previous_refresh` is kept.
    ///
    /// # Errors
    ///
    /// Returns an error message if the response has an empty access token.
    pub fn from_response(
        response: OAuthTokenResponse,
        now: i64,
        previous_refresh: Option<SecretValue>,
    ) -> Result<Self, String> {
        if response.access_token.is_empty() {
            return Err("token response did not contain an access_token".to_string());
        }

        Ok(Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token.or(previous_refresh),
            token_type: response.token_type.unwrap_or_else(default_token_type),
            expires_in: response.expires_in,
            created_at: response.created_at.unwrap_or(now),
            scope: response.scope,
        })
    }
}

/// Body returned by GitLab's `/oauth/token` endpoint.
///
/// Only `access_token` is required; the remaining fields are optional on the
/// wire and default to `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthTokenResponse {
    /// The issued access token.
    #[serde(serialize_with = "serialize_secret")]
    pub access_token: SecretValue,

    /// Token type, typically `"Bearer"`.
    #[serde(default)]
    pub token_type: Option<String>,

    /// Lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,

    /// Refresh token for the next refresh.
    #[serde(default, serialize_with = "serialize_optional_secret")]
    pub refresh_token: Option<SecretValue>,

    /// Granted scopes.
    #[serde(default)]
    pub scope: Option<String>,

    /// Issue time in epoch seconds.
    #[serde(default)]
    pub created_at: Option<i64>,
}

impl OAuthTokenResponse {
    /// Returns `created_at + expires_in`, or `None` when either is missing.
    pub fn expires_at(&self) -> Option<i64> {
        self.created_at
            .and_then(|created_at| expiry_instant(created_at, self.expires_in))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(expires_in: Option<u64>, created_at: i64) -> OAuth2Token {
        OAuth2Token {
            access_token: SecretValue::new("access"),
            refresh_token: Some(SecretValue::new("refresh")),
            token_type: "Bearer".to_string(),
            expires_in,
            created_at,
            scope: Some("api".to_string()),
        }
    }

    #[test]
    fn test_expiry_is_strictly_after() {
        let t = token(Some(7200), 1_000_000);
        assert!(!is_expired(&t, 1_000_000));
        assert!(!is_expired(&t, 1_007_199));
        assert!(!is_expired(&t, 1_007_200));
        assert!(is_expired(&t, 1_007_201));
    }

    #[test]
    fn test_no_expires_in_never_expires() {
        let t = token(None, 0);
        assert!(!is_expired(&t, i64::MAX));
        assert_eq!(t.expires_at(), None);
    }

    #[test]
    fn test_expiry_is_monotonic() {
        let t = token(Some(60), 500);
        let mut seen_expired = false;
        for now in 400..700 {
            let expired = is_expired(&t, now);
            assert!(!(seen_expired && !expired));
            seen_expired |= expired;
        }
        assert!(seen_expired);
    }

    #[test]
    fn test_force_expired() {
        let mut t = token(None, 0);
        t.force_expired(1_000);
        assert!(is_expired(&t, 1_000));
    }

    #[test]
    fn test_is_expired_now() {
        let now = now_epoch_seconds();
        assert!(token(Some(60), now - 120).is_expired_now());
        assert!(!token(Some(3600), now).is_expired_now());
        assert!(!token(None, 0).is_expired_now());
    }

    #[test]
    fn test_huge_expires_in_saturates() {
        let t = token(Some(u64::MAX), 10);
        assert_eq!(t.expires_at(), Some(i64::MAX));
        assert!(!is_expired(&t, i64::MAX));
    }

    #[test]
    fn test_can_refresh() {
        let mut t = token(Some(10), 0);
        assert!(t.can_refresh());
        t.refresh_token = Some(SecretValue::new(""));
        assert!(!t.can_refresh());
        t.refresh_token = None;
        assert!(!t.can_refresh());
    }

    #[test]
    fn test_response_deserialize() {
        let json = r#"{
            "access_token": "TOKEN",
            "token_type": "Bearer",
            "expires_in": 7200,
            "refresh_token": "REFRESH",
            "scope": "api",
            "created_at": 1593096829
        }"#;

        let response: OAuthTokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.access_token.reveal(), "TOKEN");
        assert_eq!(response.refresh_token.as_ref().unwrap().reveal(), "REFRESH");
        assert_eq!(response.expires_at(), Some(1593096829 + 7200));
    }

    #[test]
    fn test_response_round_trip_keeps_expiry() {
        let json = r#"{"access_token":"a","expires_in":7200,"created_at":1607635748}"#;
        let response: OAuthTokenResponse = serde_json::from_str(json).unwrap();
        let encoded = serde_json::to_string(&response).unwrap();
        let decoded: OAuthTokenResponse = serde_json::from_str(&encoded).unwrap();
        assert_eq!(response.expires_at(), decoded.expires_at());
        assert_eq!(decoded.access_token.reveal(), "a");
    }

    #[test]
    fn test_from_response_defaults_created_at() {
        let json = r#"{"access_token":"new","expires_in":60}"#;
        let response: OAuthTokenResponse = serde_json::from_str(json).unwrap();
        let t = OAuth2Token::from_response(response, 42, Some(SecretValue::new("old"))).unwrap();
        assert_eq!(t.created_at, 42);
        assert_eq!(t.token_type, "Bearer");
        assert_eq!(t.refresh_token.as_ref().unwrap().reveal(), "old");
        assert_eq!(t.expires_at(), Some(102));
    }

    #[test]
    fn test_from_response_rejects_empty_access_token() {
        let json = r#"{"access_token":""}"#;
        let response: OAuthTokenResponse = serde_json::from_str(json).unwrap();
        assert!(OAuth2Token::from_response(response, 0, None).is_err());
    }

    #[test]
    fn test_missing_access_token_fails_to_parse() {
        let json = r#"{"token_type":"Bearer"}"#;
        assert!(serde_json::from_str::<OAuthTokenResponse>(json).is_err());
    }
}
