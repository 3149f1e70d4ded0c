//
//  gitlab-client
//  auth/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Authentication Module
//!
//! This module provides credential and session management for talking to a
//! GitLab server.
//!
//! ## Supported Authentication Methods
//!
//! - **Personal Access Token**: Sent in the `PRIVATE-TOKEN` header. Never
//!   refreshed; a 401 is surfaced straight to the caller.
//! - **OAuth 2.0**: Obtained with the password grant and sent as
//!   `Authorization: Bearer`. Refreshed transparently when the server rejects
//!   it with 401.
//! - **Username/Password**: HTTP Basic authentication, mainly useful against
//!   endpoints that accept it during login.
//!
//! ## Module Structure
//!
//! - [`secret`]: Zeroizing holder for passwords and tokens
//! - [`token`]: OAuth2 token model and the expiry predicate
//! - [`session`]: The shared, mutable holder of the active credential
//! - [`oauth`]: Password grant and refresh against `/oauth/token`
//! - [`keyring`]: Secure credential storage for the CLI
//!
//! ## Example
//!
//! ```rust
//! use gitlab_client::auth::{Credential, SecretValue, Session};
//!
//! let session = Session::new(
//!     "https://gitlab.example.com",
//!     Credential::PersonalAccessToken(SecretValue::new("glpat-xxxx")),
//! );
//!
//! assert!(!session.is_oauth2());
//! assert!(session.auth_headers().contains_key("PRIVATE-TOKEN"));
//! ```

mod keyring;
mod oauth;
mod secret;
mod session;
mod token;

pub use keyring::*;
pub use oauth::*;
pub use secret::*;
pub use session::*;
pub use token::*;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use thiserror::Error;

/// Header GitLab reads personal, project and group access tokens from.
///
/// Lowercase so it can back a static `HeaderName`; header lookups are
/// case-insensitive.
pub const PRIVATE_TOKEN_HEADER: &str = "private-token";

/// Errors raised while obtaining or refreshing credentials.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The token endpoint rejected a refresh, or the refresh could not be
    /// attempted at all (network failure, missing refresh token, bad body).
    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    /// A refresh was requested for a session that does not hold an OAuth2
    /// token.
    #[error("session is not authenticated with OAuth2")]
    NotOAuth2Session,

    /// The initial password grant failed.
    #[error("login failed: {0}")]
    LoginFailed(String),
}

/// The credential a session authenticates with.
///
/// Exactly one variant is active per session. The OAuth2 variant is the only
/// one that can be replaced after construction, by a token refresh.
///
/// # Variants
///
/// - `PersonalAccessToken`: A static token (`glpat-...`).
/// - `OAuth2`: An access token with optional refresh token and expiry.
/// - `UsernamePassword`: Plain credentials sent with Basic authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Personal access token sent in `PRIVATE-TOKEN`.
    PersonalAccessToken(SecretValue),

    /// OAuth2 token sent as a bearer token.
    OAuth2(OAuth2Token),

    /// Username and password sent with HTTP Basic authentication.
    UsernamePassword {
        /// Account name.
        username: String,
        /// Account password.
        password: SecretValue,
    },
}

impl Credential {
    /// Builds the authentication headers for an outgoing request.
    ///
    /// # Returns
    ///
    /// A [`HeaderMap`] holding one header:
    /// - `PRIVATE-TOKEN: <token>` for personal access tokens
    /// - `Authorization: Bearer <access_token>` for OAuth2
    /// - `Authorization: Basic <base64(user:pass)>` for username/password
    ///
    /// The header value is marked sensitive so it is never printed by
    /// `reqwest`'s debug output. A value containing bytes that are not legal
    /// in a header yields an empty map; the server then answers 401.
    pub fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        let (name, value) = match self {
            Self::PersonalAccessToken(token) => (
                HeaderName::from_static(PRIVATE_TOKEN_HEADER),
                token.reveal().to_string(),
            ),
            Self::OAuth2(token) => (
                AUTHORIZATION,
                format!("Bearer {}", token.access_token.reveal()),
            ),
            Self::UsernamePassword { username, password } => {
                let encoded = STANDARD.encode(format!("{}:{}", username, password.reveal()));
                (AUTHORIZATION, format!("Basic {}", encoded))
            }
        };

        if let Ok(mut value) = HeaderValue::from_str(&value) {
            value.set_sensitive(true);
            headers.insert(name, value);
        }

        headers
    }

    /// Returns `true` for the OAuth2 variant.
    pub fn is_oauth2(&self) -> bool {
        matches!(self, Self::OAuth2(_))
    }

    /// Returns the OAuth2 token, if this is an OAuth2 credential.
    pub fn oauth2_token(&self) -> Option<&OAuth2Token> {
        match self {
            Self::OAuth2(token) => Some(token),
            _ => None,
        }
    }

    /// Checks if this credential supports token refresh.
    ///
    /// Only OAuth2 credentials with a non-empty refresh token can be
    /// refreshed.
    pub fn can_refresh(&self) -> bool {
        self.oauth2_token().is_some_and(OAuth2Token::can_refresh)
    }

    /// Checks if the credential has expired at `now`.
    ///
    /// Personal tokens and passwords never expire from the client's point of
    /// view; the server decides.
    pub fn is_expired(&self, now: i64) -> bool {
        self.oauth2_token()
            .is_some_and(|token| is_expired(token, now))
    }

    /// Short label for the credential kind, used in status output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PersonalAccessToken(_) => "personal access token",
            Self::OAuth2(_) => "oauth2",
            Self::UsernamePassword { .. } => "basic",
        }
    }
}
