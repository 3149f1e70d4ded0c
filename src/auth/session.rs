//
//  gitlab-client
//  auth/session.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Session
//!
//! A [`Session`] owns the base server URL and the one active [`Credential`].
//! It is shared by every request a client makes and mutated only by the token
//! refresher.
//!
//! ## Concurrency
//!
//! The credential lives in an `Arc` behind a `std::sync::RwLock`. Readers take
//! a [`CredentialSnapshot`], which clones the `Arc` and the generation counter
//! under the read lock, so a request never sees a half-replaced credential.
//!
//! Every replacement bumps the generation. The refresher holds
//! [`Session::refresh_lock`] across the token request and compares
//! generations inside it, which keeps concurrent 401s from refreshing more
//! than once.

use std::sync::{Arc, PoisonError, RwLock};

use reqwest::header::HeaderMap;
use tokio::sync::Mutex;

use super::{now_epoch_seconds, AuthError, Credential, OAuth2Token};

/// A consistent view of the session credential at one instant.
#[derive(Debug, Clone)]
pub struct CredentialSnapshot {
    /// The credential in effect.
    pub credential: Arc<Credential>,
    /// Generation the credential belongs to.
    pub generation: u64,
}

#[derive(Debug)]
struct SessionState {
    credential: Arc<Credential>,
    generation: u64,
}

/// The authenticated state shared by a client and all of its requests.
///
/// # Example
///
/// ```rust
/// use gitlab_client::auth::{Credential, SecretValue, Session};
///
/// let session = Session::new(
///     "https://gitlab.com/",
///     Credential::PersonalAccessToken(SecretValue::new("glpat-xxxx")),
/// );
///
/// assert_eq!(session.base_url(), "https://gitlab.com");
/// assert_eq!(session.api_url(), "https://gitlab.com/api/v4");
/// assert_eq!(session.generation(), 0);
/// ```
#[derive(Debug)]
pub struct Session {
    base_url: String,
    state: RwLock<SessionState>,
    refresh_lock: Mutex<()>,
}

impl Session {
    /// Creates a session for `base_url` with the given credential.
    ///
    /// Trailing slashes are stripped from the URL.
    pub fn new(base_url: impl Into<String>, credential: Credential) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            state: RwLock::new(SessionState {
                credential: Arc::new(credential),
                generation: 0,
            }),
            refresh_lock: Mutex::new(()),
        }
    }

    /// The server root, e.g. `https://gitlab.com`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The REST API root, `{base_url}/api/v4`.
    pub fn api_url(&self) -> String {
        format!("{}/api/v4", self.base_url)
    }

    /// Takes a snapshot of the current credential and generation.
    pub fn snapshot(&self) -> CredentialSnapshot {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        CredentialSnapshot {
            credential: Arc::clone(&state.credential),
            generation: state.generation,
        }
    }

    /// Returns the current credential.
    pub fn credential(&self) -> Arc<Credential> {
        self.snapshot().credential
    }

    /// Returns the current generation.
    pub fn generation(&self) -> u64 {
        self.snapshot().generation
    }

    /// Headers carrying the current credential.
    pub fn auth_headers(&self) -> HeaderMap {
        self.credential().auth_headers()
    }

    /// Returns `true` if the active credential is OAuth2.
    pub fn is_oauth2(&self) -> bool {
        self.credential().is_oauth2()
    }

    /// Returns the current OAuth2 token, if any.
    pub fn oauth2_token(&self) -> Option<OAuth2Token> {
        self.credential().oauth2_token().cloned()
    }

    /// Lock serializing token refreshes for this session.
    ///
    /// Hold it across the whole refresh request; the credential itself is
    /// still read through [`snapshot`](Self::snapshot).
    pub fn refresh_lock(&self) -> &Mutex<()> {
        &self.refresh_lock
    }

    /// Replaces the OAuth2 token and bumps the generation.
    ///
    /// This is the only mutation the session allows.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotOAuth2Session`] if the session does not hold an
    /// OAuth2 credential.
    pub fn replace_oauth2_token(&self, token: OAuth2Token) -> Result<u64, AuthError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if !state.credential.is_oauth2() {
            return Err(AuthError::NotOAuth2Session);
        }
        state.credential = Arc::new(Credential::OAuth2(token));
        state.generation += 1;
        tracing::debug!(generation = state.generation, "Replaced session credential");
        Ok(state.generation)
    }

    /// Makes the OAuth2 access token read as expired.
    ///
    /// The token string is left untouched and the generation is not bumped,
    /// so the next 401 still goes through the normal refresh path. Has no
    /// effect on non-OAuth2 sessions.
    pub fn expire_token_for_testing(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if let Credential::OAuth2(token) = state.credential.as_ref() {
            let mut token = token.clone();
            token.force_expired(now_epoch_seconds());
            state.credential = Arc::new(Credential::OAuth2(token));
        }
    }
}
