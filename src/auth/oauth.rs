//
//  gitlab-client
//  auth/oauth.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # OAuth 2.0 Token Exchange
//!
//! This module talks to GitLab's token endpoint, `{base}/oauth/token`, for
//! two grants:
//!
//! - **Password grant** (`grant_type=password`): the initial login with a
//!   username and password.
//! - **Refresh grant** (`grant_type=refresh_token`): swaps the session's
//!   refresh token for a new access token.
//!
//! Both post a form-encoded body. The client id and secret are sent only when
//! an [`OAuthApp`] carries them; GitLab accepts the password grant without
//! them for first-party logins.
//!
//! ## Refresh and concurrency
//!
//! A refresh replaces the session credential in one step. Callers that race
//! on a 401 go through [`refresh_if_current`], which holds the session's
//! refresh lock and skips the network round trip when another task already
//! replaced the token.
//!
//! ## Example
//!
//! ```rust,ignore
//! use gitlab_client::auth::{refresh, OAuthApp};
//!
//! let token = refresh(&session, transport.as_ref(), &OAuthApp::default()).await?;
//! println!("new token expires at {:?}", token.expires_at());
//! ```

use reqwest::Method;

use super::{now_epoch_seconds, AuthError, OAuth2Token, OAuthTokenResponse, SecretValue, Session};
use crate::api::error::extract_error_message;
use crate::api::transport::{ApiRequest, FormBody, Transport};

/// Path of the token endpoint relative to the server root.
pub const TOKEN_PATH: &str = "/oauth/token";

/// OAuth application credentials registered on the GitLab instance.
///
/// Both fields are optional; leave them unset for first-party password logins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OAuthApp {
    pub client_id: Option<String>,
    pub client_secret: Option<SecretValue>,
}

impl OAuthApp {
    /// Creates an app description with a client id and no secret.
    pub fn with_client_id(client_id: impl Into<String>) -> Self {
        Self {
            client_id: Some(client_id.into()),
            client_secret: None,
        }
    }

    fn apply(&self, form: FormBody) -> FormBody {
        form.optional_field("client_id", self.client_id.as_deref())
            .optional_field(
                "client_secret",
                self.client_secret.as_ref().map(SecretValue::reveal),
            )
    }
}

/// Result of [`refresh_if_current`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// This call refreshed the token.
    Refreshed(OAuth2Token),
    /// Another caller replaced the credential first; no request was made.
    AlreadyRefreshed,
}

/// Returns the token endpoint URL for a server root.
pub fn token_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), TOKEN_PATH)
}

/// Posts a form to the token endpoint and parses the response.
///
/// Errors are returned as plain messages; callers wrap them in the
/// [`AuthError`] variant that fits the grant.
async fn request_token(
    transport: &dyn Transport,
    base_url: &str,
    form: FormBody,
) -> Result<OAuthTokenResponse, String> {
    let request = ApiRequest::new(Method::POST, token_url(base_url)).form(form);

    let response = transport
        .send(request)
        .await
        .map_err(|e| format!("token request failed: {}", e))?;

    if !response.is_success() {
        let detail = extract_error_message(&response.body)
            .unwrap_or_else(|| response.status.to_string());
        return Err(format!("{} ({})", detail, response.status.as_u16()));
    }

    response
        .json::<OAuthTokenResponse>()
        .map_err(|e| format!("invalid token response: {}", e))
}

/// Logs in with the OAuth2 password grant.
///
/// # Parameters
///
/// - `transport`: Transport used for the token request.
/// - `base_url`: Server root, e.g. `https://gitlab.com`.
/// - `username`, `password`: Account credentials.
/// - `app`: Optional client id and secret.
/// - `scope`: Space separated scopes; GitLab grants `api` when omitted.
///
/// # Returns
///
/// The new [`OAuth2Token`]. `created_at` defaults to the current time when
/// the server does not report it.
///
/// # Errors
///
/// Returns [`AuthError::LoginFailed`] for a rejected login, a network
/// failure, or an unparsable response.
pub async fn password_grant(
    transport: &dyn Transport,
    base_url: &str,
    username: &str,
    password: &SecretValue,
    app: &OAuthApp,
    scope: Option<&str>,
) -> Result<OAuth2Token, AuthError> {
    let form = app.apply(
        FormBody::new()
            .field("grant_type", "password")
            .field("username", username)
            .field("password", password.reveal())
            .optional_field("scope", scope),
    );

    tracing::debug!(username, "Requesting OAuth2 token with password grant");

    let response = request_token(transport, base_url, form)
        .await
        .map_err(AuthError::LoginFailed)?;

    OAuth2Token::from_response(response, now_epoch_seconds(), None).map_err(AuthError::LoginFailed)
}

/// Refreshes the session's OAuth2 token unconditionally.
///
/// Waits for any refresh already in flight, then exchanges the current
/// refresh token and replaces the session credential.
///
/// # Errors
///
/// - [`AuthError::NotOAuth2Session`] if the session is not OAuth2.
/// - [`AuthError::RefreshFailed`] if there is no refresh token or the
///   server rejects it.
pub async fn refresh(
    session: &Session,
    transport: &dyn Transport,
    app: &OAuthApp,
) -> Result<OAuth2Token, AuthError> {
    let _guard = session.refresh_lock().lock().await;
    refresh_locked(session, transport, app).await
}

/// Refreshes only if the session is still at `observed_generation`.
///
/// Used by the request executor after a 401: the generation it sent the
/// request with is compared under the refresh lock, so N concurrent 401s on
/// the same token produce one refresh and N-1 [`RefreshOutcome::AlreadyRefreshed`].
///
/// # Errors
///
/// Same as [`refresh`].
pub async fn refresh_if_current(
    session: &Session,
    transport: &dyn Transport,
    app: &OAuthApp,
    observed_generation: u64,
) -> Result<RefreshOutcome, AuthError> {
    let _guard = session.refresh_lock().lock().await;

    if session.generation() != observed_generation {
        tracing::debug!(
            observed_generation,
            current = session.generation(),
            "Credential already refreshed by another request"
        );
        return Ok(RefreshOutcome::AlreadyRefreshed);
    }

    refresh_locked(session, transport, app)
        .await
        .map(RefreshOutcome::Refreshed)
}

async fn refresh_locked(
    session: &Session,
    transport: &dyn Transport,
    app: &OAuthApp,
) -> Result<OAuth2Token, AuthError> {
    let current = session.oauth2_token().ok_or(AuthError::NotOAuth2Session)?;

    let refresh_token = current
        .refresh_token
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AuthError::RefreshFailed("no refresh token available".to_string()))?;

    let form = app.apply(
        FormBody::new()
            .field("grant_type", "refresh_token")
            .field("refresh_token", refresh_token.reveal()),
    );

    tracing::debug!("Refreshing OAuth2 access token");

    let response = request_token(transport, session.base_url(), form)
        .await
        .map_err(|message| {
            tracing::warn!("Token refresh failed: {}", message);
            AuthError::RefreshFailed(message)
        })?;

    let token = OAuth2Token::from_response(response, now_epoch_seconds(), Some(refresh_token))
        .map_err(AuthError::RefreshFailed)?;

    let generation = session.replace_oauth2_token(token.clone())?;
    tracing::info!(generation, "OAuth2 access token refreshed");

    Ok(token)
}
