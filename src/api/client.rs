//
//  gitlab-client
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # GitLab API Client
//!
//! This module provides [`GitLabClient`], the request executor every endpoint
//! operation goes through, and [`ClientBuilder`] to configure it.
//!
//! ## Features
//!
//! - Credential injection from the shared [`Session`]
//! - One transparent token refresh and retry on `401 Unauthorized` for
//!   OAuth2 sessions
//! - JSON serialization/deserialization
//! - Header-driven pagination
//! - Custom User-Agent header (`glc/<version>`)
//!
//! ## Retry policy
//!
//! ```text
//! send(request, current credential)
//!   ├─ not 401          → success or ApiError::Http
//!   ├─ 401, not OAuth2  → ApiError::Unauthorized
//!   └─ 401, OAuth2      → refresh (deduplicated by generation)
//!        ├─ refresh failed → ApiError::Unauthorized { refresh_error: Some(..) }
//!        └─ refreshed      → send(request, new credential) once, result returned as is
//! ```
//!
//! Transport failures and non-401 statuses are never retried.
//!
//! ## Example
//!
//! ```rust,no_run
//! use gitlab_client::api::GitLabClient;
//!
//! # async fn run() -> Result<(), gitlab_client::api::ApiError> {
//! let client = GitLabClient::with_personal_token("https://gitlab.com", "glpat-xxxx")?;
//! let version = client.get_version().await?;
//! println!("GitLab {}", version.version);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::common::{Page, Pager, DEFAULT_PER_PAGE, MAX_PER_PAGE};
use super::transport::{ApiRequest, HttpResponse, HttpTransport, Transport, TransportOptions};
use super::ApiError;
use crate::auth::{
    now_epoch_seconds, password_grant, refresh, refresh_if_current, AuthError, Credential,
    OAuth2Token, OAuthApp, RefreshOutcome, SecretValue, Session,
};

/// Query parameters as owned key/value pairs.
pub type Query = Vec<(String, String)>;

/// Configures and builds a [`GitLabClient`].
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use gitlab_client::api::ClientBuilder;
/// use gitlab_client::auth::{Credential, SecretValue};
///
/// # fn run() -> Result<(), gitlab_client::api::ApiError> {
/// let client = ClientBuilder::new("https://gitlab.example.com")
///     .credential(Credential::PersonalAccessToken(SecretValue::new("glpat-xxxx")))
///     .timeout(Duration::from_secs(30))
///     .ignore_cert_errors(true)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: String,
    credential: Option<Credential>,
    transport: Option<Arc<dyn Transport>>,
    transport_options: TransportOptions,
    oauth_app: OAuthApp,
    per_page: u32,
    refresh_before_expiry: bool,
}

impl ClientBuilder {
    /// Starts a builder for the server at `base_url` (e.g. `https://gitlab.com`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            credential: None,
            transport: None,
            transport_options: TransportOptions::default(),
            oauth_app: OAuthApp::default(),
            per_page: DEFAULT_PER_PAGE,
            refresh_before_expiry: false,
        }
    }

    /// Sets the credential to authenticate with.
    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Uses a personal access token.
    pub fn personal_token(self, token: impl Into<SecretValue>) -> Self {
        self.credential(Credential::PersonalAccessToken(token.into()))
    }

    /// Replaces the HTTP transport. Mainly used by tests.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the OAuth application used for login and refresh.
    pub fn oauth_app(mut self, app: OAuthApp) -> Self {
        self.oauth_app = app;
        self
    }

    /// Accepts invalid TLS certificates (self-hosted instances).
    pub fn ignore_cert_errors(mut self, ignore: bool) -> Self {
        self.transport_options.ignore_cert_errors = ignore;
        self
    }

    /// Sets a per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.transport_options.timeout = Some(timeout);
        self
    }

    /// Default page size for list operations, clamped to 1..=100.
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }

    /// Refreshes an expired OAuth2 token before sending, instead of waiting
    /// for the server to answer 401. Off by default.
    pub fn refresh_before_expiry(mut self, enabled: bool) -> Self {
        self.refresh_before_expiry = enabled;
        self
    }

    fn resolve_transport(&mut self) -> Result<Arc<dyn Transport>, ApiError> {
        match self.transport.take() {
            Some(transport) => Ok(transport),
            None => Ok(Arc::new(HttpTransport::new(&self.transport_options)?)),
        }
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - [`ApiError::InvalidRequest`] if no credential or an empty base URL
    ///   was given.
    /// - [`ApiError::Transport`] if the HTTP client cannot be created.
    pub fn build(mut self) -> Result<GitLabClient, ApiError> {
        if self.base_url.trim().is_empty() {
            return Err(ApiError::InvalidRequest("base URL is empty".to_string()));
        }
        let credential = self
            .credential
            .take()
            .ok_or_else(|| ApiError::InvalidRequest("no credential configured".to_string()))?;
        let transport = self.resolve_transport()?;

        Ok(GitLabClient {
            session: Arc::new(Session::new(self.base_url, credential)),
            transport,
            oauth_app: Arc::new(self.oauth_app),
            per_page: self.per_page,
            refresh_before_expiry: self.refresh_before_expiry,
        })
    }

    /// Logs in with the OAuth2 password grant and builds an OAuth2 client.
    ///
    /// Any credential set on the builder is replaced by the obtained token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Auth`] wrapping [`AuthError::LoginFailed`](crate::auth::AuthError::LoginFailed)
    /// when GitLab rejects the login.
    pub async fn login_with_password(
        mut self,
        username: &str,
        password: &SecretValue,
        scope: Option<&str>,
    ) -> Result<GitLabClient, ApiError> {
        let transport = self.resolve_transport()?;
        let token = password_grant(
            transport.as_ref(),
            self.base_url.trim_end_matches('/'),
            username,
            password,
            &self.oauth_app,
            scope,
        )
        .await?;

        tracing::info!(username, "Logged in with OAuth2 password grant");

        self.transport = Some(transport);
        self.credential = Some(Credential::OAuth2(token));
        self.build()
    }
}

/// The GitLab REST API client.
///
/// Cloning is cheap and clones share one [`Session`], so a token refreshed by
/// one clone is used by all of them.
#[derive(Debug, Clone)]
pub struct GitLabClient {
    session: Arc<Session>,
    transport: Arc<dyn Transport>,
    oauth_app: Arc<OAuthApp>,
    per_page: u32,
    refresh_before_expiry: bool,
}

impl GitLabClient {
    /// Starts a [`ClientBuilder`].
    pub fn builder(base_url: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(base_url)
    }

    /// Creates a client authenticated with a personal access token.
    pub fn with_personal_token(
        base_url: impl Into<String>,
        token: impl Into<SecretValue>,
    ) -> Result<Self, ApiError> {
        ClientBuilder::new(base_url).personal_token(token).build()
    }

    /// Logs in with username and password and returns an OAuth2 client.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use gitlab_client::api::GitLabClient;
    /// use gitlab_client::auth::SecretValue;
    ///
    /// # async fn run() -> Result<(), gitlab_client::api::ApiError> {
    /// let password = SecretValue::new("s3cret");
    /// let client = GitLabClient::oauth2_login("https://gitlab.example.com", "root", &password).await?;
    /// let me = client.current_user().await?;
    /// println!("logged in as {}", me.username);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn oauth2_login(
        base_url: impl Into<String>,
        username: &str,
        password: &SecretValue,
    ) -> Result<Self, ApiError> {
        ClientBuilder::new(base_url)
            .login_with_password(username, password, None)
            .await
    }

    /// The shared session.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// The server root, e.g. `https://gitlab.com`.
    pub fn base_url(&self) -> &str {
        self.session.base_url()
    }

    /// The REST API root, `{base_url}/api/v4`.
    pub fn api_url(&self) -> String {
        self.session.api_url()
    }

    /// Default page size for list operations.
    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// The token currently sent with requests.
    ///
    /// Personal access token or OAuth2 access token; `None` for Basic auth.
    pub fn auth_token(&self) -> Option<SecretValue> {
        match self.session.credential().as_ref() {
            Credential::PersonalAccessToken(token) => Some(token.clone()),
            Credential::OAuth2(token) => Some(token.access_token.clone()),
            Credential::UsernamePassword { .. } => None,
        }
    }

    /// The current OAuth2 token, if this is an OAuth2 session.
    pub fn oauth2_token(&self) -> Option<OAuth2Token> {
        self.session.oauth2_token()
    }

    /// Refreshes the OAuth2 access token now.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Auth`] if the session is not OAuth2 or the refresh
    /// is rejected.
    pub async fn refresh_access_token(&self) -> Result<OAuth2Token, ApiError> {
        Ok(refresh(&self.session, self.transport.as_ref(), &self.oauth_app).await?)
    }

    /// Marks the OAuth2 access token as expired without changing it.
    ///
    /// See [`Session::expire_token_for_testing`].
    pub fn expire_token_for_testing(&self) {
        self.session.expire_token_for_testing();
    }

    /// Builds a request for an API path such as `/projects`.
    pub fn request(&self, method: Method, path: &str) -> ApiRequest {
        ApiRequest::new(method, format!("{}{}", self.api_url(), path))
    }

    /// Sends a request, refreshing and retrying once on 401 for OAuth2
    /// sessions.
    ///
    /// # Returns
    ///
    /// The 2xx response.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Unauthorized`] for a 401 that could not be recovered.
    /// - [`ApiError::Http`] for other non-2xx statuses.
    /// - [`ApiError::Transport`] if the server could not be reached.
    pub async fn execute(&self, request: ApiRequest) -> Result<HttpResponse, ApiError> {
        let early_refresh = if self.refresh_before_expiry {
            self.refresh_if_expired().await
        } else {
            None
        };

        let snapshot = self.session.snapshot();
        let response = self.send_with(&request, &snapshot.credential).await?;

        if response.status != StatusCode::UNAUTHORIZED {
            return check_status(response);
        }

        if !snapshot.credential.is_oauth2() {
            return check_status(response);
        }

        let message = match ApiError::from_response(response.status, response.body) {
            ApiError::Unauthorized { message, .. } => message,
            other => other.message(),
        };

        // At most one refresh per call.
        if let Some(result) = early_refresh {
            return Err(ApiError::Unauthorized {
                message,
                refresh_error: result.err(),
            });
        }

        tracing::debug!(url = %request.url, "Received 401, refreshing OAuth2 token");

        let outcome = refresh_if_current(
            &self.session,
            self.transport.as_ref(),
            &self.oauth_app,
            snapshot.generation,
        )
        .await;

        if let Err(refresh_error) = outcome {
            return Err(ApiError::Unauthorized {
                message,
                refresh_error: Some(refresh_error),
            });
        }

        let credential = self.session.credential();
        let response = self.send_with(&request, &credential).await?;
        check_status(response)
    }

    /// Refreshes an expired OAuth2 token before sending.
    ///
    /// Returns `None` when this call made no token request, otherwise the
    /// outcome of the refresh. A failure is logged and the request still goes
    /// out.
    async fn refresh_if_expired(&self) -> Option<Result<(), AuthError>> {
        let snapshot = self.session.snapshot();
        if !snapshot.credential.can_refresh() || !snapshot.credential.is_expired(now_epoch_seconds())
        {
            return None;
        }

        tracing::debug!("OAuth2 token expired, refreshing before request");
        let outcome = refresh_if_current(
            &self.session,
            self.transport.as_ref(),
            &self.oauth_app,
            snapshot.generation,
        )
        .await;

        match outcome {
            Ok(RefreshOutcome::Refreshed(_)) => Some(Ok(())),
            Ok(RefreshOutcome::AlreadyRefreshed) => {
                tracing::debug!("Token was refreshed concurrently");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Refresh before request failed, sending with the expired token");
                Some(Err(e))
            }
        }
    }

    async fn send_with(
        &self,
        request: &ApiRequest,
        credential: &Credential,
    ) -> Result<HttpResponse, ApiError> {
        let mut request = request.clone();
        request.headers.extend(credential.auth_headers());
        self.transport.send(request).await
    }

    /// GET a path and decode the JSON body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.get_with_query(path, Vec::new()).await
    }

    /// GET a path with query parameters and decode the JSON body.
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Query,
    ) -> Result<T, ApiError> {
        let mut request = self.request(Method::GET, path);
        request.query = query;
        self.execute(request).await?.json()
    }

    /// GET a path, mapping 404 to `None`.
    pub async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ApiError> {
        match self.get(path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// GET one page of a list endpoint.
    pub async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Query,
        page: u32,
        per_page: u32,
    ) -> Result<Page<T>, ApiError> {
        let page = page.max(1);
        let per_page = per_page.clamp(1, MAX_PER_PAGE);

        let mut request = self.request(Method::GET, path);
        request.query = query;
        let request = request.query("page", page).query("per_page", per_page);

        let response = self.execute(request).await?;
        Page::from_response(&response, page, per_page)
    }

    /// Returns a [`Pager`] over a list endpoint using the default page size.
    pub fn pager<T: DeserializeOwned>(&self, path: &str, query: Query) -> Pager<T> {
        Pager::new(self.clone(), path.to_string(), query, self.per_page)
    }

    /// GET every page of a list endpoint.
    pub async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Query,
    ) -> Result<Vec<T>, ApiError> {
        self.pager(path, query).collect_all().await
    }

    /// POST a JSON body and decode the response.
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self
            .request(Method::POST, path)
            .json(serde_json::to_value(body)?);
        self.execute(request).await?.json()
    }

    /// POST without a body, ignoring the response body.
    pub async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        self.execute(self.request(Method::POST, path)).await?;
        Ok(())
    }

    /// PUT a JSON body and decode the response.
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self
            .request(Method::PUT, path)
            .json(serde_json::to_value(body)?);
        self.execute(request).await?.json()
    }

    /// DELETE a path, ignoring the response body.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.delete_with_query(path, Vec::new()).await
    }

    /// DELETE a path with query parameters, ignoring the response body.
    pub async fn delete_with_query(&self, path: &str, query: Query) -> Result<(), ApiError> {
        let mut request = self.request(Method::DELETE, path);
        request.query = query;
        self.execute(request).await?;
        Ok(())
    }

    /// DELETE a path and decode the response body.
    pub async fn delete_returning<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(self.request(Method::DELETE, path))
            .await?
            .json()
    }
}

fn check_status(response: HttpResponse) -> Result<HttpResponse, ApiError> {
    if response.is_success() {
        Ok(response)
    } else {
        tracing::debug!(status = response.status.as_u16(), "API request failed");
        Err(ApiError::from_response(response.status, response.body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requires_credential() {
        let result = ClientBuilder::new("https://gitlab.com").build();
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
    }

    #[test]
    fn test_build_rejects_empty_base_url() {
        let result = ClientBuilder::new("  ").personal_token("t").build();
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
    }

    #[test]
    fn test_urls() {
        let client = GitLabClient::with_personal_token("https://gitlab.com/", "t").unwrap();
        assert_eq!(client.base_url(), "https://gitlab.com");
        assert_eq!(client.api_url(), "https://gitlab.com/api/v4");
        assert_eq!(
            client.request(Method::GET, "/version").url,
            "https://gitlab.com/api/v4/version"
        );
    }

    #[test]
    fn test_per_page_is_clamped() {
        let client = ClientBuilder::new("https://gitlab.com")
            .personal_token("t")
            .per_page(500)
            .build()
            .unwrap();
        assert_eq!(client.per_page(), MAX_PER_PAGE);
    }

    #[test]
    fn test_auth_token_for_personal_token() {
        let client = GitLabClient::with_personal_token("https://gitlab.com", "glpat-1").unwrap();
        assert_eq!(client.auth_token().unwrap().reveal(), "glpat-1");
        assert!(client.oauth2_token().is_none());
    }

    #[tokio::test]
    async fn test_execute_attaches_private_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v4/version")
            .match_header("private-token", "glpat-1")
            .with_status(200)
            .with_body(r#"{"version":"16.0.0","revision":"abc"}"#)
            .create_async()
            .await;

        let client = GitLabClient::with_personal_token(server.url(), "glpat-1").unwrap();
        let value: serde_json::Value = client.get("/version").await.unwrap();
        assert_eq!(value["version"], "16.0.0");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_optional_maps_404() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v4/projects/1")
            .with_status(404)
            .with_body(r#"{"message":"404 Project Not Found"}"#)
            .create_async()
            .await;

        let client = GitLabClient::with_personal_token(server.url(), "t").unwrap();
        let project: Option<serde_json::Value> = client.get_optional("/projects/1").await.unwrap();
        assert!(project.is_none());
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v4/user")
            .with_status(500)
            .with_body(r#"{"message":"500 Internal Server Error"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = GitLabClient::with_personal_token(server.url(), "t").unwrap();
        let err = client.get::<serde_json::Value>("/user").await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        mock.assert_async().await;
    }
}
