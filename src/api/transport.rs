//
//  gitlab-client
//  api/transport.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # HTTP Transport
//!
//! Every byte the client sends goes through the [`Transport`] trait. The
//! production implementation, [`HttpTransport`], wraps a `reqwest::Client`;
//! tests swap in scripted fakes to drive the retry policy without a server.
//!
//! A transport performs exactly one exchange per call, never inspects status
//! codes and never retries.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use zeroize::Zeroize;

use super::ApiError;

/// A form-encoded request body.
///
/// Used for the OAuth2 token endpoint, where values include passwords and
/// refresh tokens. Every value is zeroized when the body is dropped.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct FormBody {
    fields: Vec<(String, String)>,
}

impl FormBody {
    /// Creates an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Appends a field when `value` is present.
    pub fn optional_field(self, name: impl Into<String>, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.field(name, value),
            None => self,
        }
    }

    /// Looks up the first value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The fields in insertion order.
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }
}

impl fmt::Debug for FormBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.fields.iter().map(|(name, _)| name.as_str()).collect();
        f.debug_struct("FormBody").field("fields", &names).finish()
    }
}

impl Drop for FormBody {
    fn drop(&mut self) {
        for (_, value) in self.fields.iter_mut() {
            value.zeroize();
        }
    }
}

/// Body of an outgoing request.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// No body.
    #[default]
    None,
    /// `application/json` body.
    Json(serde_json::Value),
    /// `application/x-www-form-urlencoded` body.
    Form(FormBody),
}

/// A fully described HTTP request.
///
/// `url` is absolute. Authentication headers are already merged into
/// `headers` by the time a transport sees the request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

impl ApiRequest {
    /// Creates a request with no query, headers or body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: RequestBody::None,
        }
    }

    /// Adds a query parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    /// Adds a query parameter when `value` is present.
    pub fn optional_query<V: ToString>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(name, value),
            None => self,
        }
    }

    /// Sets a JSON body.
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    /// Sets a form body.
    pub fn form(mut self, body: FormBody) -> Self {
        self.body = RequestBody::Form(body);
        self
    }

    /// Looks up a query parameter.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// A buffered HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl HttpResponse {
    /// Creates a response, mainly for tests.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns a header as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] when the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Sends one HTTP request and returns the buffered response.
///
/// Implementations must not interpret the status code and must not retry:
/// a 401 or 500 is a successful exchange as far as the transport is
/// concerned. Only failures to exchange at all are errors.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    async fn send(&self, request: ApiRequest) -> Result<HttpResponse, ApiError>;
}

/// Options for building an [`HttpTransport`].
#[derive(Debug, Clone, Default)]
pub struct TransportOptions {
    /// Per-request timeout; `None` uses reqwest's default (no timeout).
    pub timeout: Option<Duration>,
    /// Accept self-signed and otherwise invalid TLS certificates.
    pub ignore_cert_errors: bool,
}

/// The reqwest-backed transport used outside of tests.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    /// Builds a transport with the `glc/<version>` user agent.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the TLS backend cannot be set up.
    pub fn new(options: &TransportOptions) -> Result<Self, ApiError> {
        let mut builder = Client::builder()
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
            .danger_accept_invalid_certs(options.ignore_cert_errors);

        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<HttpResponse, ApiError> {
        let mut builder = self
            .http
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone());

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        builder = match &request.body {
            RequestBody::None => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Form(form) => builder.form(form.fields()),
        };

        tracing::debug!(method = %request.method, url = %request.url, "Sending request");

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        tracing::debug!(status = status.as_u16(), "Received response");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_form_body_debug_hides_values() {
        let form = FormBody::new()
            .field("grant_type", "password")
            .field("password", "hunter2");
        let debug = format!("{:?}", form);
        assert!(debug.contains("grant_type"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_form_body_optional_field() {
        let form = FormBody::new()
            .optional_field("client_id", Some("abc"))
            .optional_field("client_secret", None);
        assert_eq!(form.get("client_id"), Some("abc"));
        assert_eq!(form.get("client_secret"), None);
        assert_eq!(form.fields().len(), 1);
    }

    #[test]
    fn test_request_builder() {
        let request = ApiRequest::new(Method::GET, "https://gitlab.com/api/v4/projects")
            .query("per_page", 20)
            .optional_query("search", Some("core"))
            .optional_query::<u32>("page", None);
        assert_eq!(request.query_value("per_page"), Some("20"));
        assert_eq!(request.query_value("search"), Some("core"));
        assert_eq!(request.query_value("page"), None);
    }

    #[test]
    fn test_response_header_lookup() {
        let mut response = HttpResponse::new(200, "[]");
        response
            .headers
            .insert("x-total", HeaderValue::from_static("42"));
        assert_eq!(response.header("X-Total"), Some("42"));
        assert!(response.is_success());
    }

    #[test]
    fn test_response_json_decode_error() {
        let response = HttpResponse::new(200, "not json");
        let result: Result<serde_json::Value, ApiError> = response.json();
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[tokio::test]
    async fn test_http_transport_sends_form_and_reads_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth/token")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(mockito::Matcher::UrlEncoded(
                "grant_type".into(),
                "refresh_token".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"x"}"#)
            .create_async()
            .await;

        let transport = HttpTransport::new(&TransportOptions::default()).unwrap();
        let request = ApiRequest::new(Method::POST, format!("{}/oauth/token", server.url()))
            .form(FormBody::new().field("grant_type", "refresh_token"));

        let response = transport.send(request).await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, r#"{"access_token":"x"}"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_transport_does_not_interpret_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v4/user")
            .match_query(mockito::Matcher::UrlEncoded("page".into(), "2".into()))
            .with_status(401)
            .with_body(r#"{"message":"401 Unauthorized"}"#)
            .create_async()
            .await;

        let transport = HttpTransport::new(&TransportOptions::default()).unwrap();
        let request =
            ApiRequest::new(Method::GET, format!("{}/api/v4/user", server.url())).query("page", 2);

        let response = transport.send(request).await.unwrap();
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_http_transport_connection_error() {
        let transport = HttpTransport::new(&TransportOptions {
            timeout: Some(Duration::from_secs(2)),
            ignore_cert_errors: false,
        })
        .unwrap();
        let request = ApiRequest::new(Method::GET, "http://127.0.0.1:1/unreachable");
        let result = transport.send(request).await;
        assert!(matches!(result, Err(ApiError::Transport(_))));
    }
}
