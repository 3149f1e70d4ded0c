//
//  gitlab-client
//  tests/retry_policy.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Refresh-and-retry behaviour of the request executor, driven by an
//! in-process fake of GitLab's API and token endpoint.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use tokio::sync::Barrier;
use tokio::task::JoinSet;

use gitlab_client::api::transport::RequestBody;
use gitlab_client::api::{ApiError, ApiRequest, ClientBuilder, GitLabClient, HttpResponse, Transport};
use gitlab_client::auth::{now_epoch_seconds, AuthError, Credential, OAuth2Token, SecretValue};

const FRESH_TOKEN: &str = "fresh-token";

/// Accepts only `Bearer fresh-token` on the API. The token endpoint hands
/// out `fresh-token` unless configured to fail.
#[derive(Debug)]
struct FakeGitLab {
    refresh_status: u16,
    reject_everything: bool,
    gate: Option<Barrier>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeGitLab {
    fn new() -> Self {
        Self {
            refresh_status: 200,
            reject_everything: false,
            gate: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn token_requests(&self) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.url.ends_with("/oauth/token"))
            .count()
    }

    fn api_requests(&self) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.url.contains("/api/v4/"))
            .collect()
    }
}

fn authorization(request: &ApiRequest) -> Option<&str> {
    request
        .headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
}

#[async_trait]
impl Transport for FakeGitLab {
    async fn send(&self, request: ApiRequest) -> Result<HttpResponse, ApiError> {
        self.requests.lock().unwrap().push(request.clone());

        if request.url.ends_with("/oauth/token") {
            if self.refresh_status != 200 {
                return Ok(HttpResponse::new(
                    self.refresh_status,
                    r#"{"error":"invalid_grant","error_description":"The provided authorization grant is invalid"}"#,
                ));
            }
            let body = serde_json::json!({
                "access_token": FRESH_TOKEN,
                "token_type": "Bearer",
                "expires_in": 7200,
                "refresh_token": "refresh-2",
                "created_at": now_epoch_seconds(),
            });
            return Ok(HttpResponse::new(200, body.to_string()));
        }

        let authorized = authorization(&request) == Some("Bearer fresh-token");
        if !authorized {
            if let Some(gate) = &self.gate {
                gate.wait().await;
            }
        }

        if authorized && !self.reject_everything {
            Ok(HttpResponse::new(200, r#"{"id":1,"username":"jdoe","name":"John Doe"}"#))
        } else {
            Ok(HttpResponse::new(401, r#"{"message":"401 Unauthorized"}"#))
        }
    }
}

fn stale_token(refresh_token: Option<&str>) -> OAuth2Token {
    OAuth2Token {
        access_token: SecretValue::new("stale-token"),
        refresh_token: refresh_token.map(SecretValue::new),
        token_type: "Bearer".to_string(),
        expires_in: Some(7200),
        created_at: now_epoch_seconds(),
        scope: Some("api".to_string()),
    }
}

fn oauth_client(fake: &Arc<FakeGitLab>, token: OAuth2Token) -> GitLabClient {
    ClientBuilder::new("https://gitlab.example.com")
        .credential(Credential::OAuth2(token))
        .transport(fake.clone())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_401_refreshes_once_and_retries_with_new_token() {
    let fake = Arc::new(FakeGitLab::new());
    let client = oauth_client(&fake, stale_token(Some("refresh-1")));

    let user = client.current_user().await.unwrap();
    assert_eq!(user.username, "jdoe");

    let requests = fake.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(authorization(&requests[0]), Some("Bearer stale-token"));
    assert!(requests[1].url.ends_with("/oauth/token"));
    assert_eq!(authorization(&requests[2]), Some("Bearer fresh-token"));
    assert_eq!(requests[2].url, requests[0].url);

    match &requests[1].body {
        RequestBody::Form(form) => {
            assert_eq!(form.get("grant_type"), Some("refresh_token"));
            assert_eq!(form.get("refresh_token"), Some("refresh-1"));
        }
        other => panic!("unexpected token request body: {:?}", other),
    }

    let token = client.oauth2_token().unwrap();
    assert_eq!(token.access_token.reveal(), FRESH_TOKEN);
    assert_eq!(token.refresh_token.unwrap().reveal(), "refresh-2");
    assert_eq!(client.session().generation(), 1);
}

#[tokio::test]
async fn test_retry_keeps_method_and_body() {
    let fake = Arc::new(FakeGitLab::new());
    let client = oauth_client(&fake, stale_token(Some("refresh-1")));

    let request = client
        .request(Method::POST, "/projects/42/repository/tags")
        .json(serde_json::json!({"tag_name": "v1.0.0", "ref": "main"}));
    client.execute(request).await.unwrap();

    let api = fake.api_requests();
    assert_eq!(api.len(), 2);
    assert_eq!(api[1].method, Method::POST);
    match (&api[0].body, &api[1].body) {
        (RequestBody::Json(first), RequestBody::Json(retry)) => assert_eq!(first, retry),
        other => panic!("unexpected bodies: {:?}", other),
    }
}

#[tokio::test]
async fn test_personal_token_401_is_not_refreshed() {
    let fake = Arc::new(FakeGitLab::new());
    let client = ClientBuilder::new("https://gitlab.example.com")
        .personal_token("glpat-revoked")
        .transport(fake.clone())
        .build()
        .unwrap();

    let err = client.current_user().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(err.refresh_error().is_none());
    assert_eq!(fake.requests().len(), 1);
    assert_eq!(fake.token_requests(), 0);
    assert_eq!(
        fake.requests()[0]
            .headers
            .get("private-token")
            .and_then(|v| v.to_str().ok()),
        Some("glpat-revoked")
    );
}

#[tokio::test]
async fn test_401_on_retry_is_returned_without_second_refresh() {
    let fake = Arc::new(FakeGitLab {
        reject_everything: true,
        ..FakeGitLab::new()
    });
    let client = oauth_client(&fake, stale_token(Some("refresh-1")));

    let err = client.current_user().await.unwrap_err();
    match err {
        ApiError::Unauthorized { refresh_error, message } => {
            assert!(refresh_error.is_none());
            assert_eq!(message, "401 Unauthorized");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(fake.api_requests().len(), 2);
    assert_eq!(fake.token_requests(), 1);
}

#[tokio::test]
async fn test_failed_refresh_surfaces_unauthorized_with_cause() {
    let fake = Arc::new(FakeGitLab {
        refresh_status: 400,
        ..FakeGitLab::new()
    });
    let client = oauth_client(&fake, stale_token(Some("refresh-revoked")));

    let err = client.current_user().await.unwrap_err();
    assert!(err.is_unauthorized());
    match err.refresh_error() {
        Some(AuthError::RefreshFailed(message)) => {
            assert!(message.contains("authorization grant is invalid"), "{}", message)
        }
        other => panic!("unexpected refresh error: {:?}", other),
    }

    // The original request is not retried and the session keeps its token.
    assert_eq!(fake.api_requests().len(), 1);
    assert_eq!(client.session().generation(), 0);
    assert_eq!(client.oauth2_token().unwrap().access_token.reveal(), "stale-token");
}

#[tokio::test]
async fn test_missing_refresh_token_fails_without_token_request() {
    let fake = Arc::new(FakeGitLab::new());
    let client = oauth_client(&fake, stale_token(None));

    let err = client.current_user().await.unwrap_err();
    assert!(matches!(err.refresh_error(), Some(AuthError::RefreshFailed(_))));
    assert_eq!(fake.token_requests(), 0);
    assert_eq!(fake.api_requests().len(), 1);
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    const CONCURRENCY: usize = 4;

    let fake = Arc::new(FakeGitLab {
        gate: Some(Barrier::new(CONCURRENCY)),
        ..FakeGitLab::new()
    });
    let client = oauth_client(&fake, stale_token(Some("refresh-1")));

    let mut calls = JoinSet::new();
    for _ in 0..CONCURRENCY {
        let client = client.clone();
        calls.spawn(async move { client.current_user().await });
    }

    let results = calls.join_all().await;
    assert_eq!(results.len(), CONCURRENCY);
    for result in results {
        assert_eq!(result.unwrap().username, "jdoe");
    }
    assert_eq!(fake.token_requests(), 1);
    assert_eq!(fake.api_requests().len(), CONCURRENCY * 2);
    assert_eq!(client.session().generation(), 1);
}

#[tokio::test]
async fn test_expired_token_is_refreshed_before_request_when_enabled() {
    let fake = Arc::new(FakeGitLab::new());
    let client = refreshing_client(&fake);

    client.current_user().await.unwrap();

    let requests = fake.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].url.ends_with("/oauth/token"));
    assert_eq!(authorization(&requests[1]), Some("Bearer fresh-token"));
}

fn refreshing_client(fake: &Arc<FakeGitLab>) -> GitLabClient {
    let mut token = stale_token(Some("refresh-1"));
    token.created_at = now_epoch_seconds() - 7201;

    ClientBuilder::new("https://gitlab.example.com")
        .credential(Credential::OAuth2(token))
        .transport(fake.clone())
        .refresh_before_expiry(true)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_failed_refresh_before_request_still_sends_request() {
    let fake = Arc::new(FakeGitLab {
        refresh_status: 400,
        ..FakeGitLab::new()
    });
    let client = refreshing_client(&fake);

    let err = client.current_user().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(matches!(err.refresh_error(), Some(AuthError::RefreshFailed(_))));

    let requests = fake.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].url.ends_with("/oauth/token"));
    assert_eq!(authorization(&requests[1]), Some("Bearer stale-token"));
}

#[tokio::test]
async fn test_refresh_before_request_counts_as_the_one_refresh() {
    let fake = Arc::new(FakeGitLab {
        reject_everything: true,
        ..FakeGitLab::new()
    });
    let client = refreshing_client(&fake);

    let err = client.current_user().await.unwrap_err();
    match err {
        ApiError::Unauthorized { refresh_error, .. } => assert!(refresh_error.is_none()),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(fake.token_requests(), 1);
    assert_eq!(fake.api_requests().len(), 1);
    assert_eq!(client.session().generation(), 1);
}

#[tokio::test]
async fn test_expired_token_is_sent_as_is_by_default() {
    let fake = Arc::new(FakeGitLab::new());
    let client = oauth_client(&fake, stale_token(Some("refresh-1")));
    client.expire_token_for_testing();

    client.current_user().await.unwrap();

    // The stale token goes out first; the refresh is triggered by the 401.
    let requests = fake.requests();
    assert_eq!(authorization(&requests[0]), Some("Bearer stale-token"));
    assert_eq!(fake.token_requests(), 1);
}

#[tokio::test]
async fn test_explicit_refresh_is_visible_to_clones() {
    let fake = Arc::new(FakeGitLab::new());
    let client = oauth_client(&fake, stale_token(Some("refresh-1")));
    let clone = client.clone();

    let token = client.refresh_access_token().await.unwrap();
    assert_eq!(token.access_token.reveal(), FRESH_TOKEN);
    assert_eq!(clone.auth_token().unwrap().reveal(), FRESH_TOKEN);

    clone.current_user().await.unwrap();
    assert_eq!(fake.api_requests().len(), 1);
}

#[tokio::test]
async fn test_explicit_refresh_on_personal_token_session() {
    let fake = Arc::new(FakeGitLab::new());
    let client = ClientBuilder::new("https://gitlab.example.com")
        .personal_token("glpat-1")
        .transport(fake.clone())
        .build()
        .unwrap();

    let err = client.refresh_access_token().await.unwrap_err();
    assert!(matches!(err, ApiError::Auth(AuthError::NotOAuth2Session)));
    assert!(fake.requests().is_empty());
}

#[tokio::test]
async fn test_other_statuses_are_not_retried() {
    #[derive(Debug)]
    struct Forbidden(Mutex<usize>);

    #[async_trait]
    impl Transport for Forbidden {
        async fn send(&self, _request: ApiRequest) -> Result<HttpResponse, ApiError> {
            *self.0.lock().unwrap() += 1;
            Ok(HttpResponse::new(403, r#"{"message":"403 Forbidden"}"#))
        }
    }

    let transport = Arc::new(Forbidden(Mutex::new(0)));
    let client = ClientBuilder::new("https://gitlab.example.com")
        .credential(Credential::OAuth2(stale_token(Some("refresh-1"))))
        .transport(transport.clone())
        .build()
        .unwrap();

    let err = client.current_user().await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
    assert_eq!(*transport.0.lock().unwrap(), 1);
}
