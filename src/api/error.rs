//
//  gitlab-client
//  api/error.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # API Errors
//!
//! [`ApiError`] is the single error type returned by every client operation.
//!
//! GitLab reports failures in a handful of body shapes:
//!
//! ```text
//! {"message": "404 Project Not Found"}
//! {"message": {"name": ["has already been taken"]}}
//! {"error": "invalid_token", "error_description": "Token is expired."}
//! {"error": "insufficient_scope"}
//! ```
//!
//! [`extract_error_message`] turns any of them into one readable line.

use reqwest::StatusCode;
use thiserror::Error;

use crate::auth::AuthError;

/// Boxed error used for transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by API operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered 401 and no refresh could fix it.
    ///
    /// `refresh_error` is set when a refresh was attempted and failed; it is
    /// `None` for non-OAuth2 sessions and for a 401 on the retried request.
    #[error("unauthorized: {message}")]
    Unauthorized {
        message: String,
        #[source]
        refresh_error: Option<AuthError>,
    },

    /// Any other non-2xx status.
    #[error("{} ({status})", http_summary(.body))]
    Http { status: StatusCode, body: String },

    /// The request could not be exchanged with the server at all.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// The response body did not match the expected model.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Logging in or refreshing failed outside of a 401 retry.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The request could not be built from the given arguments.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

fn http_summary(body: &str) -> String {
    extract_error_message(body).unwrap_or_else(|| "API error".to_string())
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(Box::new(error))
    }
}

impl ApiError {
    /// Builds an error from a non-2xx response.
    pub fn from_response(status: StatusCode, body: String) -> Self {
        if status == StatusCode::UNAUTHORIZED {
            Self::Unauthorized {
                message: extract_error_message(&body).unwrap_or_else(|| status.to_string()),
                refresh_error: None,
            }
        } else {
            Self::Http { status, body }
        }
    }

    /// The HTTP status behind this error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// A readable message for display.
    pub fn message(&self) -> String {
        match self {
            Self::Unauthorized { message, .. } => message.clone(),
            Self::Http { status, body } => {
                extract_error_message(body).unwrap_or_else(|| status.to_string())
            }
            other => other.to_string(),
        }
    }

    /// Returns `true` for 404 responses.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Returns `true` for 401 responses.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// The refresh failure attached to a 401, if one was attempted.
    pub fn refresh_error(&self) -> Option<&AuthError> {
        match self {
            Self::Unauthorized { refresh_error, .. } => refresh_error.as_ref(),
            _ => None,
        }
    }
}

/// Pulls a human readable message out of a GitLab error body.
///
/// Returns `None` when the body is not JSON or carries none of the known
/// fields.
pub fn extract_error_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;

    if let Some(message) = json.get("message") {
        if let Some(text) = flatten_message(message) {
            return Some(text);
        }
    }

    if let Some(description) = json.get("error_description").and_then(|v| v.as_str()) {
        return Some(description.to_string());
    }

    if let Some(error) = json.get("error").and_then(|v| v.as_str()) {
        return Some(error.to_string());
    }

    None
}

fn flatten_message(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(text) => Some(text.clone()),
        serde_json::Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(flatten_message).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        // Validation errors: {"name": ["has already been taken"]}
        serde_json::Value::Object(fields) => {
            let parts: Vec<String> = fields
                .iter()
                .filter_map(|(field, detail)| {
                    flatten_message(detail).map(|detail| format!("{} {}", field, detail))
                })
                .collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        _ => None,
    }
}
