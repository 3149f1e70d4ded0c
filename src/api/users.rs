//
//  gitlab-client
//  api/users.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Users API
//!
//! ## API Endpoints
//!
//! ```text
//! GET            /user
//! GET/POST       /users
//! GET/PUT/DELETE /users/:id
//! POST           /users/:id/block
//! POST           /users/:id/unblock
//! ```
//!
//! Creating, updating, deleting, blocking and unblocking users require an
//! administrator token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ApiError, GitLabClient, Query};
use crate::auth::{serialize_optional_secret, SecretValue};

/// A GitLab user.
///
/// Administrator-only fields (`email`, `is_admin`, ...) are `None` when the
/// token cannot see them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,

    pub username: String,

    #[serde(default)]
    pub name: String,

    /// `active`, `blocked`, `deactivated`, ...
    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub avatar_url: Option<String>,

    #[serde(default)]
    pub web_url: Option<String>,

    #[serde(default)]
    pub bio: Option<String>,

    #[serde(default)]
    pub is_admin: Option<bool>,

    #[serde(default)]
    pub bot: bool,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_blocked(&self) -> bool {
        self.state.as_deref() == Some("blocked")
    }
}

/// Filters for [`GitLabClient::list_users`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserListOptions {
    pub search: Option<String>,
    pub active: bool,
    pub blocked: bool,
}

impl UserListOptions {
    fn to_query(&self) -> Query {
        let mut query = Query::new();
        if let Some(search) = &self.search {
            query.push(("search".to_string(), search.clone()));
        }
        if self.active {
            query.push(("active".to_string(), "true".to_string()));
        }
        if self.blocked {
            query.push(("blocked".to_string(), "true".to_string()));
        }
        query
    }
}

/// Parameters for [`GitLabClient::create_user`].
///
/// Either `password` or `reset_password` must be set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateUser {
    pub email: String,
    pub username: String,
    pub name: String,

    #[serde(
        serialize_with = "serialize_optional_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub password: Option<SecretValue>,

    /// Send the user a password reset link instead of setting a password.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub reset_password: bool,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub skip_confirmation: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<bool>,
}

/// Parameters for [`GitLabClient::update_user`]. Unset fields are left
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<bool>,
}

fn user_path(user_id: u64) -> String {
    format!("/users/{}", user_id)
}

impl GitLabClient {
    /// Gets the user the current credential belongs to.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.get("/user").await
    }

    /// Gets a user by id.
    pub async fn get_user(&self, user_id: u64) -> Result<User, ApiError> {
        self.get(&user_path(user_id)).await
    }

    /// Gets a user by id, or `None` if it does not exist.
    pub async fn get_optional_user(&self, user_id: u64) -> Result<Option<User>, ApiError> {
        self.get_optional(&user_path(user_id)).await
    }

    /// Looks a user up by exact username.
    pub async fn find_user(&self, username: &str) -> Result<Option<User>, ApiError> {
        let query = vec![("username".to_string(), username.to_string())];
        let users: Vec<User> = self.get_with_query("/users", query).await?;
        Ok(users.into_iter().next())
    }

    /// Lists users, following pagination.
    pub async fn list_users(&self, options: &UserListOptions) -> Result<Vec<User>, ApiError> {
        self.get_all("/users", options.to_query()).await
    }

    /// Creates a user.
    pub async fn create_user(&self, params: &CreateUser) -> Result<User, ApiError> {
        if params.username.trim().is_empty() || params.email.trim().is_empty() {
            return Err(ApiError::InvalidRequest(
                "username and email are required".to_string(),
            ));
        }
        let has_password = params.password.as_ref().is_some_and(|p| !p.is_empty());
        if !has_password && !params.reset_password {
            return Err(ApiError::InvalidRequest(
                "either a password or reset_password is required".to_string(),
            ));
        }
        self.post("/users", params).await
    }

    /// Updates a user.
    pub async fn update_user(&self, user_id: u64, params: &UpdateUser) -> Result<User, ApiError> {
        if params == &UpdateUser::default() {
            return Err(ApiError::InvalidRequest(
                "nothing to update: set at least one field".to_string(),
            ));
        }
        self.put(&user_path(user_id), params).await
    }

    /// Deletes a user.
    ///
    /// With `hard_delete`, contributions are removed instead of being moved
    /// to the ghost user.
    pub async fn delete_user(&self, user_id: u64, hard_delete: bool) -> Result<(), ApiError> {
        let mut query = Query::new();
        if hard_delete {
            query.push(("hard_delete".to_string(), "true".to_string()));
        }
        self.delete_with_query(&user_path(user_id), query).await
    }

    /// Blocks a user.
    pub async fn block_user(&self, user_id: u64) -> Result<(), ApiError> {
        self.post_empty(&format!("{}/block", user_path(user_id)))
            .await
    }

    /// Unblocks a user.
    pub async fn unblock_user(&self, user_id: u64) -> Result<(), ApiError> {
        self.post_empty(&format!("{}/unblock", user_path(user_id)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_deserialize() {
        let json = r#"{
            "id": 1,
            "username": "john_smith",
            "name": "John Smith",
            "state": "blocked",
            "avatar_url": "http://localhost:3000/uploads/user/avatar/1/cd8.jpeg",
            "web_url": "http://localhost:3000/john_smith",
            "created_at": "2012-05-23T08:00:58Z",
            "bio": "",
            "bot": false
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.username, "john_smith");
        assert!(user.is_blocked());
        assert!(user.email.is_none());
    }

    #[test]
    fn test_create_user_serializes_password() {
        let params = CreateUser {
            email: "jane@example.com".to_string(),
            username: "jane".to_string(),
            name: "Jane".to_string(),
            password: Some(SecretValue::new("hunter22hunter")),
            ..CreateUser::default()
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["password"], "hunter22hunter");
        assert!(value.get("reset_password").is_none());
        assert!(!format!("{:?}", params).contains("hunter22hunter"));
    }

    #[test]
    fn test_user_list_query() {
        let options = UserListOptions {
            search: Some("jo".to_string()),
            blocked: true,
            ..UserListOptions::default()
        };
        assert_eq!(
            options.to_query(),
            vec![
                ("search".to_string(), "jo".to_string()),
                ("blocked".to_string(), "true".to_string()),
            ]
        );
    }
}
