//
//  gitlab-client
//  api/releases.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Releases API
//!
//! Releases are addressed by the tag they are attached to.
//!
//! ## API Endpoints
//!
//! ```text
//! GET/POST       /projects/:id/releases
//! GET/PUT/DELETE /projects/:id/releases/:tag_name
//! ```
//!
//! Creating a release for a tag that does not exist creates the tag from
//! `ref`. Deleting a release leaves the tag in place.
//!
//! ## Example
//!
//! ```rust,ignore
//! use gitlab_client::api::CreateRelease;
//!
//! let release = client
//!     .create_release(
//!         "group/project",
//!         &CreateRelease::new("v1.2.0")
//!             .name("Version 1.2.0")
//!             .description("## Changes\n- Faster builds"),
//!     )
//!     .await?;
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{encode_path_segment, ProjectRef, SortOrder};
use super::tags::Commit;
use super::{ApiError, GitLabClient, Query};

/// A project release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub tag_name: String,

    #[serde(default)]
    pub name: Option<String>,

    /// Release notes in Markdown.
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub released_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub upcoming_release: bool,

    #[serde(default)]
    pub author: Option<ReleaseAuthor>,

    #[serde(default)]
    pub commit: Option<Commit>,

    #[serde(default)]
    pub assets: Option<ReleaseAssets>,
}

/// The user who created a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAuthor {
    pub id: u64,
    pub username: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub avatar_url: Option<String>,

    #[serde(default)]
    pub web_url: Option<String>,
}

/// Source archives and links attached to a release.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAssets {
    #[serde(default)]
    pub count: u32,

    #[serde(default)]
    pub sources: Vec<ReleaseSource>,

    #[serde(default)]
    pub links: Vec<ReleaseLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseSource {
    pub format: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseLink {
    pub id: u64,
    pub name: String,
    pub url: String,

    #[serde(default)]
    pub link_type: Option<String>,
}

/// Ordering for release lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseOrderBy {
    ReleasedAt,
    CreatedAt,
}

impl ReleaseOrderBy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReleasedAt => "released_at",
            Self::CreatedAt => "created_at",
        }
    }
}

/// Filters for [`GitLabClient::list_releases`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseListOptions {
    pub order_by: Option<ReleaseOrderBy>,
    pub sort: Option<SortOrder>,
}

impl ReleaseListOptions {
    fn to_query(&self) -> Query {
        let mut query = Query::new();
        if let Some(order_by) = self.order_by {
            query.push(("order_by".to_string(), order_by.as_str().to_string()));
        }
        if let Some(sort) = self.sort {
            query.push(("sort".to_string(), sort.as_str().to_string()));
        }
        query
    }
}

/// Parameters for [`GitLabClient::create_release`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateRelease {
    pub tag_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Branch or commit to create the tag from when it does not exist yet.
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,

    /// Message for the tag when one is created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub released_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub milestones: Vec<String>,
}

impl CreateRelease {
    /// Starts a release for `tag_name`.
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            ..Self::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn git_ref(mut self, git_ref: impl Into<String>) -> Self {
        self.git_ref = Some(git_ref.into());
        self
    }
}

/// Parameters for [`GitLabClient::update_release`]. Unset fields are left
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateRelease {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub released_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestones: Option<Vec<String>>,
}

impl UpdateRelease {
    fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn releases_path(project: &ProjectRef) -> String {
    format!("/projects/{}/releases", project.to_path_segment())
}

fn release_path(project: &ProjectRef, tag_name: &str) -> String {
    format!("{}/{}", releases_path(project), encode_path_segment(tag_name))
}

impl GitLabClient {
    /// Lists every release of a project, following pagination.
    pub async fn list_releases(
        &self,
        project: impl Into<ProjectRef>,
        options: &ReleaseListOptions,
    ) -> Result<Vec<Release>, ApiError> {
        self.get_all(&releases_path(&project.into()), options.to_query())
            .await
    }

    /// Gets the release attached to `tag_name`.
    pub async fn get_release(
        &self,
        project: impl Into<ProjectRef>,
        tag_name: &str,
    ) -> Result<Release, ApiError> {
        self.get(&release_path(&project.into(), tag_name)).await
    }

    /// Gets a release, or `None` if the tag has none.
    pub async fn get_optional_release(
        &self,
        project: impl Into<ProjectRef>,
        tag_name: &str,
    ) -> Result<Option<Release>, ApiError> {
        self.get_optional(&release_path(&project.into(), tag_name))
            .await
    }

    /// Creates a release.
    pub async fn create_release(
        &self,
        project: impl Into<ProjectRef>,
        params: &CreateRelease,
    ) -> Result<Release, ApiError> {
        if params.tag_name.trim().is_empty() {
            return Err(ApiError::InvalidRequest("tag name is required".to_string()));
        }
        self.post(&releases_path(&project.into()), params).await
    }

    /// Updates a release.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] when no field is set.
    pub async fn update_release(
        &self,
        project: impl Into<ProjectRef>,
        tag_name: &str,
        params: &UpdateRelease,
    ) -> Result<Release, ApiError> {
        if params.is_empty() {
            return Err(ApiError::InvalidRequest(
                "nothing to update: set at least one field".to_string(),
            ));
        }
        self.put(&release_path(&project.into(), tag_name), params)
            .await
    }

    /// Deletes a release and returns it. The tag is kept.
    pub async fn delete_release(
        &self,
        project: impl Into<ProjectRef>,
        tag_name: &str,
    ) -> Result<Release, ApiError> {
        self.delete_returning(&release_path(&project.into(), tag_name))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_deserialize() {
        let json = r###"{
            "tag_name": "v0.1",
            "description": "## CHANGELOG\r\n\r\n- Remove limit of 100 when searching repository code. !8671",
            "name": "Awesome app v0.1 alpha",
            "created_at": "2019-01-03T01:55:18.203Z",
            "released_at": "2019-01-03T01:55:18.203Z",
            "author": {
                "id": 1,
                "name": "Administrator",
                "username": "root",
                "state": "active",
                "avatar_url": "https://www.gravatar.com/avatar/e64c7d89f26bd1972efa854d13d7dd61?s=80&d=identicon",
                "web_url": "https://gitlab.example.com/root"
            },
            "commit": {
                "id": "f8d3d94cbd347e924aa7b715845e439d00e80ca4",
                "short_id": "f8d3d94c",
                "title": "Initial commit",
                "parent_ids": []
            },
            "upcoming_release": false,
            "assets": {
                "count": 2,
                "sources": [
                    {"format": "zip", "url": "https://gitlab.example.com/root/app/-/archive/v0.1/app-v0.1.zip"}
                ],
                "links": []
            }
        }"###;

        let release: Release = serde_json::from_str(json).unwrap();
        assert_eq!(release.tag_name, "v0.1");
        assert_eq!(release.author.unwrap().username, "root");
        assert_eq!(release.commit.unwrap().short_id, "f8d3d94c");
        assert_eq!(release.assets.unwrap().sources[0].format, "zip");
    }

    #[test]
    fn test_create_release_body() {
        let params = CreateRelease::new("v1.0")
            .name("One")
            .git_ref("main");
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["tag_name"], "v1.0");
        assert_eq!(value["ref"], "main");
        assert!(value.get("description").is_none());
        assert!(value.get("milestones").is_none());
    }

    #[test]
    fn test_update_release_is_empty() {
        assert!(UpdateRelease::default().is_empty());
        let params = UpdateRelease {
            description: Some("notes".to_string()),
            ..UpdateRelease::default()
        };
        assert!(!params.is_empty());
    }
}
