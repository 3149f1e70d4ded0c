//
//  gitlab-client
//  api/tags.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Repository Tags API
//!
//! Types and operations for repository tags.
//!
//! ## API Endpoints
//!
//! ```text
//! GET/POST   /projects/:id/repository/tags
//! GET/DELETE /projects/:id/repository/tags/:tag_name
//! ```
//!
//! Tag names are percent-encoded in the path, so names containing `/`
//! (e.g. `env/test-tag`) address a single tag.
//!
//! ## Example
//!
//! ```rust,ignore
//! use gitlab_client::api::{SortOrder, TagListOptions, TagOrderBy};
//!
//! let options = TagListOptions {
//!     order_by: Some(TagOrderBy::Updated),
//!     sort: Some(SortOrder::Desc),
//!     search: Some("^v1".to_string()),
//! };
//! let tags = client.list_tags("group/project", &options).await?;
//!
//! let tag = client.create_tag("group/project", "v1.2.0", "main", Some("Release 1.2.0")).await?;
//! println!("Created {} at {}", tag.name, tag.commit.short_id);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{encode_path_segment, Page, Pager, ProjectRef, SortOrder};
use super::{ApiError, GitLabClient, Query};

/// A repository tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,

    /// Annotation message; `None` for lightweight tags.
    #[serde(default)]
    pub message: Option<String>,

    /// Object id the tag points at (tag object for annotated tags).
    #[serde(default)]
    pub target: Option<String>,

    pub commit: Commit,

    /// Release attached to the tag.
    #[serde(default)]
    pub release: Option<TagRelease>,

    #[serde(default)]
    pub protected: bool,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A commit as embedded in tag and release responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    pub id: String,

    pub short_id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub author_name: Option<String>,

    #[serde(default)]
    pub author_email: Option<String>,

    #[serde(default)]
    pub authored_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub committer_name: Option<String>,

    #[serde(default)]
    pub committer_email: Option<String>,

    #[serde(default)]
    pub committed_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub parent_ids: Vec<String>,

    #[serde(default)]
    pub web_url: Option<String>,
}

/// Release summary embedded in a [`Tag`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRelease {
    pub tag_name: String,

    #[serde(default)]
    pub description: Option<String>,
}

/// Ordering for tag lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TagOrderBy {
    Name,
    Updated,
    Version,
}

impl TagOrderBy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Updated => "updated",
            Self::Version => "version",
        }
    }
}

/// Filters for [`GitLabClient::list_tags`].
///
/// `search` accepts GitLab's syntax: `^term` matches a prefix and `term$`
/// a suffix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagListOptions {
    pub order_by: Option<TagOrderBy>,
    pub sort: Option<SortOrder>,
    pub search: Option<String>,
}

impl TagListOptions {
    fn to_query(&self) -> Query {
        let mut query = Query::new();
        if let Some(order_by) = self.order_by {
            query.push(("order_by".to_string(), order_by.as_str().to_string()));
        }
        if let Some(sort) = self.sort {
            query.push(("sort".to_string(), sort.as_str().to_string()));
        }
        if let Some(search) = &self.search {
            query.push(("search".to_string(), search.clone()));
        }
        query
    }
}

#[derive(Debug, Serialize)]
struct CreateTagRequest<'a> {
    tag_name: &'a str,
    #[serde(rename = "ref")]
    git_ref: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

fn tags_path(project: &ProjectRef) -> String {
    format!("/projects/{}/repository/tags", project.to_path_segment())
}

fn tag_path(project: &ProjectRef, tag_name: &str) -> String {
    format!("{}/{}", tags_path(project), encode_path_segment(tag_name))
}

impl GitLabClient {
    /// Lists every tag of a project, following pagination.
    pub async fn list_tags(
        &self,
        project: impl Into<ProjectRef>,
        options: &TagListOptions,
    ) -> Result<Vec<Tag>, ApiError> {
        self.get_all(&tags_path(&project.into()), options.to_query())
            .await
    }

    /// Lists one page of tags.
    pub async fn list_tags_page(
        &self,
        project: impl Into<ProjectRef>,
        options: &TagListOptions,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Tag>, ApiError> {
        self.get_page(&tags_path(&project.into()), options.to_query(), page, per_page)
            .await
    }

    /// Returns a pager over a project's tags.
    pub fn tags_pager(&self, project: impl Into<ProjectRef>, options: &TagListOptions) -> Pager<Tag> {
        self.pager(&tags_path(&project.into()), options.to_query())
    }

    /// Gets a single tag.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] with status 404 if the tag does not exist.
    pub async fn get_tag(
        &self,
        project: impl Into<ProjectRef>,
        tag_name: &str,
    ) -> Result<Tag, ApiError> {
        self.get(&tag_path(&project.into(), tag_name)).await
    }

    /// Gets a single tag, or `None` if it does not exist.
    pub async fn get_optional_tag(
        &self,
        project: impl Into<ProjectRef>,
        tag_name: &str,
    ) -> Result<Option<Tag>, ApiError> {
        self.get_optional(&tag_path(&project.into(), tag_name))
            .await
    }

    /// Creates a tag.
    ///
    /// # Parameters
    ///
    /// - `tag_name`: Name of the new tag.
    /// - `git_ref`: Branch name or commit SHA to tag.
    /// - `message`: Creates an annotated tag when present.
    pub async fn create_tag(
        &self,
        project: impl Into<ProjectRef>,
        tag_name: &str,
        git_ref: &str,
        message: Option<&str>,
    ) -> Result<Tag, ApiError> {
        if tag_name.trim().is_empty() {
            return Err(ApiError::InvalidRequest("tag name is required".to_string()));
        }

        let body = CreateTagRequest {
            tag_name,
            git_ref,
            message,
        };
        self.post(&tags_path(&project.into()), &body).await
    }

    /// Deletes a tag.
    pub async fn delete_tag(
        &self,
        project: impl Into<ProjectRef>,
        tag_name: &str,
    ) -> Result<(), ApiError> {
        self.delete(&tag_path(&project.into(), tag_name)).await
    }
}
