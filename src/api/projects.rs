//
//  gitlab-client
//  api/projects.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Projects API
//!
//! Types and operations for GitLab projects.
//!
//! ## API Endpoints
//!
//! ```text
//! GET/POST       /projects
//! GET/PUT/DELETE /projects/:id
//! ```
//!
//! `:id` is the numeric project id or the URL-encoded full path, see
//! [`ProjectRef`].
//!
//! ## Notes
//!
//! - Deleting a project is asynchronous on the server; GitLab answers
//!   `202 Accepted` and may keep the project in a pending-delete state.
//! - `visibility` is one of `private`, `internal` or `public`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{Page, ProjectRef, SortOrder};
use super::{ApiError, GitLabClient, Query};

/// Project visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Internal,
    Public,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Internal => "internal",
            Self::Public => "public",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The namespace (user or group) a project lives in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    pub id: u64,
    pub name: String,
    pub path: String,

    /// `user` or `group`.
    #[serde(default)]
    pub kind: Option<String>,

    #[serde(default)]
    pub full_path: Option<String>,
}

/// A GitLab project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,

    pub name: String,

    #[serde(default)]
    pub name_with_namespace: Option<String>,

    pub path: String,

    pub path_with_namespace: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub default_branch: Option<String>,

    #[serde(default)]
    pub visibility: Option<Visibility>,

    pub web_url: String,

    #[serde(default)]
    pub http_url_to_repo: Option<String>,

    #[serde(default)]
    pub ssh_url_to_repo: Option<String>,

    #[serde(default)]
    pub namespace: Option<Namespace>,

    #[serde(default)]
    pub archived: bool,

    #[serde(default)]
    pub star_count: u64,

    #[serde(default)]
    pub forks_count: u64,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub last_activity_at: Option<DateTime<Utc>>,
}

impl From<&Project> for ProjectRef {
    fn from(project: &Project) -> Self {
        Self::Id(project.id)
    }
}

/// Ordering for project lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ProjectOrderBy {
    Id,
    Name,
    Path,
    CreatedAt,
    UpdatedAt,
    LastActivityAt,
}

impl ProjectOrderBy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Path => "path",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::LastActivityAt => "last_activity_at",
        }
    }
}

/// Filters for [`GitLabClient::list_projects`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectListOptions {
    pub search: Option<String>,
    /// Only projects owned by the current user.
    pub owned: bool,
    /// Only projects the current user is a member of.
    pub membership: bool,
    pub visibility: Option<Visibility>,
    pub archived: Option<bool>,
    pub order_by: Option<ProjectOrderBy>,
    pub sort: Option<SortOrder>,
}

impl ProjectListOptions {
    fn to_query(&self) -> Query {
        let mut query = Query::new();
        if let Some(search) = &self.search {
            query.push(("search".to_string(), search.clone()));
        }
        if self.owned {
            query.push(("owned".to_string(), "true".to_string()));
        }
        if self.membership {
            query.push(("membership".to_string(), "true".to_string()));
        }
        if let Some(visibility) = self.visibility {
            query.push(("visibility".to_string(), visibility.as_str().to_string()));
        }
        if let Some(archived) = self.archived {
            query.push(("archived".to_string(), archived.to_string()));
        }
        if let Some(order_by) = self.order_by {
            query.push(("order_by".to_string(), order_by.as_str().to_string()));
        }
        if let Some(sort) = self.sort {
            query.push(("sort".to_string(), sort.as_str().to_string()));
        }
        query
    }
}

/// Parameters for [`GitLabClient::create_project`].
///
/// At least one of `name` or `path` must be set; GitLab derives the other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateProject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Group or user namespace; defaults to the current user's.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace_id: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub initialize_with_readme: bool,
}

/// Parameters for [`GitLabClient::update_project`]. Unset fields are left
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateProject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
}

fn project_path(project: &ProjectRef) -> String {
    format!("/projects/{}", project.to_path_segment())
}

impl GitLabClient {
    /// Lists every project visible to the current user, following pagination.
    ///
    /// On gitlab.com this is a very large set; narrow it with `owned`,
    /// `membership` or `search`, or use [`list_projects_page`](Self::list_projects_page).
    pub async fn list_projects(&self, options: &ProjectListOptions) -> Result<Vec<Project>, ApiError> {
        self.get_all("/projects", options.to_query()).await
    }

    /// Lists one page of projects.
    pub async fn list_projects_page(
        &self,
        options: &ProjectListOptions,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Project>, ApiError> {
        self.get_page("/projects", options.to_query(), page, per_page)
            .await
    }

    /// Gets a project by id or path.
    pub async fn get_project(&self, project: impl Into<ProjectRef>) -> Result<Project, ApiError> {
        self.get(&project_path(&project.into())).await
    }

    /// Gets a project, or `None` if it does not exist or is not visible.
    pub async fn get_optional_project(
        &self,
        project: impl Into<ProjectRef>,
    ) -> Result<Option<Project>, ApiError> {
        self.get_optional(&project_path(&project.into())).await
    }

    /// Creates a project.
    pub async fn create_project(&self, params: &CreateProject) -> Result<Project, ApiError> {
        let has_name = params.name.as_deref().is_some_and(|n| !n.trim().is_empty());
        let has_path = params.path.as_deref().is_some_and(|p| !p.trim().is_empty());
        if !has_name && !has_path {
            return Err(ApiError::InvalidRequest(
                "project name or path is required".to_string(),
            ));
        }
        self.post("/projects", params).await
    }

    /// Updates a project.
    pub async fn update_project(
        &self,
        project: impl Into<ProjectRef>,
        params: &UpdateProject,
    ) -> Result<Project, ApiError> {
        if params == &UpdateProject::default() {
            return Err(ApiError::InvalidRequest(
                "nothing to update: set at least one field".to_string(),
            ));
        }
        self.put(&project_path(&project.into()), params).await
    }

    /// Deletes a project.
    pub async fn delete_project(&self, project: impl Into<ProjectRef>) -> Result<(), ApiError> {
        self.delete(&project_path(&project.into())).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_deserialize() {
        let json = r#"{
            "id": 3,
            "description": null,
            "name": "Diaspora Project Site",
            "name_with_namespace": "Diaspora / Diaspora Project Site",
            "path": "diaspora-project-site",
            "path_with_namespace": "diaspora/diaspora-project-site",
            "created_at": "2013-09-30T13:46:02Z",
            "default_branch": "main",
            "ssh_url_to_repo": "git@example.com:diaspora/diaspora-project-site.git",
            "http_url_to_repo": "http://example.com/diaspora/diaspora-project-site.git",
            "web_url": "http://example.com/diaspora/diaspora-project-site",
            "visibility": "private",
            "namespace": {"id": 3, "name": "Diaspora", "path": "diaspora", "kind": "group", "full_path": "diaspora"},
            "archived": false,
            "star_count": 1,
            "forks_count": 0,
            "last_activity_at": "2013-09-30T13:46:02Z"
        }"#;

        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.id, 3);
        assert_eq!(project.visibility, Some(Visibility::Private));
        assert_eq!(project.namespace.as_ref().unwrap().kind.as_deref(), Some("group"));
        assert_eq!(ProjectRef::from(&project), ProjectRef::Id(3));
    }

    #[test]
    fn test_list_options_query() {
        let options = ProjectListOptions {
            search: Some("runner".to_string()),
            owned: true,
            visibility: Some(Visibility::Public),
            ..ProjectListOptions::default()
        };
        let query = options.to_query();
        assert!(query.contains(&("owned".to_string(), "true".to_string())));
        assert!(query.contains(&("visibility".to_string(), "public".to_string())));
        assert!(!query.iter().any(|(k, _)| k == "membership"));
    }

    #[test]
    fn test_create_project_body_skips_defaults() {
        let params = CreateProject {
            name: Some("demo".to_string()),
            ..CreateProject::default()
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value, serde_json::json!({"name": "demo"}));
    }
}
