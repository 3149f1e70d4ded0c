//
//  gitlab-client
//  api/protected_tags.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Protected Tags API
//!
//! A protected tag restricts who may create tags matching a name or wildcard
//! (`release-*`).
//!
//! ## API Endpoints
//!
//! ```text
//! GET/POST   /projects/:id/protected_tags
//! GET/DELETE /projects/:id/protected_tags/:name
//! ```
//!
//! ## Access levels
//!
//! GitLab encodes roles as integers:
//!
//! | Level | Role |
//! |-------|------|
//! | 0 | No access |
//! | 5 | Minimal access |
//! | 10 | Guest |
//! | 20 | Reporter |
//! | 30 | Developer |
//! | 40 | Maintainer |
//! | 50 | Owner |
//! | 60 | Admin |

use std::fmt;

use serde::{Deserialize, Serialize};

use super::common::{encode_path_segment, ProjectRef};
use super::{ApiError, GitLabClient};

/// A GitLab role, serialized as its numeric level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum AccessLevel {
    NoAccess,
    Minimal,
    Guest,
    Reporter,
    Developer,
    Maintainer,
    Owner,
    Admin,
    /// A level this client does not know by name.
    Other(u32),
}

impl From<u32> for AccessLevel {
    fn from(value: u32) -> Self {
        match value {
            0 => Self::NoAccess,
            5 => Self::Minimal,
            10 => Self::Guest,
            20 => Self::Reporter,
            30 => Self::Developer,
            40 => Self::Maintainer,
            50 => Self::Owner,
            60 => Self::Admin,
            other => Self::Other(other),
        }
    }
}

impl From<AccessLevel> for u32 {
    fn from(level: AccessLevel) -> Self {
        match level {
            AccessLevel::NoAccess => 0,
            AccessLevel::Minimal => 5,
            AccessLevel::Guest => 10,
            AccessLevel::Reporter => 20,
            AccessLevel::Developer => 30,
            AccessLevel::Maintainer => 40,
            AccessLevel::Owner => 50,
            AccessLevel::Admin => 60,
            AccessLevel::Other(value) => value,
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAccess => f.write_str("No access"),
            Self::Minimal => f.write_str("Minimal access"),
            Self::Guest => f.write_str("Guest"),
            Self::Reporter => f.write_str("Reporter"),
            Self::Developer => f.write_str("Developer"),
            Self::Maintainer => f.write_str("Maintainer"),
            Self::Owner => f.write_str("Owner"),
            Self::Admin => f.write_str("Admin"),
            Self::Other(value) => write!(f, "Level {}", value),
        }
    }
}

impl std::str::FromStr for AccessLevel {
    type Err = String;

    /// Parses a role name (`developer`, `maintainer`, ...) or a number.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if let Ok(level) = value.parse::<u32>() {
            return Ok(Self::from(level));
        }
        match value.to_ascii_lowercase().as_str() {
            "none" | "no_access" | "noaccess" => Ok(Self::NoAccess),
            "minimal" => Ok(Self::Minimal),
            "guest" => Ok(Self::Guest),
            "reporter" => Ok(Self::Reporter),
            "developer" => Ok(Self::Developer),
            "maintainer" => Ok(Self::Maintainer),
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown access level: {}", other)),
        }
    }
}

/// One access rule of a protected tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedTagAccessLevel {
    #[serde(default)]
    pub id: Option<u64>,

    pub access_level: AccessLevel,

    #[serde(default)]
    pub access_level_description: Option<String>,

    #[serde(default)]
    pub user_id: Option<u64>,

    #[serde(default)]
    pub group_id: Option<u64>,
}

/// A protected tag rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedTag {
    /// Tag name or wildcard.
    pub name: String,

    #[serde(default)]
    pub create_access_levels: Vec<ProtectedTagAccessLevel>,
}

#[derive(Debug, Serialize)]
struct ProtectTagRequest<'a> {
    name: &'a str,
    create_access_level: AccessLevel,
}

fn protected_tags_path(project: &ProjectRef) -> String {
    format!("/projects/{}/protected_tags", project.to_path_segment())
}

fn protected_tag_path(project: &ProjectRef, name: &str) -> String {
    format!("{}/{}", protected_tags_path(project), encode_path_segment(name))
}

impl GitLabClient {
    /// Lists a project's protected tags.
    pub async fn list_protected_tags(
        &self,
        project: impl Into<ProjectRef>,
    ) -> Result<Vec<ProtectedTag>, ApiError> {
        self.get_all(&protected_tags_path(&project.into()), Vec::new())
            .await
    }

    /// Gets a single protected tag or wildcard.
    pub async fn get_protected_tag(
        &self,
        project: impl Into<ProjectRef>,
        name: &str,
    ) -> Result<ProtectedTag, ApiError> {
        self.get(&protected_tag_path(&project.into(), name)).await
    }

    /// Gets a protected tag, or `None` if the name is not protected.
    pub async fn get_optional_protected_tag(
        &self,
        project: impl Into<ProjectRef>,
        name: &str,
    ) -> Result<Option<ProtectedTag>, ApiError> {
        self.get_optional(&protected_tag_path(&project.into(), name))
            .await
    }

    /// Protects a tag or wildcard.
    ///
    /// `create_access_level` is the minimum role allowed to create matching
    /// tags; GitLab defaults to Maintainer.
    pub async fn protect_tag(
        &self,
        project: impl Into<ProjectRef>,
        name: &str,
        create_access_level: AccessLevel,
    ) -> Result<ProtectedTag, ApiError> {
        let body = ProtectTagRequest {
            name,
            create_access_level,
        };
        self.post(&protected_tags_path(&project.into()), &body)
            .await
    }

    /// Removes protection from a tag or wildcard.
    pub async fn unprotect_tag(
        &self,
        project: impl Into<ProjectRef>,
        name: &str,
    ) -> Result<(), ApiError> {
        self.delete(&protected_tag_path(&project.into(), name))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_level_numeric_serde() {
        let json = r#"{
            "name": "release-1-0",
            "create_access_levels": [
                {"id": 1, "access_level": 40, "access_level_description": "Maintainers"},
                {"id": 2, "access_level": 15, "access_level_description": "Planner"}
            ]
        }"#;
        let tag: ProtectedTag = serde_json::from_str(json).unwrap();
        assert_eq!(tag.create_access_levels[0].access_level, AccessLevel::Maintainer);
        assert_eq!(tag.create_access_levels[1].access_level, AccessLevel::Other(15));

        let body = ProtectTagRequest {
            name: "v*",
            create_access_level: AccessLevel::Developer,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["create_access_level"], 30);
    }

    #[test]
    fn test_access_level_from_str() {
        assert_eq!("developer".parse::<AccessLevel>(), Ok(AccessLevel::Developer));
        assert_eq!("40".parse::<AccessLevel>(), Ok(AccessLevel::Maintainer));
        assert!("wizard".parse::<AccessLevel>().is_err());
    }

    #[test]
    fn test_access_level_round_trips_every_known_level() {
        for level in [0u32, 5, 10, 20, 30, 40, 50, 60] {
            assert_eq!(u32::from(AccessLevel::from(level)), level);
        }
    }

    #[test]
    fn test_protected_tag_path_encodes_wildcard() {
        assert_eq!(
            protected_tag_path(&ProjectRef::Id(3), "release-*"),
            "/projects/3/protected_tags/release-%2A"
        );
    }
}
