//
//  gitlab-client
//  api/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Common API Types
//!
//! Shared pieces used by every endpoint module:
//!
//! - [`ProjectRef`] - A project addressed by numeric id or namespace path
//! - [`encode_path_segment`] - Percent-encoding for ids, paths and tag names
//! - [`SortOrder`] - The `sort` query parameter
//! - Pagination types (re-exported from the [`pagination`] submodule)
//!
//! # Example
//!
//! ```rust
//! use gitlab_client::api::common::{encode_path_segment, ProjectRef};
//!
//! let by_path = ProjectRef::from("group/subgroup/project");
//! assert_eq!(by_path.to_path_segment(), "group%2Fsubgroup%2Fproject");
//!
//! let by_id = ProjectRef::from(42_u64);
//! assert_eq!(by_id.to_path_segment(), "42");
//!
//! assert_eq!(encode_path_segment("env/test-tag"), "env%2Ftest-tag");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

mod pagination;

pub use pagination::*;

/// A project reference accepted by every project-scoped endpoint.
///
/// GitLab accepts either the numeric project id or the URL-encoded full path
/// (`namespace/project`) in the `:id` position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProjectRef {
    /// Numeric project id.
    Id(u64),
    /// Full path with namespace, e.g. `gitlab-org/gitlab`.
    Path(String),
}

impl ProjectRef {
    /// Returns the value to place in a URL path, percent-encoded.
    pub fn to_path_segment(&self) -> String {
        match self {
            Self::Id(id) => id.to_string(),
            Self::Path(path) => encode_path_segment(path),
        }
    }
}

impl fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Path(path) => f.write_str(path),
        }
    }
}

impl From<u64> for ProjectRef {
    fn from(id: u64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for ProjectRef {
    /// Numeric strings become ids; anything else is a path.
    fn from(value: &str) -> Self {
        match value.parse::<u64>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Path(value.trim_matches('/').to_string()),
        }
    }
}

impl From<String> for ProjectRef {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<&ProjectRef> for ProjectRef {
    fn from(value: &ProjectRef) -> Self {
        value.clone()
    }
}

/// Percent-encodes a single URL path segment.
///
/// Everything except RFC 3986 unreserved characters (`A-Z a-z 0-9 - . _ ~`)
/// is encoded, including `/`, so tag names such as `env/test-tag` and project
/// paths stay one segment.
pub fn encode_path_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Sort direction for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// The query parameter value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
