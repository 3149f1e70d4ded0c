//
//  gitlab-client
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # API Client Layer
//!
//! This module provides the typed client for GitLab's REST API v4, served at
//! `{base}/api/v4`.
//!
//! ## Architecture
//!
//! - [`client`]: [`GitLabClient`], the request executor with credential
//!   injection and the refresh-and-retry policy
//! - [`transport`]: The [`Transport`] seam and its reqwest implementation
//! - [`error`]: [`ApiError`] and GitLab error body parsing
//! - [`common`]: Project references, path encoding and pagination
//! - Resource endpoints, each adding operations to [`GitLabClient`]:
//!   [`tags`], [`protected_tags`], [`releases`], [`projects`], [`users`],
//!   [`version`]
//!
//! ## Usage
//!
//! ```rust,no_run
//! use gitlab_client::api::{GitLabClient, TagListOptions};
//!
//! # async fn run() -> Result<(), gitlab_client::api::ApiError> {
//! let client = GitLabClient::with_personal_token("https://gitlab.com", "glpat-xxxx")?;
//!
//! for tag in client.list_tags("gitlab-org/gitlab-runner", &TagListOptions::default()).await? {
//!     println!("{} -> {}", tag.name, tag.commit.short_id);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`ApiError`]:
//!
//! - `Unauthorized`: 401 that survived the refresh-and-retry policy
//! - `Http`: any other non-2xx status, with the raw body
//! - `Transport`: the server could not be reached
//! - `Decode`: the body did not match the model
//! - `Auth`: login or explicit refresh failed

pub mod client;

pub mod common;

pub mod error;

pub mod transport;

pub mod projects;

pub mod protected_tags;

pub mod releases;

pub mod tags;

pub mod users;

pub mod version;

pub use client::{ClientBuilder, GitLabClient, Query};

pub use common::{encode_path_segment, Page, Pager, ProjectRef, SortOrder};

pub use error::ApiError;

pub use transport::{ApiRequest, HttpResponse, HttpTransport, Transport};

pub use projects::*;

pub use protected_tags::*;

pub use releases::*;

pub use tags::*;

pub use users::*;

pub use version::*;
