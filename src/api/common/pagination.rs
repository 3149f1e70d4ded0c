//
//  gitlab-client
//  api/common/pagination.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Pagination for GitLab list endpoints
//!
//! GitLab paginates with `page` and `per_page` query parameters and reports
//! the position in response headers:
//!
//! | Header | Meaning |
//! |--------|---------|
//! | `X-Page` | Current page (1-indexed) |
//! | `X-Per-Page` | Items per page |
//! | `X-Total` | Total number of items |
//! | `X-Total-Pages` | Total number of pages |
//! | `X-Next-Page` | Next page, empty on the last page |
//!
//! `X-Total` and `X-Total-Pages` are omitted for very large collections, so
//! the next page is always driven by `X-Next-Page`.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut pager = client.pager::<Tag>(&path, query);
//! while let Some(page) = pager.next().await? {
//!     for tag in page {
//!         println!("{}", tag.name);
//!     }
//! }
//! ```

use serde::de::DeserializeOwned;

use crate::api::transport::HttpResponse;
use crate::api::{ApiError, GitLabClient};

/// Default page size used when the caller does not choose one.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Largest page size GitLab accepts.
pub const MAX_PER_PAGE: u32 = 100;

/// One page of a list endpoint.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: Option<u64>,
    pub total_pages: Option<u32>,
    pub next_page: Option<u32>,
}

impl<T: DeserializeOwned> Page<T> {
    /// Parses a page from a list response.
    ///
    /// Missing headers fall back to `requested_page` and `requested_per_page`.
    pub fn from_response(
        response: &HttpResponse,
        requested_page: u32,
        requested_per_page: u32,
    ) -> Result<Self, ApiError> {
        let items: Vec<T> = response.json()?;

        Ok(Self {
            page: header_number(response, "x-page").unwrap_or(requested_page),
            per_page: header_number(response, "x-per-page").unwrap_or(requested_per_page),
            total: header_number(response, "x-total"),
            total_pages: header_number(response, "x-total-pages"),
            next_page: header_number(response, "x-next-page"),
            items,
        })
    }
}

impl<T> Page<T> {
    /// Returns `true` if GitLab reported a following page.
    pub fn has_next(&self) -> bool {
        self.next_page.is_some()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

fn header_number<N: std::str::FromStr>(response: &HttpResponse, name: &str) -> Option<N> {
    response
        .header(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| value.parse().ok())
}

/// Walks a list endpoint page by page.
///
/// Each call to [`next`](Self::next) is one request through the client, so
/// every page gets the same refresh-and-retry treatment as a single call.
#[derive(Debug)]
pub struct Pager<T> {
    client: GitLabClient,
    path: String,
    query: Vec<(String, String)>,
    per_page: u32,
    next_page: Option<u32>,
    total: Option<u64>,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Pager<T> {
    pub(crate) fn new(
        client: GitLabClient,
        path: String,
        query: Vec<(String, String)>,
        per_page: u32,
    ) -> Self {
        Self {
            client,
            path,
            query,
            per_page: per_page.clamp(1, MAX_PER_PAGE),
            next_page: Some(1),
            total: None,
            _marker: std::marker::PhantomData,
        }
    }

    /// Fetches the next page, or `None` once the last page has been read.
    pub async fn next(&mut self) -> Result<Option<Page<T>>, ApiError> {
        let Some(page_number) = self.next_page else {
            return Ok(None);
        };

        let page: Page<T> = self
            .client
            .get_page(&self.path, self.query.clone(), page_number, self.per_page)
            .await?;

        self.total = page.total.or(self.total);
        // Guard against a server that keeps pointing at the same page.
        self.next_page = page.next_page.filter(|next| *next > page_number);

        Ok(Some(page))
    }

    /// Total item count, known after the first page if GitLab reported it.
    pub fn total_items(&self) -> Option<u64> {
        self.total
    }

    /// Reads every remaining page into one vector.
    pub async fn collect_all(mut self) -> Result<Vec<T>, ApiError> {
        let mut items = Vec::new();
        while let Some(page) = self.next().await? {
            items.extend(page.items);
        }
        Ok(items)
    }
}
