//
//  gitlab-client
//  config/hosts.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Host Utilities
//!
//! Host names are stored normalized: no `https://` prefix, no trailing
//! slash, lowercase. A plain-HTTP server keeps its `http://` prefix so the
//! base URL can be rebuilt from the stored name.
//!
//! ```rust
//! use gitlab_client::config::{base_url_for, normalize_host};
//!
//! assert_eq!(normalize_host("https://GitLab.com/"), "gitlab.com");
//! assert_eq!(base_url_for("gitlab.com"), "https://gitlab.com");
//! assert_eq!(base_url_for("http://localhost:8080"), "http://localhost:8080");
//! ```

/// The host used when nothing else is configured.
pub const DEFAULT_HOST: &str = "gitlab.com";

/// Normalizes a host for storage and comparison.
///
/// # Notes
///
/// - `https://` is dropped since it is the default scheme.
/// - `http://` is kept, lowercased.
/// - Paths are kept, so GitLab instances under a relative URL root work.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let host = strip_prefix_ignore_case(host, "https://").unwrap_or(host);
    let host = host.trim_end_matches('/');
    match strip_prefix_ignore_case(host, "http://") {
        Some(rest) => format!("http://{}", rest.to_lowercase()),
        None => host.to_lowercase(),
    }
}

/// Builds the server root URL for a normalized host.
pub fn base_url_for(host: &str) -> String {
    let host = normalize_host(host);
    if host.starts_with("http://") {
        host
    } else {
        format!("https://{}", host)
    }
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &value[prefix.len()..])
}
