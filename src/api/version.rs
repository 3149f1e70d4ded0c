//
//  gitlab-client
//  api/version.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! `GET /version`: the server's GitLab version.

use serde::{Deserialize, Serialize};

use super::{ApiError, GitLabClient};

/// GitLab server version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// e.g. `16.11.1-ee`.
    pub version: String,

    /// Git revision the server was built from.
    pub revision: String,
}

impl Version {
    /// The leading `major.minor` pair, if the version string has one.
    pub fn major_minor(&self) -> Option<(u32, u32)> {
        let mut parts = self.version.split(['.', '-']);
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        Some((major, minor))
    }
}

impl GitLabClient {
    /// Gets the server version. Any valid credential can read it.
    pub async fn get_version(&self) -> Result<Version, ApiError> {
        self.get("/version").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_major_minor() {
        let version: Version =
            serde_json::from_str(r#"{"version": "16.11.1-ee", "revision": "a1b2c3d4"}"#).unwrap();
        assert_eq!(version.major_minor(), Some((16, 11)));

        let odd = Version {
            version: "unknown".to_string(),
            revision: String::new(),
        };
        assert_eq!(odd.major_minor(), None);
    }
}
