//! Publish target parsing.
//!
//! A publish target is given as a Confluence URL, either a page
//! (`https://host/wiki/spaces/DEV/pages/123/Title`) or a space overview
//! (`https://host/wiki/spaces/DEV/overview`).

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Pattern for page and space-overview URLs.
static PARENT_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[^/]+(?:/[^/]+)*?/wiki/spaces/([^/?#]+)/(?:pages/(\d+)(?:[/?#].*)?|overview/?(?:[?#].*)?)$")
        .expect("invalid parent url regex")
});

/// Pattern capturing scheme and host of a URL.
static SERVER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(https?://[^/?#]+)").expect("invalid server regex"));

/// Space and optional parent page under which documents are published.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParentReference {
    /// Space key. Empty when the source URL did not match.
    pub space: String,
    /// Parent page ID. `None` publishes at the space root.
    pub parent: Option<String>,
}

impl ParentReference {
    /// Target the root of `space`.
    #[must_use]
    pub fn space(space: impl Into<String>) -> Self {
        Self {
            space: space.into(),
            parent: None,
        }
    }

    /// Target page `parent` in `space`.
    #[must_use]
    pub fn page(space: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            space: space.into(),
            parent: Some(parent.into()),
        }
    }

    /// Parse a page or space-overview URL.
    ///
    /// Non-matching input yields an empty space and no parent; check
    /// [`is_valid`](Self::is_valid) before publishing.
    pub fn from_url(url: &str) -> Self {
        let Some(caps) = PARENT_URL_PATTERN.captures(url.trim()) else {
            return Self::default();
        };
        Self {
            space: caps[1].to_owned(),
            parent: caps.get(2).map(|m| m.as_str().to_owned()),
        }
    }

    /// Whether a space key is present.
    pub fn is_valid(&self) -> bool {
        !self.space.is_empty()
    }
}

/// Scheme and host of `url`, e.g. `https://example.atlassian.net`.
pub fn server_from_url(url: &str) -> Option<String> {
    SERVER_PATTERN
        .captures(url.trim())
        .map(|caps| caps[1].to_owned())
}

/// Add `https://` when no scheme is given and drop trailing slashes.
pub fn normalize_server_url(server: &str) -> String {
    let server = server.trim().trim_end_matches('/');
    if server.starts_with("http://") || server.starts_with("https://") {
        server.to_owned()
    } else {
        format!("https://{server}")
    }
}

/// Web URL of a page.
pub fn page_url(server: &str, space: &str, id: &str) -> String {
    format!(
        "{}/wiki/spaces/{space}/pages/{id}",
        server.trim_end_matches('/')
    )
}
