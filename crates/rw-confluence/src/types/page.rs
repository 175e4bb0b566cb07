//! Remote Confluence page snapshot types.

use serde::{Deserialize, Serialize};

use crate::path;

/// Page already published in the remote space.
///
/// Only includes the fields reconciliation reads.
/// Serde ignores unknown fields from the API response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RemotePage {
    /// Page ID.
    pub id: String,
    /// Page title.
    #[serde(default)]
    pub title: String,
    /// Content properties written by the publisher.
    #[serde(default)]
    pub metadata: Option<PageMetadata>,
    /// Ancestor pages, root-most first.
    #[serde(default)]
    pub ancestors: Vec<PageRef>,
}

/// Publisher-owned content properties of a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PageMetadata {
    /// Local path the page was last published from.
    #[serde(
        rename = "fileName",
        default,
        deserialize_with = "path::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub file_name: Option<String>,
}

/// Reference to a page by ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct PageRef {
    /// Page ID.
    pub id: String,
}

impl RemotePage {
    /// Create a page snapshot without metadata or ancestors.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            metadata: None,
            ancestors: Vec::new(),
        }
    }

    /// Set the publisher file name (normalized).
    #[must_use]
    pub fn with_file_name(mut self, file_name: &str) -> Self {
        self.metadata = Some(PageMetadata {
            file_name: Some(path::normalize(file_name).into_owned()),
        });
        self
    }

    /// Append an ancestor ID (call root-most first).
    #[must_use]
    pub fn with_ancestor(mut self, id: impl Into<String>) -> Self {
        self.ancestors.push(PageRef { id: id.into() });
        self
    }

    /// Local path this page was published from, if the publisher manages it.
    pub fn file_name(&self) -> Option<&str> {
        self.metadata.as_ref()?.file_name.as_deref()
    }

    /// Immediate parent page ID.
    pub fn parent_id(&self) -> Option<&str> {
        self.ancestors.last().map(|a| a.id.as_str())
    }

    /// Whether `id` appears anywhere in this page's ancestor chain.
    pub fn has_ancestor(&self, id: &str) -> bool {
        self.ancestors.iter().any(|a| a.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_api_shape() {
        let json = r#"{
            "id": "42",
            "title": "Guide",
            "type": "page",
            "metadata": {"fileName": "docs\\guide.xml"},
            "ancestors": [{"id": "1", "title": "Root"}, {"id": "7"}]
        }"#;
        let page: RemotePage = serde_json::from_str(json).unwrap();
        assert_eq!(page.file_name(), Some("docs/guide.xml"));
        assert_eq!(page.parent_id(), Some("7"));
        assert!(page.has_ancestor("1"));
        assert!(!page.has_ancestor("42"));
    }

    #[test]
    fn test_deserialize_unmanaged_page() {
        let page: RemotePage = serde_json::from_str(r#"{"id": "9", "title": "Notes"}"#).unwrap();
        assert_eq!(page.file_name(), None);
        assert_eq!(page.parent_id(), None);
    }
}
