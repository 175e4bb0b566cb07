//! Local rendered document types.

use serde::{Deserialize, Serialize};

use crate::path;

/// Representation name of Confluence storage format.
const STORAGE_REPRESENTATION: &str = "storage";

/// Rendered local file destined for publication.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalDocument {
    /// Path relative to the site root, `/`-separated.
    #[serde(deserialize_with = "path::deserialize")]
    pub path: String,
    /// Publication title.
    #[serde(default)]
    pub title: String,
    /// Title as written in the source document.
    #[serde(default)]
    pub original_title: String,
    /// Page body.
    pub body: ContentBody,
    /// Attachment files referenced by the body, resolved against published resources.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
}

/// Page body content.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContentBody {
    /// Storage format content.
    pub storage: Storage,
}

/// Storage format representation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Storage {
    /// HTML content in Confluence storage format.
    pub value: String,
    /// Content representation (always "storage").
    #[serde(default = "default_representation")]
    pub representation: String,
}

fn default_representation() -> String {
    STORAGE_REPRESENTATION.to_owned()
}

impl ContentBody {
    /// Wrap storage-format markup.
    #[must_use]
    pub fn storage(value: impl Into<String>) -> Self {
        Self {
            storage: Storage {
                value: value.into(),
                representation: default_representation(),
            },
        }
    }

    /// Empty body used for folder placeholder pages.
    #[must_use]
    pub fn empty() -> Self {
        Self::storage("")
    }

    /// Storage-format markup.
    pub fn value(&self) -> &str {
        &self.storage.value
    }
}

impl LocalDocument {
    /// Create a document; `path` is normalized.
    #[must_use]
    pub fn new(path: &str, title: impl Into<String>, body: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            path: path::normalize(path).into_owned(),
            original_title: title.clone(),
            title,
            body: ContentBody::storage(body),
            attachments: Vec::new(),
        }
    }

    /// Title to publish under.
    ///
    /// Falls back to the original title, then to the capitalized file stem.
    pub fn display_title(&self) -> String {
        if !self.title.is_empty() {
            return self.title.clone();
        }
        if !self.original_title.is_empty() {
            return self.original_title.clone();
        }
        path::capitalize(path::file_stem(&self.path))
    }
}
