//! Publish result types.

use serde::Serialize;

/// Result of a publish run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PublishResult {
    /// Pages created, in execution order.
    pub created: Vec<PublishedPage>,
    /// Pages updated in the first pass.
    pub updated: Vec<PublishedPage>,
    /// IDs of deleted pages.
    pub deleted: Vec<String>,
    /// Pages updated again in the second pass to fix forward links.
    pub relinked: usize,
    /// Number of attachments uploaded.
    pub attachments_uploaded: usize,
    /// File names of pages that still hold unresolved links.
    pub unresolved: Vec<String>,
}

/// A page the run created or updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedPage {
    /// Local file name.
    pub file_name: String,
    /// Page ID.
    pub id: String,
    /// Page web URL.
    pub url: String,
}
