//! Content operations produced by reconciliation.

use serde::Serialize;

use super::document::ContentBody;

/// Confluence content type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Regular page.
    #[default]
    Page,
}

/// Confluence content status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    /// Published. Reconciliation only writes published pages.
    #[default]
    Current,
}

/// Parent reference on a create or update.
///
/// Serializes as `{"id": ..}` or `{"pending": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Ancestor {
    /// Existing page ID.
    Id(String),
    /// File name of a page created earlier in the same batch; replaced with
    /// its ID once the create has run.
    Pending(String),
}

impl Ancestor {
    /// Page ID, if already known.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Id(id) => Some(id),
            Self::Pending(_) => None,
        }
    }
}

/// Create a new page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentCreate {
    pub title: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub space: String,
    pub status: ContentStatus,
    /// Parent chain; the last entry is the immediate parent. Empty at space root.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ancestors: Vec<Ancestor>,
    pub body: ContentBody,
    pub file_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
}

/// Update an existing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentUpdate {
    pub id: String,
    /// Always `None` here; the executor assigns the next version at call time.
    pub version: Option<u32>,
    pub title: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub status: ContentStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ancestors: Vec<Ancestor>,
    pub body: ContentBody,
    pub file_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
}

/// Delete a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentDelete {
    pub id: String,
}

/// One operation against the remote space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SpaceChange {
    Create(ContentCreate),
    Update(ContentUpdate),
    Delete(ContentDelete),
}

impl ContentCreate {
    /// Create a current page with no attachments.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        space: impl Into<String>,
        body: ContentBody,
        file_name: impl Into<String>,
        ancestors: Vec<Ancestor>,
    ) -> Self {
        Self {
            title: title.into(),
            content_type: ContentType::Page,
            space: space.into(),
            status: ContentStatus::Current,
            ancestors,
            body,
            file_name: file_name.into(),
            attachments: Vec::new(),
        }
    }

    /// Turn into an update of page `id`, keeping content and placement.
    #[must_use]
    pub fn into_update(self, id: impl Into<String>) -> ContentUpdate {
        ContentUpdate {
            id: id.into(),
            version: None,
            title: self.title,
            content_type: self.content_type,
            status: self.status,
            ancestors: self.ancestors,
            body: self.body,
            file_name: self.file_name,
            attachments: self.attachments,
        }
    }
}

impl ContentUpdate {
    /// Update page `id` with no attachments.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        body: ContentBody,
        file_name: impl Into<String>,
        ancestors: Vec<Ancestor>,
    ) -> Self {
        Self {
            id: id.into(),
            version: None,
            title: title.into(),
            content_type: ContentType::Page,
            status: ContentStatus::Current,
            ancestors,
            body,
            file_name: file_name.into(),
            attachments: Vec::new(),
        }
    }
}

impl SpaceChange {
    /// File name of a create or update.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            Self::Create(c) => Some(&c.file_name),
            Self::Update(u) => Some(&u.file_name),
            Self::Delete(_) => None,
        }
    }

    /// Title of a create or update.
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Create(c) => Some(&c.title),
            Self::Update(u) => Some(&u.title),
            Self::Delete(_) => None,
        }
    }

    /// Body of a create or update.
    pub fn body(&self) -> Option<&ContentBody> {
        match self {
            Self::Create(c) => Some(&c.body),
            Self::Update(u) => Some(&u.body),
            Self::Delete(_) => None,
        }
    }

    pub(crate) fn body_mut(&mut self) -> Option<&mut ContentBody> {
        match self {
            Self::Create(c) => Some(&mut c.body),
            Self::Update(u) => Some(&mut u.body),
            Self::Delete(_) => None,
        }
    }

    /// Ancestors of a create or update; empty for deletes.
    pub fn ancestors(&self) -> &[Ancestor] {
        match self {
            Self::Create(c) => &c.ancestors,
            Self::Update(u) => &u.ancestors,
            Self::Delete(_) => &[],
        }
    }

    /// Replace title, body and attachments with those of `other`.
    ///
    /// Placement and identity are kept. No-op when either side is a delete.
    pub(crate) fn take_content(&mut self, other: SpaceChange) {
        let (title, body, attachments) = match other {
            Self::Create(c) => (c.title, c.body, c.attachments),
            Self::Update(u) => (u.title, u.body, u.attachments),
            Self::Delete(_) => return,
        };
        match self {
            Self::Create(c) => {
                c.title = title;
                c.body = body;
                c.attachments = attachments;
            }
            Self::Update(u) => {
                u.title = title;
                u.body = body;
                u.attachments = attachments;
            }
            Self::Delete(_) => {}
        }
    }

    /// Turn a create or update into an update of page `id` with no version.
    ///
    /// Returns `None` for deletes.
    #[must_use]
    pub fn into_update(self, id: &str) -> Option<ContentUpdate> {
        match self {
            Self::Create(create) => Some(create.into_update(id)),
            Self::Update(mut update) => {
                id.clone_into(&mut update.id);
                update.version = None;
                Some(update)
            }
            Self::Delete(_) => None,
        }
    }

    /// Page ID targeted by an update or delete.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Create(_) => None,
            Self::Update(u) => Some(&u.id),
            Self::Delete(d) => Some(&d.id),
        }
    }
}
