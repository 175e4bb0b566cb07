//! Data model shared by the reconciliation passes.

mod change;
mod document;
mod page;

pub use change::{
    Ancestor, ContentCreate, ContentDelete, ContentStatus, ContentType, ContentUpdate, SpaceChange,
};
pub use document::{ContentBody, LocalDocument, Storage};
pub use page::{PageMetadata, PageRef, RemotePage};
