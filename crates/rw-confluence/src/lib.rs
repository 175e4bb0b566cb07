//! Confluence publishing for RW.
//!
//! This crate maps a tree of rendered documents onto a Confluence page tree:
//! - [`build_changes`]: reconcile local documents against the remote snapshot
//! - [`flatten_indexes`]: publish folder `index` documents onto folder pages
//! - [`resolve_links`]: rewrite relative links into page URLs, in two passes
//! - [`SpacePublisher`]: drive all of the above through a [`SpaceExecutor`]
//!
//! Transport is out of scope: a [`SpaceExecutor`] implementation owns HTTP,
//! authentication and retries. [`DryRunExecutor`] records operations instead.
//!
//! # Example
//!
//! ```
//! use rw_confluence::{LocalDocument, ParentReference, SpaceChange, build_changes};
//!
//! let parent = ParentReference::from_url(
//!     "https://example.atlassian.net/wiki/spaces/DEV/pages/100/Docs",
//! );
//! let documents = vec![LocalDocument::new("guide/intro.xml", "Intro", "<p>Hi</p>")];
//!
//! let changes = build_changes(&documents, &parent, &[]);
//! let files: Vec<_> = changes.iter().filter_map(SpaceChange::file_name).collect();
//! assert_eq!(files, ["guide", "guide/intro.xml"]);
//! ```

// Path helpers
pub mod path;

// Publish target
mod parent;
pub use parent::{ParentReference, normalize_server_url, page_url, server_from_url};

// Types
mod types;
pub use types::{
    Ancestor, ContentBody, ContentCreate, ContentDelete, ContentStatus, ContentType,
    ContentUpdate, LocalDocument, PageMetadata, PageRef, RemotePage, SpaceChange, Storage,
};

// Reconciliation
mod attachments;
mod deletion;
mod diff;
mod flatten;
pub use attachments::{find_attachments, update_image_paths};
pub use deletion::find_deletable;
pub use diff::build_changes;
pub use flatten::{flatten_indexes, pages_by_file_name};

// Link rewriting
mod links;
pub use links::{FileToPageTable, LinkResolution, convert_for_second_pass, resolve_links};

// Publish driver
mod publish;
pub use publish::{
    DryRunExecutor, PublishConfig, PublishRequest, PublishResult, PublishedPage,
    RecordedOperation, SpaceExecutor, SpacePublisher,
};

// Errors
pub mod error;
pub use error::PublishError;
