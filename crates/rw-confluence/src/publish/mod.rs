//! Two-pass publishing of a document batch.
//!
//! This module provides [`SpacePublisher`], which drives a batch of rendered
//! documents into a Confluence space through a [`SpaceExecutor`]:
//!
//! 1. Resolve attachment references and flatten their paths
//! 2. Reconcile against the remote snapshot and flatten folder indexes
//! 3. Rewrite links to existing pages and execute every change in order
//! 4. Turn changes with forward references into updates, rewrite their links
//!    with the IDs learned in step 3 and execute them
//!
//! # Example
//!
//! ```
//! use rw_confluence::{
//!     DryRunExecutor, LocalDocument, ParentReference, PublishConfig, PublishRequest,
//!     SpacePublisher,
//! };
//!
//! let documents = vec![
//!     LocalDocument::new("a.xml", "A", r#"<a href="b.xml">B</a>"#),
//!     LocalDocument::new("b.xml", "B", r#"<a href="a.xml">A</a>"#),
//! ];
//! let config = PublishConfig {
//!     server: "https://example.atlassian.net".to_owned(),
//!     parent: ParentReference::page("DEV", "100"),
//! };
//!
//! let mut executor = DryRunExecutor::new();
//! let mut publisher = SpacePublisher::new(&mut executor, config);
//! let result = publisher.publish(&PublishRequest::new(&documents)).unwrap();
//!
//! assert_eq!(result.created.len(), 2);
//! assert!(result.unresolved.is_empty());
//! ```

mod dry_run;
mod executor;
mod result;

pub use dry_run::{DryRunExecutor, RecordedOperation};
pub use executor::{SpaceExecutor, SpacePublisher};
pub use result::{PublishResult, PublishedPage};

use crate::parent::ParentReference;
use crate::types::{LocalDocument, RemotePage};

/// Where and how to publish.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// Confluence server URL (scheme and host).
    pub server: String,
    /// Target space and parent page.
    pub parent: ParentReference,
}

/// Inputs of one publish run.
#[derive(Debug, Clone, Copy)]
pub struct PublishRequest<'a> {
    /// Rendered documents.
    pub documents: &'a [LocalDocument],
    /// Published resource files that attachment references resolve against.
    pub resources: &'a [String],
    /// Snapshot of the pages currently under the parent.
    pub existing: &'a [RemotePage],
}

impl<'a> PublishRequest<'a> {
    /// Publish `documents` into an empty space with no resources.
    #[must_use]
    pub fn new(documents: &'a [LocalDocument]) -> Self {
        Self {
            documents,
            resources: &[],
            existing: &[],
        }
    }

    /// Set the remote snapshot.
    #[must_use]
    pub fn existing(mut self, existing: &'a [RemotePage]) -> Self {
        self.existing = existing;
        self
    }

    /// Set the published resource files.
    #[must_use]
    pub fn resources(mut self, resources: &'a [String]) -> Self {
        self.resources = resources;
        self
    }
}
