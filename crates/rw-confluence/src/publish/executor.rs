//! Publish driver implementation.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::attachments::{find_attachments, update_image_paths};
use crate::diff::build_changes;
use crate::error::PublishError;
use crate::flatten::{flatten_indexes, pages_by_file_name};
use crate::links::{FileToPageTable, convert_for_second_pass, resolve_links};
use crate::parent::page_url;
use crate::types::{
    Ancestor, ContentCreate, ContentDelete, ContentUpdate, LocalDocument, SpaceChange,
};

use super::result::{PublishResult, PublishedPage};
use super::{PublishConfig, PublishRequest};

/// Applies changes to the remote space.
///
/// Implementations own transport, authentication and retries. Every change
/// handed over has its ancestors resolved to page IDs.
pub trait SpaceExecutor {
    /// Error returned by remote operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Create a page and return its ID.
    fn create(&mut self, change: &ContentCreate) -> Result<String, Self::Error>;

    /// Update a page. The executor picks the next version number.
    fn update(&mut self, change: &ContentUpdate) -> Result<(), Self::Error>;

    /// Delete a page.
    fn delete(&mut self, change: &ContentDelete) -> Result<(), Self::Error>;

    /// Upload (or replace) attachment `file` on page `page_id`.
    fn upload_attachment(&mut self, page_id: &str, file: &str) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    First,
    Second,
}

/// Publishes document batches through a [`SpaceExecutor`].
pub struct SpacePublisher<'a, E: SpaceExecutor> {
    executor: &'a mut E,
    config: PublishConfig,
}

impl<'a, E: SpaceExecutor> SpacePublisher<'a, E> {
    /// Create a new publisher.
    #[must_use]
    pub fn new(executor: &'a mut E, config: PublishConfig) -> Self {
        Self { executor, config }
    }

    /// Compute the ordered changes for a batch without executing anything.
    ///
    /// Link rewriting is not applied; see [`publish`](Self::publish).
    pub fn plan(&self, request: &PublishRequest<'_>) -> Vec<SpaceChange> {
        let documents = Self::prepare_documents(request);
        let parent = &self.config.parent;
        let changes = build_changes(&documents, parent, request.existing);
        flatten_indexes(
            changes,
            &pages_by_file_name(request.existing),
            parent.parent.as_deref(),
        )
    }

    /// Publish a batch.
    ///
    /// Executes the planned changes in order, then re-publishes pages whose
    /// links pointed at pages created in the same batch. Links that remain
    /// unresolved are logged and listed in [`PublishResult::unresolved`].
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the target has no space key
    /// - a change references a parent that was never created
    /// - the executor fails
    pub fn publish(&mut self, request: &PublishRequest<'_>) -> Result<PublishResult, PublishError> {
        if !self.config.parent.is_valid() {
            return Err(PublishError::InvalidParent);
        }

        let changes = self.plan(request);
        info!(
            changes = changes.len(),
            documents = request.documents.len(),
            "Planned publish"
        );

        // Pages deleted by this run must not become link targets.
        let deleted: HashSet<&str> = changes
            .iter()
            .filter_map(|change| match change {
                SpaceChange::Delete(delete) => Some(delete.id.as_str()),
                _ => None,
            })
            .collect();
        let mut table = FileToPageTable::from_pages(
            request
                .existing
                .iter()
                .filter(|page| !deleted.contains(page.id.as_str())),
        );
        let mut result = PublishResult::default();

        let first = resolve_links(&table, changes, &self.config.server, &self.config.parent);
        for change in first.resolved {
            self.execute(change, Pass::First, &mut table, &mut result)?;
        }

        if !first.deferred.is_empty() {
            let second = convert_for_second_pass(&table, first.deferred);
            let second = resolve_links(&table, second, &self.config.server, &self.config.parent);
            for change in second.resolved {
                self.execute(change, Pass::Second, &mut table, &mut result)?;
            }
            for change in &second.deferred {
                let file = change.file_name().unwrap_or_default();
                warn!(file, "Links still unresolved after second pass");
                result.unresolved.push(file.to_owned());
            }
        }

        info!(
            created = result.created.len(),
            updated = result.updated.len(),
            deleted = result.deleted.len(),
            relinked = result.relinked,
            "Published"
        );
        Ok(result)
    }

    fn prepare_documents(request: &PublishRequest<'_>) -> Vec<LocalDocument> {
        request
            .documents
            .iter()
            .map(|document| {
                let mut prepared = document.clone();
                prepared.attachments =
                    find_attachments(document.body.value(), request.resources, &document.path);
                prepared.body.storage.value = update_image_paths(document.body.value());
                prepared
            })
            .collect()
    }

    fn execute(
        &mut self,
        change: SpaceChange,
        pass: Pass,
        table: &mut FileToPageTable,
        result: &mut PublishResult,
    ) -> Result<(), PublishError> {
        match change {
            SpaceChange::Create(mut create) => {
                resolve_ancestors(&mut create.ancestors, table)?;
                let id = self
                    .executor
                    .create(&create)
                    .map_err(|e| PublishError::executor(&create.file_name, e))?;
                debug!(file = %create.file_name, id = %id, "Created page");
                table.insert(&create.file_name, &id);
                self.upload_attachments(&id, &create.attachments, result)?;
                result.created.push(self.published(create.file_name, id));
            }
            SpaceChange::Update(mut update) => {
                resolve_ancestors(&mut update.ancestors, table)?;
                self.executor
                    .update(&update)
                    .map_err(|e| PublishError::executor(&update.file_name, e))?;
                debug!(file = %update.file_name, id = %update.id, "Updated page");
                table.insert(&update.file_name, &update.id);
                match pass {
                    Pass::First => {
                        self.upload_attachments(&update.id, &update.attachments, result)?;
                        result
                            .updated
                            .push(self.published(update.file_name, update.id));
                    }
                    Pass::Second => result.relinked += 1,
                }
            }
            SpaceChange::Delete(delete) => {
                self.executor
                    .delete(&delete)
                    .map_err(|e| PublishError::executor(&delete.id, e))?;
                debug!(id = %delete.id, "Deleted page");
                result.deleted.push(delete.id);
            }
        }
        Ok(())
    }

    fn upload_attachments(
        &mut self,
        page_id: &str,
        attachments: &[String],
        result: &mut PublishResult,
    ) -> Result<(), PublishError> {
        for file in attachments {
            self.executor
                .upload_attachment(page_id, file)
                .map_err(|e| PublishError::executor(file, e))?;
            result.attachments_uploaded += 1;
        }
        Ok(())
    }

    fn published(&self, file_name: String, id: String) -> PublishedPage {
        PublishedPage {
            url: page_url(&self.config.server, &self.config.parent.space, &id),
            file_name,
            id,
        }
    }
}

/// Replace placeholder ancestors with the IDs their creates returned.
fn resolve_ancestors(
    ancestors: &mut [Ancestor],
    table: &FileToPageTable,
) -> Result<(), PublishError> {
    for ancestor in ancestors.iter_mut() {
        if let Ancestor::Pending(file) = ancestor {
            let id = table
                .get(file)
                .ok_or_else(|| PublishError::UnknownAncestor(file.clone()))?;
            *ancestor = Ancestor::Id(id.to_owned());
        }
    }
    Ok(())
}
