//! Page tree reconciliation.
//!
//! Maps the local file tree onto the remote page tree:
//!
//! 1. Pages with no local counterpart that nothing depends on are deleted
//! 2. Every folder on a document's path gets a page, created empty when the
//!    remote space has none
//! 3. Documents already published are updated in place (moving them when
//!    their folder changed), the rest are created
//!
//! Deletions come first, then per-document changes in input order, each
//! preceded by the folder pages it needs.

use std::collections::HashMap;

use tracing::debug;

use crate::deletion::find_deletable;
use crate::parent::ParentReference;
use crate::path;
use crate::types::{
    Ancestor, ContentBody, ContentCreate, ContentDelete, ContentUpdate, LocalDocument, RemotePage,
    SpaceChange,
};

/// Compute the operations that bring `existing` in line with `documents`.
pub fn build_changes(
    documents: &[LocalDocument],
    parent: &ParentReference,
    existing: &[RemotePage],
) -> Vec<SpaceChange> {
    let root_id = parent.parent.as_deref();
    let deletable = find_deletable(documents, existing);

    let mut changes: Vec<SpaceChange> = deletable
        .iter()
        .filter(|page| Some(page.id.as_str()) != root_id)
        .map(|page| {
            debug!(id = %page.id, file = ?page.file_name(), "Deleting page");
            SpaceChange::Delete(ContentDelete {
                id: page.id.clone(),
            })
        })
        .collect();

    let mut pages_by_file: HashMap<&str, &RemotePage> = HashMap::new();
    for page in existing {
        if deletable.iter().any(|d| d.id == page.id) {
            continue;
        }
        if let Some(file) = page.file_name() {
            pages_by_file.entry(file).or_insert(page);
        }
    }

    let root = parent.parent.clone().map(Ancestor::Id);
    let mut emitted: HashMap<String, Ancestor> = HashMap::new();

    for document in documents {
        let mut effective = root.clone();

        for folder in path::parent_chain(&document.path) {
            let ancestor = if let Some(page) = pages_by_file.get(folder.as_str()) {
                Ancestor::Id(page.id.clone())
            } else if let Some(known) = emitted.get(&folder) {
                known.clone()
            } else {
                debug!(folder = %folder, "Creating folder page");
                changes.push(SpaceChange::Create(ContentCreate::new(
                    path::capitalize(path::file_name(&folder)),
                    parent.space.clone(),
                    ContentBody::empty(),
                    folder.clone(),
                    effective.iter().cloned().collect(),
                )));
                let pending = Ancestor::Pending(folder.clone());
                emitted.insert(folder, pending.clone());
                pending
            };
            effective = Some(ancestor);
        }

        let ancestors: Vec<Ancestor> = effective.into_iter().collect();

        if let Some(page) = pages_by_file.get(document.path.as_str()) {
            let target = ancestors.last().and_then(Ancestor::id);
            if !ancestors.is_empty() && target != page.parent_id() {
                debug!(
                    file = %document.path,
                    from = ?page.parent_id(),
                    to = ?ancestors.last(),
                    "Moving page"
                );
            }
            let mut update = ContentUpdate::new(
                page.id.clone(),
                document.display_title(),
                document.body.clone(),
                document.path.clone(),
                ancestors,
            );
            update.attachments.clone_from(&document.attachments);
            emitted.insert(document.path.clone(), Ancestor::Id(page.id.clone()));
            changes.push(SpaceChange::Update(update));
        } else {
            let mut create = ContentCreate::new(
                document.display_title(),
                parent.space.clone(),
                document.body.clone(),
                document.path.clone(),
                ancestors,
            );
            create.attachments.clone_from(&document.attachments);
            emitted.insert(
                document.path.clone(),
                Ancestor::Pending(document.path.clone()),
            );
            changes.push(SpaceChange::Create(create));
        }
    }

    changes
}
