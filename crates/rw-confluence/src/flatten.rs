//! Folder index flattening.
//!
//! An `index` document is the landing content of its folder, not a child
//! page. Flattening moves its title, body and attachments onto the folder's
//! page and drops the separate change.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::path;
use crate::types::{Ancestor, RemotePage, SpaceChange};

/// Index remote pages by their publisher file name.
///
/// Unmanaged pages are skipped; the first page wins on duplicates.
pub fn pages_by_file_name(pages: &[RemotePage]) -> HashMap<&str, &RemotePage> {
    let mut map = HashMap::new();
    for page in pages {
        if let Some(file) = page.file_name() {
            map.entry(file).or_insert(page);
        }
    }
    map
}

/// Merge index documents into their folder pages.
///
/// - `index.xml` at the root updates `root_page_id`; without a root page it
///   passes through unchanged.
/// - `<folder>/index.xml` merges into the change for `<folder>` emitted
///   earlier in `changes`, or becomes an update of the existing remote folder
///   page (keeping its ancestors). With neither it is dropped.
/// - Everything else passes through.
pub fn flatten_indexes(
    changes: Vec<SpaceChange>,
    existing_folders: &HashMap<&str, &RemotePage>,
    root_page_id: Option<&str>,
) -> Vec<SpaceChange> {
    let mut flattened: Vec<SpaceChange> = Vec::with_capacity(changes.len());

    for change in changes {
        let Some(folder) = change.file_name().and_then(path::index_folder) else {
            flattened.push(change);
            continue;
        };
        let folder = folder.to_owned();

        if folder.is_empty() {
            match root_page_id {
                Some(root) => {
                    debug!(root, "Publishing root index onto parent page");
                    if let Some(mut update) = change.into_update(root) {
                        update.ancestors.clear();
                        flattened.push(SpaceChange::Update(update));
                    }
                }
                None => flattened.push(change),
            }
            continue;
        }

        if let Some(target) = flattened
            .iter_mut()
            .find(|c| c.file_name() == Some(folder.as_str()))
        {
            debug!(folder = %folder, "Merging index into folder page");
            target.take_content(change);
        } else if let Some(page) = existing_folders.get(folder.as_str()) {
            debug!(folder = %folder, id = %page.id, "Publishing index onto existing folder page");
            if let Some(mut update) = change.into_update(&page.id) {
                update.file_name = folder;
                update.ancestors = page
                    .ancestors
                    .iter()
                    .map(|a| Ancestor::Id(a.id.clone()))
                    .collect();
                flattened.push(SpaceChange::Update(update));
            }
        } else {
            warn!(folder = %folder, "No folder page for index document, dropping it");
        }
    }

    flattened
}
