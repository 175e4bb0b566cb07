//! Remote pages with no local counterpart.

use std::collections::HashSet;

use crate::path;
use crate::types::{LocalDocument, RemotePage};

/// Existing pages that are safe to delete.
///
/// A page is retained when a local document has its file name, when it is the
/// folder page of a folder that still holds local documents, when the
/// publisher does not manage it (no file name), or when it appears in the
/// ancestor chain of another retained page. Everything else is deletable.
pub fn find_deletable<'a>(
    documents: &[LocalDocument],
    existing: &'a [RemotePage],
) -> Vec<&'a RemotePage> {
    let local_paths: HashSet<&str> = documents.iter().map(|d| d.path.as_str()).collect();
    let local_folders: HashSet<String> = documents
        .iter()
        .flat_map(|d| path::parent_chain(&d.path))
        .collect();

    let mut retained: Vec<bool> = existing
        .iter()
        .map(|page| match page.file_name() {
            Some(file) => local_paths.contains(file) || local_folders.contains(file),
            None => true,
        })
        .collect();

    // Ancestor lists may be partial, so propagate until nothing changes.
    loop {
        let mut changed = false;
        for (i, page) in existing.iter().enumerate() {
            if retained[i] {
                continue;
            }
            let load_bearing = existing
                .iter()
                .zip(&retained)
                .any(|(other, &kept)| kept && other.id != page.id && other.has_ancestor(&page.id));
            if load_bearing {
                tracing::debug!(id = %page.id, "Keeping page that is an active ancestor");
                retained[i] = true;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    existing
        .iter()
        .zip(retained)
        .filter_map(|(page, kept)| (!kept).then_some(page))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(path: &str) -> LocalDocument {
        LocalDocument::new(path, "", "")
    }

    fn ids(pages: &[&RemotePage]) -> Vec<String> {
        pages.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn test_orphan_is_deletable() {
        let existing = vec![RemotePage::new("1", "Old").with_file_name("old.xml")];
        assert_eq!(ids(&find_deletable(&[], &existing)), vec!["1"]);
    }

    #[test]
    fn test_matched_page_is_kept() {
        let existing = vec![RemotePage::new("42", "X").with_file_name("x.xml")];
        assert!(find_deletable(&[doc("x.xml")], &existing).is_empty());
    }

    #[test]
    fn test_active_ancestor_is_kept() {
        let existing = vec![
            RemotePage::new("1", "Old").with_file_name("old.xml"),
            RemotePage::new("2", "Kept")
                .with_file_name("kept.xml")
                .with_ancestor("1"),
        ];
        assert!(find_deletable(&[doc("kept.xml")], &existing).is_empty());
    }

    #[test]
    fn test_ancestor_of_deleted_page_is_deletable() {
        let existing = vec![
            RemotePage::new("1", "Old").with_file_name("old"),
            RemotePage::new("2", "Gone")
                .with_file_name("old/gone.xml")
                .with_ancestor("1"),
        ];
        assert_eq!(ids(&find_deletable(&[], &existing)), vec!["1", "2"]);
    }

    #[test]
    fn test_partial_ancestor_chains_propagate() {
        // Each page only lists its immediate parent.
        let existing = vec![
            RemotePage::new("1", "A").with_file_name("a"),
            RemotePage::new("2", "B").with_file_name("a/b").with_ancestor("1"),
            RemotePage::new("3", "C")
                .with_file_name("moved.xml")
                .with_ancestor("2"),
        ];
        assert!(find_deletable(&[doc("moved.xml")], &existing).is_empty());
    }

    #[test]
    fn test_folder_with_local_documents_is_kept() {
        let existing = vec![RemotePage::new("5", "Guide").with_file_name("guide")];
        assert!(find_deletable(&[doc("guide/index.xml")], &existing).is_empty());
    }

    #[test]
    fn test_unmanaged_page_is_kept() {
        let existing = vec![RemotePage::new("9", "Hand written")];
        assert!(find_deletable(&[], &existing).is_empty());
    }

    #[test]
    fn test_backslash_file_names_match() {
        let existing = vec![RemotePage::new("3", "C").with_file_name(r"a\c.xml")];
        assert!(find_deletable(&[doc(r"a\c.xml")], &existing).is_empty());
    }
}
