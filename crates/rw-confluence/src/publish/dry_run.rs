//! In-memory executor that records operations instead of sending them.

use std::collections::HashMap;
use std::convert::Infallible;

use serde::Serialize;

use crate::types::{Ancestor, ContentCreate, ContentDelete, ContentUpdate, RemotePage};

use super::executor::SpaceExecutor;

/// Operation recorded by [`DryRunExecutor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "operation", rename_all = "lowercase")]
pub enum RecordedOperation {
    Create {
        id: String,
        change: ContentCreate,
    },
    Update {
        version: u32,
        change: ContentUpdate,
    },
    Delete {
        id: String,
    },
    Upload {
        page_id: String,
        file: String,
    },
}

/// Executor for previews and tests.
///
/// Assigns IDs `dry-run-1`, `dry-run-2`, ... and tracks page versions, so a
/// run through it reports exactly what a real executor would be asked to do.
#[derive(Debug, Default)]
pub struct DryRunExecutor {
    operations: Vec<RecordedOperation>,
    versions: HashMap<String, u32>,
    pages: Vec<RemotePage>,
    next_id: usize,
}

impl DryRunExecutor {
    /// Create an executor with no recorded operations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Operations in the order they were requested.
    pub fn operations(&self) -> &[RecordedOperation] {
        &self.operations
    }

    /// Consume the executor, returning its operations.
    #[must_use]
    pub fn into_operations(self) -> Vec<RecordedOperation> {
        self.operations
    }

    /// Body last written to page `id`.
    pub fn last_body(&self, id: &str) -> Option<&str> {
        self.operations.iter().rev().find_map(|op| match op {
            RecordedOperation::Create { id: created, change } if created == id => {
                Some(change.body.value())
            }
            RecordedOperation::Update { change, .. } if change.id == id => {
                Some(change.body.value())
            }
            _ => None,
        })
    }

    /// Remote pages as they would exist after the recorded operations.
    ///
    /// Feeding this back as the existing snapshot simulates a follow-up run.
    #[must_use]
    pub fn snapshot(&self) -> Vec<RemotePage> {
        self.pages.clone()
    }

    fn record_page(&mut self, id: &str, title: &str, file_name: &str, ancestors: Vec<String>) {
        let mut page = RemotePage::new(id, title).with_file_name(file_name);
        for ancestor in ancestors {
            page = page.with_ancestor(ancestor);
        }
        match self.pages.iter_mut().find(|p| p.id == id) {
            Some(existing) => *existing = page,
            None => self.pages.push(page),
        }
    }
}

fn ancestor_ids<'a>(ancestors: impl IntoIterator<Item = &'a Ancestor>) -> Vec<String> {
    ancestors
        .into_iter()
        .filter_map(|a| a.id().map(str::to_owned))
        .collect()
}

impl SpaceExecutor for DryRunExecutor {
    type Error = Infallible;

    fn create(&mut self, change: &ContentCreate) -> Result<String, Self::Error> {
        self.next_id += 1;
        let id = format!("dry-run-{}", self.next_id);
        self.versions.insert(id.clone(), 1);
        self.record_page(
            &id,
            &change.title,
            &change.file_name,
            ancestor_ids(&change.ancestors),
        );
        self.operations.push(RecordedOperation::Create {
            id: id.clone(),
            change: change.clone(),
        });
        Ok(id)
    }

    fn update(&mut self, change: &ContentUpdate) -> Result<(), Self::Error> {
        let version = self.versions.entry(change.id.clone()).or_insert(1);
        *version += 1;
        let version = *version;
        self.record_page(
            &change.id,
            &change.title,
            &change.file_name,
            ancestor_ids(&change.ancestors),
        );
        self.operations.push(RecordedOperation::Update {
            version,
            change: change.clone(),
        });
        Ok(())
    }

    fn delete(&mut self, change: &ContentDelete) -> Result<(), Self::Error> {
        self.pages.retain(|p| p.id != change.id);
        self.versions.remove(&change.id);
        self.operations.push(RecordedOperation::Delete {
            id: change.id.clone(),
        });
        Ok(())
    }

    fn upload_attachment(&mut self, page_id: &str, file: &str) -> Result<(), Self::Error> {
        self.operations.push(RecordedOperation::Upload {
            page_id: page_id.to_owned(),
            file: file.to_owned(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContentBody;

    fn create(file: &str) -> ContentCreate {
        ContentCreate::new(
            "T",
            "DEV",
            ContentBody::storage("<p/>"),
            file,
            vec![Ancestor::Id("100".to_owned())],
        )
    }

    #[test]
    fn test_sequential_ids() {
        let mut executor = DryRunExecutor::new();
        assert_eq!(executor.create(&create("a.xml")).unwrap(), "dry-run-1");
        assert_eq!(executor.create(&create("b.xml")).unwrap(), "dry-run-2");
    }

    #[test]
    fn test_update_bumps_version() {
        let mut executor = DryRunExecutor::new();
        let id = executor.create(&create("a.xml")).unwrap();
        let update = create("a.xml").into_update(id);
        executor.update(&update).unwrap();
        executor.update(&update).unwrap();
        let versions: Vec<u32> = executor
            .operations()
            .iter()
            .filter_map(|op| match op {
                RecordedOperation::Update { version, .. } => Some(*version),
                _ => None,
            })
            .collect();
        assert_eq!(versions, vec![2, 3]);
    }

    #[test]
    fn test_snapshot_reflects_operations() {
        let mut executor = DryRunExecutor::new();
        let a = executor.create(&create("a.xml")).unwrap();
        let b = executor.create(&create("b.xml")).unwrap();
        executor.delete(&ContentDelete { id: a }).unwrap();

        let snapshot = executor.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, b);
        assert_eq!(snapshot[0].file_name(), Some("b.xml"));
        assert_eq!(snapshot[0].parent_id(), Some("100"));
    }

    #[test]
    fn test_operations_serialize_tagged() {
        let mut executor = DryRunExecutor::new();
        executor.upload_attachment("7", "img/x.png").unwrap();
        let json = serde_json::to_value(executor.operations()).unwrap();
        assert_eq!(json[0]["operation"], "upload");
        assert_eq!(json[0]["page_id"], "7");
    }
}
