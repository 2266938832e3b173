use crate::audit::services::Reconciliation;
use crate::ports::outbound::{IgnoreConfigStore, ProgressReporter};
use crate::shared::Result;
use std::path::Path;

/// ReconcileConfigUseCase - persists the outcome of ignore file reconciliation
///
/// Nothing is written unless the reconciler changed something. An empty
/// result removes the file instead of leaving an empty document behind.
pub struct ReconcileConfigUseCase<'a, S, P> {
    store: &'a S,
    progress_reporter: &'a P,
}

impl<'a, S, P> ReconcileConfigUseCase<'a, S, P>
where
    S: IgnoreConfigStore,
    P: ProgressReporter,
{
    pub fn new(store: &'a S, progress_reporter: &'a P) -> Self {
        Self {
            store,
            progress_reporter,
        }
    }

    /// Writes or deletes `path` according to `reconciliation`.
    ///
    /// # Returns
    /// `true` when the file was touched.
    pub fn execute(&self, path: &Path, reconciliation: &Reconciliation) -> Result<bool> {
        if !reconciliation.changed {
            return Ok(false);
        }

        if reconciliation.cleaned.is_empty() {
            tracing::info!(path = %path.display(), "removing empty ignore file");
            self.store.delete(path)?;
        } else {
            self.store.save(path, &reconciliation.cleaned.to_yaml())?;
        }

        if let Some(summary) = reconciliation.summary(path) {
            self.progress_reporter.report(&summary);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::domain::{IgnoreConfig, IgnoreEntry};
    use crate::audit::services::{RemovalReason, RemovedEntry};
    use serde_yaml_ng::Value;
    use std::cell::RefCell;
    use std::path::PathBuf;

    #[derive(Default)]
    struct RecordingStore {
        saved: RefCell<Vec<Value>>,
        deleted: RefCell<usize>,
    }

    impl IgnoreConfigStore for RecordingStore {
        fn load(&self, _path: &Path) -> Result<Option<Value>> {
            Ok(None)
        }

        fn save(&self, _path: &Path, document: &Value) -> Result<()> {
            self.saved.borrow_mut().push(document.clone());
            Ok(())
        }

        fn delete(&self, _path: &Path) -> Result<()> {
            *self.deleted.borrow_mut() += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        messages: RefCell<Vec<String>>,
    }

    impl ProgressReporter for RecordingReporter {
        fn report(&self, message: &str) {
            self.messages.borrow_mut().push(message.to_string());
        }
        fn report_progress(&self, _current: usize, _total: usize, _message: Option<&str>) {}
        fn report_warning(&self, message: &str) {
            self.messages.borrow_mut().push(message.to_string());
        }
        fn report_completion(&self, _message: &str) {}
    }

    fn removed(name: &str) -> RemovedEntry {
        RemovedEntry {
            technology: "node".to_string(),
            name: name.to_string(),
            version: "1.0.0".to_string(),
            reason: RemovalReason::NoLongerExists,
        }
    }

    #[test]
    fn test_unchanged_reconciliation_is_not_written() {
        let store = RecordingStore::default();
        let reporter = RecordingReporter::default();
        let reconciliation = Reconciliation {
            cleaned: IgnoreConfig::new(),
            removed: Vec::new(),
            changed: false,
        };

        let touched = ReconcileConfigUseCase::new(&store, &reporter)
            .execute(&PathBuf::from(".package-audit.yml"), &reconciliation)
            .unwrap();

        assert!(!touched);
        assert!(store.saved.borrow().is_empty());
        assert_eq!(*store.deleted.borrow(), 0);
    }

    #[test]
    fn test_empty_result_deletes_file() {
        let store = RecordingStore::default();
        let reporter = RecordingReporter::default();
        let reconciliation = Reconciliation {
            cleaned: IgnoreConfig::new(),
            removed: vec![removed("moment")],
            changed: true,
        };

        ReconcileConfigUseCase::new(&store, &reporter)
            .execute(&PathBuf::from(".package-audit.yml"), &reconciliation)
            .unwrap();

        assert_eq!(*store.deleted.borrow(), 1);
        assert!(reporter.messages.borrow()[0].starts_with("Cleaned up 1 package(s)"));
    }

    #[test]
    fn test_remaining_entries_are_saved() {
        let store = RecordingStore::default();
        let reporter = RecordingReporter::default();
        let mut cleaned = IgnoreConfig::new();
        cleaned.insert("node", "lodash", IgnoreEntry::new("4.17.0"));
        let reconciliation = Reconciliation {
            cleaned,
            removed: vec![removed("moment")],
            changed: true,
        };

        ReconcileConfigUseCase::new(&store, &reporter)
            .execute(&PathBuf::from(".package-audit.yml"), &reconciliation)
            .unwrap();

        let saved = store.saved.borrow();
        assert_eq!(saved.len(), 1);
        let rendered = serde_yaml_ng::to_string(&saved[0]).unwrap();
        assert!(rendered.contains("lodash"));
        assert!(!rendered.contains("moment"));
    }
}
