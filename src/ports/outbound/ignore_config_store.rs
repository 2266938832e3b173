use crate::shared::Result;
use serde_yaml_ng::Value;
use std::path::Path;

/// IgnoreConfigStore port for the persisted ignore file
///
/// The document is exchanged as a raw YAML value so malformed content
/// reaches the reconciler instead of failing at load time.
pub trait IgnoreConfigStore {
    /// Loads the document, `Ok(None)` when the file does not exist.
    fn load(&self, path: &Path) -> Result<Option<Value>>;

    /// Replaces the file content atomically.
    fn save(&self, path: &Path, document: &Value) -> Result<()>;

    /// Removes the file; a missing file is not an error.
    fn delete(&self, path: &Path) -> Result<()>;
}
