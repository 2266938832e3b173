use crate::ports::outbound::IgnoreConfigStore;
use crate::shared::error::AuditError;
use crate::shared::security::{ensure_not_symlink, read_regular_file};
use crate::shared::Result;
use serde_yaml_ng::Value;
use std::fs;
use std::io::Write;
use std::path::Path;

/// YamlConfigStore adapter persisting the ignore file as YAML
///
/// Saves go through a temporary file in the same directory followed by a
/// rename, so readers never observe a half-written file.
pub struct YamlConfigStore;

impl YamlConfigStore {
    pub fn new() -> Self {
        Self
    }

    fn write_error(path: &Path, details: impl ToString) -> AuditError {
        AuditError::FileWriteError {
            path: path.to_path_buf(),
            details: details.to_string(),
        }
    }
}

impl Default for YamlConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IgnoreConfigStore for YamlConfigStore {
    fn load(&self, path: &Path) -> Result<Option<Value>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = read_regular_file(path, "ignore file").map_err(|e| {
            AuditError::FileReadError {
                path: path.to_path_buf(),
                details: e.to_string(),
            }
        })?;

        let document: Value =
            serde_yaml_ng::from_str(&content).map_err(|e| AuditError::ConfigParseError {
                path: path.to_path_buf(),
                details: e.to_string(),
            })?;
        Ok(Some(document))
    }

    fn save(&self, path: &Path, document: &Value) -> Result<()> {
        ensure_not_symlink(path, "write").map_err(|e| Self::write_error(path, e))?;

        let rendered =
            serde_yaml_ng::to_string(document).map_err(|e| Self::write_error(path, e))?;
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp_file =
            tempfile::NamedTempFile::new_in(directory).map_err(|e| Self::write_error(path, e))?;
        temp_file
            .write_all(rendered.as_bytes())
            .map_err(|e| Self::write_error(path, e))?;
        temp_file
            .persist(path)
            .map_err(|e| Self::write_error(path, e.error))?;

        tracing::info!(path = %path.display(), "ignore file updated");
        Ok(())
    }

    fn delete(&self, path: &Path) -> Result<()> {
        ensure_not_symlink(path, "delete").map_err(|e| Self::write_error(path, e))?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::write_error(path, e).into()),
        }
    }
}
