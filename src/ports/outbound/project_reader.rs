use crate::audit::domain::{ManifestDeclarations, Technology};
use crate::shared::Result;
use std::path::{Path, PathBuf};

/// Raw lock file content together with where it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockfileContent {
    pub path: PathBuf,
    pub content: String,
}

/// ProjectReader port for reading a node project's manifest and lock file
///
/// This port abstracts the file system operations needed to read
/// `package.json` and `yarn.lock` from a project directory.
pub trait ProjectReader {
    /// Lists technologies whose manifest is present in `project_path`, in `Technology::ALL` order.
    fn detect_technologies(&self, project_path: &Path) -> Vec<Technology>;

    /// Reads dependency declarations from `package.json`.
    ///
    /// # Errors
    /// Returns an error if the manifest is missing or is not valid JSON.
    fn read_manifest(&self, project_path: &Path) -> Result<ManifestDeclarations>;

    /// Reads the raw `yarn.lock` text.
    ///
    /// # Errors
    /// Returns an error if the lock file is missing or unreadable.
    fn read_lockfile(&self, project_path: &Path) -> Result<LockfileContent>;
}
