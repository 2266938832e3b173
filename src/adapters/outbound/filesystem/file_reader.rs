use crate::audit::domain::{ManifestDeclarations, Technology};
use crate::ports::outbound::{LockfileContent, ProjectReader};
use crate::shared::error::AuditError;
use crate::shared::security::read_regular_file;
use crate::shared::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

const PACKAGE_JSON: &str = "package.json";
const YARN_LOCK: &str = "yarn.lock";
const GEMFILE: &str = "Gemfile";

/// The part of `package.json` the audit reads.
///
/// Values are kept as raw JSON so a stray non-string entry is skipped
/// instead of failing the whole manifest.
#[derive(Debug, Default, Deserialize)]
struct PackageJson {
    #[serde(default)]
    dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    resolutions: BTreeMap<String, serde_json::Value>,
}

fn string_entries(entries: BTreeMap<String, serde_json::Value>) -> BTreeMap<String, String> {
    entries
        .into_iter()
        .filter_map(|(name, value)| match value {
            serde_json::Value::String(range) => Some((name, range)),
            _ => None,
        })
        .collect()
}

/// FileSystemReader adapter for reading node project files from the file system
///
/// Implements the ProjectReader port: technology detection, `package.json`
/// declarations and raw `yarn.lock` content.
pub struct FileSystemReader;

impl FileSystemReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileSystemReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectReader for FileSystemReader {
    fn detect_technologies(&self, project_path: &Path) -> Vec<Technology> {
        Technology::ALL
            .iter()
            .copied()
            .filter(|technology| {
                let marker = match technology {
                    Technology::Node => PACKAGE_JSON,
                    Technology::Ruby => GEMFILE,
                };
                project_path.join(marker).is_file()
            })
            .collect()
    }

    fn read_manifest(&self, project_path: &Path) -> Result<ManifestDeclarations> {
        let manifest_path = project_path.join(PACKAGE_JSON);

        if !manifest_path.exists() {
            return Err(AuditError::ManifestNotFound {
                manifest: PACKAGE_JSON,
                path: manifest_path,
                suggestion: format!(
                    "package.json does not exist in project directory \"{}\".\n   \
                     Please run in the root directory of a node project.",
                    project_path.display()
                ),
            }
            .into());
        }

        let content = read_regular_file(&manifest_path, PACKAGE_JSON).map_err(|e| {
            AuditError::FileReadError {
                path: manifest_path.clone(),
                details: e.to_string(),
            }
        })?;

        let package_json: PackageJson =
            serde_json::from_str(&content).map_err(|e| AuditError::ManifestParseError {
                path: manifest_path,
                details: e.to_string(),
            })?;

        Ok(ManifestDeclarations {
            dependencies: string_entries(package_json.dependencies),
            dev_dependencies: string_entries(package_json.dev_dependencies),
            resolutions: string_entries(package_json.resolutions),
        })
    }

    fn read_lockfile(&self, project_path: &Path) -> Result<LockfileContent> {
        let lockfile_path = project_path.join(YARN_LOCK);

        if !lockfile_path.exists() {
            return Err(AuditError::LockfileNotFound {
                path: lockfile_path,
                suggestion: "Run `yarn install` to generate yarn.lock".to_string(),
            }
            .into());
        }

        let content = read_regular_file(&lockfile_path, YARN_LOCK).map_err(|e| {
            AuditError::FileReadError {
                path: lockfile_path.clone(),
                details: e.to_string(),
            }
        })?;

        Ok(LockfileContent {
            path: lockfile_path,
            content,
        })
    }
}
