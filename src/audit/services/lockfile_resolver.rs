use super::version_extractor::{self, LockFileIndex};
use crate::audit::domain::{Dependency, Group, ManifestDeclarations, Technology};
use crate::shared::error::AuditError;
use std::collections::BTreeSet;
use std::path::Path;

/// Prefixes marking a declaration as a local path rather than a registry package.
const LOCAL_PREFIXES: [&str; 6] = ["file:", "link:", "portal:", "workspace:", "./", "../"];

/// LockfileResolver - turns manifest declarations into resolved dependencies
///
/// Every declared (non-local) package must be pinned by the lock file; a
/// package the lock file cannot resolve aborts the run.
pub struct LockfileResolver;

impl LockfileResolver {
    /// Resolves every declared package against the lock file index.
    ///
    /// # Arguments
    /// * `declarations` - Manifest dependencies, dev dependencies and resolutions
    /// * `index` - Parsed lock file
    /// * `lockfile_path` - Path used in error messages
    ///
    /// # Errors
    /// Returns `AuditError::ResolutionFailed` for the first package that cannot be resolved.
    pub fn resolve(
        declarations: &ManifestDeclarations,
        index: &LockFileIndex,
        lockfile_path: &Path,
    ) -> Result<Vec<Dependency>, AuditError> {
        let mut resolved = Vec::new();

        for name in declarations.names() {
            let Some(declared_range) = declarations.declared_range(name) else {
                continue;
            };
            if is_local_declaration(declared_range) {
                tracing::debug!(package = name, range = declared_range, "skipping local package");
                continue;
            }

            let override_range = declarations.override_range(name);
            let version = version_extractor::extract(index, name, declared_range, override_range)
                .map_err(|e| AuditError::ResolutionFailed {
                    name: name.to_string(),
                    lockfile: lockfile_path.to_path_buf(),
                    details: e.to_string(),
                })?;

            resolved.push(Dependency::new(
                name,
                declared_range,
                version,
                Technology::Node,
                groups_for(declarations, name),
            ));
        }

        Ok(resolved)
    }
}

/// Development-only packages belong to `development`; everything else to both groups.
fn groups_for(declarations: &ManifestDeclarations, name: &str) -> BTreeSet<Group> {
    if declarations.is_development_only(name) {
        BTreeSet::from([Group::Development])
    } else {
        BTreeSet::from([Group::Default, Group::Development])
    }
}

/// True for path, link and workspace declarations, including `git+file:` URLs.
pub fn is_local_declaration(range: &str) -> bool {
    LOCAL_PREFIXES.iter().any(|prefix| range.starts_with(prefix)) || range.contains("file:")
}
