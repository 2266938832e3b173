use crate::audit::domain::Group;
use crate::shared::Result;
use std::collections::BTreeSet;
use std::path::Path;

/// A package as installed by an ecosystem's own resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSpec {
    pub name: String,
    pub declared_range: String,
    pub version: String,
    pub groups: BTreeSet<Group>,
}

impl ResolvedSpec {
    pub fn new(name: &str, declared_range: &str, version: &str, groups: BTreeSet<Group>) -> Self {
        Self {
            name: name.to_string(),
            declared_range: declared_range.to_string(),
            version: version.to_string(),
            groups,
        }
    }
}

/// What the native resolver reports for one project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NativeResolution {
    pub specs: Vec<ResolvedSpec>,
    /// Every name the manifest declares, local sources included.
    pub declared: Vec<String>,
}

/// NativeResolver port for ecosystems whose installed set is computed elsewhere
///
/// The audit does not resolve these dependencies itself; it asks the
/// ecosystem's resolver (or the file that resolver wrote) for the result.
pub trait NativeResolver {
    /// Returns installed, registry-sourced packages declared by the manifest in `project_path`.
    fn resolve_manifest(&self, project_path: &Path) -> Result<NativeResolution>;
}
