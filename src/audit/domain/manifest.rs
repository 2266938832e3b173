use super::dependency::Technology;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Dependency declarations read from a project manifest.
///
/// Maps are keyed by package name; values are the range as written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestDeclarations {
    pub dependencies: BTreeMap<String, String>,
    pub dev_dependencies: BTreeMap<String, String>,
    /// Forced ranges (yarn `resolutions`) keyed by package name.
    pub resolutions: BTreeMap<String, String>,
}

impl ManifestDeclarations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dependency(mut self, name: &str, range: &str) -> Self {
        self.dependencies.insert(name.to_string(), range.to_string());
        self
    }

    pub fn with_dev_dependency(mut self, name: &str, range: &str) -> Self {
        self.dev_dependencies
            .insert(name.to_string(), range.to_string());
        self
    }

    pub fn with_resolution(mut self, name: &str, range: &str) -> Self {
        self.resolutions.insert(name.to_string(), range.to_string());
        self
    }

    /// Union of default and development names, sorted.
    pub fn names(&self) -> BTreeSet<&str> {
        self.dependencies
            .keys()
            .chain(self.dev_dependencies.keys())
            .map(String::as_str)
            .collect()
    }

    /// Range declared for `name`; the runtime declaration wins over the dev one.
    pub fn declared_range(&self, name: &str) -> Option<&str> {
        self.dependencies
            .get(name)
            .or_else(|| self.dev_dependencies.get(name))
            .map(String::as_str)
    }

    pub fn is_development_only(&self, name: &str) -> bool {
        self.dev_dependencies.contains_key(name) && !self.dependencies.contains_key(name)
    }

    /// Forced range for `name`, accepting the `**/name` glob form as well.
    pub fn override_range(&self, name: &str) -> Option<&str> {
        self.resolutions
            .get(name)
            .or_else(|| self.resolutions.get(&format!("**/{}", name)))
            .map(String::as_str)
    }
}

/// Package names still declared in each technology's manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredPackages {
    names: HashMap<Technology, BTreeSet<String>>,
}

impl DeclaredPackages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<I, S>(&mut self, technology: Technology, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names
            .entry(technology)
            .or_default()
            .extend(names.into_iter().map(Into::into));
    }

    pub fn contains(&self, technology: &str, name: &str) -> bool {
        self.names
            .iter()
            .any(|(tech, names)| tech.as_str() == technology && names.contains(name))
    }

    /// True when `technology` was audited and its declarations recorded.
    pub fn covers(&self, technology: &str) -> bool {
        self.names.keys().any(|tech| tech.as_str() == technology)
    }
}
