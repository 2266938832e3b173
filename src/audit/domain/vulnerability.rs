use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Severity level of a vulnerability as reported by the advisory database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::None => "NONE",
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        };
        f.write_str(label)
    }
}

/// A single advisory affecting a specific package version.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VulnerabilityRecord {
    pub id: String,
    pub severity: Severity,
    pub summary: Option<String>,
    pub fixed_version: Option<String>,
}

impl VulnerabilityRecord {
    pub fn new(id: impl Into<String>, severity: Severity) -> Self {
        Self {
            id: id.into(),
            severity,
            summary: None,
            fixed_version: None,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_fixed_version(mut self, fixed_version: impl Into<String>) -> Self {
        self.fixed_version = Some(fixed_version.into());
        self
    }
}

/// Advisories found for one package version.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageVulnerabilities {
    pub name: String,
    pub version: String,
    pub vulnerabilities: Vec<VulnerabilityRecord>,
}

impl PackageVulnerabilities {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        vulnerabilities: Vec<VulnerabilityRecord>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            vulnerabilities,
        }
    }
}

/// Synchronous `(name, version) -> advisories` lookup consumed by the classifier.
pub trait VulnerabilityLookup {
    fn lookup(&self, name: &str, version: &str) -> Vec<VulnerabilityRecord>;
}

/// In-memory lookup built from advisory query results.
#[derive(Debug, Clone, Default)]
pub struct VulnerabilityIndex {
    entries: HashMap<(String, String), Vec<VulnerabilityRecord>>,
}

impl VulnerabilityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, found: PackageVulnerabilities) {
        self.entries
            .entry((found.name, found.version))
            .or_default()
            .extend(found.vulnerabilities);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<PackageVulnerabilities> for VulnerabilityIndex {
    fn from_iter<I: IntoIterator<Item = PackageVulnerabilities>>(iter: I) -> Self {
        let mut index = Self::new();
        for found in iter {
            index.insert(found);
        }
        index
    }
}

impl VulnerabilityLookup for VulnerabilityIndex {
    fn lookup(&self, name: &str, version: &str) -> Vec<VulnerabilityRecord> {
        self.entries
            .get(&(name.to_string(), version.to_string()))
            .cloned()
            .unwrap_or_default()
    }
}
