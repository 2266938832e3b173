use super::vulnerability::VulnerabilityRecord;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Package ecosystem a dependency belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Technology {
    Node,
    Ruby,
}

impl Technology {
    pub const ALL: [Technology; 2] = [Technology::Node, Technology::Ruby];

    /// Key used for this technology in the ignore file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Technology::Node => "node",
            Technology::Ruby => "ruby",
        }
    }
}

impl fmt::Display for Technology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Technology {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "node" => Ok(Technology::Node),
            "ruby" => Ok(Technology::Ruby),
            _ => Err(format!(
                "Invalid technology: {}. Please specify 'node' or 'ruby'",
                s
            )),
        }
    }
}

/// Dependency group a package is declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    Default,
    Development,
}

impl Group {
    pub fn as_str(&self) -> &'static str {
        match self {
            Group::Default => "default",
            Group::Development => "development",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Group {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" | "production" => Ok(Group::Default),
            "development" | "dev" => Ok(Group::Development),
            _ => Err(format!(
                "Invalid group: {}. Please specify 'default' or 'development'",
                s
            )),
        }
    }
}

/// Risk kinds a dependency can be flagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskKind {
    Deprecated,
    Outdated,
    Vulnerable,
}

impl RiskKind {
    pub const ALL: [RiskKind; 3] = [RiskKind::Deprecated, RiskKind::Outdated, RiskKind::Vulnerable];

    /// Key used for this risk in ignore entries.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskKind::Deprecated => "deprecated",
            RiskKind::Outdated => "outdated",
            RiskKind::Vulnerable => "vulnerable",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskFlags {
    pub deprecated: bool,
    pub outdated: bool,
    pub vulnerable: bool,
}

impl RiskFlags {
    pub fn get(&self, kind: RiskKind) -> bool {
        match kind {
            RiskKind::Deprecated => self.deprecated,
            RiskKind::Outdated => self.outdated,
            RiskKind::Vulnerable => self.vulnerable,
        }
    }

    pub fn set(&mut self, kind: RiskKind, value: bool) {
        match kind {
            RiskKind::Deprecated => self.deprecated = value,
            RiskKind::Outdated => self.outdated = value,
            RiskKind::Vulnerable => self.vulnerable = value,
        }
    }

    pub fn any(&self) -> bool {
        self.deprecated || self.outdated || self.vulnerable
    }

    pub fn union(self, other: RiskFlags) -> RiskFlags {
        RiskFlags {
            deprecated: self.deprecated || other.deprecated,
            outdated: self.outdated || other.outdated,
            vulnerable: self.vulnerable || other.vulnerable,
        }
    }
}

/// Overall risk ranking shown next to each reported package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    None,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_flags(flags: &RiskFlags) -> Self {
        if flags.vulnerable {
            RiskLevel::High
        } else if flags.deprecated {
            RiskLevel::Medium
        } else if flags.outdated {
            RiskLevel::Low
        } else {
            RiskLevel::None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::None => "none",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// A declared third-party package pinned to the version the lock file resolved.
///
/// Created by a resolver, enriched by the metadata fetcher, flagged once by
/// the classifier. Ownership moves forward through the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dependency {
    pub name: String,
    pub declared_range: String,
    pub resolved_version: String,
    pub technology: Technology,
    pub groups: BTreeSet<Group>,
    pub version_date: Option<NaiveDate>,
    pub latest_version: Option<String>,
    pub latest_version_date: Option<NaiveDate>,
    /// Registry marked the resolved version as deprecated.
    pub registry_deprecated: bool,
    pub flags: RiskFlags,
    pub vulnerabilities: Vec<VulnerabilityRecord>,
}

impl Dependency {
    pub fn new(
        name: impl Into<String>,
        declared_range: impl Into<String>,
        resolved_version: impl Into<String>,
        technology: Technology,
        groups: BTreeSet<Group>,
    ) -> Self {
        Self {
            name: name.into(),
            declared_range: declared_range.into(),
            resolved_version: resolved_version.into(),
            technology,
            groups,
            version_date: None,
            latest_version: None,
            latest_version_date: None,
            registry_deprecated: false,
            flags: RiskFlags::default(),
            vulnerabilities: Vec::new(),
        }
    }

    /// Identity used when merging duplicates.
    pub fn key(&self) -> (&str, Technology) {
        (self.name.as_str(), self.technology)
    }

    pub fn has_metadata(&self) -> bool {
        self.latest_version.is_some()
    }

    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_flags(&self.flags)
    }

    pub fn in_any_group(&self, groups: &BTreeSet<Group>) -> bool {
        groups.is_empty() || !self.groups.is_disjoint(groups)
    }
}
