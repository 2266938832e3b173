pub mod dependency;
pub mod ignore_config;
pub mod manifest;
pub mod vulnerability;

pub use dependency::{Dependency, Group, RiskFlags, RiskKind, RiskLevel, Technology};
pub use ignore_config::{IgnoreConfig, IgnoreEntry, ParsedIgnoreConfig};
pub use manifest::{DeclaredPackages, ManifestDeclarations};
pub use vulnerability::{
    PackageVulnerabilities, Severity, VulnerabilityIndex, VulnerabilityLookup,
    VulnerabilityRecord,
};
