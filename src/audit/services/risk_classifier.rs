use crate::audit::domain::{Dependency, RiskFlags, VulnerabilityLookup};
use chrono::NaiveDate;

/// A package whose latest release is older than this is considered abandoned.
pub const DEPRECATION_THRESHOLD_DAYS: i64 = 730;

/// RiskClassifier - computes risk flags for enriched dependencies
///
/// Flags are computed exactly once per dependency and never revised.
pub struct RiskClassifier;

impl RiskClassifier {
    /// Classifies every dependency against registry metadata and the vulnerability lookup.
    ///
    /// # Arguments
    /// * `dependencies` - Dependencies enriched by the metadata fetcher
    /// * `lookup` - `(name, version) -> advisories`
    /// * `today` - Reference date for the staleness rule
    pub fn classify<L: VulnerabilityLookup + ?Sized>(
        dependencies: Vec<Dependency>,
        lookup: &L,
        today: NaiveDate,
    ) -> Vec<Dependency> {
        dependencies
            .into_iter()
            .map(|mut dependency| {
                dependency.vulnerabilities =
                    lookup.lookup(&dependency.name, &dependency.resolved_version);
                dependency.flags = RiskFlags {
                    deprecated: is_deprecated(&dependency, today),
                    outdated: is_outdated(&dependency),
                    vulnerable: !dependency.vulnerabilities.is_empty(),
                };
                dependency
            })
            .collect()
    }

    /// Keeps only dependencies carrying at least one risk flag.
    pub fn risky(dependencies: &[Dependency]) -> Vec<Dependency> {
        dependencies
            .iter()
            .filter(|dependency| dependency.flags.any())
            .cloned()
            .collect()
    }
}

/// Unknown latest version means "not outdated".
///
/// Versions are compared semantically when both parse as semver, so a
/// resolved pre-release ahead of the latest tag is not reported.
pub fn is_outdated(dependency: &Dependency) -> bool {
    let Some(latest) = dependency.latest_version.as_deref() else {
        return false;
    };
    let resolved = dependency.resolved_version.as_str();

    match (semver::Version::parse(resolved), semver::Version::parse(latest)) {
        (Ok(resolved), Ok(latest)) => resolved < latest,
        _ => resolved != latest,
    }
}

/// Registry-flagged, or no release for longer than the threshold.
pub fn is_deprecated(dependency: &Dependency, today: NaiveDate) -> bool {
    if dependency.registry_deprecated {
        return true;
    }
    dependency
        .latest_version_date
        .map(|released| (today - released).num_days() > DEPRECATION_THRESHOLD_DAYS)
        .unwrap_or(false)
}
