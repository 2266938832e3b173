use crate::audit::domain::{Dependency, RiskFlags, Severity};
use chrono::NaiveDate;

pub(super) const NOT_AVAILABLE: &str = "N/A";

pub(super) fn date(value: Option<NaiveDate>) -> String {
    value
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub(super) fn latest_version(dependency: &Dependency) -> &str {
    dependency.latest_version.as_deref().unwrap_or(NOT_AVAILABLE)
}

/// Comma-separated risk kinds, e.g. `deprecated, outdated`.
pub(super) fn risks(flags: &RiskFlags) -> String {
    let mut kinds = Vec::new();
    if flags.deprecated {
        kinds.push("deprecated");
    }
    if flags.outdated {
        kinds.push("outdated");
    }
    if flags.vulnerable {
        kinds.push("vulnerable");
    }
    kinds.join(", ")
}

pub(super) fn groups(dependency: &Dependency) -> String {
    dependency
        .groups
        .iter()
        .map(|g| g.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Advisory ids with their severity, highest severity first.
pub(super) fn vulnerabilities(dependency: &Dependency) -> String {
    let mut records: Vec<_> = dependency.vulnerabilities.iter().collect();
    records.sort_by(|a, b| b.severity.cmp(&a.severity).then_with(|| a.id.cmp(&b.id)));
    records
        .iter()
        .map(|r| match r.severity {
            Severity::None => r.id.clone(),
            severity => format!("{} ({})", r.id, severity),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::domain::{Group, Technology, VulnerabilityRecord};
    use std::collections::BTreeSet;

    #[test]
    fn test_date_and_missing_values() {
        assert_eq!(date(NaiveDate::from_ymd_opt(2017, 2, 21)), "2017-02-21");
        assert_eq!(date(None), "N/A");

        let dependency = Dependency::new("left-pad", "1.0.0", "1.0.0", Technology::Node, BTreeSet::new());
        assert_eq!(latest_version(&dependency), "N/A");
    }

    #[test]
    fn test_risks_and_groups() {
        let flags = RiskFlags {
            deprecated: true,
            outdated: false,
            vulnerable: true,
        };
        assert_eq!(risks(&flags), "deprecated, vulnerable");

        let dependency = Dependency::new(
            "rspec",
            "~> 3.12",
            "3.12.0",
            Technology::Ruby,
            BTreeSet::from([Group::Development, Group::Default]),
        );
        assert_eq!(groups(&dependency), "default, development");
    }

    #[test]
    fn test_vulnerabilities_sorted_by_severity() {
        let mut dependency =
            Dependency::new("lodash", "4.17.0", "4.17.0", Technology::Node, BTreeSet::new());
        dependency.vulnerabilities = vec![
            VulnerabilityRecord::new("GHSA-low", Severity::Low),
            VulnerabilityRecord::new("GHSA-unrated", Severity::None),
            VulnerabilityRecord::new("GHSA-crit", Severity::Critical),
        ];
        assert_eq!(
            vulnerabilities(&dependency),
            "GHSA-crit (CRITICAL), GHSA-low (LOW), GHSA-unrated"
        );
    }
}
