use crate::audit::domain::{Dependency, IgnoreConfig, RiskKind};

/// Active and ignored dependencies after applying the ignore file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IgnoreOutcome {
    pub active: Vec<Dependency>,
    pub ignored: Vec<Dependency>,
}

/// IgnorePolicy - hides acknowledged risks recorded in the ignore file
///
/// An entry only applies to the exact version it records. Each override set
/// to `false` hides that risk; a dependency left with no visible risk is
/// ignored.
pub struct IgnorePolicy;

impl IgnorePolicy {
    pub fn partition(dependencies: Vec<Dependency>, config: &IgnoreConfig) -> IgnoreOutcome {
        let mut outcome = IgnoreOutcome::default();

        for dependency in dependencies {
            if Self::is_ignored(&dependency, config) {
                outcome.ignored.push(dependency);
            } else {
                outcome.active.push(dependency);
            }
        }

        outcome
    }

    pub fn is_ignored(dependency: &Dependency, config: &IgnoreConfig) -> bool {
        let Some(entry) = config.entry_for(dependency) else {
            return false;
        };
        RiskKind::ALL
            .iter()
            .filter(|kind| dependency.flags.get(**kind))
            .all(|kind| entry.suppresses(*kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::domain::{Group, IgnoreEntry, Technology};
    use serde_yaml_ng::Value;
    use std::collections::BTreeSet;

    fn outdated_and_deprecated(version: &str) -> Dependency {
        let mut dep = Dependency::new(
            "moment",
            "^2.29.0",
            version,
            Technology::Node,
            BTreeSet::from([Group::Default]),
        );
        dep.flags.outdated = true;
        dep.flags.deprecated = true;
        dep
    }

    fn config(entry: IgnoreEntry) -> IgnoreConfig {
        let mut config = IgnoreConfig::new();
        config.insert("node", "moment", entry);
        config
    }

    #[test]
    fn test_all_flags_suppressed_is_ignored() {
        let config = config(
            IgnoreEntry::new("2.29.1")
                .with_override("deprecated", Value::Bool(false))
                .with_override("outdated", Value::Bool(false)),
        );
        let outcome = IgnorePolicy::partition(vec![outdated_and_deprecated("2.29.1")], &config);
        assert!(outcome.active.is_empty());
        assert_eq!(outcome.ignored.len(), 1);
    }

    #[test]
    fn test_partial_suppression_stays_active() {
        let config = config(
            IgnoreEntry::new("2.29.1").with_override("deprecated", Value::Bool(false)),
        );
        let outcome = IgnorePolicy::partition(vec![outdated_and_deprecated("2.29.1")], &config);
        assert_eq!(outcome.active.len(), 1);
    }

    #[test]
    fn test_entry_for_other_version_does_not_apply() {
        let config = config(
            IgnoreEntry::new("2.29.0")
                .with_override("deprecated", Value::Bool(false))
                .with_override("outdated", Value::Bool(false)),
        );
        assert!(!IgnorePolicy::is_ignored(
            &outdated_and_deprecated("2.29.1"),
            &config
        ));
    }

    #[test]
    fn test_override_true_does_not_suppress() {
        let config = config(
            IgnoreEntry::new("2.29.1")
                .with_override("deprecated", Value::Bool(true))
                .with_override("outdated", Value::Bool(false)),
        );
        assert!(!IgnorePolicy::is_ignored(
            &outdated_and_deprecated("2.29.1"),
            &config
        ));
    }
}
