use crate::audit::domain::{Dependency, Technology};
use std::collections::HashMap;

/// DuplicateMerger - collapses records sharing `(name, technology)`
///
/// Groups are unioned, flags OR-ed and vulnerabilities concatenated without
/// repeating an id. When resolved versions disagree, the record with known
/// registry metadata supplies version and metadata; on a tie the first wins.
/// Output keeps first-seen order, and merging twice equals merging once.
pub struct DuplicateMerger;

impl DuplicateMerger {
    pub fn merge(dependencies: Vec<Dependency>) -> Vec<Dependency> {
        let mut merged: Vec<Dependency> = Vec::with_capacity(dependencies.len());
        let mut positions: HashMap<(String, Technology), usize> = HashMap::new();

        for dependency in dependencies {
            let key = (dependency.name.clone(), dependency.technology);
            match positions.get(&key) {
                Some(&at) => merge_into(&mut merged[at], dependency),
                None => {
                    positions.insert(key, merged.len());
                    merged.push(dependency);
                }
            }
        }

        merged
    }
}

fn merge_into(kept: &mut Dependency, other: Dependency) {
    if !kept.has_metadata() && other.has_metadata() {
        kept.declared_range = other.declared_range;
        kept.resolved_version = other.resolved_version;
        kept.version_date = other.version_date;
        kept.latest_version = other.latest_version;
        kept.latest_version_date = other.latest_version_date;
    }

    kept.groups.extend(other.groups);
    kept.flags = kept.flags.union(other.flags);
    kept.registry_deprecated |= other.registry_deprecated;

    for vulnerability in other.vulnerabilities {
        if !kept.vulnerabilities.iter().any(|v| v.id == vulnerability.id) {
            kept.vulnerabilities.push(vulnerability);
        }
    }
}
