use crate::audit::domain::{
    DeclaredPackages, Dependency, IgnoreConfig, ParsedIgnoreConfig, Technology,
};
use serde_yaml_ng::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Why an ignore entry was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalReason {
    VersionChanged { from: String, to: String },
    NoLongerExists,
    /// Still declared in the manifest but absent from the resolved set.
    VersionInFlux,
}

impl fmt::Display for RemovalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemovalReason::VersionChanged { from, to } => {
                write!(f, "version changed from {} to {}", from, to)
            }
            RemovalReason::NoLongerExists => f.write_str("package no longer exists"),
            RemovalReason::VersionInFlux => f.write_str("package version has changed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedEntry {
    pub technology: String,
    pub name: String,
    pub version: String,
    pub reason: RemovalReason,
}

impl fmt::Display for RemovedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{} ({}): {}",
            self.name, self.version, self.technology, self.reason
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub cleaned: IgnoreConfig,
    pub removed: Vec<RemovedEntry>,
    /// The persisted file differs from `cleaned` and must be rewritten.
    pub changed: bool,
}

impl Reconciliation {
    /// Human-readable summary of removed entries, `None` when nothing was removed.
    pub fn summary(&self, file: &Path) -> Option<String> {
        if self.removed.is_empty() {
            return None;
        }
        let mut lines = vec![format!(
            "Cleaned up {} package(s) from {}:",
            self.removed.len(),
            file.display()
        )];
        lines.extend(self.removed.iter().map(|entry| format!("  - {}", entry)));
        Some(lines.join("\n"))
    }
}

/// ConfigReconciler - keeps the ignore file in step with the resolved packages
///
/// An entry survives only when a resolved dependency with the same
/// technology, name and exact version exists. Output order is deterministic:
/// technologies sorted, names sorted, `version` first inside each entry.
///
/// Entries of a known technology that was not audited in this run are kept
/// as they are; entries under an unknown technology are always dropped.
pub struct ConfigReconciler;

impl ConfigReconciler {
    pub fn reconcile(
        persisted: ParsedIgnoreConfig,
        current: &[Dependency],
        declared: &DeclaredPackages,
    ) -> Reconciliation {
        let resolved: HashMap<(&str, &str), &str> = current
            .iter()
            .map(|dep| {
                (
                    (dep.technology.as_str(), dep.name.as_str()),
                    dep.resolved_version.as_str(),
                )
            })
            .collect();

        let mut cleaned = IgnoreConfig::new();
        let mut removed = Vec::new();

        for (technology, name, entry) in persisted.config.iter() {
            if !declared.covers(technology) && technology.parse::<Technology>().is_ok() {
                cleaned.insert(technology, name, entry.clone());
                continue;
            }
            let reason = match resolved.get(&(technology, name)) {
                Some(version) if *version == entry.version => {
                    cleaned.insert(technology, name, entry.clone());
                    continue;
                }
                Some(version) => RemovalReason::VersionChanged {
                    from: entry.version.clone(),
                    to: version.to_string(),
                },
                None if declared.contains(technology, name) => RemovalReason::VersionInFlux,
                None => RemovalReason::NoLongerExists,
            };

            removed.push(RemovedEntry {
                technology: technology.to_string(),
                name: name.to_string(),
                version: entry.version.clone(),
                reason,
            });
        }

        let changed = if cleaned.is_empty() {
            !persisted.document.is_null()
        } else {
            !removed.is_empty()
                || persisted.malformed > 0
                || render(&cleaned.to_yaml()) != render(&persisted.document)
        };
        Reconciliation {
            cleaned,
            removed,
            changed,
        }
    }
}

/// Text form of a document. Compared as text because mapping equality
/// ignores key order.
fn render(document: &Value) -> Option<String> {
    serde_yaml_ng::to_string(document).ok()
}
