use crate::audit::domain::{Dependency, Technology};
use crate::audit::services::RemovedEntry;
use serde::Serialize;

/// Audit result for one technology.
#[derive(Debug, Clone, Serialize)]
pub struct TechnologyReport {
    pub technology: Technology,
    /// Risky packages that passed the filters, sorted by name
    pub packages: Vec<Dependency>,
    /// Resolved packages before any filtering
    pub total_count: usize,
    /// Risky packages hidden by the ignore file
    pub ignored_count: usize,
    /// Packages whose registry metadata could not be fetched
    pub degraded_count: usize,
}

/// AuditResponse - Internal response DTO from the audit use case
#[derive(Debug, Clone, Serialize)]
pub struct AuditResponse {
    pub reports: Vec<TechnologyReport>,
    /// Ignore entries dropped because they no longer match
    #[serde(skip)]
    pub removed_entries: Vec<RemovedEntry>,
}

impl AuditResponse {
    pub fn new(reports: Vec<TechnologyReport>, removed_entries: Vec<RemovedEntry>) -> Self {
        Self {
            reports,
            removed_entries,
        }
    }

    /// Total number of reported packages across technologies.
    pub fn package_count(&self) -> usize {
        self.reports.iter().map(|report| report.packages.len()).sum()
    }

    /// Whether any risky package is reported; drives the exit code.
    pub fn has_risks(&self) -> bool {
        self.package_count() > 0
    }
}
