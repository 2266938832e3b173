use crate::audit::domain::{Group, Technology};
use crate::audit::services::RiskFilter;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// AuditRequest - Internal request DTO for the audit use case
#[derive(Debug, Clone)]
pub struct AuditRequest {
    /// Project directory containing the manifests
    pub project_path: PathBuf,
    /// Technologies to audit; empty means every detected technology
    pub technologies: Vec<Technology>,
    /// Only report packages in these groups; empty means all groups
    pub groups: BTreeSet<Group>,
    pub filter: RiskFilter,
    /// Report packages hidden by the ignore file as well
    pub include_ignored: bool,
    /// Explicit ignore file; must exist when given
    pub config_path: Option<PathBuf>,
    /// Skip registry and advisory lookups
    pub offline: bool,
}

impl AuditRequest {
    pub fn new(project_path: PathBuf) -> Self {
        Self {
            project_path,
            technologies: Vec::new(),
            groups: BTreeSet::new(),
            filter: RiskFilter::default(),
            include_ignored: false,
            config_path: None,
            offline: false,
        }
    }

    pub fn with_technologies(mut self, technologies: Vec<Technology>) -> Self {
        self.technologies = technologies;
        self
    }

    pub fn with_groups(mut self, groups: BTreeSet<Group>) -> Self {
        self.groups = groups;
        self
    }

    pub fn with_filter(mut self, filter: RiskFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_include_ignored(mut self, include_ignored: bool) -> Self {
        self.include_ignored = include_ignored;
        self
    }

    pub fn with_config_path(mut self, config_path: Option<PathBuf>) -> Self {
        self.config_path = config_path;
        self
    }

    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }
}
