use crate::audit::domain::{Dependency, RiskFlags, RiskKind};

/// Per-kind filter selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterMode {
    #[default]
    Unset,
    Include,
    Exclude,
}

impl FilterMode {
    /// Maps `--kind` / `--skip-kind` flags. The CLI rejects both at once; a skip wins otherwise.
    pub fn from_flags(include: bool, exclude: bool) -> Self {
        match (include, exclude) {
            (_, true) => FilterMode::Exclude,
            (true, false) => FilterMode::Include,
            (false, false) => FilterMode::Unset,
        }
    }
}

/// RiskFilter - narrows the reported packages by risk kind
///
/// 1. If any kind is `Include`, a package must carry at least one included kind.
/// 2. If any kind is `Exclude`, a package must carry at least one kind that is
///    not excluded.
/// 3. With everything `Unset`, all packages pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RiskFilter {
    pub deprecated: FilterMode,
    pub outdated: FilterMode,
    pub vulnerable: FilterMode,
}

impl RiskFilter {
    pub fn new(deprecated: FilterMode, outdated: FilterMode, vulnerable: FilterMode) -> Self {
        Self {
            deprecated,
            outdated,
            vulnerable,
        }
    }

    pub fn mode(&self, kind: RiskKind) -> FilterMode {
        match kind {
            RiskKind::Deprecated => self.deprecated,
            RiskKind::Outdated => self.outdated,
            RiskKind::Vulnerable => self.vulnerable,
        }
    }

    pub fn is_unset(&self) -> bool {
        RiskKind::ALL
            .iter()
            .all(|kind| self.mode(*kind) == FilterMode::Unset)
    }

    pub fn matches(&self, flags: &RiskFlags) -> bool {
        let with_mode = |mode: FilterMode| -> Vec<RiskKind> {
            RiskKind::ALL
                .into_iter()
                .filter(|kind| self.mode(*kind) == mode)
                .collect()
        };

        let included = with_mode(FilterMode::Include);
        if !included.is_empty() && !included.iter().any(|kind| flags.get(*kind)) {
            return false;
        }

        let excluded = with_mode(FilterMode::Exclude);
        if !excluded.is_empty() {
            let shown_and_set = RiskKind::ALL
                .iter()
                .filter(|kind| !excluded.contains(kind))
                .any(|kind| flags.get(*kind));
            if !shown_and_set {
                return false;
            }
        }

        true
    }

    pub fn apply(&self, dependencies: Vec<Dependency>) -> Vec<Dependency> {
        if self.is_unset() {
            return dependencies;
        }
        dependencies
            .into_iter()
            .filter(|dependency| self.matches(&dependency.flags))
            .collect()
    }
}
