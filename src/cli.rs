use clap::Parser;
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::application::dto::{AuditRequest, OutputFormat};
use crate::audit::domain::{Group, Technology};
use crate::audit::services::{FilterMode, RiskFilter};

/// Audit yarn and bundler dependencies for deprecated, outdated and vulnerable packages
#[derive(Parser, Debug)]
#[command(name = "package-audit")]
#[command(version)]
#[command(about = "Audit yarn and bundler dependencies for deprecated, outdated and vulnerable packages", long_about = None)]
pub struct Args {
    /// Project directory (defaults to current directory)
    #[arg(value_name = "DIR")]
    pub path: Option<PathBuf>,

    /// Report deprecated packages
    #[arg(long)]
    pub deprecated: bool,

    /// Hide packages that are only deprecated
    #[arg(long, conflicts_with = "deprecated")]
    pub skip_deprecated: bool,

    /// Report outdated packages
    #[arg(long)]
    pub outdated: bool,

    /// Hide packages that are only outdated
    #[arg(long, conflicts_with = "outdated")]
    pub skip_outdated: bool,

    /// Report vulnerable packages
    #[arg(long)]
    pub vulnerable: bool,

    /// Hide packages that are only vulnerable
    #[arg(long, conflicts_with = "vulnerable")]
    pub skip_vulnerable: bool,

    /// Technology to audit: node or ruby (repeatable; defaults to all detected)
    #[arg(short, long = "technology", value_name = "TECHNOLOGY")]
    pub technologies: Vec<Technology>,

    /// Only report packages in these groups: default or development (repeatable)
    #[arg(short, long = "group", value_name = "GROUP")]
    pub groups: Vec<Group>,

    /// Ignore file (defaults to .package-audit.yml in the project directory)
    #[arg(short, long, value_name = "FILE", env = "PACKAGE_AUDIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Also report packages hidden by the ignore file
    #[arg(long)]
    pub include_ignored: bool,

    /// Output format: table, markdown, json or csv
    #[arg(short, long, default_value = "table", env = "PACKAGE_AUDIT_FORMAT")]
    pub format: OutputFormat,

    /// Leave out the header row of the csv format
    #[arg(long)]
    pub csv_exclude_headers: bool,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Skip registry and vulnerability lookups
    #[arg(long)]
    pub offline: bool,

    /// npm registry base URL
    #[arg(long, value_name = "URL", env = "PACKAGE_AUDIT_NPM_REGISTRY")]
    pub npm_registry: Option<String>,

    /// RubyGems base URL
    #[arg(long, value_name = "URL", env = "PACKAGE_AUDIT_RUBYGEMS_REGISTRY")]
    pub rubygems_registry: Option<String>,

    /// Registry lookups running concurrently
    #[arg(long, value_name = "N", env = "PACKAGE_AUDIT_BATCH_SIZE")]
    pub batch_size: Option<usize>,

    /// Attempts per registry lookup, the first one included
    #[arg(long, value_name = "N", env = "PACKAGE_AUDIT_MAX_RETRIES")]
    pub max_retries: Option<u32>,

    /// Print diagnostic logs to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn project_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn risk_filter(&self) -> RiskFilter {
        RiskFilter::new(
            FilterMode::from_flags(self.deprecated, self.skip_deprecated),
            FilterMode::from_flags(self.outdated, self.skip_outdated),
            FilterMode::from_flags(self.vulnerable, self.skip_vulnerable),
        )
    }

    pub fn audit_request(&self) -> AuditRequest {
        AuditRequest::new(self.project_path())
            .with_technologies(self.technologies.clone())
            .with_groups(self.groups.iter().copied().collect::<BTreeSet<_>>())
            .with_filter(self.risk_filter())
            .with_include_ignored(self.include_ignored)
            .with_config_path(self.config.clone())
            .with_offline(self.offline)
    }
}
