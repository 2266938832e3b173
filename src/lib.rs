//! package-audit - dependency risk audit for yarn and bundler projects
//!
//! Resolves the packages a project declares to the versions its lock file
//! pins, enriches them with registry metadata and advisories, and reports the
//! deprecated, outdated and vulnerable ones. A YAML ignore file can hide
//! accepted risks; stale entries are pruned on every run.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`audit`): Pure resolution, classification and ignore rules
//! - **Application Layer** (`application`): Use cases, DTOs and factories
//! - **Ports** (`ports`): Interface definitions for infrastructure
//! - **Adapters** (`adapters`): File system, registry, console and formatter implementations
//! - **Shared** (`shared`): Error types and file safety checks
//!
//! # Example
//!
//! ```no_run
//! use package_audit::prelude::*;
//! use std::path::PathBuf;
//!
//! # async fn audit() -> Result<()> {
//! let use_case = AuditPackagesUseCase::new(
//!     FileSystemReader::new(),
//!     GemfileLockResolver::new(),
//!     CachingRegistryClient::new(NpmRegistryClient::new()?),
//!     CachingRegistryClient::new(RubyGemsClient::new()?),
//!     Some(OsvClient::new()?),
//!     YamlConfigStore::new(),
//!     StderrProgressReporter::new(),
//! );
//!
//! let response = use_case.execute(AuditRequest::new(PathBuf::from("."))).await?;
//! let output = TableFormatter::new().format(&response)?;
//! println!("{}", output);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod audit;
pub mod config;
pub mod ports;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::console::StderrProgressReporter;
    pub use crate::adapters::outbound::filesystem::{
        FileSystemReader, FileSystemWriter, GemfileLockResolver, StdoutPresenter, YamlConfigStore,
    };
    pub use crate::adapters::outbound::formatters::{
        JsonFormatter, MarkdownFormatter, TableFormatter,
    };
    pub use crate::adapters::outbound::network::{
        CachingRegistryClient, NpmRegistryClient, OsvClient, RubyGemsClient,
    };
    pub use crate::application::dto::{AuditRequest, AuditResponse, OutputFormat, TechnologyReport};
    pub use crate::application::use_cases::{AuditPackagesUseCase, FetchPolicy, MetadataFetcher};
    pub use crate::audit::domain::{
        Dependency, Group, IgnoreConfig, ManifestDeclarations, PackageVulnerabilities, RiskFlags,
        RiskKind, RiskLevel, Severity, Technology, VulnerabilityRecord,
    };
    pub use crate::audit::services::{
        ConfigReconciler, DuplicateMerger, FilterMode, LockFileIndex, LockfileResolver,
        RiskClassifier, RiskFilter,
    };
    pub use crate::config::AuditSettings;
    pub use crate::ports::outbound::{
        IgnoreConfigStore, NativeResolver, OutputPresenter, ProgressReporter, ProjectReader,
        NativeResolution, RegistryError, RegistryPackage, RegistryRepository, ReportFormatter,
        ResolvedSpec, VulnerabilityRepository,
    };
    pub use crate::shared::Result;
}
