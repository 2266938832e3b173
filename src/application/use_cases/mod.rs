/// Use cases module containing application business logic orchestration
mod audit_packages;
pub mod fetch_metadata;
mod reconcile_config;

pub use audit_packages::AuditPackagesUseCase;
pub use fetch_metadata::{DegradedDependency, FetchOutcome, FetchPolicy, MetadataFetcher};
pub use reconcile_config::ReconcileConfigUseCase;
