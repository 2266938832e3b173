pub mod config_reconciler;
pub mod duplicate_merger;
pub mod ignore_policy;
pub mod lockfile_resolver;
pub mod risk_classifier;
pub mod risk_filter;
pub mod version_extractor;

pub use config_reconciler::{ConfigReconciler, Reconciliation, RemovalReason, RemovedEntry};
pub use duplicate_merger::DuplicateMerger;
pub use ignore_policy::{IgnoreOutcome, IgnorePolicy};
pub use lockfile_resolver::LockfileResolver;
pub use risk_classifier::RiskClassifier;
pub use risk_filter::{FilterMode, RiskFilter};
pub use version_extractor::{ExtractError, ExtractionStrategy, LockFileIndex};
