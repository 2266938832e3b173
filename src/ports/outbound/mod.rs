/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the application core uses
/// to interact with external systems (file system, registries, console, etc.).
pub mod formatter;
pub mod ignore_config_store;
pub mod native_resolver;
pub mod output_presenter;
pub mod progress_reporter;
pub mod project_reader;
pub mod registry_repository;
pub mod vulnerability_repository;

pub use formatter::ReportFormatter;
pub use ignore_config_store::IgnoreConfigStore;
pub use native_resolver::{NativeResolution, NativeResolver, ResolvedSpec};
pub use output_presenter::OutputPresenter;
pub use progress_reporter::ProgressReporter;
pub use project_reader::{LockfileContent, ProjectReader};
pub use registry_repository::{RegistryError, RegistryPackage, RegistryRepository};
pub use vulnerability_repository::VulnerabilityRepository;
