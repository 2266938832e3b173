/// Data Transfer Objects for application layer
///
/// DTOs carry data between the CLI, the use cases and the formatters,
/// keeping the audit domain isolated.
mod audit_request;
mod audit_response;
mod output_format;

pub use audit_request::AuditRequest;
pub use audit_response::{AuditResponse, TechnologyReport};
pub use output_format::OutputFormat;
