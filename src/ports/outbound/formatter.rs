use crate::application::dto::AuditResponse;
use crate::shared::Result;

/// ReportFormatter port for rendering audit results
///
/// Rendering is kept outside the audit pipeline; each output format
/// is one implementation.
pub trait ReportFormatter {
    /// Formats the audit response
    ///
    /// # Errors
    /// Returns an error if serialization fails
    fn format(&self, response: &AuditResponse) -> Result<String>;
}
