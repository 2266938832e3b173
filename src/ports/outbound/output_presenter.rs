use crate::shared::Result;

/// OutputPresenter port for presenting the rendered report
pub trait OutputPresenter {
    /// Writes the formatted report to its destination
    ///
    /// # Errors
    /// Returns an error if writing to the destination fails
    fn present(&self, content: &str) -> Result<()>;
}
