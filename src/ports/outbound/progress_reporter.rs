/// ProgressReporter port for user-facing progress output
///
/// Keeps stdout free for the report itself; implementations typically
/// write to stderr.
pub trait ProgressReporter {
    /// Reports a progress message
    fn report(&self, message: &str);

    /// Reports progress of a counted operation
    ///
    /// # Arguments
    /// * `current` - Items completed so far
    /// * `total` - Total items
    /// * `message` - Optional label for the operation
    fn report_progress(&self, current: usize, total: usize, message: Option<&str>);

    /// Reports a non-fatal problem
    fn report_warning(&self, message: &str);

    /// Reports completion of an operation
    fn report_completion(&self, message: &str);
}
