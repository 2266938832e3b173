use crate::audit::domain::{PackageVulnerabilities, Technology};
use crate::shared::Result;
use async_trait::async_trait;

/// VulnerabilityRepository port for querying an advisory database
///
/// The audit treats this as an external collaborator: a failure is reported
/// as a warning and the run continues without advisory data.
#[async_trait]
pub trait VulnerabilityRepository: Send + Sync {
    /// Fetches advisories for a set of `(name, version)` pairs of one technology.
    ///
    /// # Returns
    /// Only packages with at least one advisory are returned.
    async fn fetch_vulnerabilities(
        &self,
        technology: Technology,
        packages: &[(String, String)],
    ) -> Result<Vec<PackageVulnerabilities>>;
}
