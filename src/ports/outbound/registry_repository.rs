use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Registry lookup failures, classified for the retry policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The registry does not know the package. Not an error for the audit.
    #[error("package not found in registry")]
    NotFound,

    /// Connection failures, timeouts, rate limiting and 5xx responses.
    #[error("transient registry failure: {0}")]
    Transient(String),

    /// Anything else: unexpected status, malformed payload, invalid name.
    #[error("registry request failed: {0}")]
    Unexpected(String),
}

impl RegistryError {
    pub fn is_transient(&self) -> bool {
        matches!(self, RegistryError::Transient(_))
    }
}

/// Registry metadata for one package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryPackage {
    /// Version currently tagged as latest.
    pub latest_version: Option<String>,
    /// Publish date per version.
    pub release_dates: HashMap<String, NaiveDate>,
    /// Versions the registry marks as deprecated.
    pub deprecated_versions: HashSet<String>,
}

impl RegistryPackage {
    pub fn new(latest_version: impl Into<String>) -> Self {
        Self {
            latest_version: Some(latest_version.into()),
            ..Default::default()
        }
    }

    pub fn with_release(mut self, version: &str, date: NaiveDate) -> Self {
        self.release_dates.insert(version.to_string(), date);
        self
    }

    pub fn with_deprecated(mut self, version: &str) -> Self {
        self.deprecated_versions.insert(version.to_string());
        self
    }

    pub fn release_date(&self, version: &str) -> Option<NaiveDate> {
        self.release_dates.get(version).copied()
    }
}

/// RegistryRepository port for fetching package metadata
///
/// Implementations must be `Send + Sync` so lookups can run on
/// concurrent tasks.
#[async_trait]
pub trait RegistryRepository: Send + Sync {
    /// Fetches metadata for `package_name`.
    ///
    /// # Errors
    /// * `RegistryError::NotFound` when the registry has no such package
    /// * `RegistryError::Transient` for failures worth retrying
    /// * `RegistryError::Unexpected` for everything else
    async fn fetch_package(&self, package_name: &str) -> Result<RegistryPackage, RegistryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transient_is_retryable() {
        assert!(RegistryError::Transient("timeout".into()).is_transient());
        assert!(!RegistryError::NotFound.is_transient());
        assert!(!RegistryError::Unexpected("bad json".into()).is_transient());
    }

    #[test]
    fn test_registry_package_builder() {
        let date = NaiveDate::from_ymd_opt(2021, 2, 20).unwrap();
        let package = RegistryPackage::new("4.17.21")
            .with_release("4.17.21", date)
            .with_deprecated("4.17.0");
        assert_eq!(package.release_date("4.17.21"), Some(date));
        assert_eq!(package.release_date("4.17.0"), None);
        assert!(package.deprecated_versions.contains("4.17.0"));
    }
}
