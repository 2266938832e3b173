//! Runtime settings and ignore-file discovery for package-audit.
//!
//! The ignore file itself is loaded by the `YamlConfigStore` adapter and
//! interpreted by the reconciler; this module only knows where it lives and
//! the network settings a run uses.

use anyhow::bail;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::adapters::outbound::network::{
    DEFAULT_NPM_REGISTRY, DEFAULT_OSV_API, DEFAULT_RUBYGEMS_REGISTRY,
};
use crate::application::use_cases::FetchPolicy;
use crate::shared::Result;

/// Ignore file looked up in the project directory.
pub const CONFIG_FILENAME: &str = ".package-audit.yml";

/// Network and batching settings for one audit run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditSettings {
    pub npm_registry: String,
    pub rubygems_registry: String,
    pub osv_api: String,
    pub request_timeout: Duration,
    pub batch_size: usize,
    pub batch_pause: Duration,
    /// Attempts per package, the first one included.
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for AuditSettings {
    fn default() -> Self {
        let policy = FetchPolicy::default();
        Self {
            npm_registry: DEFAULT_NPM_REGISTRY.to_string(),
            rubygems_registry: DEFAULT_RUBYGEMS_REGISTRY.to_string(),
            osv_api: DEFAULT_OSV_API.to_string(),
            request_timeout: Duration::from_secs(10),
            batch_size: policy.batch_size,
            batch_pause: policy.batch_pause,
            max_retries: policy.max_attempts,
            initial_backoff: policy.initial_backoff,
            max_backoff: policy.max_backoff,
        }
    }
}

impl AuditSettings {
    pub fn with_npm_registry(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            self.npm_registry = url;
        }
        self
    }

    pub fn with_rubygems_registry(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            self.rubygems_registry = url;
        }
        self
    }

    pub fn with_batch_size(mut self, batch_size: Option<usize>) -> Self {
        if let Some(batch_size) = batch_size {
            self.batch_size = batch_size;
        }
        self
    }

    pub fn with_max_retries(mut self, max_retries: Option<u32>) -> Self {
        if let Some(max_retries) = max_retries {
            self.max_retries = max_retries;
        }
        self
    }

    /// Checks values that would otherwise fail deep inside the run.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!(
                "Invalid setting: batch size must be at least 1.\n\n\
                 💡 Hint: Use --batch-size with a positive number (default 10)."
            );
        }
        if self.max_retries == 0 {
            bail!(
                "Invalid setting: max retries must be at least 1.\n\n\
                 💡 Hint: The value counts the first attempt (default 3)."
            );
        }
        for (label, url) in [
            ("npm registry", &self.npm_registry),
            ("RubyGems registry", &self.rubygems_registry),
            ("OSV API", &self.osv_api),
        ] {
            if reqwest::Url::parse(url).is_err() {
                bail!(
                    "Invalid setting: {} URL \"{}\" is not a valid URL.\n\n\
                     💡 Hint: Use an absolute URL such as https://registry.npmjs.org",
                    label,
                    url
                );
            }
        }
        Ok(())
    }

    pub fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy {
            batch_size: self.batch_size,
            batch_pause: self.batch_pause,
            max_attempts: self.max_retries,
            initial_backoff: self.initial_backoff,
            max_backoff: self.max_backoff,
        }
    }
}

/// Path of the ignore file: the explicit one, or the default in `project_dir`.
pub fn ignore_file_path(project_dir: &Path, explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| project_dir.join(CONFIG_FILENAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = AuditSettings::default();
        assert_eq!(settings.npm_registry, "https://registry.npmjs.org");
        assert_eq!(settings.rubygems_registry, "https://rubygems.org");
        assert_eq!(settings.batch_size, 10);
        assert_eq!(settings.max_retries, 3);
        assert!(settings.validate().is_ok());
        assert_eq!(settings.fetch_policy(), FetchPolicy::default());
    }

    #[test]
    fn test_overrides() {
        let settings = AuditSettings::default()
            .with_npm_registry(Some("http://localhost:4873".to_string()))
            .with_rubygems_registry(None)
            .with_batch_size(Some(4))
            .with_max_retries(Some(5));

        assert_eq!(settings.npm_registry, "http://localhost:4873");
        assert_eq!(settings.rubygems_registry, "https://rubygems.org");
        let policy = settings.fetch_policy();
        assert_eq!(policy.batch_size, 4);
        assert_eq!(policy.max_attempts, 5);
    }

    #[test]
    fn test_validate_rejects_zero_batch_size() {
        let err = AuditSettings::default()
            .with_batch_size(Some(0))
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("batch size must be at least 1"));
    }

    #[test]
    fn test_validate_rejects_zero_retries() {
        let err = AuditSettings::default()
            .with_max_retries(Some(0))
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("max retries"));
    }

    #[test]
    fn test_validate_rejects_relative_url() {
        let err = AuditSettings::default()
            .with_npm_registry(Some("registry.local".to_string()))
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("npm registry URL"));
    }

    #[test]
    fn test_ignore_file_path() {
        let project = Path::new("/app");
        assert_eq!(
            ignore_file_path(project, None),
            PathBuf::from("/app/.package-audit.yml")
        );
        assert_eq!(
            ignore_file_path(project, Some(Path::new("/etc/audit.yml"))),
            PathBuf::from("/etc/audit.yml")
        );
    }
}
