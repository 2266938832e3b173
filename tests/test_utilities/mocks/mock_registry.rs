use async_trait::async_trait;
use chrono::NaiveDate;
use package_audit::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Mock RegistryRepository answering from a fixed table
///
/// Unknown packages answer `NotFound`; packages registered with
/// `with_failure` always answer the given error.
#[derive(Default, Clone)]
pub struct MockRegistry {
    packages: HashMap<String, std::result::Result<RegistryPackage, RegistryError>>,
    pub calls: Arc<AtomicUsize>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `latest` with a release date for it and for `current`.
    pub fn with_package(
        mut self,
        name: &str,
        current: (&str, NaiveDate),
        latest: (&str, NaiveDate),
    ) -> Self {
        let package = RegistryPackage::new(latest.0)
            .with_release(current.0, current.1)
            .with_release(latest.0, latest.1);
        self.packages.insert(name.to_string(), Ok(package));
        self
    }

    pub fn with_registry_package(mut self, name: &str, package: RegistryPackage) -> Self {
        self.packages.insert(name.to_string(), Ok(package));
        self
    }

    pub fn with_failure(mut self, name: &str, error: RegistryError) -> Self {
        self.packages.insert(name.to_string(), Err(error));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RegistryRepository for MockRegistry {
    async fn fetch_package(
        &self,
        package_name: &str,
    ) -> std::result::Result<RegistryPackage, RegistryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.packages
            .get(package_name)
            .cloned()
            .unwrap_or(Err(RegistryError::NotFound))
    }
}
