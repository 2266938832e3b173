use crate::ports::outbound::{RegistryError, RegistryPackage, RegistryRepository};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// CachingRegistryClient wraps a RegistryRepository and adds in-memory caching.
///
/// Successful lookups and `NotFound` answers are cached by package name for
/// the lifetime of the client. Transient and unexpected failures are not, so
/// a later lookup can still succeed.
pub struct CachingRegistryClient<R: RegistryRepository> {
    inner: R,
    cache: Arc<DashMap<String, Option<RegistryPackage>>>,
}

impl<R: RegistryRepository> CachingRegistryClient<R> {
    /// Creates a new caching client wrapping the given inner repository
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: Arc::new(DashMap::new()),
        }
    }

    /// Returns the current cache size (for testing/monitoring)
    #[cfg(test)]
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

#[async_trait]
impl<R: RegistryRepository> RegistryRepository for CachingRegistryClient<R> {
    async fn fetch_package(&self, package_name: &str) -> Result<RegistryPackage, RegistryError> {
        if let Some(cached) = self.cache.get(package_name) {
            return cached.value().clone().ok_or(RegistryError::NotFound);
        }

        match self.inner.fetch_package(package_name).await {
            Ok(package) => {
                self.cache
                    .insert(package_name.to_string(), Some(package.clone()));
                Ok(package)
            }
            Err(RegistryError::NotFound) => {
                self.cache.insert(package_name.to_string(), None);
                Err(RegistryError::NotFound)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock registry for testing that tracks call counts
    struct MockRegistry {
        call_count: AtomicUsize,
        fail_with: Option<RegistryError>,
    }

    impl MockRegistry {
        fn new(fail_with: Option<RegistryError>) -> Self {
            Self {
                call_count: AtomicUsize::new(0),
                fail_with,
            }
        }

        fn get_call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RegistryRepository for MockRegistry {
        async fn fetch_package(&self, package_name: &str) -> Result<RegistryPackage, RegistryError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            match &self.fail_with {
                Some(e) => Err(e.clone()),
                None => Ok(RegistryPackage::new(format!("{}-latest", package_name))),
            }
        }
    }

    #[tokio::test]
    async fn test_caching_client_returns_cached_value() {
        let client = CachingRegistryClient::new(MockRegistry::new(None));

        let first = client.fetch_package("lodash").await.unwrap();
        let second = client.fetch_package("lodash").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second.latest_version.as_deref(), Some("lodash-latest"));
        assert_eq!(client.inner.get_call_count(), 1);
        assert_eq!(client.cache_size(), 1);
    }

    #[tokio::test]
    async fn test_not_found_is_cached() {
        let client = CachingRegistryClient::new(MockRegistry::new(Some(RegistryError::NotFound)));

        assert_eq!(client.fetch_package("ghost").await, Err(RegistryError::NotFound));
        assert_eq!(client.fetch_package("ghost").await, Err(RegistryError::NotFound));
        assert_eq!(client.inner.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_transient_failure_is_not_cached() {
        let client = CachingRegistryClient::new(MockRegistry::new(Some(
            RegistryError::Transient("timeout".into()),
        )));

        assert!(client.fetch_package("react").await.is_err());
        assert!(client.fetch_package("react").await.is_err());
        assert_eq!(client.inner.get_call_count(), 2);
        assert_eq!(client.cache_size(), 0);
    }
}
