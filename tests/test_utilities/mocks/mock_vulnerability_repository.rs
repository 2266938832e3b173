use async_trait::async_trait;
use package_audit::prelude::*;
use std::collections::HashMap;

/// Mock VulnerabilityRepository keyed by `(name, version)`
#[derive(Default, Clone)]
pub struct MockVulnerabilityRepository {
    advisories: HashMap<(String, String), Vec<VulnerabilityRecord>>,
    fail: bool,
}

impl MockVulnerabilityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_advisory(mut self, name: &str, version: &str, record: VulnerabilityRecord) -> Self {
        self.advisories
            .entry((name.to_string(), version.to_string()))
            .or_default()
            .push(record);
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl VulnerabilityRepository for MockVulnerabilityRepository {
    async fn fetch_vulnerabilities(
        &self,
        _technology: Technology,
        packages: &[(String, String)],
    ) -> Result<Vec<PackageVulnerabilities>> {
        if self.fail {
            anyhow::bail!("advisory service unavailable");
        }
        Ok(packages
            .iter()
            .filter_map(|key| {
                let records = self.advisories.get(key)?;
                Some(PackageVulnerabilities::new(&key.0, &key.1, records.clone()))
            })
            .collect())
    }
}
