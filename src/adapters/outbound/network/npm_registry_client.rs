use super::http;
use crate::ports::outbound::{RegistryError, RegistryPackage, RegistryRepository};
use crate::shared::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_NPM_REGISTRY: &str = "https://registry.npmjs.org";

#[derive(Debug, Deserialize)]
struct Packument {
    #[serde(rename = "dist-tags", default)]
    dist_tags: HashMap<String, String>,
    #[serde(default)]
    time: HashMap<String, String>,
    #[serde(default)]
    versions: HashMap<String, PackumentVersion>,
}

#[derive(Debug, Deserialize)]
struct PackumentVersion {
    /// A message string when deprecated; some registries write `false` otherwise.
    #[serde(default)]
    deprecated: Option<serde_json::Value>,
}

impl PackumentVersion {
    fn is_deprecated(&self) -> bool {
        match &self.deprecated {
            Some(serde_json::Value::String(message)) => !message.is_empty(),
            Some(serde_json::Value::Bool(flag)) => *flag,
            _ => false,
        }
    }
}

/// NpmRegistryClient adapter for the npm registry JSON API
///
/// Fetches the full packument for a package and keeps only what the audit
/// needs: the `latest` dist-tag, publish dates and deprecation markers.
pub struct NpmRegistryClient {
    client: reqwest::Client,
    base_url: String,
}

impl NpmRegistryClient {
    /// Creates a client for the public npm registry.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_NPM_REGISTRY)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(10))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http::build_client(timeout, Duration::from_secs(5))?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Scoped names keep their `@` and encode the separator: `@scope%2Fname`.
    fn package_url(&self, package_name: &str) -> String {
        let encoded = match package_name.strip_prefix('@') {
            Some(scoped) => format!("@{}", urlencoding::encode(scoped)),
            None => urlencoding::encode(package_name).into_owned(),
        };
        format!("{}/{}", self.base_url, encoded)
    }
}

fn to_registry_package(packument: Packument) -> RegistryPackage {
    let release_dates = packument
        .time
        .iter()
        .filter_map(|(version, timestamp)| {
            chrono::DateTime::parse_from_rfc3339(timestamp)
                .ok()
                .map(|published| (version.clone(), published.date_naive()))
        })
        .collect();
    let deprecated_versions = packument
        .versions
        .iter()
        .filter(|(_, version)| version.is_deprecated())
        .map(|(version, _)| version.clone())
        .collect();

    RegistryPackage {
        latest_version: packument.dist_tags.get("latest").cloned(),
        release_dates,
        deprecated_versions,
    }
}

#[async_trait]
impl RegistryRepository for NpmRegistryClient {
    async fn fetch_package(&self, package_name: &str) -> std::result::Result<RegistryPackage, RegistryError> {
        http::validate_package_name(package_name)?;

        let response = self
            .client
            .get(self.package_url(package_name))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(http::transport_error)?;

        if !response.status().is_success() {
            return Err(http::status_error(response.status()));
        }

        let packument: Packument = http::read_json(response).await?;
        Ok(to_registry_package(packument))
    }
}
