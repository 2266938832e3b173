use super::http;
use crate::ports::outbound::{RegistryError, RegistryPackage, RegistryRepository};
use crate::shared::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_RUBYGEMS_REGISTRY: &str = "https://rubygems.org";

#[derive(Debug, Deserialize)]
struct GemVersion {
    number: String,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    prerelease: bool,
    #[serde(default)]
    platform: Option<String>,
}

/// RubyGemsClient adapter for the RubyGems versions API
///
/// `/api/v1/versions/<name>.json` lists releases newest first; the latest
/// version is the first one that is not a pre-release.
pub struct RubyGemsClient {
    client: reqwest::Client,
    base_url: String,
}

impl RubyGemsClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_RUBYGEMS_REGISTRY)
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
}

fn to_registry_package(versions: Vec<GemVersion>) -> RegistryPackage {
    let latest_version = versions
        .iter()
        .find(|version| !version.prerelease)
        .map(|version| version.number.clone());

    // Platform builds share a number; the first listed date is kept.
    let mut package = RegistryPackage {
        latest_version,
        ..Default::default()
    };
    for version in versions.iter().rev() {
        let Some(published) = version
            .created_at
            .as_deref()
            .and_then(|created| chrono::DateTime::parse_from_rfc3339(created).ok())
        else {
            continue;
        };
        if version.platform.as_deref().is_none_or(|p| p == "ruby")
            || !package.release_dates.contains_key(&version.number)
        {
            package
                .release_dates
                .insert(version.number.clone(), published.date_naive());
        }
    }
    package
}

#[async_trait]
impl RegistryRepository for RubyGemsClient {
    async fn fetch_package(&self, package_name: &str) -> std::result::Result<RegistryPackage, RegistryError> {
        if package_name.starts_with('@') {
            return Err(RegistryError::Unexpected(format!(
                "\"{}\" is not a valid gem name",
                package_name
            )));
        }
        http::validate_package_name(package_name)?;

        let url = format!(
            "{}/api/v1/versions/{}.json",
            self.base_url,
            urlencoding::encode(package_name)
        );
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(http::transport_error)?;

        if !response.status().is_success() {
            return Err(http::status_error(response.status()));
        }

        let versions: Vec<GemVersion> = http::read_json(response).await?;
        Ok(to_registry_package(versions))
    }
}
