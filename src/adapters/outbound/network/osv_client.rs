use super::http;
use crate::audit::domain::{PackageVulnerabilities, Severity, Technology, VulnerabilityRecord};
use crate::ports::outbound::VulnerabilityRepository;
use crate::shared::Result;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

pub const DEFAULT_OSV_API: &str = "https://api.osv.dev";

/// OSV API client for fetching vulnerability data
///
/// Uses the OSV.dev batch query API to find advisory ids, then fetches each
/// distinct advisory once for its summary, severity and fixed version.
///
/// # Security
/// - Implements timeout (30 seconds)
/// - Bounds concurrent detail requests
/// - Does not retry failed requests (fail fast for advisory checks)
pub struct OsvClient {
    client: reqwest::Client,
    base_url: String,
}

impl OsvClient {
    const TIMEOUT_SECONDS: u64 = 30;
    const MAX_BATCH_SIZE: usize = 100; // OSV API limit
    const MAX_CONCURRENT_DETAILS: usize = 10;

    /// Creates a new OSV API client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_OSV_API)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http::build_client(
                Duration::from_secs(Self::TIMEOUT_SECONDS),
                Duration::from_secs(5),
            )?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn ecosystem(technology: Technology) -> &'static str {
        match technology {
            Technology::Node => "npm",
            Technology::Ruby => "RubyGems",
        }
    }

    /// Queries advisory ids for a batch of `(name, version)` pairs, in input order.
    async fn fetch_batch(
        &self,
        technology: Technology,
        packages: &[(String, String)],
    ) -> Result<Vec<OsvResult>> {
        let batch_query = OsvBatchQuery {
            queries: packages
                .iter()
                .map(|(name, version)| OsvQuery {
                    package: OsvPackage {
                        name: name.clone(),
                        ecosystem: Self::ecosystem(technology).to_string(),
                    },
                    version: version.clone(),
                })
                .collect(),
        };

        let response = self
            .client
            .post(format!("{}/v1/querybatch", self.base_url))
            .json(&batch_query)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("OSV API returned status code {}", response.status());
        }

        let batch_response: OsvBatchResponse = response.json().await?;
        if batch_response.results.len() != packages.len() {
            anyhow::bail!(
                "OSV API returned {} result(s) for {} queries",
                batch_response.results.len(),
                packages.len()
            );
        }
        Ok(batch_response.results)
    }

    /// Fetches detailed vulnerability information by ID
    ///
    /// The batch API returns ids only; severity and fix data need the full record.
    async fn fetch_vulnerability_details(&self, vuln_id: &str) -> Result<OsvVulnerability> {
        let url = format!(
            "{}/v1/vulns/{}",
            self.base_url,
            urlencoding::encode(vuln_id)
        );
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!(
                "OSV API returned status code {} for vulnerability {}",
                response.status(),
                vuln_id
            );
        }

        Ok(response.json().await?)
    }

    /// Details for every distinct id; an id whose detail fetch fails keeps only its id.
    async fn fetch_records(&self, ids: BTreeSet<String>) -> HashMap<String, VulnerabilityRecord> {
        stream::iter(ids)
            .map(|id| async move {
                let record = match self.fetch_vulnerability_details(&id).await {
                    Ok(detailed) => convert_to_record(&detailed),
                    Err(e) => {
                        tracing::warn!(advisory = %id, error = %e, "failed to fetch advisory details");
                        VulnerabilityRecord::new(id.clone(), Severity::None)
                    }
                };
                (id, record)
            })
            .buffer_unordered(Self::MAX_CONCURRENT_DETAILS)
            .collect()
            .await
    }
}

#[async_trait]
impl VulnerabilityRepository for OsvClient {
    async fn fetch_vulnerabilities(
        &self,
        technology: Technology,
        packages: &[(String, String)],
    ) -> Result<Vec<PackageVulnerabilities>> {
        // Step 1: Collect advisory ids per package
        let mut matches: Vec<(&(String, String), Vec<String>)> = Vec::new();
        for chunk in packages.chunks(Self::MAX_BATCH_SIZE) {
            let results = self.fetch_batch(technology, chunk).await?;
            for (package, result) in chunk.iter().zip(results) {
                if !result.vulns.is_empty() {
                    matches.push((package, result.vulns.into_iter().map(|v| v.id).collect()));
                }
            }
        }
        if matches.is_empty() {
            return Ok(Vec::new());
        }

        // Step 2: Fetch each advisory once
        let ids: BTreeSet<String> = matches
            .iter()
            .flat_map(|(_, ids)| ids.iter().cloned())
            .collect();
        tracing::info!(technology = %technology, advisories = ids.len(), "fetching advisory details");
        let records = self.fetch_records(ids).await;

        Ok(matches
            .into_iter()
            .map(|((name, version), ids)| {
                let vulnerabilities = ids
                    .iter()
                    .filter_map(|id| records.get(id).cloned())
                    .collect();
                PackageVulnerabilities::new(name.clone(), version.clone(), vulnerabilities)
            })
            .collect())
    }
}

// OSV API request/response structures

#[derive(Debug, Serialize)]
struct OsvBatchQuery {
    queries: Vec<OsvQuery>,
}

#[derive(Debug, Serialize)]
struct OsvQuery {
    package: OsvPackage,
    version: String,
}

#[derive(Debug, Serialize)]
struct OsvPackage {
    name: String,
    ecosystem: String, // "npm" or "RubyGems"
}

#[derive(Debug, Deserialize)]
struct OsvBatchResponse {
    #[serde(default)]
    results: Vec<OsvResult>,
}

#[derive(Debug, Deserialize)]
struct OsvResult {
    #[serde(default)]
    vulns: Vec<OsvVulnerabilityId>,
}

#[derive(Debug, Deserialize)]
struct OsvVulnerabilityId {
    id: String,
}

#[derive(Debug, Deserialize)]
struct OsvVulnerability {
    id: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    database_specific: Option<DatabaseSpecific>,
    #[serde(default)]
    affected: Vec<OsvAffected>,
}

#[derive(Debug, Deserialize)]
struct DatabaseSpecific {
    #[serde(default)]
    severity: Option<String>, // "CRITICAL", "HIGH", "MODERATE", "MEDIUM", "LOW"
}

#[derive(Debug, Deserialize)]
struct OsvAffected {
    #[serde(default)]
    ranges: Vec<OsvRange>,
}

#[derive(Debug, Deserialize)]
struct OsvRange {
    #[serde(default)]
    events: Vec<OsvEvent>,
}

#[derive(Debug, Deserialize)]
struct OsvEvent {
    #[serde(default)]
    fixed: Option<String>,
}

fn convert_to_record(osv_vuln: &OsvVulnerability) -> VulnerabilityRecord {
    let severity = osv_vuln
        .database_specific
        .as_ref()
        .and_then(|db| db.severity.as_deref())
        .map(parse_severity_string)
        .unwrap_or(Severity::None);

    let fixed_version = osv_vuln.affected.iter().find_map(|affected| {
        affected
            .ranges
            .iter()
            .find_map(|range| range.events.iter().find_map(|event| event.fixed.clone()))
    });

    let mut record = VulnerabilityRecord::new(osv_vuln.id.clone(), severity);
    if let Some(summary) = &osv_vuln.summary {
        record = record.with_summary(summary.clone());
    }
    if let Some(fixed) = fixed_version {
        record = record.with_fixed_version(fixed);
    }
    record
}

/// Parses severity string from OSV database_specific field
///
/// "MODERATE" and "MEDIUM" both map to `Severity::Medium`; unknown values to `Severity::None`.
fn parse_severity_string(severity: &str) -> Severity {
    match severity.to_uppercase().as_str() {
        "CRITICAL" => Severity::Critical,
        "HIGH" => Severity::High,
        "MODERATE" | "MEDIUM" => Severity::Medium,
        "LOW" => Severity::Low,
        _ => Severity::None,
    }
}
