use crate::audit::domain::{Dependency, Technology};
use crate::ports::outbound::{RegistryError, RegistryPackage, RegistryRepository};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Markers identifying packages that do not come from a registry.
const NON_REGISTRY_MARKERS: [&str; 4] = ["file:", "git:", "git+", "link:"];

/// Batching and retry settings for registry lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Lookups running concurrently; a batch finishes before the next starts.
    pub batch_size: usize,
    /// Pause between batches to stay under registry rate limits.
    pub batch_pause: Duration,
    /// Total attempts per package, the first one included.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            batch_size: 10,
            batch_pause: Duration::from_millis(100),
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(2),
        }
    }
}

impl FetchPolicy {
    /// Same limits as the default with every delay removed.
    pub fn without_delays() -> Self {
        Self {
            batch_pause: Duration::ZERO,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (1-based), doubling up to `max_backoff`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// A dependency left without registry metadata because its lookup failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegradedDependency {
    pub name: String,
    pub technology: Technology,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    /// Every input dependency, in input order.
    pub dependencies: Vec<Dependency>,
    pub degraded: Vec<DegradedDependency>,
}

impl FetchOutcome {
    pub fn warning_count(&self) -> usize {
        self.degraded.len()
    }
}

/// MetadataFetcher - enriches dependencies with registry metadata
///
/// Lookups run as a bounded pool of tasks per batch and report back over a
/// channel as `(index, result)`. A failed lookup never aborts the batch: it
/// degrades that one dependency and is counted once in the outcome.
pub struct MetadataFetcher<R> {
    registry: Arc<R>,
    policy: FetchPolicy,
}

impl<R> MetadataFetcher<R>
where
    R: RegistryRepository + 'static,
{
    pub fn new(registry: Arc<R>, policy: FetchPolicy) -> Self {
        Self { registry, policy }
    }

    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    /// Fetches metadata for every registry-sourced dependency.
    ///
    /// # Arguments
    /// * `dependencies` - Resolved dependencies; all are returned
    /// * `on_progress` - Called with `(completed, total)` after each lookup
    pub async fn fetch(
        &self,
        mut dependencies: Vec<Dependency>,
        on_progress: &dyn Fn(usize, usize),
    ) -> FetchOutcome {
        let fetchable: Vec<usize> = dependencies
            .iter()
            .enumerate()
            .filter(|(_, dependency)| is_registry_package(dependency))
            .map(|(index, _)| index)
            .collect();
        let total = fetchable.len();
        let mut completed = 0;
        let mut degraded = Vec::new();

        for (batch_number, batch) in fetchable.chunks(self.policy.batch_size.max(1)).enumerate() {
            if batch_number > 0 && !self.policy.batch_pause.is_zero() {
                tokio::time::sleep(self.policy.batch_pause).await;
            }

            let (tx, mut rx) = mpsc::channel(batch.len());
            for &index in batch {
                let tx = tx.clone();
                let registry = Arc::clone(&self.registry);
                let policy = self.policy.clone();
                let name = dependencies[index].name.clone();
                tokio::spawn(async move {
                    let result = fetch_with_retry(registry.as_ref(), &name, &policy).await;
                    // The receiver outlives every sender of its batch.
                    let _ = tx.send((index, result)).await;
                });
            }
            drop(tx);

            let mut answered = HashSet::with_capacity(batch.len());
            while let Some((index, result)) = rx.recv().await {
                answered.insert(index);
                let dependency = &mut dependencies[index];
                match result {
                    Ok(package) => apply_metadata(dependency, &package),
                    Err(RegistryError::NotFound) => {
                        tracing::debug!(package = %dependency.name, "not found in registry");
                    }
                    Err(e) => {
                        tracing::warn!(package = %dependency.name, error = %e, "registry lookup failed");
                        degraded.push(DegradedDependency {
                            name: dependency.name.clone(),
                            technology: dependency.technology,
                            reason: e.to_string(),
                        });
                    }
                }
                completed += 1;
                on_progress(completed, total);
            }

            for &index in batch.iter().filter(|index| !answered.contains(index)) {
                degraded.push(DegradedDependency {
                    name: dependencies[index].name.clone(),
                    technology: dependencies[index].technology,
                    reason: "lookup task aborted".to_string(),
                });
            }
        }

        FetchOutcome {
            dependencies,
            degraded,
        }
    }
}

async fn fetch_with_retry<R: RegistryRepository + ?Sized>(
    registry: &R,
    name: &str,
    policy: &FetchPolicy,
) -> Result<RegistryPackage, RegistryError> {
    let mut attempt = 1;
    loop {
        match registry.fetch_package(name).await {
            Err(e) if e.is_transient() && attempt < policy.max_attempts => {
                let delay = policy.backoff_for(attempt);
                tracing::debug!(package = name, attempt, ?delay, error = %e, "retrying registry lookup");
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                attempt += 1;
            }
            other => return other,
        }
    }
}

/// Local paths and git checkouts have no registry entry.
pub fn is_registry_package(dependency: &Dependency) -> bool {
    !NON_REGISTRY_MARKERS.iter().any(|marker| {
        dependency.name.contains(marker)
            || dependency.resolved_version.starts_with(marker)
            || dependency.declared_range.starts_with(marker)
    })
}

/// Copies registry metadata onto the dependency.
///
/// A missing publish date for one of the two versions is substituted by the
/// other; with neither date known the dependency stays without metadata.
fn apply_metadata(dependency: &mut Dependency, package: &RegistryPackage) {
    let Some(latest) = package.latest_version.as_deref() else {
        return;
    };
    let (version_date, latest_date) = match (
        package.release_date(&dependency.resolved_version),
        package.release_date(latest),
    ) {
        (None, None) => return,
        (Some(version), None) => (version, version),
        (None, Some(latest)) => (latest, latest),
        (Some(version), Some(latest)) => (version, latest),
    };

    dependency.latest_version = Some(latest.to_string());
    dependency.version_date = Some(version_date);
    dependency.latest_version_date = Some(latest_date);
    dependency.registry_deprecated = package
        .deprecated_versions
        .contains(&dependency.resolved_version);
}
