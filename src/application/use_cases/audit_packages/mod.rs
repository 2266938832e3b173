use crate::application::dto::{AuditRequest, AuditResponse, TechnologyReport};
use crate::application::use_cases::fetch_metadata::{FetchOutcome, FetchPolicy, MetadataFetcher};
use crate::application::use_cases::ReconcileConfigUseCase;
use crate::audit::domain::{
    DeclaredPackages, Dependency, IgnoreConfig, ParsedIgnoreConfig, Technology, VulnerabilityIndex,
};
use crate::audit::services::{
    ConfigReconciler, DuplicateMerger, IgnorePolicy, LockFileIndex, LockfileResolver,
    RiskClassifier,
};
use crate::config::ignore_file_path;
use crate::ports::outbound::{
    IgnoreConfigStore, NativeResolver, ProgressReporter, ProjectReader, RegistryRepository,
    VulnerabilityRepository,
};
use crate::shared::error::AuditError;
use crate::shared::Result;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;


/// Dependencies of one technology after resolution, enrichment and classification.
struct AuditedTechnology {
    technology: Technology,
    dependencies: Vec<Dependency>,
    declared: Vec<String>,
    degraded_count: usize,
}

/// AuditPackagesUseCase - Core use case for auditing project dependencies
///
/// Orchestrates, per detected technology: resolution, registry enrichment,
/// risk classification and duplicate merging. The resulting "all" view is
/// then used to reconcile the ignore file, while the filtered "any-risk"
/// view becomes the report.
///
/// # Type Parameters
/// * `PR` - ProjectReader implementation (node manifest and lock file)
/// * `NR` - NativeResolver implementation (ruby)
/// * `NPM` - RegistryRepository for npm
/// * `GEM` - RegistryRepository for RubyGems
/// * `V` - VulnerabilityRepository implementation (optional)
/// * `S` - IgnoreConfigStore implementation
/// * `P` - ProgressReporter implementation
pub struct AuditPackagesUseCase<PR, NR, NPM, GEM, V, S, P> {
    project_reader: PR,
    native_resolver: NR,
    npm_registry: Arc<NPM>,
    gem_registry: Arc<GEM>,
    vulnerability_repository: Option<V>,
    config_store: S,
    progress_reporter: P,
    fetch_policy: FetchPolicy,
    today: NaiveDate,
}

impl<PR, NR, NPM, GEM, V, S, P> AuditPackagesUseCase<PR, NR, NPM, GEM, V, S, P>
where
    PR: ProjectReader,
    NR: NativeResolver,
    NPM: RegistryRepository + 'static,
    GEM: RegistryRepository + 'static,
    V: VulnerabilityRepository,
    S: IgnoreConfigStore,
    P: ProgressReporter,
{
    /// Creates a new AuditPackagesUseCase with injected dependencies
    pub fn new(
        project_reader: PR,
        native_resolver: NR,
        npm_registry: NPM,
        gem_registry: GEM,
        vulnerability_repository: Option<V>,
        config_store: S,
        progress_reporter: P,
    ) -> Self {
        Self {
            project_reader,
            native_resolver,
            npm_registry: Arc::new(npm_registry),
            gem_registry: Arc::new(gem_registry),
            vulnerability_repository,
            config_store,
            progress_reporter,
            fetch_policy: FetchPolicy::default(),
            today: chrono::Local::now().date_naive(),
        }
    }

    pub fn with_fetch_policy(mut self, fetch_policy: FetchPolicy) -> Self {
        self.fetch_policy = fetch_policy;
        self
    }

    /// Overrides the reference date used by the staleness rule.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Executes the audit use case
    ///
    /// # Arguments
    /// * `request` - Audit request containing project path and options
    ///
    /// # Returns
    /// AuditResponse with one report per audited technology
    ///
    /// # Errors
    /// Fails when no technology is detected, a requested technology is
    /// absent, a manifest or lock file cannot be read, or a declared
    /// package cannot be resolved. Registry and advisory failures are
    /// reported as warnings only.
    pub async fn execute(&self, request: AuditRequest) -> Result<AuditResponse> {
        // Step 1: Select technologies
        let technologies = self.select_technologies(&request)?;

        // Step 2: Load the ignore file
        let config_path =
            ignore_file_path(&request.project_path, request.config_path.as_deref());
        let persisted = self.load_ignore_config(&config_path, request.config_path.is_some())?;

        // Step 3: Resolve, enrich and classify each technology in turn
        let mut audited = Vec::with_capacity(technologies.len());
        for technology in technologies {
            audited.push(self.audit_technology(technology, &request).await?);
        }

        // Step 4: Reconcile the ignore file against every resolved package
        let mut declared = DeclaredPackages::new();
        let mut all = Vec::new();
        for result in &audited {
            declared.insert(result.technology, result.declared.iter().cloned());
            all.extend(result.dependencies.iter().cloned());
        }
        let reconciliation = ConfigReconciler::reconcile(persisted, &all, &declared);
        ReconcileConfigUseCase::new(&self.config_store, &self.progress_reporter)
            .execute(&config_path, &reconciliation)?;

        // Step 5: Build the reports from the persisted entries that still apply
        let reports = audited
            .into_iter()
            .map(|result| Self::build_report(result, &request, &reconciliation.cleaned))
            .collect();

        Ok(AuditResponse::new(reports, reconciliation.removed))
    }

    /// Detected technologies, narrowed to the requested ones, sorted.
    fn select_technologies(&self, request: &AuditRequest) -> Result<Vec<Technology>> {
        let detected = self
            .project_reader
            .detect_technologies(&request.project_path);
        if detected.is_empty() {
            return Err(AuditError::NoSupportedTechnology {
                path: request.project_path.clone(),
            }
            .into());
        }

        if request.technologies.is_empty() {
            let selected: BTreeSet<Technology> = detected.into_iter().collect();
            return Ok(selected.into_iter().collect());
        }

        let mut selected = BTreeSet::new();
        for technology in &request.technologies {
            if !detected.contains(technology) {
                return Err(AuditError::TechnologyNotDetected {
                    technology: technology.to_string(),
                    path: request.project_path.clone(),
                    detected: detected
                        .iter()
                        .map(Technology::as_str)
                        .collect::<Vec<_>>()
                        .join(", "),
                }
                .into());
            }
            selected.insert(*technology);
        }
        Ok(selected.into_iter().collect())
    }

    fn load_ignore_config(&self, path: &Path, explicit: bool) -> Result<ParsedIgnoreConfig> {
        match self.config_store.load(path)? {
            Some(document) => {
                let parsed = IgnoreConfig::from_yaml(&document);
                tracing::info!(
                    path = %path.display(),
                    entries = parsed.config.len(),
                    malformed = parsed.malformed,
                    "loaded ignore file"
                );
                Ok(parsed)
            }
            None if explicit => Err(AuditError::FileReadError {
                path: path.to_path_buf(),
                details: "file does not exist".to_string(),
            }
            .into()),
            None => Ok(ParsedIgnoreConfig::default()),
        }
    }

    async fn audit_technology(
        &self,
        technology: Technology,
        request: &AuditRequest,
    ) -> Result<AuditedTechnology> {
        self.progress_reporter.report(&format!(
            "📖 Resolving {} dependencies in {}",
            technology,
            request.project_path.display()
        ));

        let (resolved, declared) = match technology {
            Technology::Node => self.resolve_node(&request.project_path)?,
            Technology::Ruby => self.resolve_ruby(&request.project_path)?,
        };
        self.progress_reporter
            .report(&format!("✅ Resolved {} package(s)", resolved.len()));

        let (dependencies, vulnerabilities, degraded_count) = if request.offline {
            (resolved, VulnerabilityIndex::new(), 0)
        } else {
            let vulnerabilities = self.fetch_vulnerabilities(technology, &resolved).await;
            let outcome = self.fetch_metadata(technology, resolved).await;
            let degraded_count = outcome.warning_count();
            if degraded_count > 0 {
                self.progress_reporter.report_warning(&format!(
                    "⚠️  Warning: {} package(s) are missing registry metadata; their risks may be incomplete.",
                    degraded_count
                ));
            }
            (outcome.dependencies, vulnerabilities, degraded_count)
        };

        let classified = RiskClassifier::classify(dependencies, &vulnerabilities, self.today);
        let dependencies = DuplicateMerger::merge(classified);
        tracing::info!(
            technology = %technology,
            packages = dependencies.len(),
            "classified dependencies"
        );

        Ok(AuditedTechnology {
            technology,
            dependencies,
            declared,
            degraded_count,
        })
    }

    fn resolve_node(&self, project_path: &Path) -> Result<(Vec<Dependency>, Vec<String>)> {
        let manifest = self.project_reader.read_manifest(project_path)?;
        let lockfile = self.project_reader.read_lockfile(project_path)?;
        let index = LockFileIndex::parse(&lockfile.content);
        let resolved = LockfileResolver::resolve(&manifest, &index, &lockfile.path)?;
        let declared = manifest.names().into_iter().map(str::to_string).collect();
        Ok((resolved, declared))
    }

    fn resolve_ruby(&self, project_path: &Path) -> Result<(Vec<Dependency>, Vec<String>)> {
        let resolution = self.native_resolver.resolve_manifest(project_path)?;
        let resolved = resolution
            .specs
            .into_iter()
            .map(|spec| {
                Dependency::new(
                    spec.name,
                    spec.declared_range,
                    spec.version,
                    Technology::Ruby,
                    spec.groups,
                )
            })
            .collect();
        Ok((resolved, resolution.declared))
    }

    async fn fetch_metadata(
        &self,
        technology: Technology,
        dependencies: Vec<Dependency>,
    ) -> FetchOutcome {
        self.progress_reporter.report(&format!(
            "🔍 Fetching {} registry metadata...",
            technology
        ));
        let on_progress = |current: usize, total: usize| {
            self.progress_reporter
                .report_progress(current, total, Some("Fetching registry metadata"));
        };

        let outcome = match technology {
            Technology::Node => {
                MetadataFetcher::new(Arc::clone(&self.npm_registry), self.fetch_policy.clone())
                    .fetch(dependencies, &on_progress)
                    .await
            }
            Technology::Ruby => {
                MetadataFetcher::new(Arc::clone(&self.gem_registry), self.fetch_policy.clone())
                    .fetch(dependencies, &on_progress)
                    .await
            }
        };
        self.progress_reporter
            .report_completion("Registry metadata fetched");
        outcome
    }

    /// Advisory failures leave the technology without vulnerability data.
    async fn fetch_vulnerabilities(
        &self,
        technology: Technology,
        dependencies: &[Dependency],
    ) -> VulnerabilityIndex {
        let Some(repository) = &self.vulnerability_repository else {
            return VulnerabilityIndex::new();
        };

        let packages: Vec<(String, String)> = dependencies
            .iter()
            .map(|dep| (dep.name.clone(), dep.resolved_version.clone()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if packages.is_empty() {
            return VulnerabilityIndex::new();
        }

        self.progress_reporter.report(&format!(
            "🛡️  Checking {} package(s) for known vulnerabilities...",
            packages.len()
        ));
        match repository.fetch_vulnerabilities(technology, &packages).await {
            Ok(found) => found.into_iter().collect(),
            Err(e) => {
                tracing::warn!(technology = %technology, error = %e, "vulnerability lookup failed");
                self.progress_reporter.report_warning(&format!(
                    "⚠️  Warning: Vulnerability check failed for {}: {}",
                    technology, e
                ));
                VulnerabilityIndex::new()
            }
        }
    }

    /// Applies group filter, ignore file and risk filter, then sorts by name.
    fn build_report(
        audited: AuditedTechnology,
        request: &AuditRequest,
        ignore_config: &IgnoreConfig,
    ) -> TechnologyReport {
        let total_count = audited.dependencies.len();
        let in_groups: Vec<Dependency> = audited
            .dependencies
            .into_iter()
            .filter(|dep| dep.in_any_group(&request.groups))
            .collect();

        let outcome = IgnorePolicy::partition(RiskClassifier::risky(&in_groups), ignore_config);
        let ignored_count = outcome.ignored.len();
        let mut shown = outcome.active;
        if request.include_ignored {
            shown.extend(outcome.ignored);
        }

        let mut packages = request.filter.apply(shown);
        packages.sort_by(|a, b| a.name.cmp(&b.name));

        TechnologyReport {
            technology: audited.technology,
            packages,
            total_count,
            ignored_count,
            degraded_count: audited.degraded_count,
        }
    }
}
