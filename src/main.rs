mod adapters;
mod application;
mod audit;
mod cli;
mod config;
mod ports;
mod shared;

use adapters::outbound::console::StderrProgressReporter;
use adapters::outbound::filesystem::{FileSystemReader, GemfileLockResolver, YamlConfigStore};
use adapters::outbound::network::{
    CachingRegistryClient, NpmRegistryClient, OsvClient, RubyGemsClient,
};
use application::factories::{
    FormatterFactory, FormatterOptions, PresenterFactory, PresenterType,
};
use application::use_cases::AuditPackagesUseCase;
use cli::Args;
use config::AuditSettings;
use shared::error::{AuditError, ExitCode};
use shared::Result;
use std::io::IsTerminal;
use std::path::Path;
use std::process;
use tracing_subscriber::filter::LevelFilter;

#[tokio::main]
async fn main() {
    let args = Args::parse_args();
    init_tracing(args.verbose);

    match run(args).await {
        Ok(exit_code) => process::exit(exit_code.as_i32()),
        Err(e) => {
            eprintln!("\n❌ An error occurred:\n");
            eprintln!("{}", e);

            // Display error chain
            let mut source = e.source();
            while let Some(err) = source {
                eprintln!("\nCaused by: {}", err);
                source = err.source();
            }

            eprintln!();
            process::exit(ExitCode::ApplicationError.as_i32());
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(args: Args) -> Result<ExitCode> {
    let settings = AuditSettings::default()
        .with_npm_registry(args.npm_registry.clone())
        .with_rubygems_registry(args.rubygems_registry.clone())
        .with_batch_size(args.batch_size)
        .with_max_retries(args.max_retries);
    if let Err(e) = settings.validate() {
        eprintln!("{}", e);
        return Ok(ExitCode::InvalidArguments);
    }

    let request = args.audit_request();
    validate_project_path(&request.project_path)?;

    // Create adapters (Dependency Injection)
    let npm_registry = CachingRegistryClient::new(NpmRegistryClient::with_timeout(
        settings.npm_registry.as_str(),
        settings.request_timeout,
    )?);
    let gem_registry = CachingRegistryClient::new(RubyGemsClient::with_timeout(
        settings.rubygems_registry.as_str(),
        settings.request_timeout,
    )?);
    let vulnerability_repository = if request.offline {
        None
    } else {
        Some(OsvClient::with_base_url(settings.osv_api.as_str())?)
    };
    let mut progress_reporter = StderrProgressReporter::new();
    if !std::io::stderr().is_terminal() {
        progress_reporter = progress_reporter.without_color();
    }

    let use_case = AuditPackagesUseCase::new(
        FileSystemReader::new(),
        GemfileLockResolver::new(),
        npm_registry,
        gem_registry,
        vulnerability_repository,
        YamlConfigStore::new(),
        progress_reporter,
    )
    .with_fetch_policy(settings.fetch_policy());

    let response = use_case.execute(request).await?;

    eprintln!("{}", FormatterFactory::progress_message(args.format));
    let options = FormatterOptions {
        colored: args.output.is_none() && std::io::stdout().is_terminal(),
        csv_headers: !args.csv_exclude_headers,
    };
    let formatter = FormatterFactory::create(args.format, options);
    let rendered = formatter.format(&response)?;

    let presenter = PresenterFactory::create(PresenterType::from_output(args.output));
    presenter.present(&rendered)?;

    if response.has_risks() {
        Ok(ExitCode::RisksDetected)
    } else {
        Ok(ExitCode::Success)
    }
}

fn validate_project_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(AuditError::InvalidProjectPath {
            path: path.to_path_buf(),
            reason: "Directory does not exist".to_string(),
        }
        .into());
    }

    let metadata = std::fs::symlink_metadata(path).map_err(|e| AuditError::InvalidProjectPath {
        path: path.to_path_buf(),
        reason: format!("Failed to read path metadata: {}", e),
    })?;

    if metadata.is_symlink() {
        return Err(AuditError::InvalidProjectPath {
            path: path.to_path_buf(),
            reason: "Security: Project path is a symbolic link. For security reasons, symbolic links are not allowed.".to_string(),
        }
        .into());
    }

    if !metadata.is_dir() {
        return Err(AuditError::InvalidProjectPath {
            path: path.to_path_buf(),
            reason: "Not a directory".to_string(),
        }
        .into());
    }

    Ok(())
}
