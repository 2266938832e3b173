use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// These codes allow CI systems to distinguish between a clean audit,
/// an audit that reported risky packages, and a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// No risky packages reported
    Success = 0,
    /// At least one deprecated, outdated or vulnerable package was reported
    RisksDetected = 1,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (resolution failure, file I/O error, etc.)
    ApplicationError = 3,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::RisksDetected => write!(f, "Risks Detected (1)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
        }
    }
}

/// Application-specific errors for dependency auditing.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Unable to find \"{name}\" in {lockfile}\nDetails: {details}\n\n💡 Hint: Run your package manager's install command so the lock file matches the manifest")]
    ResolutionFailed {
        name: String,
        lockfile: PathBuf,
        details: String,
    },

    #[error("{manifest} not found: {path}\n\n💡 Hint: {suggestion}")]
    ManifestNotFound {
        manifest: &'static str,
        path: PathBuf,
        suggestion: String,
    },

    #[error("Failed to parse {path}\nDetails: {details}\n\n💡 Hint: Please verify that the file is valid")]
    ManifestParseError { path: PathBuf, details: String },

    #[error("Lock file not found: {path}\n\n💡 Hint: {suggestion}")]
    LockfileNotFound { path: PathBuf, suggestion: String },

    #[error("No supported technology detected in {path}\n\n💡 Hint: Run in a directory containing package.json or Gemfile")]
    NoSupportedTechnology { path: PathBuf },

    #[error("Technology \"{technology}\" is not used in {path}\n\n💡 Hint: Detected technologies: {detected}")]
    TechnologyNotDetected {
        technology: String,
        path: PathBuf,
        detected: String,
    },

    #[error("Failed to parse ignore file: {path}\nDetails: {details}\n\n💡 Hint: The file must be YAML with a top-level \"technology\" mapping")]
    ConfigParseError { path: PathBuf, details: String },

    #[error("Failed to write to file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the directory exists and you have write permissions")]
    FileWriteError { path: PathBuf, details: String },

    #[error("Invalid project path: {path}\nReason: {reason}\n\n💡 Hint: Please specify a valid project directory")]
    InvalidProjectPath { path: PathBuf, reason: String },

    #[error("Failed to read file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the file exists and you have read permissions")]
    FileReadError { path: PathBuf, details: String },
}
