use crate::ports::outbound::OutputPresenter;
use crate::shared::error::AuditError;
use crate::shared::security::ensure_not_symlink;
use crate::shared::Result;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// FileSystemWriter adapter writing the rendered report to a file
pub struct FileSystemWriter {
    output_path: PathBuf,
}

impl FileSystemWriter {
    pub fn new(output_path: PathBuf) -> Self {
        Self { output_path }
    }

    fn write_error(&self, details: impl ToString) -> AuditError {
        AuditError::FileWriteError {
            path: self.output_path.clone(),
            details: details.to_string(),
        }
    }

    fn validate_parent_directory(&self) -> Result<()> {
        match self.output_path.parent() {
            Some(parent) if parent != Path::new("") && !parent.is_dir() => Err(self
                .write_error(format!(
                    "Parent directory does not exist: {}",
                    parent.display()
                ))
                .into()),
            _ => Ok(()),
        }
    }
}

impl OutputPresenter for FileSystemWriter {
    fn present(&self, content: &str) -> Result<()> {
        self.validate_parent_directory()?;
        ensure_not_symlink(&self.output_path, "write").map_err(|e| self.write_error(e))?;

        fs::write(&self.output_path, content).map_err(|e| self.write_error(e))?;

        eprintln!("✅ Report written to {}", self.output_path.display());
        Ok(())
    }
}

/// StdoutPresenter adapter writing the rendered report to stdout
pub struct StdoutPresenter;

impl StdoutPresenter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StdoutPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputPresenter for StdoutPresenter {
    fn present(&self, content: &str) -> Result<()> {
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(content.as_bytes())
            .and_then(|_| stdout.flush())
            .map_err(|e| anyhow::anyhow!("Failed to write report to stdout: {}", e))?;
        Ok(())
    }
}
