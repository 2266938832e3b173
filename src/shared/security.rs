use crate::shared::Result;
use std::fs;
use std::path::Path;

/// Largest manifest, lock or ignore file the audit will read (50 MB).
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Reads a project file after checking it is a regular, reasonably sized file.
///
/// # Security
/// Uses `symlink_metadata()` so a symbolic link is rejected rather than
/// followed, and checks the size before reading to avoid loading huge files.
///
/// # Arguments
/// * `path` - The file to read
/// * `file_description` - Name used in error messages (e.g. "yarn.lock")
pub fn read_regular_file(path: &Path, file_description: &str) -> Result<String> {
    let metadata = fs::symlink_metadata(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {} metadata: {}", file_description, e))?;

    if metadata.is_symlink() {
        anyhow::bail!(
            "Security: {} is a symbolic link. For security reasons, symbolic links are not allowed.",
            path.display()
        );
    }
    if !metadata.is_file() {
        anyhow::bail!("{} is not a regular file", path.display());
    }
    validate_file_size(metadata.len(), path, MAX_FILE_SIZE)?;

    fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", file_description, e))
}

/// Refuses to replace or remove a path that is a symbolic link.
///
/// A path that does not exist yet is accepted.
pub fn ensure_not_symlink(path: &Path, operation: &str) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_symlink() => anyhow::bail!(
            "Security: {} is a symbolic link. For security reasons, {} operations on symbolic links are not allowed.",
            path.display(),
            operation
        ),
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(anyhow::anyhow!(
            "Failed to read metadata for {} operation on {}: {}",
            operation,
            path.display(),
            e
        )),
    }
}

fn validate_file_size(file_size: u64, path: &Path, max_size: u64) -> Result<()> {
    if file_size > max_size {
        anyhow::bail!(
            "Security: {} is too large ({} bytes). Maximum allowed size is {} bytes.",
            path.display(),
            file_size,
            max_size
        );
    }
    Ok(())
}
