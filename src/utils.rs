// ABOUTME: Filesystem helpers shared by the settings store and the exporter
// ABOUTME: Provides directory creation and atomic pretty-printed JSON writes

use crate::error::{CliError, CliResult};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Create the parent directory of `path` (and its ancestors) if missing.
pub fn ensure_parent_dir(path: &Path) -> CliResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| CliError::filesystem(parent, e))
        }
        _ => Ok(()),
    }
}

/// Serialize `value` as pretty-printed JSON and atomically replace `path`.
///
/// The document is written to a temporary file in the destination directory
/// and renamed over the target, so an interrupted write never leaves a
/// truncated file behind. Any existing file at `path` is overwritten.
///
/// # Errors
///
/// Returns [`CliError::Filesystem`] if the directory cannot be created, the
/// temporary file cannot be written, or the rename fails.
pub fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> CliResult<()> {
    ensure_parent_dir(path)?;

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp =
        tempfile::NamedTempFile::new_in(parent).map_err(|e| CliError::filesystem(parent, e))?;

    serde_json::to_writer_pretty(tmp.as_file_mut(), value)
        .map_err(|e| CliError::filesystem(path, e.into()))?;
    tmp.as_file_mut()
        .write_all(b"\n")
        .map_err(|e| CliError::filesystem(path, e))?;

    tmp.persist(path)
        .map_err(|e| CliError::filesystem(path, e.error))?;

    tracing::debug!("Wrote {}", path.display());

    Ok(())
}
