//! Persistence of decoded text to the storage destination

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Write decoded text to `destination`, creating missing parent directories
/// first when `auto_create_dir` is set
///
/// The returned path is only handed back after the write fully succeeded, so
/// an outcome never reports a storage location for a failed write.
///
/// # Errors
///
/// Directory creation and write faults (permission denied, disk full,
/// invalid path) convert to [`Error::Storage`].
pub(crate) async fn persist_text(
    destination: &Path,
    text: &str,
    auto_create_dir: bool,
) -> Result<PathBuf> {
    if auto_create_dir
        && let Some(parent) = destination.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            Error::Storage(format!(
                "failed to create directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    tokio::fs::write(destination, text).await.map_err(|e| {
        Error::Storage(format!("failed to write '{}': {}", destination.display(), e))
    })?;

    Ok(destination.to_path_buf())
}
