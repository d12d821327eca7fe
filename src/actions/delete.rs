//! Killing files: move to trash, or delete permanently.
//!
//! # Overview
//!
//! - Move to system trash (default, recoverable)
//! - Permanent deletion (with explicit flag)
//! - Batch operations that keep going past individual failures
//!
//! Every deletion checks that the path still names a regular file first, so
//! a file replaced by a directory or symlink since it was compared is left
//! alone.
//!
//! # Example
//!
//! ```no_run
//! use killdupes::actions::delete::{delete_batch, DeleteConfig};
//! use std::path::PathBuf;
//!
//! let paths = vec![PathBuf::from("copy of a.txt"), PathBuf::from("empty.log")];
//! let result = delete_batch(&paths, &DeleteConfig::trash());
//! println!("{}", result.summary());
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bytesize::ByteSize;
use thiserror::Error;

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The path no longer names a regular file.
    #[error("not a regular file: {0}")]
    NotAFile(PathBuf),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed {
        /// File that could not be trashed
        path: PathBuf,
        /// Message from the trash backend
        message: String,
    },

    /// Permanent delete operation failed.
    #[error("permanent delete failed for {path}: {source}")]
    RemoveFailed {
        /// File that could not be removed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// File being inspected
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::NotAFile(p)
            | Self::TrashFailed { path: p, .. }
            | Self::RemoveFailed { path: p, .. }
            | Self::Io { path: p, .. } => p,
        }
    }
}

/// Result of a successful deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
    /// Whether deletion was permanent (true) or to trash (false).
    pub permanent: bool,
}

/// Results of a batch deletion.
#[derive(Debug, Clone, Default)]
pub struct BatchDeleteResult {
    /// Successfully deleted files.
    pub successes: Vec<DeleteResult>,
    /// Failed deletions with their error messages.
    pub failures: Vec<(PathBuf, String)>,
    /// Total bytes freed.
    pub bytes_freed: u64,
}

impl BatchDeleteResult {
    /// Number of successful deletions.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    /// Number of failed deletions.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Check if all deletions succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let verb = match self.successes.first() {
            Some(first) if first.permanent => "Deleted",
            Some(_) => "Trashed",
            None => "Killed",
        };
        if self.all_succeeded() {
            format!(
                "{verb} {} file(s), freed {}",
                self.success_count(),
                ByteSize::b(self.bytes_freed)
            )
        } else {
            format!(
                "{verb} {} file(s), {} failed, freed {}",
                self.success_count(),
                self.failure_count(),
                ByteSize::b(self.bytes_freed)
            )
        }
    }
}

/// Configuration for deletion operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteConfig {
    /// Use permanent deletion instead of trash.
    pub permanent: bool,
}

impl DeleteConfig {
    /// Config for trash deletion.
    #[must_use]
    pub fn trash() -> Self {
        Self::default()
    }

    /// Config for permanent deletion.
    #[must_use]
    pub fn permanent() -> Self {
        Self { permanent: true }
    }
}

/// Size of `path` if it still names a regular file.
fn regular_file_size(path: &Path) -> Result<u64, DeleteError> {
    let metadata = fs::symlink_metadata(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DeleteError::NotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => DeleteError::PermissionDenied(path.to_path_buf()),
        _ => DeleteError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    if !metadata.file_type().is_file() {
        return Err(DeleteError::NotAFile(path.to_path_buf()));
    }
    Ok(metadata.len())
}

/// Move a single file to the system trash.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `NotAFile` if the path is no longer a regular file
/// - `TrashFailed` if the trash operation fails
pub fn delete_to_trash(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = regular_file_size(path)?;

    trash::delete(path).map_err(|e| DeleteError::TrashFailed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    log::debug!("Moved to trash: {} ({})", path.display(), ByteSize::b(size));
    Ok(DeleteResult {
        path: path.to_path_buf(),
        size,
        permanent: false,
    })
}

/// Permanently delete a single file.
///
/// **WARNING**: This operation cannot be undone.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `NotAFile` if the path is no longer a regular file
/// - `RemoveFailed` if the delete operation fails
pub fn permanent_delete(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = regular_file_size(path)?;

    fs::remove_file(path).map_err(|source| DeleteError::RemoveFailed {
        path: path.to_path_buf(),
        source,
    })?;

    log::debug!("Permanently deleted: {} ({})", path.display(), ByteSize::b(size));
    Ok(DeleteResult {
        path: path.to_path_buf(),
        size,
        permanent: true,
    })
}

/// Kill every file in `paths`.
///
/// Failures are collected and never stop the batch.
pub fn delete_batch(paths: &[PathBuf], config: &DeleteConfig) -> BatchDeleteResult {
    let mut result = BatchDeleteResult::default();

    for path in paths {
        let outcome = if config.permanent {
            permanent_delete(path)
        } else {
            delete_to_trash(path)
        };

        match outcome {
            Ok(deleted) => {
                result.bytes_freed += deleted.size;
                result.successes.push(deleted);
            }
            Err(e) => {
                log::warn!("Failed to kill {}: {}", path.display(), e);
                result.failures.push((path.clone(), e.to_string()));
            }
        }
    }

    log::info!("{}", result.summary());
    result
}
