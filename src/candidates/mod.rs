//! Candidate file enumeration.
//!
//! This module provides functionality for:
//! - Expanding a glob pattern into files ([`pattern`])
//! - Reading a newline-separated list of files ([`list`])
//!
//! Both keep only regular files that are not symbolic links and drop
//! repeated paths, so the result can be handed straight to the
//! [`BucketEngine`](crate::engine::BucketEngine).
//!
//! # Example
//!
//! ```no_run
//! use killdupes::candidates::from_pattern;
//! use killdupes::engine::BucketEngine;
//!
//! let files = from_pattern("downloads/*.iso").unwrap();
//! let report = BucketEngine::with_defaults().classify(files);
//! println!("{} duplicate group(s)", report.classification.duplicate.len());
//! ```

pub mod list;
pub mod pattern;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub use list::{from_list, from_list_file};
pub use pattern::from_pattern;

/// Errors that can occur while enumerating candidates.
#[derive(thiserror::Error, Debug)]
pub enum CandidateError {
    /// The glob pattern could not be compiled.
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The pattern as given
        pattern: String,
        /// The underlying glob error
        #[source]
        source: globset::Error,
    },

    /// The file list could not be read.
    #[error("Cannot read file list {path}: {source}")]
    ListUnreadable {
        /// Path of the list file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Whether `path` is a regular file and not a symbolic link.
#[must_use]
pub fn is_candidate(path: &Path) -> bool {
    match fs::symlink_metadata(path) {
        Ok(meta) => meta.file_type().is_file(),
        Err(e) => {
            log::debug!("Skipping {}: {}", path.display(), e);
            false
        }
    }
}

/// Drop repeated paths, keeping the first occurrence of each.
#[must_use]
pub fn dedup_paths(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::with_capacity(paths.len());
    paths
        .into_iter()
        .filter(|p| seen.insert(p.clone()))
        .collect()
}
