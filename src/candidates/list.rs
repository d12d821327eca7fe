//! Newline-separated file lists.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use super::{dedup_paths, is_candidate, CandidateError};

/// Read candidate files from `reader`, one path per line.
///
/// Lines are trimmed and blank lines skipped. Paths that are not regular
/// files, or are symbolic links, are dropped, as are repeats.
///
/// # Errors
///
/// Returns an I/O error if the reader fails.
pub fn from_list<R: BufRead>(reader: R) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let entry = line.trim();
        if entry.is_empty() {
            continue;
        }
        let path = PathBuf::from(entry);
        if is_candidate(&path) {
            files.push(path);
        } else {
            log::debug!("Ignoring list entry {}", path.display());
        }
    }
    Ok(dedup_paths(files))
}

/// Read candidate files from the list file at `path`.
///
/// # Errors
///
/// Returns [`CandidateError::ListUnreadable`] if the file cannot be opened
/// or read.
pub fn from_list_file(path: &Path) -> Result<Vec<PathBuf>, CandidateError> {
    let unreadable = |source| CandidateError::ListUnreadable {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(unreadable)?;
    let files = from_list(BufReader::new(file)).map_err(unreadable)?;
    log::debug!("{} listed {} file(s)", path.display(), files.len());
    Ok(files)
}
