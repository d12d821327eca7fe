//! Glob pattern expansion.
//!
//! The pattern is split into a literal base directory and a glob tail. The
//! base is walked with `walkdir` (no symlink following, depth bounded by the
//! number of tail components unless the tail contains `**`) and every entry
//! is matched against the whole pattern with `globset`. `*` does not cross
//! `/`, and hidden entries are only matched when the pattern itself names a
//! dot-file, as with shell globbing.

use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use walkdir::{DirEntry, WalkDir};

use super::{is_candidate, CandidateError};

/// Expand `pattern` into a sorted list of candidate files.
///
/// A pattern without glob characters names a single file.
///
/// # Errors
///
/// Returns [`CandidateError::InvalidPattern`] if the pattern does not compile.
/// Unreadable directories are logged and skipped.
///
/// # Example
///
/// ```no_run
/// use killdupes::candidates::from_pattern;
///
/// for path in from_pattern("*.part").unwrap() {
///     println!("{}", path.display());
/// }
/// ```
pub fn from_pattern(pattern: &str) -> Result<Vec<PathBuf>, CandidateError> {
    let split = SplitPattern::new(pattern);

    if split.depth == 0 {
        let path = PathBuf::from(pattern);
        return Ok(if is_candidate(&path) { vec![path] } else { Vec::new() });
    }

    let matcher = compile(pattern)?;
    let match_hidden = split.names_hidden;

    let mut walker = WalkDir::new(&split.base)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name();
    if !split.recursive {
        walker = walker.max_depth(split.depth);
    }

    let mut files = Vec::new();
    let entries = walker
        .into_iter()
        .filter_entry(|e| match_hidden || e.depth() == 0 || !is_hidden(e));
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry while expanding '{pattern}': {e}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = split.display_path(entry.path());
        if matcher.is_match(&path) && is_candidate(&path) {
            files.push(path);
        }
    }

    log::debug!("Pattern '{}' matched {} file(s)", pattern, files.len());
    Ok(files)
}

fn compile(pattern: &str) -> Result<GlobMatcher, CandidateError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|source| CandidateError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

fn has_glob_meta(component: &str) -> bool {
    component.contains(['*', '?', '[', '{'])
}

/// A pattern split into the directory to walk and how deep to walk it.
#[derive(Debug, PartialEq, Eq)]
struct SplitPattern {
    base: PathBuf,
    /// Number of components after the literal base
    depth: usize,
    /// The tail contains `**`
    recursive: bool,
    /// A tail component starts with `.`
    names_hidden: bool,
    relative_to_cwd: bool,
}

impl SplitPattern {
    fn new(pattern: &str) -> Self {
        let components: Vec<&str> = pattern.split('/').collect();
        let literal = components
            .iter()
            .take_while(|c| !has_glob_meta(c))
            .count();

        // A fully literal pattern names one file.
        if literal == components.len() {
            return Self {
                base: PathBuf::from(pattern),
                depth: 0,
                recursive: false,
                names_hidden: false,
                relative_to_cwd: false,
            };
        }

        let base = components[..literal].join("/");
        let (base, relative_to_cwd) = if base.is_empty() {
            if pattern.starts_with('/') {
                (PathBuf::from("/"), false)
            } else {
                (PathBuf::from("."), true)
            }
        } else {
            (PathBuf::from(base), false)
        };

        Self {
            base,
            depth: components.len() - literal,
            recursive: components[literal..].contains(&"**"),
            names_hidden: components[literal..].iter().any(|c| c.starts_with('.')),
            relative_to_cwd,
        }
    }

    /// Path as the user would expect to see it: `a.txt` rather than `./a.txt`
    /// for patterns relative to the working directory.
    fn display_path(&self, walked: &Path) -> PathBuf {
        if self.relative_to_cwd {
            walked.strip_prefix(".").unwrap_or(walked).to_path_buf()
        } else {
            walked.to_path_buf()
        }
    }
}
