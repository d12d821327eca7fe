//! Classification results and the orderings used to build and present them.
//!
//! # Overview
//!
//! A finished run produces a [`Classification`] with three disjoint parts:
//!
//! - **zero-length** files, whose very first read returned no bytes;
//! - **incomplete** groups, a superset file mapped to the shorter files that
//!   are byte-identical prefixes of it;
//! - **duplicate** groups, a representative mapped to the other files with
//!   exactly the same content.
//!
//! # Example
//!
//! ```
//! use killdupes::engine::{Category, Classification};
//! use std::collections::BTreeSet;
//! use std::path::PathBuf;
//!
//! let mut classification = Classification::default();
//! classification.duplicate.insert(
//!     PathBuf::from("a.txt"),
//!     BTreeSet::from([PathBuf::from("copy of a.txt")]),
//! );
//!
//! assert_eq!(
//!     classification.category_of(&PathBuf::from("copy of a.txt")),
//!     Some(Category::Duplicate)
//! );
//! ```

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Which part of a [`Classification`] a file landed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Zero bytes long.
    Empty,
    /// Superset or prefix member of an incomplete group.
    Incomplete,
    /// Member of a duplicate group.
    Duplicate,
}

impl Category {
    /// Lowercase label used by the reports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Incomplete => "incomplete",
            Self::Duplicate => "duplicate",
        }
    }
}

/// Three-way result of a bucket engine run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Files whose first read returned zero bytes.
    pub zero_length: BTreeSet<PathBuf>,
    /// Superset file to the files that are strict prefixes of it.
    pub incomplete: BTreeMap<PathBuf, BTreeSet<PathBuf>>,
    /// Representative file to its exact duplicates.
    pub duplicate: BTreeMap<PathBuf, BTreeSet<PathBuf>>,
}

impl Classification {
    /// True when nothing was classified.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zero_length.is_empty() && self.incomplete.is_empty() && self.duplicate.is_empty()
    }

    /// Total number of files mentioned anywhere in the result.
    #[must_use]
    pub fn file_count(&self) -> usize {
        let incomplete: usize = self.incomplete.values().map(|p| p.len() + 1).sum();
        let duplicate: usize = self.duplicate.values().map(|d| d.len() + 1).sum();
        self.zero_length.len() + incomplete + duplicate
    }

    /// Find which category, if any, a path was placed in.
    #[must_use]
    pub fn category_of(&self, path: &Path) -> Option<Category> {
        if self.zero_length.contains(path) {
            return Some(Category::Empty);
        }
        let in_groups = |groups: &BTreeMap<PathBuf, BTreeSet<PathBuf>>| {
            groups
                .iter()
                .any(|(key, members)| key == path || members.contains(path))
        };
        if in_groups(&self.incomplete) {
            Some(Category::Incomplete)
        } else if in_groups(&self.duplicate) {
            Some(Category::Duplicate)
        } else {
            None
        }
    }

    /// The full duplicate group containing `path`, representative first.
    #[must_use]
    pub fn duplicate_group_of(&self, path: &Path) -> Option<Vec<&Path>> {
        self.duplicate
            .iter()
            .find(|(key, members)| key.as_path() == path || members.contains(path))
            .map(|(key, members)| {
                std::iter::once(key.as_path())
                    .chain(members.iter().map(PathBuf::as_path))
                    .collect()
            })
    }
}

/// Order paths by length, then lexicographically.
///
/// Used to pick the file to keep in a duplicate group: the shortest name is
/// usually the original and the longer ones the "copy (1)" variants.
#[must_use]
pub fn by_short_name(a: &Path, b: &Path) -> Ordering {
    let (a, b) = (a.as_os_str(), b.as_os_str());
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Order by size ascending, ties by path.
#[must_use]
pub fn by_size_asc(a: (&Path, u64), b: (&Path, u64)) -> Ordering {
    a.1.cmp(&b.1)
        .then_with(|| a.0.as_os_str().cmp(b.0.as_os_str()))
}

/// Order by size descending, ties by path ascending.
#[must_use]
pub fn by_size_desc(a: (&Path, u64), b: (&Path, u64)) -> Ordering {
    b.1.cmp(&a.1)
        .then_with(|| a.0.as_os_str().cmp(b.0.as_os_str()))
}
