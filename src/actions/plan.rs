//! Which files a classification would kill.
//!
//! # Rules
//!
//! - every zero-length file is killed;
//! - in an incomplete group the largest file is kept and every strictly
//!   smaller member is killed;
//! - in a duplicate group the first file by [`by_short_name`] is kept and
//!   the rest are killed.
//!
//! A [`Selection`] then narrows the plan to the categories the user chose.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::engine::{by_short_name, Category, Classification};

/// Categories chosen for killing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    /// Kill zero-length files
    pub empty: bool,
    /// Kill prefixes of larger files
    pub incompletes: bool,
    /// Kill extra copies in duplicate groups
    pub duplicates: bool,
}

impl Selection {
    /// Kill nothing.
    pub const NONE: Self = Self {
        empty: false,
        incompletes: false,
        duplicates: false,
    };

    /// Kill everything the plan proposes.
    pub const ALL: Self = Self {
        empty: true,
        incompletes: true,
        duplicates: true,
    };

    /// Interpret an answer to the kill prompt.
    ///
    /// Each of the letters `a`, `e`, `i`, `d` (any case, any order) adds its
    /// category; anything else is ignored, so an empty or unexpected answer
    /// kills nothing.
    ///
    /// # Example
    ///
    /// ```
    /// use killdupes::actions::Selection;
    ///
    /// assert_eq!(Selection::from_answer("A"), Selection::ALL);
    /// assert!(Selection::from_answer("ed").duplicates);
    /// assert!(Selection::from_answer("").is_none());
    /// assert!(Selection::from_answer("no").is_none());
    /// ```
    #[must_use]
    pub fn from_answer(answer: &str) -> Self {
        let answer = answer.trim().to_lowercase();
        if answer.contains('a') {
            return Self::ALL;
        }
        Self {
            empty: answer.contains('e'),
            incompletes: answer.contains('i'),
            duplicates: answer.contains('d'),
        }
    }

    /// Whether no category is selected.
    #[must_use]
    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }

    /// Whether `category` is selected.
    #[must_use]
    pub fn includes(&self, category: Category) -> bool {
        match category {
            Category::Empty => self.empty,
            Category::Incomplete => self.incompletes,
            Category::Duplicate => self.duplicates,
        }
    }
}

/// Strict parsing for `--kill`: comma-separated words (`all`, `empty`,
/// `incompletes`, `duplicates`, `none`) or a run of letters (`eid`).
impl FromStr for Selection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if s.is_empty() {
            return Err("selection cannot be empty".to_string());
        }

        let mut selection = Self::NONE;
        for word in s.split(',').map(str::trim) {
            match word {
                "none" | "n" => {}
                "all" => selection = Self::ALL,
                "empty" => selection.empty = true,
                "incomplete" | "incompletes" => selection.incompletes = true,
                "duplicate" | "duplicates" => selection.duplicates = true,
                letters if !letters.is_empty() && letters.chars().all(|c| "aeid".contains(c)) => {
                    let parsed = Self::from_answer(letters);
                    selection.empty |= parsed.empty;
                    selection.incompletes |= parsed.incompletes;
                    selection.duplicates |= parsed.duplicates;
                }
                other => {
                    return Err(format!(
                        "unknown selection '{other}' (expected all, empty, incompletes, duplicates, none, or letters from 'aeid')"
                    ))
                }
            }
        }
        Ok(selection)
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return write!(f, "none");
        }
        let names: Vec<&str> = [
            (self.empty, "empty"),
            (self.incompletes, "incompletes"),
            (self.duplicates, "duplicates"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect();
        write!(f, "{}", names.join(","))
    }
}

/// One file the plan would kill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KillTarget {
    /// File to kill
    pub path: PathBuf,
    /// Why it would be killed
    pub category: Category,
}

/// The files a classification would kill, per category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KillPlan {
    targets: Vec<KillTarget>,
    killed: HashSet<PathBuf>,
}

impl KillPlan {
    /// Build the plan for `classification`.
    ///
    /// `size_of` supplies file sizes for incomplete groups; members with an
    /// unknown size are kept.
    #[must_use]
    pub fn build<F>(classification: &Classification, size_of: F) -> Self
    where
        F: Fn(&Path) -> Option<u64>,
    {
        let mut targets = Vec::new();

        targets.extend(classification.zero_length.iter().map(|path| KillTarget {
            path: path.clone(),
            category: Category::Empty,
        }));

        for (superset, prefixes) in &classification.incomplete {
            let largest = std::iter::once(superset)
                .chain(prefixes)
                .filter_map(|p| size_of(p))
                .max();
            let Some(largest) = largest else {
                continue;
            };
            for path in std::iter::once(superset).chain(prefixes) {
                if size_of(path).is_some_and(|size| size < largest) {
                    targets.push(KillTarget {
                        path: path.clone(),
                        category: Category::Incomplete,
                    });
                }
            }
        }

        for (first, rest) in &classification.duplicate {
            let mut group: Vec<&Path> = std::iter::once(first.as_path())
                .chain(rest.iter().map(PathBuf::as_path))
                .collect();
            group.sort_by(|a, b| by_short_name(a, b));
            targets.extend(group[1..].iter().map(|path| KillTarget {
                path: path.to_path_buf(),
                category: Category::Duplicate,
            }));
        }

        Self::from_targets(targets)
    }

    fn from_targets(targets: Vec<KillTarget>) -> Self {
        let killed = targets.iter().map(|t| t.path.clone()).collect();
        Self { targets, killed }
    }

    /// Drop `protected` paths from the plan.
    ///
    /// A group whose kept file is protected is dropped entirely: if the file
    /// meant to survive could not be fully read, its copies are left alone
    /// too.
    #[must_use]
    pub fn excluding(self, classification: &Classification, protected: &HashSet<PathBuf>) -> Self {
        if protected.is_empty() {
            return self;
        }

        let mut abandoned: BTreeSet<&Path> = BTreeSet::new();
        for (superset, prefixes) in &classification.incomplete {
            if protected.contains(superset) {
                abandoned.extend(prefixes.iter().map(PathBuf::as_path));
            }
        }
        for (first, rest) in &classification.duplicate {
            let mut group: Vec<&Path> = std::iter::once(first.as_path())
                .chain(rest.iter().map(PathBuf::as_path))
                .collect();
            group.sort_by(|a, b| by_short_name(a, b));
            if protected.contains(group[0]) {
                abandoned.extend(group);
            }
        }

        let targets: Vec<KillTarget> = self
            .targets
            .into_iter()
            .filter(|t| !protected.contains(&t.path) && !abandoned.contains(t.path.as_path()))
            .collect();
        log::debug!(
            "Kill plan after protecting {} file(s): {} target(s)",
            protected.len(),
            targets.len()
        );
        Self::from_targets(targets)
    }

    /// All targets, empty files first, then incompletes, then duplicates.
    #[must_use]
    pub fn targets(&self) -> &[KillTarget] {
        &self.targets
    }

    /// Whether `path` would be killed under [`Selection::ALL`].
    #[must_use]
    pub fn is_killed(&self, path: &Path) -> bool {
        self.killed.contains(path)
    }

    /// Paths to kill for `selection`, in plan order.
    #[must_use]
    pub fn select(&self, selection: Selection) -> Vec<PathBuf> {
        self.targets
            .iter()
            .filter(|t| selection.includes(t.category))
            .map(|t| t.path.clone())
            .collect()
    }

    /// Number of targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether nothing would be killed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
