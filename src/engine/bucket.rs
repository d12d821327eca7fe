//! File handles, buckets and the offset frontier.
//!
//! Handles live in an arena owned by the running engine and are referred to
//! by index. Pending buckets are kept in an ordered map keyed by offset; the
//! engine pops the lowest offset, reads every bucket there, and pushes the
//! resulting child buckets at strictly larger offsets. The map is never
//! iterated while it is being extended.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::fingerprint::Fingerprint;

/// Index of a [`FileHandle`] in the engine's handle arena.
pub type HandleId = usize;

/// One candidate file plus its comparison state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    /// Path of the candidate
    pub path: PathBuf,
    /// Size from metadata at seed time, only used to order reads
    pub size: u64,
    end_offset: Option<u64>,
    failed: bool,
}

impl FileHandle {
    /// Create a handle that has not been read yet.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self {
            path,
            size,
            end_offset: None,
            failed: false,
        }
    }

    /// Path and size pair for the ordering functions in [`super::groups`].
    #[must_use]
    pub fn key(&self) -> (&Path, u64) {
        (&self.path, self.size)
    }

    /// Whether a read of this file has returned no bytes (or failed).
    #[must_use]
    pub fn reached_end(&self) -> bool {
        self.end_offset.is_some()
    }

    /// Offset at which the file ended, if it has.
    #[must_use]
    pub fn end_offset(&self) -> Option<u64> {
        self.end_offset
    }

    /// Whether the file ended because a read failed.
    #[must_use]
    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Finalize the file at `offset`.
    pub fn mark_end(&mut self, offset: u64) {
        debug_assert!(self.end_offset.is_none(), "file ended twice");
        self.end_offset = Some(offset);
    }

    /// Finalize the file at `offset` after a read failure.
    pub fn mark_failed(&mut self, offset: u64) {
        self.mark_end(offset);
        self.failed = true;
    }
}

/// A member of a bucket that was read, as seen after its round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketMember {
    /// Path of the file
    pub path: PathBuf,
    /// Size from metadata
    pub size: u64,
    /// The file ended at this bucket's offset
    pub reached_end: bool,
    /// The file ended here because a read failed
    pub failed: bool,
}

/// A bucket the engine read, kept for the final classification walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketRecord {
    /// Offset at which the members were read
    pub offset: u64,
    /// Fingerprint shared by all members up to `offset`
    pub fingerprint: Fingerprint,
    /// Members in read order (size ascending)
    pub members: Vec<BucketMember>,
}

impl BucketRecord {
    /// Build a record from the handles of a bucket after its round.
    #[must_use]
    pub fn capture(
        offset: u64,
        fingerprint: Fingerprint,
        members: &[HandleId],
        handles: &[FileHandle],
    ) -> Self {
        let members = members
            .iter()
            .map(|&id| {
                let handle = &handles[id];
                let reached_end = handle.end_offset() == Some(offset);
                BucketMember {
                    path: handle.path.clone(),
                    size: handle.size,
                    reached_end,
                    failed: reached_end && handle.failed(),
                }
            })
            .collect();
        Self {
            offset,
            fingerprint,
            members,
        }
    }

    /// Members that ended at this offset.
    pub fn ended(&self) -> impl Iterator<Item = &BucketMember> {
        self.members.iter().filter(|m| m.reached_end)
    }

    /// Members that had more bytes past this offset.
    pub fn continued(&self) -> impl Iterator<Item = &BucketMember> {
        self.members.iter().filter(|m| !m.reached_end)
    }

    /// Whether `path` is a member of this bucket.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.members.iter().any(|m| m.path == path)
    }
}

/// Buckets awaiting a read, grouped by offset.
#[derive(Debug, Default)]
pub struct Frontier {
    pending: BTreeMap<u64, BTreeMap<Fingerprint, Vec<HandleId>>>,
}

impl Frontier {
    /// Create an empty frontier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the root bucket at offset 0.
    pub fn seed(&mut self, members: Vec<HandleId>) {
        if !members.is_empty() {
            self.push(0, Fingerprint::root(), members);
        }
    }

    /// Add members to the bucket at `(offset, fingerprint)`.
    pub fn push(&mut self, offset: u64, fingerprint: Fingerprint, members: Vec<HandleId>) {
        self.pending
            .entry(offset)
            .or_default()
            .entry(fingerprint)
            .or_default()
            .extend(members);
    }

    /// Remove and return every bucket at the lowest pending offset.
    pub fn pop_lowest(&mut self) -> Option<(u64, Vec<(Fingerprint, Vec<HandleId>)>)> {
        self.pending
            .pop_first()
            .map(|(offset, buckets)| (offset, buckets.into_iter().collect()))
    }

    /// Number of distinct pending offsets.
    #[must_use]
    pub fn offsets(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
