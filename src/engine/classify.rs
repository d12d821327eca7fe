//! Final classification walk over the recorded buckets.
//!
//! Buckets are visited from the largest offset downward, so the longest
//! matching fingerprint chain decides a file's group first. Once a file has
//! been placed as a duplicate or as a prefix it is claimed and never placed
//! again. A file chosen as a superset may keep collecting shorter prefixes
//! from earlier buckets.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use super::bucket::{BucketMember, BucketRecord};
use super::groups::{by_short_name, by_size_desc, Classification};

/// Turn the engine's bucket log into a [`Classification`].
///
/// For each bucket with two or more members:
/// - every member ended here: the members are duplicates;
/// - some ended, some continued: the ended members are prefixes of the
///   largest unclaimed continuing member;
/// - some ended but every continuing member is already claimed: the ended
///   members, if there are at least two, are duplicates of each other.
///
/// The root bucket at offset 0 only contributes zero-length files. Members
/// whose first read failed are not reported as zero-length.
#[must_use]
pub fn classify_buckets(records: &[BucketRecord]) -> Classification {
    let mut ordered: Vec<&BucketRecord> = records.iter().collect();
    ordered.sort_by(|a, b| {
        b.offset
            .cmp(&a.offset)
            .then_with(|| a.fingerprint.cmp(&b.fingerprint))
    });

    let mut result = Classification::default();
    let mut claimed: HashSet<&Path> = HashSet::new();

    for record in ordered {
        if record.offset == 0 {
            result.zero_length.extend(
                record
                    .ended()
                    .filter(|m| !m.failed)
                    .map(|m| m.path.clone()),
            );
            continue;
        }

        if record.members.len() < 2 {
            continue;
        }

        let ended: Vec<&BucketMember> = record.ended().collect();
        if ended.is_empty() {
            continue;
        }

        let superset = record
            .continued()
            .filter(|m| !claimed.contains(m.path.as_path()))
            .min_by(|a, b| by_size_desc((&a.path, a.size), (&b.path, b.size)));

        match superset {
            Some(superset) => {
                log::trace!(
                    "Offset {}: {} prefix(es) of {}",
                    record.offset,
                    ended.len(),
                    superset.path.display()
                );
                let prefixes = result.incomplete.entry(superset.path.clone()).or_default();
                for member in ended {
                    prefixes.insert(member.path.clone());
                    claimed.insert(member.path.as_path());
                }
            }
            None if ended.len() >= 2 => {
                let mut paths: Vec<&Path> = ended.iter().map(|m| m.path.as_path()).collect();
                paths.sort_by(|a, b| by_short_name(a, b));
                log::trace!(
                    "Offset {}: {} identical file(s), keeping {}",
                    record.offset,
                    paths.len(),
                    paths[0].display()
                );
                let rest: BTreeSet<PathBuf> = paths[1..].iter().map(|p| p.to_path_buf()).collect();
                result.duplicate.insert(paths[0].to_path_buf(), rest);
                claimed.extend(paths);
            }
            None => {
                log::debug!(
                    "Offset {}: {} is a prefix of already grouped files, leaving it unclassified",
                    record.offset,
                    ended[0].path.display()
                );
            }
        }
    }

    result
}
