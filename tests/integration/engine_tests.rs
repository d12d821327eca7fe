//! End-to-end engine runs against real files.

use killdupes::engine::{BucketEngine, EngineConfig, EngineReport};
use killdupes::progress::{ProgressCallback, ReadEvent};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, TempDir};

fn write_files(dir: &TempDir, files: &[(&str, &[u8])]) -> Vec<PathBuf> {
    files
        .iter()
        .map(|(name, content)| {
            let path = dir.path().join(name);
            fs::write(&path, content).unwrap();
            path
        })
        .collect()
}

fn classify(paths: &[PathBuf], chunk_size: usize) -> EngineReport {
    BucketEngine::new(EngineConfig::default().with_chunk_size(chunk_size)).classify(paths.to_vec())
}

fn set(paths: &[&PathBuf]) -> BTreeSet<PathBuf> {
    paths.iter().map(|p| p.to_path_buf()).collect()
}

#[test]
fn test_identical_files_form_duplicate_group() {
    let dir = tempdir().unwrap();
    let paths = write_files(&dir, &[("a", b"hello"), ("b", b"hello"), ("c", b"world")]);
    let report = classify(&paths, 100 * 1024);

    let c = &report.classification;
    assert_eq!(c.duplicate.len(), 1);
    assert_eq!(c.duplicate[&paths[0]], set(&[&paths[1]]));
    assert_eq!(c.category_of(&paths[2]), None);
    assert!(c.incomplete.is_empty());
    assert!(c.zero_length.is_empty());
    assert!(report.warnings.is_empty());
}

#[test]
fn test_prefix_forms_incomplete_group() {
    let dir = tempdir().unwrap();
    let paths = write_files(&dir, &[("a", b"hello world"), ("b", b"hello")]);
    let report = classify(&paths, 100 * 1024);

    let c = &report.classification;
    assert_eq!(c.incomplete.len(), 1);
    assert_eq!(c.incomplete[&paths[0]], set(&[&paths[1]]));
    assert!(c.duplicate.is_empty());
}

#[test]
fn test_zero_length_file() {
    let dir = tempdir().unwrap();
    let paths = write_files(&dir, &[("a", b"")]);
    let report = classify(&paths, 100 * 1024);

    assert_eq!(report.classification.zero_length, set(&[&paths[0]]));
    assert!(report.classification.duplicate.is_empty());
}

#[test]
fn test_zero_length_files_are_not_duplicates_of_each_other() {
    let dir = tempdir().unwrap();
    let paths = write_files(&dir, &[("a", b""), ("b", b""), ("c", b"x")]);
    let c = classify(&paths, 4).classification;

    assert_eq!(c.zero_length, set(&[&paths[0], &paths[1]]));
    assert!(c.duplicate.is_empty());
    assert!(c.incomplete.is_empty());
}

#[test]
fn test_one_byte_chunks_split_on_second_byte() {
    let dir = tempdir().unwrap();
    let paths = write_files(&dir, &[("a", b"xx"), ("b", b"xx"), ("c", b"xy")]);
    let report = classify(&paths, 1);

    let sizes_at = |offset: u64| -> Vec<usize> {
        report
            .buckets
            .iter()
            .filter(|b| b.offset == offset)
            .map(|b| b.members.len())
            .collect()
    };
    assert_eq!(sizes_at(0), vec![3]);
    assert_eq!(sizes_at(1), vec![3]);
    // {c} is retired at offset 2 without a read
    assert_eq!(sizes_at(2), vec![2]);
    assert_eq!(report.stats.buckets_retired, 1);

    let c = &report.classification;
    assert_eq!(c.duplicate.len(), 1);
    assert_eq!(c.duplicate[&paths[0]], set(&[&paths[1]]));
    assert_eq!(c.category_of(&paths[2]), None);
}

/// Removes one file right after its first chunk was read.
struct VanishAfterFirstRead {
    target: PathBuf,
    done: Mutex<bool>,
}

impl ProgressCallback for VanishAfterFirstRead {
    fn on_chunk_read(&self, event: &ReadEvent<'_>) {
        let mut done = self.done.lock().unwrap();
        if !*done && event.path == self.target && event.bytes > 0 {
            fs::remove_file(&self.target).unwrap();
            *done = true;
        }
    }
}

#[test]
fn test_file_vanishing_mid_run_becomes_warning() {
    let dir = tempdir().unwrap();
    let paths = write_files(&dir, &[("a", b"abcd"), ("b", b"abcd"), ("c", b"abcd")]);
    let callback = Arc::new(VanishAfterFirstRead {
        target: paths[2].clone(),
        done: Mutex::new(false),
    });
    let config = EngineConfig::default()
        .with_chunk_size(1)
        .with_progress_callback(callback.clone());

    let report = BucketEngine::new(config).classify(paths.clone());

    assert!(*callback.done.lock().unwrap());
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].path(), paths[2].as_path());
    assert_eq!(report.warnings[0].offset(), 1);
    assert_eq!(report.warnings[0].kind(), "not_found");

    let c = &report.classification;
    assert_eq!(c.duplicate[&paths[0]], set(&[&paths[1]]));
    assert_eq!(c.category_of(&paths[2]), None);
    assert!(c.zero_length.is_empty());
}

#[test]
fn test_missing_file_does_not_stop_run() {
    let dir = tempdir().unwrap();
    let mut paths = write_files(&dir, &[("a", b"same"), ("b", b"same")]);
    paths.push(dir.path().join("never-existed"));
    let report = classify(&paths, 2);

    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].offset(), 0);
    assert_eq!(report.classification.duplicate[&paths[0]], set(&[&paths[1]]));
    assert!(!report.classification.zero_length.contains(&paths[2]));
    assert_eq!(report.warned_paths().len(), 1);
}

#[test]
fn test_offsets_are_processed_in_ascending_order() {
    let dir = tempdir().unwrap();
    let paths = write_files(
        &dir,
        &[
            ("a", b"0123456789abcdef"),
            ("b", b"0123456789abcdef"),
            ("c", b"0123456789"),
            ("d", b"0123"),
            ("e", b"01234567xx"),
        ],
    );
    let report = classify(&paths, 3);

    let offsets: Vec<u64> = report.buckets.iter().map(|b| b.offset).collect();
    assert!(offsets.windows(2).all(|w| w[0] <= w[1]), "{offsets:?}");
}

#[test]
fn test_chunk_size_does_not_change_result() {
    let dir = tempdir().unwrap();
    let paths = write_files(
        &dir,
        &[
            ("full.iso", b"0123456789abcdefghij"),
            ("full copy.iso", b"0123456789abcdefghij"),
            ("part1", b"0123456"),
            ("other", b"0123456789abcdefghiX"),
            ("empty", b""),
        ],
    );

    let reference = classify(&paths, 1024).classification;
    for chunk_size in [1, 2, 3, 5, 7, 16] {
        assert_eq!(
            classify(&paths, chunk_size).classification,
            reference,
            "chunk size {chunk_size}"
        );
    }
}

#[test]
fn test_multiple_prefixes_of_one_superset() {
    let dir = tempdir().unwrap();
    let paths = write_files(&dir, &[("whole", b"abcdefghij"), ("p1", b"abc"), ("p2", b"abcdef")]);
    let report = classify(&paths, 4);

    assert_eq!(
        report.classification.incomplete[&paths[0]],
        set(&[&paths[1], &paths[2]])
    );
}

#[test]
fn test_each_file_in_at_most_one_group() {
    let dir = tempdir().unwrap();
    let paths = write_files(
        &dir,
        &[
            ("a", b"abcdef"),
            ("b", b"abcdef"),
            ("c", b"abc"),
            ("d", b"abc"),
            ("e", b"abcdefgh"),
            ("f", b""),
        ],
    );
    let c = classify(&paths, 2).classification;

    let mut seen = BTreeSet::new();
    let grouped = c
        .zero_length
        .iter()
        .chain(c.incomplete.iter().flat_map(|(k, v)| std::iter::once(k).chain(v)))
        .chain(c.duplicate.iter().flat_map(|(k, v)| std::iter::once(k).chain(v)));
    for path in grouped {
        assert!(seen.insert(path.clone()), "{} listed twice", path.display());
    }
    assert!(c.category_of(&paths[4]).is_some());
}

#[test]
fn test_repeated_path_is_counted_once() {
    let dir = tempdir().unwrap();
    let paths = write_files(&dir, &[("a", b"data")]);
    let report = classify(&[paths[0].clone(), paths[0].clone()], 16);

    assert!(report.classification.is_empty());
    assert_eq!(report.stats.candidates, 1);
    assert_eq!(report.stats.repeated_paths, 1);
}

#[test]
fn test_large_files_read_only_until_they_differ() {
    let dir = tempdir().unwrap();
    let mut a = vec![7u8; 1 << 20];
    let mut b = a.clone();
    a[0] = 1;
    b[0] = 2;
    let paths = write_files(&dir, &[("a", &a), ("b", &b)]);

    let report = classify(&paths, 4096);
    assert!(report.classification.is_empty());
    assert_eq!(report.stats.bytes_read, 2 * 4096);
    assert_eq!(report.stats.rounds, 1);
}

#[test]
fn test_oversized_chunk_on_small_files() {
    let dir = tempdir().unwrap();
    let paths = write_files(&dir, &[("a", b"12345"), ("b", b"12345")]);
    let report = classify(&paths, 1 << 40);

    assert_eq!(report.classification.duplicate[&paths[0]], set(&[&paths[1]]));
    assert_eq!(report.stats.bytes_read, 10);
}
