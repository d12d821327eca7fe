//! Candidate enumeration from patterns and lists, fed into the engine.

use killdupes::candidates::{from_list, from_list_file, from_pattern, CandidateError};
use killdupes::engine::BucketEngine;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn touch(dir: &Path, rel: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_pattern_feeds_engine() {
    let dir = tempdir().unwrap();
    let a = touch(dir.path(), "a.iso", b"image data");
    let b = touch(dir.path(), "b.iso", b"image data");
    touch(dir.path(), "notes.txt", b"image data");

    let files = from_pattern(&format!("{}/*.iso", dir.path().display())).unwrap();
    assert_eq!(files, vec![a.clone(), b.clone()]);

    let report = BucketEngine::with_defaults().classify(files);
    assert_eq!(report.classification.duplicate_group_of(&a).unwrap().len(), 2);
}

#[test]
fn test_star_does_not_cross_directories() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "top", b"x");
    touch(dir.path(), "nested/inner", b"x");

    let flat = from_pattern(&format!("{}/*", dir.path().display())).unwrap();
    assert_eq!(flat.len(), 1);

    let deep = from_pattern(&format!("{}/**/*", dir.path().display())).unwrap();
    assert_eq!(deep.len(), 2);
}

#[test]
fn test_pattern_with_no_matches_is_empty() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "a.txt", b"x");
    let files = from_pattern(&format!("{}/*.iso", dir.path().display())).unwrap();
    assert!(files.is_empty());
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_not_candidates() {
    let dir = tempdir().unwrap();
    let target = touch(dir.path(), "real", b"content");
    std::os::unix::fs::symlink(&target, dir.path().join("link")).unwrap();

    let files = from_pattern(&format!("{}/*", dir.path().display())).unwrap();
    assert_eq!(files, vec![target.clone()]);

    let listed = from_list(Cursor::new(format!(
        "{}\n{}\n",
        dir.path().join("link").display(),
        target.display()
    )))
    .unwrap();
    assert_eq!(listed, vec![target]);
}

#[test]
fn test_list_file_keeps_order_and_drops_junk() {
    let dir = tempdir().unwrap();
    let b = touch(dir.path(), "b", b"1");
    let a = touch(dir.path(), "a", b"1");
    let list = dir.path().join("list.txt");
    fs::write(
        &list,
        format!(
            "{b}\n\n  {a}  \n{missing}\n{dir}\n{b}\n",
            b = b.display(),
            a = a.display(),
            missing = dir.path().join("missing").display(),
            dir = dir.path().display()
        ),
    )
    .unwrap();

    assert_eq!(from_list_file(&list).unwrap(), vec![b, a]);
}

#[test]
fn test_missing_list_file_is_an_error() {
    let dir = tempdir().unwrap();
    let err = from_list_file(&dir.path().join("nope.txt")).unwrap_err();
    assert!(matches!(err, CandidateError::ListUnreadable { .. }));
    assert!(err.to_string().contains("nope.txt"));
}
