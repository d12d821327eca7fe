//! Whole-application runs through `run_app`.
//!
//! Every run passes `--output json` or an explicit `--kill` so no prompt is
//! shown when the tests run from a terminal.

use clap::Parser;
use killdupes::cli::Cli;
use killdupes::error::ExitCode;
use killdupes::run_app;
use std::fs;
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

fn write(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn pattern(dir: &TempDir) -> String {
    format!("{}/*", dir.path().display())
}

fn run(args: &[&str]) -> anyhow::Result<ExitCode> {
    let mut argv = vec!["killdupes", "-q", "--no-progress"];
    argv.extend_from_slice(args);
    run_app(Cli::try_parse_from(argv).unwrap())
}

#[test]
fn test_nothing_found() {
    let dir = tempdir().unwrap();
    write(&dir, "a", b"one");
    write(&dir, "b", b"two");

    let code = run(&[&pattern(&dir), "--output", "json"]).unwrap();
    assert_eq!(code, ExitCode::NothingFound);
}

#[test]
fn test_empty_directory_finds_nothing() {
    let dir = tempdir().unwrap();
    let code = run(&[&pattern(&dir), "--output", "json"]).unwrap();
    assert_eq!(code, ExitCode::NothingFound);
}

#[test]
fn test_duplicates_found() {
    let dir = tempdir().unwrap();
    write(&dir, "a", b"same");
    write(&dir, "b", b"same");

    let code = run(&[&pattern(&dir), "--output", "json"]).unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_csv_output_runs() {
    let dir = tempdir().unwrap();
    write(&dir, "empty", b"");

    let code = run(&[&pattern(&dir), "--output", "csv"]).unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_kill_all_permanently() {
    let dir = tempdir().unwrap();
    let empty = write(&dir, "empty", b"");
    let whole = write(&dir, "whole", b"0123456789");
    let part = write(&dir, "whole.part", b"01234");
    let original = write(&dir, "x", b"copy me");
    let copy = write(&dir, "x copy", b"copy me");
    let unique = write(&dir, "unique", b"nothing like it");

    let code = run(&[&pattern(&dir), "--kill", "all", "--permanent", "--yes", "-c", "3"]).unwrap();
    assert_eq!(code, ExitCode::Success);

    assert!(!empty.exists());
    assert!(!part.exists());
    assert!(!copy.exists());
    assert!(whole.exists());
    assert!(original.exists());
    assert!(unique.exists());
}

#[test]
fn test_kill_selected_categories_only() {
    let dir = tempdir().unwrap();
    let empty = write(&dir, "empty", b"");
    let original = write(&dir, "x", b"copy me");
    let copy = write(&dir, "x copy", b"copy me");

    let code = run(&[&pattern(&dir), "--kill", "d", "--permanent", "--yes"]).unwrap();
    assert_eq!(code, ExitCode::Success);

    assert!(empty.exists());
    assert!(original.exists());
    assert!(!copy.exists());
}

#[test]
fn test_kill_none_deletes_nothing() {
    let dir = tempdir().unwrap();
    let a = write(&dir, "a", b"same");
    let b = write(&dir, "b", b"same");

    let code = run(&[&pattern(&dir), "--kill", "none", "--permanent", "--yes"]).unwrap();
    assert_eq!(code, ExitCode::Success);
    assert!(a.exists() && b.exists());
}

#[test]
fn test_file_list_input() {
    let dir = tempdir().unwrap();
    let a = write(&dir, "a", b"same");
    let b = write(&dir, "b", b"same");
    let outside_list = write(&dir, "c", b"same");
    let list = dir.path().join("list.txt");
    fs::write(&list, format!("{}\n{}\n", a.display(), b.display())).unwrap();

    let code = run(&[
        "--file",
        list.to_str().unwrap(),
        "--kill",
        "duplicates",
        "--permanent",
        "--yes",
    ])
    .unwrap();
    assert_eq!(code, ExitCode::Success);
    assert!(a.exists());
    assert!(!b.exists());
    assert!(outside_list.exists());
}

#[test]
fn test_missing_list_file_is_an_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.txt");
    let result = run(&["--file", missing.to_str().unwrap(), "--output", "json"]);
    assert!(result.is_err());
}

#[test]
fn test_invalid_pattern_is_an_error() {
    let dir = tempdir().unwrap();
    let bad = format!("{}/[unclosed", dir.path().display());
    assert!(run(&[&bad, "--output", "json"]).is_err());
}

#[test]
fn test_missing_config_file_is_an_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("none.toml");
    let result = run(&["--config", missing.to_str().unwrap(), "--output", "json"]);
    let err = result.unwrap_err();
    assert!(format!("{err:#}").contains("none.toml"));
}

#[test]
fn test_show_config() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(&config, "chunk_size = 2048\n").unwrap();

    let code = run(&["--config", config.to_str().unwrap(), "--show-config"]).unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_config_file_chunk_size_is_used() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join("a"), b"abcdefgh").unwrap();
    fs::write(data.join("b"), b"abcd").unwrap();
    let config = dir.path().join("config.toml");
    fs::write(&config, "chunk_size = 1\n").unwrap();

    let code = run(&[
        &format!("{}/*", data.display()),
        "--config",
        config.to_str().unwrap(),
        "--output",
        "json",
    ])
    .unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_partial_success() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    write(&dir, "a", b"same");
    write(&dir, "b", b"same");
    let locked = write(&dir, "locked", b"same");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    let code = run(&[&pattern(&dir), "--output", "json"]).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    // Root can read the file anyway.
    assert!(
        code == ExitCode::PartialSuccess || code == ExitCode::Success,
        "unexpected exit code {code:?}"
    );
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_never_killed() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let a = write(&dir, "a", b"same");
    let locked = write(&dir, "zz-locked", b"same");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    let readable = fs::File::open(&locked).is_ok();

    let code = run(&[&pattern(&dir), "--kill", "all", "--permanent", "--yes"]).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    assert!(a.exists());
    if readable {
        assert_eq!(code, ExitCode::Success);
        assert!(!locked.exists());
    } else {
        assert_eq!(code, ExitCode::PartialSuccess);
        assert!(locked.exists());
    }
}
