//! CSV output formatter.
//!
//! One row per classified file.
//!
//! # Columns
//!
//! - `category`: `empty`, `incomplete` or `duplicate`
//! - `group`: 1-based group number within the category (empty for empty files)
//! - `role`: `keep` or `kill`, following the kill plan
//! - `size`: file size in bytes as seen when the run started
//! - `path`: path as given
//!
//! # Example
//!
//! ```no_run
//! use killdupes::actions::KillPlan;
//! use killdupes::engine::BucketEngine;
//! use killdupes::output::csv::CsvOutput;
//!
//! let report = BucketEngine::with_defaults().classify(["a", "b"]);
//! let sizes = report.sizes();
//! let plan = KillPlan::build(&report.classification, |p| sizes.get(p).copied());
//!
//! CsvOutput::new(&report, &plan).write_to(std::io::stdout()).unwrap();
//! ```

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::actions::KillPlan;
use crate::engine::{by_short_name, by_size_desc, Category, EngineReport};

/// Errors that can occur during CSV output generation.
#[derive(Debug, Error)]
pub enum CsvOutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// A single row in the CSV output.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    category: &'static str,
    group: Option<usize>,
    role: &'static str,
    size: u64,
    path: std::borrow::Cow<'a, str>,
}

/// CSV output formatter.
pub struct CsvOutput<'a> {
    report: &'a EngineReport,
    plan: &'a KillPlan,
}

impl<'a> CsvOutput<'a> {
    /// Create a new CSV output formatter.
    #[must_use]
    pub fn new(report: &'a EngineReport, plan: &'a KillPlan) -> Self {
        Self { report, plan }
    }

    /// Write the CSV output to the given writer.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), CsvOutputError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        let c = &self.report.classification;
        let sizes = self.report.sizes();
        let size_of = |p: &Path| sizes.get(p).copied().unwrap_or(0);

        for path in &c.zero_length {
            csv_writer.serialize(self.row(Category::Empty, None, path, 0))?;
        }

        for (index, (superset, prefixes)) in c.incomplete.iter().enumerate() {
            let mut group: Vec<(&Path, u64)> = std::iter::once(superset)
                .chain(prefixes)
                .map(|p| (p.as_path(), size_of(p)))
                .collect();
            group.sort_by(|a, b| by_size_desc(*a, *b));
            for (path, size) in group {
                csv_writer.serialize(self.row(Category::Incomplete, Some(index + 1), path, size))?;
            }
        }

        for (index, (first, rest)) in c.duplicate.iter().enumerate() {
            let mut group: Vec<&Path> = std::iter::once(first)
                .chain(rest)
                .map(PathBuf::as_path)
                .collect();
            group.sort_by(|a, b| by_short_name(a, b));
            for path in group {
                let size = size_of(path);
                csv_writer.serialize(self.row(Category::Duplicate, Some(index + 1), path, size))?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }

    fn row<'p>(&self, category: Category, group: Option<usize>, path: &'p Path, size: u64) -> CsvRow<'p> {
        CsvRow {
            category: category.label(),
            group,
            role: if self.plan.is_killed(path) { "kill" } else { "keep" },
            size,
            path: path.to_string_lossy(),
        }
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if serialization fails.
    pub fn to_string(&self) -> Result<String, CsvOutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::BucketEngine;
    use std::fs;
    use tempfile::TempDir;

    fn run(dir: &TempDir, files: &[(&str, &[u8])]) -> (EngineReport, KillPlan) {
        let paths: Vec<PathBuf> = files
            .iter()
            .map(|(name, content)| {
                let path = dir.path().join(name);
                fs::write(&path, content).unwrap();
                path
            })
            .collect();
        let report = BucketEngine::with_defaults().classify(paths);
        let sizes = report.sizes();
        let plan = KillPlan::build(&report.classification, |p| sizes.get(p).copied());
        (report, plan)
    }

    #[test]
    fn test_csv_output_rows() {
        let dir = TempDir::new().unwrap();
        let (report, plan) = run(
            &dir,
            &[
                ("empty", b""),
                ("file1.txt", b"content"),
                ("file2 copy.txt", b"content"),
                ("big", b"0123456789"),
                ("small", b"0123"),
            ],
        );
        let csv_str = CsvOutput::new(&report, &plan).to_string().unwrap();
        let lines: Vec<&str> = csv_str.lines().collect();

        assert_eq!(lines[0], "category,group,role,size,path");
        assert!(lines[1].starts_with("empty,,kill,0,"));
        assert!(lines[2].starts_with("incomplete,1,keep,10,"));
        assert!(lines[3].starts_with("incomplete,1,kill,4,"));
        assert!(lines[4].starts_with("duplicate,1,keep,7,") && lines[4].ends_with("file1.txt"));
        assert!(lines[5].starts_with("duplicate,1,kill,7,"));
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_csv_output_quoting() {
        let dir = TempDir::new().unwrap();
        let (report, plan) = run(&dir, &[("file,with,comma.txt", b""), ("x", b"1")]);
        let csv_str = CsvOutput::new(&report, &plan).to_string().unwrap();

        assert!(csv_str.contains('"'));
        assert!(csv_str.contains("file,with,comma.txt"));
    }

    #[test]
    fn test_csv_output_nothing_found() {
        let report = EngineReport::default();
        let plan = KillPlan::default();
        let csv_str = CsvOutput::new(&report, &plan).to_string().unwrap();
        // csv writes the header lazily, with the first row
        assert!(csv_str.is_empty());
    }
}
