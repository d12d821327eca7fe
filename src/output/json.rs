//! JSON output formatter.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "zero_length": ["/data/empty.log"],
//!   "incomplete": [
//!     {
//!       "keep": ["/data/debian.iso"],
//!       "kill": ["/data/debian.iso.part"]
//!     }
//!   ],
//!   "duplicate": [
//!     {
//!       "keep": ["/data/notes.txt"],
//!       "kill": ["/data/notes (copy).txt"]
//!     }
//!   ],
//!   "warnings": [
//!     {
//!       "path": "/data/locked.bin",
//!       "offset": 0,
//!       "kind": "permission_denied",
//!       "message": "permission denied reading /data/locked.bin at offset 0"
//!     }
//!   ],
//!   "summary": {
//!     "candidates": 6,
//!     "rounds": 3,
//!     "reads": 14,
//!     "bytes_read": 307200,
//!     "read_failures": 1,
//!     "deepest_offset": 204800,
//!     "duration_ms": 12,
//!     "exit_code": 3,
//!     "exit_code_name": "KD003"
//!   }
//! }
//! ```
//!
//! Within each group, `keep` and `kill` follow the kill plan; a file may sit
//! in `keep` because a read failure protected it.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::actions::KillPlan;
use crate::engine::{by_short_name, EngineReport, ReadWarning};
use crate::error::ExitCode;

/// A group of related files in JSON format.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JsonGroup {
    /// Files the plan keeps
    pub keep: Vec<String>,
    /// Files the plan would kill
    pub kill: Vec<String>,
}

impl JsonGroup {
    fn split<'p>(paths: impl IntoIterator<Item = &'p Path>, plan: &KillPlan) -> Self {
        let (kill, keep): (Vec<&Path>, Vec<&Path>) =
            paths.into_iter().partition(|p| plan.is_killed(p));
        Self {
            keep: keep.into_iter().map(normalize_path).collect(),
            kill: kill.into_iter().map(normalize_path).collect(),
        }
    }
}

/// Run statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Distinct candidate files
    pub candidates: usize,
    /// Offsets at which buckets were read
    pub rounds: usize,
    /// Chunk reads performed
    pub reads: usize,
    /// Total bytes read
    pub bytes_read: u64,
    /// Reads that failed
    pub read_failures: usize,
    /// Largest offset reached
    pub deepest_offset: u64,
    /// Duration of the run in milliseconds
    pub duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "KD000")
    pub exit_code_name: String,
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Zero-length files
    pub zero_length: Vec<String>,
    /// Incomplete groups, largest file first
    pub incomplete: Vec<JsonGroup>,
    /// Duplicate groups, shortest name first
    pub duplicate: Vec<JsonGroup>,
    /// Files that could not be read
    pub warnings: Vec<ReadWarning>,
    /// Run statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Create the JSON output for a finished run.
    #[must_use]
    pub fn new(report: &EngineReport, plan: &KillPlan, exit_code: ExitCode) -> Self {
        let c = &report.classification;
        let sizes = report.sizes();

        let incomplete = c
            .incomplete
            .iter()
            .map(|(superset, prefixes)| {
                let mut group: Vec<&Path> = std::iter::once(superset)
                    .chain(prefixes)
                    .map(PathBuf::as_path)
                    .collect();
                group.sort_by_key(|p| std::cmp::Reverse(sizes.get(p).copied().unwrap_or(0)));
                JsonGroup::split(group, plan)
            })
            .collect();

        let duplicate = c
            .duplicate
            .iter()
            .map(|(first, rest)| {
                let mut group: Vec<&Path> = std::iter::once(first)
                    .chain(rest)
                    .map(PathBuf::as_path)
                    .collect();
                group.sort_by(|a, b| by_short_name(a, b));
                JsonGroup::split(group, plan)
            })
            .collect();

        let stats = &report.stats;
        Self {
            zero_length: c.zero_length.iter().map(|p| normalize_path(p)).collect(),
            incomplete,
            duplicate,
            warnings: report.warnings.iter().map(ReadWarning::from).collect(),
            summary: JsonSummary {
                candidates: stats.candidates,
                rounds: stats.rounds,
                reads: stats.reads,
                bytes_read: stats.bytes_read,
                read_failures: stats.read_failures,
                deepest_offset: stats.deepest_offset,
                duration_ms: stats.duration.as_millis() as u64,
                exit_code: exit_code.as_i32(),
                exit_code_name: exit_code.code_prefix().to_string(),
            },
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer.
    ///
    /// # Arguments
    ///
    /// * `writer` - The writer to output to (e.g., stdout)
    /// * `pretty` - Whether to pretty-print the output
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Normalize a path to an absolute path string.
///
/// Falls back to the path as given if it cannot be canonicalized.
fn normalize_path(path: &Path) -> String {
    match path.canonicalize() {
        Ok(canonical) => canonical.to_string_lossy().into_owned(),
        Err(_) => path.to_string_lossy().into_owned(),
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
