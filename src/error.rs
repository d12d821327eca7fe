//! Structured error handling and exit codes.

use serde::Serialize;

/// Exit codes for the killdupes application.
///
/// - 0: Success (completed normally, something was classified)
/// - 1: General error (unexpected failure)
/// - 2: Nothing found (completed normally, every file is unique)
/// - 3: Partial success (completed, but some reads failed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: empty files, incompletes or duplicates were found.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// Nothing found: no file belongs to any group.
    NothingFound = 2,
    /// Partial success: results are reported but some files could not be read.
    PartialSuccess = 3,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "KD000",
            Self::GeneralError => "KD001",
            Self::NothingFound => "KD002",
            Self::PartialSuccess => "KD003",
        }
    }

    /// Pick the exit code for a finished run.
    ///
    /// Read warnings take precedence over an empty result.
    #[must_use]
    pub fn for_run(found_anything: bool, had_warnings: bool) -> Self {
        if had_warnings {
            Self::PartialSuccess
        } else if found_anything {
            Self::Success
        } else {
            Self::NothingFound
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "KD001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Messages of the underlying causes, outermost first
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
            causes: err.chain().skip(1).map(ToString::to_string).collect(),
        }
    }
}
