//! Command-line interface definitions for killdupes.
//!
//! This module defines all CLI arguments and options using the clap derive API.
//!
//! # Example
//!
//! ```bash
//! # Compare every file in the current directory
//! killdupes
//!
//! # Compare downloads, including half-finished ones
//! killdupes 'downloads/*.iso*'
//!
//! # Compare the files named in a list, report as JSON
//! killdupes --file list.txt --output json
//!
//! # Kill empty files and duplicates without asking
//! killdupes '**/*' --kill ed
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::actions::Selection;
use crate::engine::MAX_CHUNK_SIZE;

/// Find empty files, incomplete copies and duplicates, and kill them.
///
/// Files are compared chunk by chunk: a file is only read as far as it takes
/// to tell it apart from every other file.
#[derive(Debug, Parser)]
#[command(name = "killdupes")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Glob pattern selecting the files to compare (`*` does not cross `/`,
    /// `**` does)
    #[arg(value_name = "PATTERN", default_value = "*", conflicts_with = "file")]
    pub pattern: String,

    /// Read the files to compare from LIST, one path per line (`-` for stdin)
    #[arg(short, long, value_name = "LIST")]
    pub file: Option<PathBuf>,

    /// Largest chunk read from a file at a time (e.g., 64KiB, 1MB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(short, long, value_name = "SIZE", value_parser = parse_chunk_size)]
    pub chunk_size: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Kill files without prompting: any combination of a(ll), e(mpty),
    /// i(ncompletes), d(uplicates), or "none"
    #[arg(short, long, value_name = "WHICH")]
    pub kill: Option<Selection>,

    /// Delete permanently instead of moving to the trash
    ///
    /// Warning: Files cannot be recovered after permanent deletion.
    #[arg(long)]
    pub permanent: bool,

    /// Skip the confirmation before permanent deletion (required with
    /// --permanent when stdin is not a terminal)
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Do not show the progress line
    #[arg(long)]
    pub no_progress: bool,

    /// Configuration file to use instead of the platform default
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub show_config: bool,
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing, followed by the kill prompt
    Text,
    /// JSON output for scripting
    Json,
    /// CSV output for spreadsheets
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use killdupes::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("100KiB").unwrap(), 102_400);
/// assert_eq!(parse_size("1MiB").unwrap(), 1_048_576);
/// ```
///
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// a negative number, or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}

/// [`parse_size`] bounded to `1..=MAX_CHUNK_SIZE`, for `--chunk-size`.
fn parse_chunk_size(s: &str) -> Result<u64, String> {
    match parse_size(s)? {
        0 => Err("Chunk size must be at least 1 byte".to_string()),
        n if n > MAX_CHUNK_SIZE => Err(format!(
            "Chunk size must be at most {}",
            bytesize::ByteSize::b(MAX_CHUNK_SIZE)
        )),
        n => Ok(n),
    }
}
