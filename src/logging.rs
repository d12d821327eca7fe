//! Logging setup for killdupes.
//!
//! Logs go through the `log` facade to an `env_logger` backend on stderr, so
//! they never mix with reports written to stdout. The level is chosen by
//! (in priority order):
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. CLI flags: `--quiet` (error only) or `--verbose` (debug/trace)
//! 3. Default: info level
//!
//! What the engine logs where:
//!
//! - `info`: run summary (candidates, groups, bytes read)
//! - `warn`: files that could not be read
//! - `debug`: every round (offset, bucket count), ignored list entries
//! - `trace`: every chunk read and every classification decision
//!
//! # Example
//!
//! ```rust,no_run
//! use killdupes::logging::init_logging;
//!
//! // -vv
//! init_logging(2, false);
//! log::trace!("now visible");
//! ```

use env_logger::{Builder, Target};
use log::LevelFilter;
use std::env;
use std::io::Write;

/// How much context each log line carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineFormat {
    /// `LEVEL message`
    Compact,
    /// `timestamp LEVEL message`
    Timestamped,
    /// `timestamp LEVEL [module] message`
    Detailed,
}

/// Initialize the logging subsystem based on CLI verbosity flags.
///
/// # Arguments
///
/// * `verbose` - Verbosity count from CLI (0=normal, 1=debug, 2+=trace)
/// * `quiet` - If true, only show errors (overridden by RUST_LOG)
///
/// Calling it again after a logger is installed has no effect, which keeps
/// repeated `run_app` calls in tests harmless.
pub fn init_logging(verbose: u8, quiet: bool) {
    let from_env = env::var("RUST_LOG").ok();

    let mut builder = Builder::new();
    builder.target(Target::Stderr);
    match &from_env {
        Some(_) => {
            builder.parse_default_env();
        }
        None => {
            builder.filter_level(determine_level(verbose, quiet));
        }
    }
    apply_format(&mut builder, line_format(verbose, cfg!(debug_assertions)));

    if builder.try_init().is_err() {
        return;
    }

    match from_env {
        Some(filters) => log::debug!("Logging configured from RUST_LOG={filters}"),
        None => log::debug!(
            "Logging initialized at level: {:?}",
            determine_level(verbose, quiet)
        ),
    }
}

/// Determine the log level from CLI flags.
///
/// `quiet` wins over any `verbose` count.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Release builds stay compact unless asked for more; debug builds always
/// carry timestamps.
fn line_format(verbose: u8, debug_build: bool) -> LineFormat {
    match (verbose, debug_build) {
        (0, false) => LineFormat::Compact,
        (0, true) | (1, false) => LineFormat::Timestamped,
        _ => LineFormat::Detailed,
    }
}

fn apply_format(builder: &mut Builder, format: LineFormat) {
    builder.format(move |buf, record| {
        let level = record.level();
        let style = buf.default_level_style(level);
        match format {
            LineFormat::Compact => {
                writeln!(buf, "{style}{level:<5}{style:#} {}", record.args())
            }
            LineFormat::Timestamped => writeln!(
                buf,
                "{} {style}{level:<5}{style:#} {}",
                buf.timestamp_seconds(),
                record.args()
            ),
            LineFormat::Detailed => writeln!(
                buf,
                "{} {style}{level:<5}{style:#} [{}] {}",
                buf.timestamp_millis(),
                record.module_path().unwrap_or("unknown"),
                record.args()
            ),
        }
    });
}

/// Name of the maximum enabled log level.
#[must_use]
pub fn current_level_name() -> &'static str {
    match log::max_level() {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}
