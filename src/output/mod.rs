//! Report formatters.
//!
//! This module provides different output formats for a finished run:
//! - Text for people, followed by the kill prompt
//! - JSON for automation and scripting
//! - CSV for spreadsheet import
//!
//! # Example
//!
//! ```no_run
//! use killdupes::actions::KillPlan;
//! use killdupes::engine::BucketEngine;
//! use killdupes::output::TextOutput;
//!
//! let report = BucketEngine::with_defaults().classify(["a", "b"]);
//! let sizes = report.sizes();
//! let plan = KillPlan::build(&report.classification, |p| sizes.get(p).copied());
//!
//! print!("{}", TextOutput::new(&report.classification, &plan).render());
//! ```

pub mod csv;
pub mod json;
pub mod text;

pub use csv::CsvOutput;
pub use json::JsonOutput;
pub use text::TextOutput;
