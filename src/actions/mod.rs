//! File actions module.
//!
//! This module provides functionality for:
//! - Deciding which files a classification would kill ([`plan`])
//! - Asking the user which categories to kill ([`prompt`])
//! - Moving files to the trash or deleting them permanently ([`delete`])
//!
//! ```no_run
//! use killdupes::actions::{delete_batch, DeleteConfig, KillPlan, Selection};
//! use killdupes::engine::BucketEngine;
//!
//! let report = BucketEngine::with_defaults().classify(["a", "b", "c"]);
//! let sizes = report.sizes();
//! let plan = KillPlan::build(&report.classification, |p| sizes.get(p).copied());
//!
//! let targets = plan.select(Selection::from_answer("d"));
//! let result = delete_batch(&targets, &DeleteConfig::trash());
//! println!("{}", result.summary());
//! ```

pub mod delete;
pub mod plan;
pub mod prompt;

pub use delete::{
    delete_batch, delete_to_trash, permanent_delete, BatchDeleteResult, DeleteConfig,
    DeleteError, DeleteResult,
};
pub use plan::{KillPlan, KillTarget, Selection};
pub use prompt::{ask_selection, confirm_permanent, KILL_PROMPT};
