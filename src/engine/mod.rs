//! Incremental bucket-refinement comparison engine.
//!
//! This module provides functionality for:
//! - Chunked, chained fingerprinting of candidate files ([`fingerprint`])
//! - Per-read file access behind a trait ([`reader`])
//! - Bucket and frontier bookkeeping ([`bucket`])
//! - The round loop itself ([`finder`])
//! - The final offset-descending classification walk ([`classify`])
//! - Result types and deterministic orderings ([`groups`])

pub mod bucket;
pub mod classify;
pub mod finder;
pub mod fingerprint;
pub mod groups;
pub mod reader;

pub use bucket::{BucketMember, BucketRecord, FileHandle};
pub use classify::classify_buckets;
pub use finder::{BucketEngine, EngineConfig, EngineReport, EngineStats, DEFAULT_CHUNK_SIZE,
    MAX_CHUNK_SIZE,
};
pub use fingerprint::Fingerprint;
pub use groups::{by_short_name, by_size_asc, by_size_desc, Category, Classification};
pub use reader::{ChunkSource, FsChunkSource, ReadError, ReadWarning};
