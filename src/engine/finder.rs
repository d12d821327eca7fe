//! Bucket engine: incremental chunk-by-chunk file classification.
//!
//! # Overview
//!
//! All candidates start in one root bucket at offset 0. Each round pops the
//! lowest pending offset and, for every bucket there:
//!
//! 1. orders the members by size, smallest first;
//! 2. reads the next chunk of each member, shrinking the read length to the
//!    shortest non-empty chunk seen so all survivors extend by the same
//!    number of bytes;
//! 3. marks members that returned no bytes (or failed) as ended here;
//! 4. chains each survivor's fingerprint with its chunk and regroups the
//!    survivors into child buckets at `offset + read length`.
//!
//! Child buckets with a single member are retired without another read.
//! When the frontier is empty the recorded buckets are classified by
//! [`classify_buckets`].
//!
//! # Example
//!
//! ```no_run
//! use killdupes::engine::{BucketEngine, EngineConfig};
//!
//! let engine = BucketEngine::new(EngineConfig::default().with_chunk_size(64 * 1024));
//! let report = engine.classify(["a.iso", "b.iso", "c.iso"]);
//!
//! for (keep, copies) in &report.classification.duplicate {
//!     println!("{} has {} duplicate(s)", keep.display(), copies.len());
//! }
//! for warning in &report.warnings {
//!     eprintln!("Warning: {warning}");
//! }
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::bucket::{BucketRecord, FileHandle, Frontier, HandleId};
use super::classify::classify_buckets;
use super::fingerprint::Fingerprint;
use super::groups::{by_size_asc, Classification};
use super::reader::{ChunkSource, FsChunkSource, ReadError};
use crate::progress::{ProgressCallback, ReadEvent};

/// Default chunk size: 100 KiB.
pub const DEFAULT_CHUNK_SIZE: usize = 100 * 1024;

/// Largest chunk size the command line and configuration accept: 1 GiB.
pub const MAX_CHUNK_SIZE: u64 = 1 << 30;

/// Configuration for the bucket engine.
#[derive(Clone)]
pub struct EngineConfig {
    /// Largest number of bytes read from a file per round.
    pub chunk_size: usize,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("chunk_size", &self.chunk_size)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            progress_callback: None,
        }
    }
}

impl EngineConfig {
    /// Set the chunk size. Values below 1 are raised to 1.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Statistics from one engine run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Distinct candidate paths
    pub candidates: usize,
    /// Repeated input paths that were ignored
    pub repeated_paths: usize,
    /// Offsets at which at least one bucket was read
    pub rounds: usize,
    /// Buckets that were read
    pub buckets_read: usize,
    /// Buckets retired because they had a single member
    pub buckets_retired: usize,
    /// Chunk reads performed, including failed ones
    pub reads: usize,
    /// Total bytes read
    pub bytes_read: u64,
    /// Reads that failed
    pub read_failures: usize,
    /// Largest offset any bucket reached
    pub deepest_offset: u64,
    /// Wall-clock duration of the run
    pub duration: Duration,
}

/// Everything a run produces.
#[derive(Debug, Default)]
pub struct EngineReport {
    /// Empty files, incomplete groups and duplicate groups
    pub classification: Classification,
    /// Per-file read failures; each file was finalized at the failing offset
    pub warnings: Vec<ReadError>,
    /// Run statistics
    pub stats: EngineStats,
    /// Every bucket that was read, in processing order
    pub buckets: Vec<BucketRecord>,
}

impl EngineReport {
    /// Whether any read failed.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Paths that produced a warning.
    #[must_use]
    pub fn warned_paths(&self) -> HashSet<PathBuf> {
        self.warnings.iter().map(|w| w.path().to_path_buf()).collect()
    }

    /// Size of every candidate as seen when the run started.
    #[must_use]
    pub fn sizes(&self) -> HashMap<&Path, u64> {
        self.buckets
            .iter()
            .filter(|record| record.offset == 0)
            .flat_map(|record| &record.members)
            .map(|member| (member.path.as_path(), member.size))
            .collect()
    }
}

/// Incremental bucket-refinement comparison engine.
///
/// Single-threaded and synchronous; a file is open only for the duration of
/// one chunk read.
pub struct BucketEngine<S: ChunkSource = FsChunkSource> {
    config: EngineConfig,
    source: S,
}

impl BucketEngine<FsChunkSource> {
    /// Create an engine that reads from the local filesystem.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self::with_source(config, FsChunkSource::new())
    }

    /// Create a filesystem engine with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl<S: ChunkSource> BucketEngine<S> {
    /// Create an engine over a custom [`ChunkSource`].
    #[must_use]
    pub fn with_source(config: EngineConfig, source: S) -> Self {
        Self { config, source }
    }

    /// The engine's configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Classify `paths` into zero-length files, incomplete groups and
    /// duplicate groups.
    ///
    /// Paths are expected to be regular files. Repeated paths are collapsed
    /// onto their first occurrence. This never fails: read errors become
    /// warnings in the returned report.
    pub fn classify<I, P>(&self, paths: I) -> EngineReport
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let start = Instant::now();
        let mut run = EngineRun::new(&self.config, &self.source);
        run.seed(paths);

        if run.handles.is_empty() {
            log::debug!("No candidates to compare");
            return run.finish(start);
        }

        log::info!(
            "Comparing {} file(s) in chunks of up to {} bytes",
            run.handles.len(),
            self.config.chunk_size
        );

        while let Some((offset, buckets)) = run.frontier.pop_lowest() {
            run.read_offset(offset, buckets);
        }

        run.finish(start)
    }
}

/// State of one in-progress classification.
struct EngineRun<'a, S: ChunkSource> {
    config: &'a EngineConfig,
    source: &'a S,
    handles: Vec<FileHandle>,
    frontier: Frontier,
    records: Vec<BucketRecord>,
    warnings: Vec<ReadError>,
    stats: EngineStats,
}

impl<'a, S: ChunkSource> EngineRun<'a, S> {
    fn new(config: &'a EngineConfig, source: &'a S) -> Self {
        Self {
            config,
            source,
            handles: Vec::new(),
            frontier: Frontier::new(),
            records: Vec::new(),
            warnings: Vec::new(),
            stats: EngineStats::default(),
        }
    }

    /// Create one handle per distinct path and put them all in the root bucket.
    fn seed<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut seen = HashSet::new();
        for path in paths {
            let path: PathBuf = path.into();
            if !seen.insert(path.clone()) {
                log::debug!("Ignoring repeated path {}", path.display());
                self.stats.repeated_paths += 1;
                continue;
            }
            // An unreadable size only affects ordering; the first read will
            // report the real problem.
            let size = self.source.size_of(&path).unwrap_or_else(|e| {
                log::debug!("Could not stat {}: {}", path.display(), e);
                0
            });
            self.handles.push(FileHandle::new(path, size));
        }
        self.stats.candidates = self.handles.len();
        self.frontier.seed((0..self.handles.len()).collect());
    }

    /// Read every bucket pending at `offset`.
    fn read_offset(&mut self, offset: u64, buckets: Vec<(Fingerprint, Vec<HandleId>)>) {
        // The root bucket is always read, even alone, to find empty files.
        let (active, retired): (Vec<_>, Vec<_>) = buckets
            .into_iter()
            .partition(|(_, members)| offset == 0 || members.len() > 1);

        for (_, members) in &retired {
            log::trace!(
                "Offset {}: {} is unique, retiring",
                offset,
                self.handles[members[0]].path.display()
            );
        }
        self.stats.buckets_retired += retired.len();

        if active.is_empty() {
            return;
        }

        self.stats.rounds += 1;
        log::debug!("Offset {}: reading {} bucket(s)", offset, active.len());
        if let Some(callback) = &self.config.progress_callback {
            callback.on_round_start(offset, active.len());
        }

        let count = active.len();
        for (index, (fingerprint, members)) in active.into_iter().enumerate() {
            self.read_bucket(offset, fingerprint, members, (index + 1, count));
        }
    }

    /// Read one chunk from each member of a bucket and push the child buckets.
    fn read_bucket(
        &mut self,
        offset: u64,
        fingerprint: Fingerprint,
        mut members: Vec<HandleId>,
        (bucket, buckets): (usize, usize),
    ) {
        let handles = &self.handles;
        members.sort_by(|&a, &b| by_size_asc(handles[a].key(), handles[b].key()));

        let mut read_size = self.config.chunk_size;
        let mut reads: Vec<(HandleId, Vec<u8>)> = Vec::with_capacity(members.len());

        for (position, &id) in members.iter().enumerate() {
            let path = self.handles[id].path.as_path();
            let requested = read_size;
            let (chunk, failed) = match self.source.read_chunk(path, offset, requested) {
                Ok(chunk) => (chunk, false),
                Err(e) => {
                    let err = ReadError::from_io(path, offset, e);
                    log::warn!("{err}; treating as end of file");
                    self.warnings.push(err);
                    (Vec::new(), true)
                }
            };

            self.stats.reads += 1;
            self.stats.bytes_read += chunk.len() as u64;
            log::trace!(
                "Offset {}: read {}/{} bytes from {}",
                offset,
                chunk.len(),
                requested,
                path.display()
            );
            if let Some(callback) = &self.config.progress_callback {
                callback.on_chunk_read(&ReadEvent {
                    path,
                    offset,
                    read_size: requested,
                    bytes: chunk.len(),
                    total_bytes_read: self.stats.bytes_read,
                    bucket,
                    buckets,
                    file: position + 1,
                    files: members.len(),
                });
            }

            if failed {
                self.stats.read_failures += 1;
                self.handles[id].mark_failed(offset);
            } else if chunk.is_empty() {
                self.handles[id].mark_end(offset);
            } else {
                read_size = read_size.min(chunk.len());
                reads.push((id, chunk));
            }
        }

        self.stats.buckets_read += 1;
        self.records.push(BucketRecord::capture(
            offset,
            fingerprint,
            &members,
            &self.handles,
        ));

        if reads.is_empty() {
            return;
        }

        let next_offset = offset + read_size as u64;
        self.stats.deepest_offset = self.stats.deepest_offset.max(next_offset);

        let mut children: BTreeMap<Fingerprint, Vec<HandleId>> = BTreeMap::new();
        for (id, chunk) in reads {
            // Every survivor contributes exactly `read_size` bytes; the chunk
            // is dropped once folded in.
            let next = fingerprint.chain(next_offset, &chunk[..read_size]);
            children.entry(next).or_default().push(id);
        }

        log::trace!(
            "Offset {}: bucket {}/{} split into {} bucket(s) at offset {}",
            offset,
            bucket,
            buckets,
            children.len(),
            next_offset
        );
        for (next, ids) in children {
            self.frontier.push(next_offset, next, ids);
        }
    }

    fn finish(self, start: Instant) -> EngineReport {
        let classification = classify_buckets(&self.records);
        let mut stats = self.stats;
        stats.duration = start.elapsed();

        if let Some(callback) = &self.config.progress_callback {
            callback.on_finish(stats.bytes_read);
        }

        log::info!(
            "Read {} bytes in {} round(s): {} empty, {} incomplete group(s), {} duplicate group(s), {} warning(s)",
            stats.bytes_read,
            stats.rounds,
            classification.zero_length.len(),
            classification.incomplete.len(),
            classification.duplicate.len(),
            self.warnings.len()
        );

        EngineReport {
            classification,
            warnings: self.warnings,
            stats,
            buckets: self.records,
        }
    }
}
