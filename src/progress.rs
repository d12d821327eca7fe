//! Progress reporting utilities using indicatif.
//!
//! This module provides the [`ProgressCallback`] trait through which the
//! bucket engine reports every round and every chunk read, and the
//! [`Progress`] struct which renders those events as a single status line
//! in the terminal:
//!
//! ```text
//! ⠁ 1.2 MiB | Offs 300.0 KiB | Buck 2/5 | File 3/4 | Rs 100.0 KiB
//! ```
//!
//! The running byte count is carried in each event; nothing is kept in
//! global state.

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use bytesize::ByteSize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// One chunk read performed by the engine.
#[derive(Debug, Clone, Copy)]
pub struct ReadEvent<'a> {
    /// File that was read
    pub path: &'a Path,
    /// Offset of the read
    pub offset: u64,
    /// Number of bytes requested
    pub read_size: usize,
    /// Number of bytes returned (0 at end-of-file or on failure)
    pub bytes: usize,
    /// Bytes read so far in this run, including this read
    pub total_bytes_read: u64,
    /// 1-based index of the bucket being read at this offset
    pub bucket: usize,
    /// Number of buckets being read at this offset
    pub buckets: usize,
    /// 1-based index of the file within its bucket
    pub file: usize,
    /// Number of files in the bucket
    pub files: usize,
}

/// Progress callback for the bucket engine.
///
/// Implement this trait to observe a run. All methods have empty default
/// implementations except [`ProgressCallback::on_chunk_read`].
pub trait ProgressCallback: Send + Sync {
    /// Called before the buckets at `offset` are read.
    ///
    /// # Arguments
    ///
    /// * `offset` - Offset about to be read
    /// * `buckets` - Number of buckets that will be read there
    fn on_round_start(&self, _offset: u64, _buckets: usize) {}

    /// Called after every chunk read, successful or not.
    fn on_chunk_read(&self, event: &ReadEvent<'_>);

    /// Called once when the run is over.
    ///
    /// # Arguments
    ///
    /// * `total_bytes_read` - Bytes read over the whole run
    fn on_finish(&self, _total_bytes_read: u64) {}
}

/// Terminal status line using indicatif.
///
/// The spinner is created on the first event and cleared by
/// [`ProgressCallback::on_finish`].
#[derive(Default)]
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Examples
    ///
    /// ```
    /// use killdupes::progress::Progress;
    ///
    /// let progress = Progress::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        let Ok(mut guard) = self.bar.lock() else {
            return;
        };
        let bar = guard.get_or_insert_with(|| {
            let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
            bar.set_style(
                ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
            );
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        });
        f(bar);
    }
}

impl ProgressCallback for Progress {
    fn on_round_start(&self, offset: u64, buckets: usize) {
        self.with_bar(|bar| {
            bar.set_message(format!(
                "Offs {} | {} bucket(s)",
                ByteSize::b(offset),
                buckets
            ));
        });
    }

    fn on_chunk_read(&self, event: &ReadEvent<'_>) {
        self.with_bar(|bar| bar.set_message(status_line(event)));
    }

    fn on_finish(&self, total_bytes_read: u64) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(bar) = guard.take() {
                bar.finish_and_clear();
                log::debug!("Read {} in total", ByteSize::b(total_bytes_read));
            }
        }
    }
}

/// Format the status line for one read.
fn status_line(event: &ReadEvent<'_>) -> String {
    format!(
        "{} | Offs {} | Buck {}/{} | File {}/{} | Rs {}",
        ByteSize::b(event.total_bytes_read),
        ByteSize::b(event.offset),
        event.bucket,
        event.buckets,
        event.file,
        event.files,
        ByteSize::b(event.read_size as u64),
    )
}
