//! Chunked file access for the bucket engine.
//!
//! The engine never keeps a file open between rounds: every chunk read opens
//! the file, seeks, reads up to the requested length and closes it again.
//! Access goes through the [`ChunkSource`] trait so the engine can be driven
//! by something other than the local filesystem.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Errors that can occur while reading a chunk of a candidate file.
///
/// These never abort a run. The engine records them as warnings and treats
/// the file as if it reached end-of-file at `offset`.
#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    /// The file disappeared before or during the run.
    #[error("File not found: {path} (offset {offset})")]
    NotFound {
        /// Path of the file
        path: PathBuf,
        /// Offset of the failed read
        offset: u64,
    },

    /// Permission was denied when opening or reading the file.
    #[error("Permission denied: {path} (offset {offset})")]
    PermissionDenied {
        /// Path of the file
        path: PathBuf,
        /// Offset of the failed read
        offset: u64,
    },

    /// Any other I/O failure.
    #[error("I/O error for {path} at offset {offset}: {source}")]
    Io {
        /// Path of the file
        path: PathBuf,
        /// Offset of the failed read
        offset: u64,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl ReadError {
    /// Classify an I/O error raised while reading `path` at `offset`.
    #[must_use]
    pub fn from_io(path: &Path, offset: u64, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound {
                path: path.to_path_buf(),
                offset,
            },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: path.to_path_buf(),
                offset,
            },
            _ => Self::Io {
                path: path.to_path_buf(),
                offset,
                source: err,
            },
        }
    }

    /// Path of the file that failed.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path, .. }
            | Self::PermissionDenied { path, .. }
            | Self::Io { path, .. } => path,
        }
    }

    /// Offset at which the read failed; the file is finalized there.
    #[must_use]
    pub fn offset(&self) -> u64 {
        match self {
            Self::NotFound { offset, .. }
            | Self::PermissionDenied { offset, .. }
            | Self::Io { offset, .. } => *offset,
        }
    }

    /// Short machine-readable kind, used by the JSON and CSV reports.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::PermissionDenied { .. } => "permission_denied",
            Self::Io { .. } => "io",
        }
    }
}

/// Serializable view of a [`ReadError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadWarning {
    /// Path of the file that failed
    pub path: String,
    /// Offset at which the file was finalized
    pub offset: u64,
    /// Machine-readable error kind
    pub kind: &'static str,
    /// Human-readable message
    pub message: String,
}

impl From<&ReadError> for ReadWarning {
    fn from(err: &ReadError) -> Self {
        Self {
            path: err.path().to_string_lossy().into_owned(),
            offset: err.offset(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Source of file sizes and byte ranges.
pub trait ChunkSource {
    /// Size of the file in bytes, used only to order reads.
    fn size_of(&self, path: &Path) -> io::Result<u64>;

    /// Read up to `len` bytes starting at `offset`.
    ///
    /// Returns fewer than `len` bytes only when end-of-file is reached, and
    /// an empty buffer when `offset` is at or past the end.
    fn read_chunk(&self, path: &Path, offset: u64, len: usize) -> io::Result<Vec<u8>>;
}

/// [`ChunkSource`] backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsChunkSource;

impl FsChunkSource {
    /// Create a filesystem chunk source.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ChunkSource for FsChunkSource {
    fn size_of(&self, path: &Path) -> io::Result<u64> {
        Ok(std::fs::metadata(path)?.len())
    }

    fn read_chunk(&self, path: &Path, offset: u64, len: usize) -> io::Result<Vec<u8>> {
        let mut file = File::open(path)?;
        let remaining = file.metadata()?.len().saturating_sub(offset);
        file.seek(SeekFrom::Start(offset))?;

        // `take` + `read_to_end` keeps reading across short reads, so a
        // partial buffer really means end-of-file. The capacity is only a
        // hint; the buffer still grows if the file has grown since.
        let capacity = usize::try_from(remaining).unwrap_or(usize::MAX).min(len);
        let mut buffer = Vec::with_capacity(capacity);
        file.take(len as u64).read_to_end(&mut buffer)?;
        Ok(buffer)
    }
}
