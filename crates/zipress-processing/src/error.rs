//! Error types for extraction, dispatch and the batch driver.
//!
//! Everything except [`PipelineError`] is local to one archive entry: the driver
//! records it in the report and moves on to the next entry.

use std::path::Path;
use thiserror::Error;
use zipress_storage::StorageError;

/// An entry name that resolves outside the trusted root.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Entry {entry:?} resolves outside the extraction root ({resolved})")]
pub struct PathTraversal {
    pub entry: String,
    pub resolved: String,
}

impl PathTraversal {
    pub(crate) fn new(entry: &str, resolved: &Path) -> Self {
        Self {
            entry: entry.to_string(),
            resolved: resolved.display().to_string(),
        }
    }
}

/// Failure reading one member of an archive.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Corrupt entry {name}: {reason}")]
    CorruptEntry { name: String, reason: String },

    #[error("Entry {name} declares {declared} bytes, above the {limit} byte limit")]
    EntryTooLarge {
        name: String,
        declared: u64,
        limit: u64,
    },

    #[error("Entry {name} declared {declared} bytes but produced {actual}")]
    SizeMismatch {
        name: String,
        declared: u64,
        actual: u64,
    },

    /// The next local header could not be read; no further entries are reachable.
    #[error("Unreadable entry header after {entries_read} entries: {reason}")]
    Header { entries_read: usize, reason: String },
}

impl ExtractError {
    /// Name of the entry the error belongs to, if the header was readable.
    pub fn entry_name(&self) -> Option<&str> {
        match self {
            ExtractError::CorruptEntry { name, .. }
            | ExtractError::EntryTooLarge { name, .. }
            | ExtractError::SizeMismatch { name, .. } => Some(name),
            ExtractError::Header { .. } => None,
        }
    }
}

/// Why a single entry produced no artifact.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Unsupported type for {name}: {reason}")]
    UnsupportedType { name: String, reason: String },

    #[error("Transcode failed for {name}: {reason}")]
    TranscodeFailure { name: String, reason: String },
}

/// Errors that abort a batch or archive operation.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Operation cancelled")]
    Cancelled,
}
