//! Per-entry and per-batch outcomes.
//!
//! The pipeline never re-raises entry-level failures; these types are how callers
//! tell "skipped because unsupported" apart from "failed during transcode".

use chrono::{DateTime, Utc};
use serde::Serialize;
use zipress_core::StoredObjectRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    PathTraversal,
    UnsupportedType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    CorruptEntry,
    TranscodeFailure,
    /// The storage backend cannot use the entry name as an object key.
    InvalidKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntryOutcome {
    Uploaded {
        key: String,
        content_type: String,
        size_bytes: u64,
    },
    Skipped {
        reason: SkipReason,
        detail: String,
    },
    Failed {
        reason: FailureReason,
        detail: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryReport {
    pub name: String,
    #[serde(flatten)]
    pub outcome: EntryOutcome,
}

impl EntryReport {
    pub fn uploaded(name: &str, key: &str, content_type: &str, size_bytes: u64) -> Self {
        Self {
            name: name.to_string(),
            outcome: EntryOutcome::Uploaded {
                key: key.to_string(),
                content_type: content_type.to_string(),
                size_bytes,
            },
        }
    }

    pub fn skipped(name: &str, reason: SkipReason, detail: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            outcome: EntryOutcome::Skipped {
                reason,
                detail: detail.to_string(),
            },
        }
    }

    pub fn failed(name: &str, reason: FailureReason, detail: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            outcome: EntryOutcome::Failed {
                reason,
                detail: detail.to_string(),
            },
        }
    }

    pub fn is_uploaded(&self) -> bool {
        matches!(self.outcome, EntryOutcome::Uploaded { .. })
    }
}

/// How an archive's members were written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveMode {
    /// Re-encoded under `resized/`.
    Transcode,
    /// Copied byte for byte under `compressed/`.
    Copy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveReport {
    pub source: StoredObjectRef,
    pub mode: ArchiveMode,
    pub entries: Vec<EntryReport>,
    /// Set when extraction stopped before the end of the archive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_error: Option<String>,
}

impl ArchiveReport {
    pub fn new(source: StoredObjectRef, mode: ArchiveMode) -> Self {
        Self {
            source,
            mode,
            entries: Vec::new(),
            extraction_error: None,
        }
    }

    pub fn uploaded_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_uploaded()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, EntryOutcome::Skipped { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, EntryOutcome::Failed { .. }))
            .count()
    }

    pub fn uploaded_keys(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|e| match &e.outcome {
                EntryOutcome::Uploaded { key, .. } => Some(key.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub bucket: String,
    /// Every key considered as a source archive, in listing order.
    pub keys: Vec<String>,
    pub archives: Vec<ArchiveReport>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl BatchReport {
    pub fn start(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            keys: Vec::new(),
            archives: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn uploaded_count(&self) -> usize {
        self.archives.iter().map(ArchiveReport::uploaded_count).sum()
    }
}
