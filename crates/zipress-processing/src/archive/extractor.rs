use bytes::Bytes;
use std::io::{Cursor, Read};
use zip::read::{read_zipfile_from_stream, ZipFile};
use zip::ZipArchive;
use zipress_core::ArchiveEntry;

use crate::error::ExtractError;

/// Largest buffer reserved before an entry's first byte is read.
const INITIAL_ENTRY_CAPACITY: u64 = 64 * 1024;

/// Turns zip data into buffered [`ArchiveEntry`] values.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveExtractor {
    max_entry_bytes: u64,
}

impl ArchiveExtractor {
    /// `max_entry_bytes` caps the in-memory buffer for a single entry.
    pub fn new(max_entry_bytes: u64) -> Self {
        Self { max_entry_bytes }
    }

    /// Start a single forward-only pass over `source`.
    ///
    /// The returned iterator owns the source and drops it when iteration ends
    /// or is abandoned. Entries whose sizes trail their data cannot be read this
    /// way; use [`extract_buffered`](Self::extract_buffered) when the whole
    /// archive is in memory.
    pub fn extract<R: Read>(&self, source: R) -> ZipEntries<R> {
        ZipEntries {
            reader: source,
            max_entry_bytes: self.max_entry_bytes,
            entries_read: 0,
            finished: false,
        }
    }

    /// Single pass over an archive held in memory, in archive order.
    ///
    /// Entries are located through the central directory, so members written
    /// with a trailing data descriptor are read like any other. Without a
    /// readable central directory the buffer is walked header by header as in
    /// [`extract`](Self::extract).
    pub fn extract_buffered(&self, data: Bytes) -> ArchiveEntries {
        let source = match ZipArchive::new(Cursor::new(data.clone())) {
            Ok(archive) => EntrySource::Indexed(IndexedEntries {
                archive,
                next_index: 0,
                max_entry_bytes: self.max_entry_bytes,
            }),
            Err(e) => {
                tracing::debug!(error = %e, "No central directory, reading local headers");
                EntrySource::Streamed(self.extract(Cursor::new(data)))
            }
        };
        ArchiveEntries { source }
    }
}

/// Lazy, non-restartable sequence of entries from one archive.
///
/// Directory entries are skipped. A failure inside one entry yields an error for
/// that entry and the next call continues with the following header. An
/// unreadable header yields [`ExtractError::Header`] and ends the sequence.
pub struct ZipEntries<R: Read> {
    reader: R,
    max_entry_bytes: u64,
    entries_read: usize,
    finished: bool,
}

impl<R: Read> Iterator for ZipEntries<R> {
    type Item = Result<ArchiveEntry, ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            let mut file = match read_zipfile_from_stream(&mut self.reader) {
                Ok(Some(file)) => file,
                Ok(None) => {
                    self.finished = true;
                    return None;
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(ExtractError::Header {
                        entries_read: self.entries_read,
                        reason: e.to_string(),
                    }));
                }
            };
            self.entries_read += 1;

            if file.is_dir() || ArchiveEntry::is_directory_name(file.name()) {
                continue;
            }

            // Dropping `file` drains whatever is left of its data, which positions
            // the reader on the next local header even after a failed read.
            return Some(read_entry(&mut file, self.max_entry_bytes));
        }
        None
    }
}

/// Entries of an in-memory archive; see [`ArchiveExtractor::extract_buffered`].
pub struct ArchiveEntries {
    source: EntrySource,
}

enum EntrySource {
    Indexed(IndexedEntries),
    Streamed(ZipEntries<Cursor<Bytes>>),
}

impl Iterator for ArchiveEntries {
    type Item = Result<ArchiveEntry, ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.source {
            EntrySource::Indexed(entries) => entries.next(),
            EntrySource::Streamed(entries) => entries.next(),
        }
    }
}

struct IndexedEntries {
    archive: ZipArchive<Cursor<Bytes>>,
    next_index: usize,
    max_entry_bytes: u64,
}

impl Iterator for IndexedEntries {
    type Item = Result<ArchiveEntry, ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next_index < self.archive.len() {
            let index = self.next_index;
            self.next_index += 1;

            let mut file = match self.archive.by_index(index) {
                Ok(file) => file,
                Err(e) => {
                    return Some(Err(ExtractError::CorruptEntry {
                        name: format!("entry {}", index),
                        reason: e.to_string(),
                    }))
                }
            };

            if file.is_dir() || ArchiveEntry::is_directory_name(file.name()) {
                continue;
            }

            return Some(read_entry(&mut file, self.max_entry_bytes));
        }
        None
    }
}

fn read_entry(file: &mut ZipFile<'_>, max_entry_bytes: u64) -> Result<ArchiveEntry, ExtractError> {
    let name = file.name().to_string();
    let declared = file.size();
    let compressed_size = file.compressed_size();

    if declared > max_entry_bytes {
        return Err(ExtractError::EntryTooLarge {
            name,
            declared,
            limit: max_entry_bytes,
        });
    }

    // The declared size comes from an untrusted header.
    let mut payload = Vec::with_capacity(declared.min(INITIAL_ENTRY_CAPACITY) as usize);
    file.by_ref()
        .take(declared + 1)
        .read_to_end(&mut payload)
        .map_err(|e| ExtractError::CorruptEntry {
            name: name.clone(),
            reason: e.to_string(),
        })?;

    let actual = payload.len() as u64;
    if actual != declared {
        return Err(ExtractError::SizeMismatch {
            name,
            declared,
            actual,
        });
    }

    Ok(ArchiveEntry {
        name,
        declared_size: declared,
        compressed_size,
        payload: Bytes::from(payload),
    })
}
