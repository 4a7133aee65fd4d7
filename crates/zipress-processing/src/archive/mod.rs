//! Zip extraction
//!
//! Archives held in memory are read through their central directory; a plain
//! byte stream is read front to back from the local headers.

pub mod extractor;

pub use extractor::{ArchiveEntries, ArchiveExtractor, ZipEntries};
