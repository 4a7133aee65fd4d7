//! Zipress Core Library
//!
//! This crate provides the domain models, key-prefix constants and configuration
//! shared by the storage, processing and CLI crates.

pub mod config;
pub mod constants;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, ContentTypePolicy};
pub use models::{ArchiveEntry, MimeType, StoredObjectRef, TranscodeResult};
pub use storage_types::StorageBackend;
