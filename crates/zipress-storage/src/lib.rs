//! Zipress Storage Library
//!
//! This crate provides the bucket abstraction the pipeline reads archives from and
//! writes artifacts to, with implementations for S3 (via `object_store`), a local
//! directory, and an in-process map.
//!
//! # Key layout
//!
//! Source archives live anywhere in the bucket. Artifacts are written under
//! `resized/{entry-name}` (re-encoded media) and `compressed/{entry-name}`
//! (verbatim copies). Keys must be non-empty; the local backend additionally
//! refuses absolute keys and keys with an empty, `.` or `..` segment.

pub mod factory;
pub mod keys;
pub mod listing;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use listing::list_all_keys;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use memory::MemoryStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{KeyPage, Storage, StorageError, StorageResult};
pub use zipress_core::StorageBackend;
