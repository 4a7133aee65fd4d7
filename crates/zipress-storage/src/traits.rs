//! Storage abstraction trait
//!
//! This module defines the narrow bucket contract the pipeline depends on.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use zipress_core::StoredObjectRef;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("List failed: {0}")]
    ListFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// One page of a bucket listing, in ascending key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPage {
    pub keys: Vec<String>,
    /// Pass back as `start_after` to fetch the next page. `None` once exhausted.
    pub next_start_after: Option<String>,
}

/// Storage abstraction trait
///
/// A handle is bound to one bucket at construction and shared (`Arc<dyn Storage>`)
/// by everything that talks to it. Implementations hold no per-call state.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Name of the bucket this handle is bound to.
    fn bucket(&self) -> &str;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;

    /// List up to `max_keys` keys strictly greater than `start_after`.
    async fn list_keys(&self, start_after: Option<&str>, max_keys: usize)
        -> StorageResult<KeyPage>;

    /// Download an object's bytes. Missing keys fail with `NotFound`.
    async fn get_object(&self, key: &str) -> StorageResult<Bytes>;

    /// Upload bytes to a key. Content length is `data.len()`.
    async fn put_object(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<StoredObjectRef>;

    /// Delete an object by key.
    async fn delete_object(&self, key: &str) -> StorageResult<()>;
}
