//! Storage wrapper that fails writes on demand.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use zipress_core::StoredObjectRef;
use zipress_storage::{
    KeyPage, MemoryStorage, Storage, StorageBackend, StorageError, StorageResult,
};

/// Delegates to a [`MemoryStorage`] but rejects every `put_object`.
pub struct ReadOnlyStorage {
    pub inner: Arc<MemoryStorage>,
}

impl ReadOnlyStorage {
    pub fn new(inner: Arc<MemoryStorage>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Storage for ReadOnlyStorage {
    fn bucket(&self) -> &str {
        self.inner.bucket()
    }

    fn backend_type(&self) -> StorageBackend {
        self.inner.backend_type()
    }

    async fn list_keys(&self, start_after: Option<&str>, max_keys: usize) -> StorageResult<KeyPage> {
        self.inner.list_keys(start_after, max_keys).await
    }

    async fn get_object(&self, key: &str) -> StorageResult<Bytes> {
        self.inner.get_object(key).await
    }

    async fn put_object(
        &self,
        key: &str,
        _data: Bytes,
        _content_type: &str,
    ) -> StorageResult<StoredObjectRef> {
        Err(StorageError::UploadFailed(format!("bucket is read-only: {}", key)))
    }

    async fn delete_object(&self, key: &str) -> StorageResult<()> {
        self.inner.delete_object(key).await
    }
}
