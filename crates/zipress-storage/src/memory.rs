//! In-process bucket, used by tests and `STORAGE_BACKEND=memory` dry runs.

use crate::keys::validate_key;
use crate::traits::{KeyPage, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{Arc, Mutex, MutexGuard};
use zipress_core::StoredObjectRef;

#[derive(Debug, Clone)]
struct MemoryObject {
    data: Bytes,
    content_type: String,
}

/// Bucket kept in a sorted map. Clones share the same contents.
#[derive(Clone)]
pub struct MemoryStorage {
    bucket: String,
    objects: Arc<Mutex<BTreeMap<String, MemoryObject>>>,
}

impl MemoryStorage {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    fn objects(&self) -> MutexGuard<'_, BTreeMap<String, MemoryObject>> {
        // A poisoned map still holds consistent entries; each insert is a single call.
        self.objects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Seed an object without going through `put_object`.
    pub fn set_file(&self, key: &str, data: impl Into<Bytes>) {
        self.objects().insert(
            key.to_string(),
            MemoryObject {
                data: data.into(),
                content_type: zipress_core::constants::OCTET_STREAM.to_string(),
            },
        );
    }

    /// Check if a key exists
    pub fn has_file(&self, key: &str) -> bool {
        self.objects().contains_key(key)
    }

    /// Get object data (for test assertions)
    pub fn get_file(&self, key: &str) -> Option<Bytes> {
        self.objects().get(key).map(|o| o.data.clone())
    }

    /// Content type recorded by the last `put_object` for a key.
    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects().get(key).map(|o| o.content_type.clone())
    }

    /// All keys, in order.
    pub fn keys(&self) -> Vec<String> {
        self.objects().keys().cloned().collect()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }

    async fn list_keys(
        &self,
        start_after: Option<&str>,
        max_keys: usize,
    ) -> StorageResult<KeyPage> {
        let objects = self.objects();
        let lower = match start_after {
            Some(key) => Bound::Excluded(key.to_string()),
            None => Bound::Unbounded,
        };

        let mut remaining = objects.range((lower, Bound::Unbounded)).map(|(k, _)| k);
        let keys: Vec<String> = remaining.by_ref().take(max_keys).cloned().collect();
        let next_start_after = if remaining.next().is_some() {
            keys.last().cloned()
        } else {
            None
        };

        Ok(KeyPage {
            keys,
            next_start_after,
        })
    }

    async fn get_object(&self, key: &str) -> StorageResult<Bytes> {
        self.objects()
            .get(key)
            .map(|o| o.data.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn put_object(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<StoredObjectRef> {
        validate_key(key)?;
        let size = data.len();
        self.objects().insert(
            key.to_string(),
            MemoryObject {
                data,
                content_type: content_type.to_string(),
            },
        );

        tracing::debug!(bucket = %self.bucket, key = %key, size_bytes = size, "Memory upload");
        Ok(StoredObjectRef::new(&self.bucket, key))
    }

    async fn delete_object(&self, key: &str) -> StorageResult<()> {
        self.objects()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let storage = MemoryStorage::new("bucket");
        let stored = storage
            .put_object("resized/a.jpg", Bytes::from_static(b"jpeg"), "image/jpeg")
            .await
            .unwrap();

        assert_eq!(stored, StoredObjectRef::new("bucket", "resized/a.jpg"));
        assert_eq!(
            storage.get_object("resized/a.jpg").await.unwrap(),
            Bytes::from_static(b"jpeg")
        );
        assert_eq!(
            storage.content_type("resized/a.jpg").as_deref(),
            Some("image/jpeg")
        );

        storage.delete_object("resized/a.jpg").await.unwrap();
        assert!(!storage.has_file("resized/a.jpg"));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let storage = MemoryStorage::new("bucket");
        let err = storage.get_object("missing").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_put_rejects_empty_key() {
        let storage = MemoryStorage::new("bucket");
        let err = storage
            .put_object("", Bytes::new(), "text/plain")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn test_list_keys_pages() {
        let storage = MemoryStorage::new("bucket");
        for key in ["a", "b", "c"] {
            storage.set_file(key, Bytes::from_static(b"x"));
        }

        let first = storage.list_keys(None, 2).await.unwrap();
        assert_eq!(first.keys, vec!["a", "b"]);
        assert_eq!(first.next_start_after.as_deref(), Some("b"));

        let second = storage.list_keys(Some("b"), 2).await.unwrap();
        assert_eq!(second.keys, vec!["c"]);
        assert_eq!(second.next_start_after, None);
    }

    #[tokio::test]
    async fn test_clones_share_contents() {
        let storage = MemoryStorage::new("bucket");
        let clone = storage.clone();
        clone.set_file("k", Bytes::from_static(b"v"));
        assert!(storage.has_file("k"));
    }
}
