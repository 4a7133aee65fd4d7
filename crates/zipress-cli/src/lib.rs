//! Helpers shared by the `zipress` binary: tracing setup and file transfer
//! between the local filesystem and the configured bucket.

use anyhow::Context;
use bytes::Bytes;
use std::path::Path;
use zipress_core::{MimeType, StoredObjectRef};
use zipress_storage::keys::is_directory_marker;
use zipress_storage::{list_all_keys, Storage};

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Key used when none is given on the command line: the file name.
pub fn default_key(path: &Path) -> anyhow::Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .with_context(|| format!("{} has no file name", path.display()))
}

/// Upload a local file, labelled with the type of its extension.
pub async fn upload_file(
    storage: &dyn Storage,
    path: &Path,
    key: Option<&str>,
) -> anyhow::Result<StoredObjectRef> {
    let key = match key {
        Some(key) => key.to_string(),
        None => default_key(path)?,
    };
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_string())
        .unwrap_or_default();
    let content_type = MimeType::from_extension(&extension);

    let stored = storage
        .put_object(&key, Bytes::from(data), content_type.as_str())
        .await?;
    Ok(stored)
}

/// Download an object to `out`, returning the number of bytes written.
pub async fn download_file(storage: &dyn Storage, key: &str, out: &Path) -> anyhow::Result<u64> {
    let data = storage.get_object(key).await?;
    tokio::fs::write(out, &data)
        .await
        .with_context(|| format!("Failed to write {}", out.display()))?;
    Ok(data.len() as u64)
}

/// Every key in the bucket except directory markers.
pub async fn list_files(storage: &dyn Storage, page_size: usize) -> anyhow::Result<Vec<String>> {
    let keys = list_all_keys(storage, page_size).await?;
    Ok(keys.into_iter().filter(|k| !is_directory_marker(k)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use zipress_storage::MemoryStorage;

    #[test]
    fn test_default_key_uses_file_name() {
        assert_eq!(default_key(Path::new("/tmp/in/photos.zip")).unwrap(), "photos.zip");
        assert!(default_key(Path::new("/")).is_err());
    }

    #[tokio::test]
    async fn test_upload_then_download() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = dir.path().join("photo.JPG");
        tokio::fs::write(&source, b"jpeg bytes").await.unwrap();

        let storage = MemoryStorage::new("bucket");
        let stored = upload_file(&storage, &source, Some("uploads/photo.JPG"))
            .await
            .unwrap();
        assert_eq!(stored.to_string(), "bucket/uploads/photo.JPG");
        assert_eq!(
            storage.content_type("uploads/photo.JPG").as_deref(),
            Some("image/jpeg")
        );

        let out = dir.path().join("copy.jpg");
        let written = download_file(&storage, "uploads/photo.JPG", &out).await.unwrap();
        assert_eq!(written, 10);
        assert_eq!(tokio::fs::read(&out).await.unwrap(), b"jpeg bytes");
    }

    #[tokio::test]
    async fn test_upload_missing_file_fails() {
        let storage = MemoryStorage::new("bucket");
        let result = upload_file(&storage, Path::new("/nonexistent/zipress.zip"), None).await;
        assert!(result.is_err());
        assert!(storage.keys().is_empty());
    }

    #[tokio::test]
    async fn test_list_files_skips_markers() {
        let storage = MemoryStorage::new("bucket");
        storage.set_file("a.zip", Bytes::from_static(b"x"));
        storage.set_file("folder/", Bytes::new());
        storage.set_file("folder/b.zip", Bytes::from_static(b"y"));

        let keys = list_files(&storage, 1).await.unwrap();
        assert_eq!(keys, vec!["a.zip", "folder/b.zip"]);
    }
}
