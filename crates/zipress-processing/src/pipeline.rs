//! Batch driver: bucket listing, archive fetch and per-entry write-back.

use bytes::Bytes;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use zipress_core::constants::RESIZED_PREFIX;
use zipress_core::{ArchiveEntry, Config, StoredObjectRef};
use zipress_storage::keys::{compressed_key, is_directory_marker, is_output_key};
use zipress_storage::{list_all_keys, Storage, StorageError};

use crate::archive::ArchiveExtractor;
use crate::dispatcher::TranscodeDispatcher;
use crate::error::{DispatchError, ExtractError, PipelineError};
use crate::image::LossyImageTranscoder;
use crate::path_guard::PathGuard;
use crate::report::{
    ArchiveMode, ArchiveReport, BatchReport, EntryReport, FailureReason, SkipReason,
};
use crate::video::FfmpegVideoTranscoder;

/// Pipeline settings that do not belong to a collaborator.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub trusted_root: PathBuf,
    pub max_entry_bytes: u64,
    pub list_page_size: usize,
    /// Leave `resized/` and `compressed/` keys out of bucket discovery.
    pub skip_output_prefixes: bool,
}

impl From<&Config> for PipelineConfig {
    fn from(config: &Config) -> Self {
        Self {
            trusted_root: config.extract_root.clone(),
            max_entry_bytes: config.max_entry_size_bytes,
            list_page_size: config.list_page_size,
            skip_output_prefixes: config.skip_output_prefixes,
        }
    }
}

pub struct ArchivePipeline {
    storage: Arc<dyn Storage>,
    dispatcher: TranscodeDispatcher,
    guard: PathGuard,
    extractor: ArchiveExtractor,
    list_page_size: usize,
    skip_output_prefixes: bool,
}

impl ArchivePipeline {
    pub fn new(
        storage: Arc<dyn Storage>,
        dispatcher: TranscodeDispatcher,
        config: PipelineConfig,
    ) -> Self {
        Self {
            storage,
            dispatcher,
            guard: PathGuard::new(&config.trusted_root),
            extractor: ArchiveExtractor::new(config.max_entry_bytes),
            list_page_size: config.list_page_size.max(1),
            skip_output_prefixes: config.skip_output_prefixes,
        }
    }

    /// Wire the default image and ffmpeg transcoders from configuration.
    pub fn from_config(storage: Arc<dyn Storage>, config: &Config) -> Self {
        let dispatcher = TranscodeDispatcher::new(
            Arc::new(LossyImageTranscoder::new(config.image_quality)),
            Arc::new(FfmpegVideoTranscoder::new(config.ffmpeg_path.clone())),
            config.content_type_policy,
        );
        Self::new(storage, dispatcher, PipelineConfig::from(config))
    }

    /// Every key in the bucket that can be treated as a source archive.
    ///
    /// Directory markers are always left out; pipeline output keys are left out
    /// when `skip_output_prefixes` is set.
    pub async fn discover_keys(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, PipelineError> {
        let listed = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PipelineError::Cancelled),
            listed = list_all_keys(self.storage.as_ref(), self.list_page_size) => listed,
        };

        let keys = listed.map_err(|e| {
            tracing::error!(error = %e, bucket = %self.storage.bucket(), "Bucket listing failed");
            e
        })?;

        Ok(keys
            .into_iter()
            .filter(|key| !is_directory_marker(key))
            .filter(|key| !(self.skip_output_prefixes && is_output_key(key)))
            .collect())
    }

    /// Run every archive in the bucket through the transcode path.
    ///
    /// Entry-level problems are recorded in the report. Storage errors and
    /// cancellation end the batch.
    pub async fn process_bucket(
        &self,
        cancel: &CancellationToken,
    ) -> Result<BatchReport, PipelineError> {
        let mut batch = BatchReport::start(self.storage.bucket());
        let keys = self.discover_keys(cancel).await?;

        tracing::info!(
            bucket = %self.storage.bucket(),
            key_count = keys.len(),
            "Processing bucket"
        );

        for key in keys {
            let archive = self.process_archive(&key, cancel).await?;
            batch.keys.push(key);
            batch.archives.push(archive);
        }

        batch.finish();
        tracing::info!(
            bucket = %self.storage.bucket(),
            archive_count = batch.archives.len(),
            uploaded = batch.uploaded_count(),
            "Bucket processed"
        );

        Ok(batch)
    }

    /// Transcode each entry of `key` and write it to `resized/{entry}`.
    pub async fn process_archive(
        &self,
        key: &str,
        cancel: &CancellationToken,
    ) -> Result<ArchiveReport, PipelineError> {
        self.run_archive(key, ArchiveMode::Transcode, cancel).await
    }

    /// Copy each entry of `key` unchanged to `compressed/{entry}`.
    pub async fn copy_archive(
        &self,
        key: &str,
        cancel: &CancellationToken,
    ) -> Result<ArchiveReport, PipelineError> {
        self.run_archive(key, ArchiveMode::Copy, cancel).await
    }

    #[tracing::instrument(skip(self, cancel), fields(bucket = %self.storage.bucket()))]
    async fn run_archive(
        &self,
        key: &str,
        mode: ArchiveMode,
        cancel: &CancellationToken,
    ) -> Result<ArchiveReport, PipelineError> {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let data = self.storage.get_object(key).await.map_err(|e| {
            tracing::error!(error = %e, archive = %key, "Archive download failed");
            e
        })?;
        let mut report = ArchiveReport::new(StoredObjectRef::new(self.storage.bucket(), key), mode);

        for item in self.extractor.extract_buffered(data) {
            if cancel.is_cancelled() {
                return Err(PipelineError::Cancelled);
            }

            let entry = match item {
                Ok(entry) => entry,
                Err(e @ ExtractError::Header { .. }) => {
                    tracing::warn!(error = %e, archive = %key, "Archive extraction stopped");
                    report.extraction_error = Some(e.to_string());
                    break;
                }
                Err(e) => {
                    let name = e.entry_name().unwrap_or_default().to_string();
                    tracing::warn!(error = %e, archive = %key, entry = %name, "Skipping corrupt entry");
                    report
                        .entries
                        .push(EntryReport::failed(&name, FailureReason::CorruptEntry, &e));
                    continue;
                }
            };

            let resolved = match self.guard.resolve(&entry.name) {
                Ok(resolved) => resolved,
                Err(e) => {
                    tracing::warn!(error = %e, archive = %key, "Skipping entry outside extraction root");
                    report
                        .entries
                        .push(EntryReport::skipped(&entry.name, SkipReason::PathTraversal, &e));
                    continue;
                }
            };

            tracing::info!(
                archive = %key,
                entry = %entry.name,
                path = %resolved.as_path().display(),
                compressed_bytes = entry.compressed_size,
                extracted_bytes = entry.declared_size,
                mime_type = %entry.mime_type(),
                "Extracting entry"
            );

            let entry_report = match mode {
                ArchiveMode::Transcode => self.transcode_entry(&entry).await?,
                ArchiveMode::Copy => self.copy_entry(&entry).await?,
            };
            report.entries.push(entry_report);
        }

        tracing::info!(
            archive = %key,
            uploaded = report.uploaded_count(),
            skipped = report.skipped_count(),
            failed = report.failed_count(),
            "Archive processed"
        );

        Ok(report)
    }

    async fn transcode_entry(&self, entry: &ArchiveEntry) -> Result<EntryReport, PipelineError> {
        let result = match self.dispatcher.dispatch(entry, RESIZED_PREFIX).await {
            Ok(result) => result,
            Err(e @ DispatchError::UnsupportedType { .. }) => {
                tracing::debug!(error = %e, "Entry is not a supported media type");
                return Ok(EntryReport::skipped(&entry.name, SkipReason::UnsupportedType, &e));
            }
            Err(e @ DispatchError::TranscodeFailure { .. }) => {
                tracing::warn!(error = %e, "Entry transcode failed");
                return Ok(EntryReport::failed(&entry.name, FailureReason::TranscodeFailure, &e));
            }
        };

        let content_type = result.mime_type.as_str();
        self.store(
            entry,
            &result.destination_key,
            result.bytes,
            content_type,
            result.content_length,
        )
        .await
    }

    async fn copy_entry(&self, entry: &ArchiveEntry) -> Result<EntryReport, PipelineError> {
        let key = compressed_key(&entry.name);
        self.store(
            entry,
            &key,
            entry.payload.clone(),
            entry.mime_type().as_str(),
            entry.declared_size,
        )
        .await
    }

    /// Write one artifact.
    ///
    /// A key the backend refuses fails only this entry; any other storage error
    /// ends the archive.
    async fn store(
        &self,
        entry: &ArchiveEntry,
        key: &str,
        bytes: Bytes,
        content_type: &str,
        size_bytes: u64,
    ) -> Result<EntryReport, PipelineError> {
        match self.storage.put_object(key, bytes, content_type).await {
            Ok(stored) => {
                tracing::info!(
                    key = %stored.key,
                    content_type = %content_type,
                    size_bytes = size_bytes,
                    "Entry uploaded"
                );
                Ok(EntryReport::uploaded(
                    &entry.name,
                    &stored.key,
                    content_type,
                    size_bytes,
                ))
            }
            Err(StorageError::InvalidKey(reason)) => {
                tracing::warn!(
                    key = %key,
                    entry = %entry.name,
                    error = %reason,
                    "Storage refused entry key"
                );
                Ok(EntryReport::failed(&entry.name, FailureReason::InvalidKey, reason))
            }
            Err(e) => {
                tracing::error!(error = %e, key = %key, entry = %entry.name, "Upload failed");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{EncodedImage, ImageTranscodeError, ImageTranscoder};
    use crate::video::{ResizeResolution, VideoFormat, VideoTranscoder};
    use async_trait::async_trait;
    use std::io::{Cursor, Write};
    use zip::write::{FileOptions, ZipWriter};
    use zipress_core::ContentTypePolicy;
    use zipress_storage::MemoryStorage;

    struct PassthroughImage;

    impl ImageTranscoder for PassthroughImage {
        fn transcode(&self, data: &[u8], _ext: &str) -> Result<EncodedImage, ImageTranscodeError> {
            if data.starts_with(b"IMG") {
                Ok(EncodedImage {
                    bytes: data.to_vec(),
                    width: 1,
                    height: 1,
                })
            } else {
                Err(ImageTranscodeError::Undecodable("not an image".to_string()))
            }
        }
    }

    struct NoVideo;

    #[async_trait]
    impl VideoTranscoder for NoVideo {
        async fn reduce_video_size(
            &self,
            _data: Bytes,
            _format: VideoFormat,
            _resolution: ResizeResolution,
        ) -> anyhow::Result<Vec<u8>> {
            anyhow::bail!("video disabled")
        }
    }

    fn zip_of(entries: &[(&str, &[u8])]) -> Bytes {
        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            for (name, data) in entries {
                zip.start_file(*name, FileOptions::default()).unwrap();
                zip.write_all(data).unwrap();
            }
            zip.finish().unwrap();
        }
        Bytes::from(buffer)
    }

    fn pipeline(storage: Arc<MemoryStorage>) -> ArchivePipeline {
        let dispatcher = TranscodeDispatcher::new(
            Arc::new(PassthroughImage),
            Arc::new(NoVideo),
            ContentTypePolicy::Source,
        );
        ArchivePipeline::new(
            storage,
            dispatcher,
            PipelineConfig {
                trusted_root: PathBuf::from("/tmp/zipress-test"),
                max_entry_bytes: 1024,
                list_page_size: 2,
                skip_output_prefixes: true,
            },
        )
    }

    #[tokio::test]
    async fn test_discover_keys_filters_markers_and_outputs() {
        let storage = Arc::new(MemoryStorage::new("bucket"));
        for key in ["a.zip", "dir/", "resized/x.jpg", "compressed/y.txt", "b.zip"] {
            storage.set_file(key, Bytes::from_static(b"x"));
        }

        let keys = pipeline(storage)
            .discover_keys(&CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(keys, vec!["a.zip", "b.zip"]);
    }

    #[tokio::test]
    async fn test_discover_keys_stops_when_cancelled() {
        let storage = Arc::new(MemoryStorage::new("bucket"));
        storage.set_file("a.zip", Bytes::from_static(b"x"));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = pipeline(storage).discover_keys(&cancel).await.unwrap_err();
        assert!(matches!(err, PipelineError::Cancelled));
    }

    #[tokio::test]
    async fn test_copy_archive_writes_verbatim_members() {
        let storage = Arc::new(MemoryStorage::new("bucket"));
        storage.set_file(
            "docs.zip",
            zip_of(&[("notes.txt", b"hello"), ("../evil.sh", b"rm -rf")]),
        );

        let report = pipeline(storage.clone())
            .copy_archive("docs.zip", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.mode, ArchiveMode::Copy);
        assert_eq!(report.uploaded_keys(), vec!["compressed/notes.txt"]);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(
            storage.get_file("compressed/notes.txt").unwrap(),
            Bytes::from_static(b"hello")
        );
        assert_eq!(
            storage.content_type("compressed/notes.txt").as_deref(),
            Some("text/plain")
        );
        assert_eq!(storage.keys().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_archive_propagates_storage_error() {
        let storage = Arc::new(MemoryStorage::new("bucket"));
        let err = pipeline(storage)
            .process_archive("missing.zip", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Storage(zipress_storage::StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_before_fetch() {
        let storage = Arc::new(MemoryStorage::new("bucket"));
        storage.set_file("a.zip", zip_of(&[("a.jpg", b"IMG1")]));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = pipeline(storage.clone())
            .process_archive("a.zip", &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Cancelled));
        assert!(!storage.has_file("resized/a.jpg"));
    }

    #[tokio::test]
    async fn test_non_zip_object_records_extraction_error() {
        let storage = Arc::new(MemoryStorage::new("bucket"));
        storage.set_file("readme.md", Bytes::from_static(b"# not an archive"));

        let report = pipeline(storage)
            .process_archive("readme.md", &CancellationToken::new())
            .await
            .unwrap();
        assert!(report.entries.is_empty());
        assert!(report.extraction_error.is_some());
    }
}
