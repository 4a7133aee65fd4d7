//! Routes one extracted entry to the image or video path.

use std::sync::Arc;
use zipress_core::{ArchiveEntry, ContentTypePolicy, MimeType, TranscodeResult};

use crate::error::DispatchError;
use crate::image::{ImageTranscodeError, ImageTranscoder};
use crate::video::{ResizeResolution, VideoFormat, VideoTranscoder};

/// Resolution applied to every video entry.
pub const VIDEO_TARGET_RESOLUTION: ResizeResolution = ResizeResolution::R480P;

pub struct TranscodeDispatcher {
    image: Arc<dyn ImageTranscoder>,
    video: Arc<dyn VideoTranscoder>,
    content_type_policy: ContentTypePolicy,
}

impl TranscodeDispatcher {
    pub fn new(
        image: Arc<dyn ImageTranscoder>,
        video: Arc<dyn VideoTranscoder>,
        content_type_policy: ContentTypePolicy,
    ) -> Self {
        Self {
            image,
            video,
            content_type_policy,
        }
    }

    /// Transcode `entry` into an artifact destined for `{destination_prefix}{entry.name}`.
    ///
    /// `mp4` entries go to the video transcoder and never reach image decoding.
    /// Everything else is decoded as an image on a blocking thread; a payload that
    /// does not decode is [`DispatchError::UnsupportedType`].
    pub async fn dispatch(
        &self,
        entry: &ArchiveEntry,
        destination_prefix: &str,
    ) -> Result<TranscodeResult, DispatchError> {
        let source_mime = entry.mime_type();

        let (bytes, encoded_mime) = match VideoFormat::for_extension(entry.extension()) {
            Some(format) => {
                let bytes = self
                    .video
                    .reduce_video_size(entry.payload.clone(), format, VIDEO_TARGET_RESOLUTION)
                    .await
                    .map_err(|e| DispatchError::TranscodeFailure {
                        name: entry.name.clone(),
                        reason: e.to_string(),
                    })?;
                (bytes, MimeType::Mp4)
            }
            None => (self.transcode_image(entry).await?, MimeType::Jpeg),
        };

        let mime_type = self.content_type_policy.resolve(source_mime, encoded_mime);
        let destination_key = format!("{}{}", destination_prefix, entry.name);
        Ok(TranscodeResult::new(mime_type, bytes, destination_key))
    }

    async fn transcode_image(&self, entry: &ArchiveEntry) -> Result<Vec<u8>, DispatchError> {
        let transcoder = Arc::clone(&self.image);
        let payload = entry.payload.clone();
        let extension = entry.extension().to_string();

        let result = tokio::task::spawn_blocking(move || transcoder.transcode(&payload, &extension))
            .await
            .map_err(|e| DispatchError::TranscodeFailure {
                name: entry.name.clone(),
                reason: format!("Image task failed: {}", e),
            })?;

        match result {
            Ok(encoded) => {
                tracing::debug!(
                    entry = %entry.name,
                    width = encoded.width,
                    height = encoded.height,
                    size_bytes = encoded.bytes.len(),
                    "Image re-encoded"
                );
                Ok(encoded.bytes)
            }
            Err(ImageTranscodeError::Undecodable(reason)) => Err(DispatchError::UnsupportedType {
                name: entry.name.clone(),
                reason,
            }),
            Err(e) => Err(DispatchError::TranscodeFailure {
                name: entry.name.clone(),
                reason: e.to_string(),
            }),
        }
    }
}
