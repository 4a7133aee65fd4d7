//! Recording transcoders for routing assertions.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use zipress_processing::{
    CancellationToken, EncodedImage, ImageTranscodeError, ImageTranscoder, LossyImageTranscoder,
    ResizeResolution, VideoFormat, VideoTranscoder,
};

/// Wraps the real image transcoder and counts invocations.
#[derive(Default)]
pub struct CountingImageTranscoder {
    inner: LossyImageTranscoder,
    calls: AtomicUsize,
}

impl CountingImageTranscoder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageTranscoder for CountingImageTranscoder {
    fn transcode(&self, data: &[u8], extension: &str) -> Result<EncodedImage, ImageTranscodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.transcode(data, extension)
    }
}

/// Records every request and returns the first half of the input.
#[derive(Default)]
pub struct RecordingVideoTranscoder {
    requests: Mutex<Vec<(VideoFormat, ResizeResolution, usize)>>,
    cancel_on_call: Option<CancellationToken>,
}

impl RecordingVideoTranscoder {
    /// Cancels `token` from inside the first transcode call.
    pub fn cancelling(token: CancellationToken) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            cancel_on_call: Some(token),
        }
    }

    pub fn requests(&self) -> Vec<(VideoFormat, ResizeResolution, usize)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoTranscoder for RecordingVideoTranscoder {
    async fn reduce_video_size(
        &self,
        data: Bytes,
        format: VideoFormat,
        resolution: ResizeResolution,
    ) -> anyhow::Result<Vec<u8>> {
        self.requests
            .lock()
            .unwrap()
            .push((format, resolution, data.len()));
        if let Some(token) = &self.cancel_on_call {
            token.cancel();
        }
        Ok(data[..data.len() / 2].to_vec())
    }
}

pub fn lossy() -> Arc<dyn ImageTranscoder> {
    Arc::new(LossyImageTranscoder::default())
}

pub fn recording_video() -> Arc<RecordingVideoTranscoder> {
    Arc::new(RecordingVideoTranscoder::default())
}
