use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;

/// Container formats the video path accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoFormat {
    Mp4,
}

impl VideoFormat {
    /// Case-insensitive extension match.
    pub fn for_extension(extension: &str) -> Option<Self> {
        if extension.eq_ignore_ascii_case("mp4") {
            Some(VideoFormat::Mp4)
        } else {
            None
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            VideoFormat::Mp4 => "mp4",
        }
    }
}

/// Named target heights. Width follows the source aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeResolution {
    R240P,
    R360P,
    R480P,
    R720P,
    R1080P,
}

impl ResizeResolution {
    pub fn height(self) -> u32 {
        match self {
            ResizeResolution::R240P => 240,
            ResizeResolution::R360P => 360,
            ResizeResolution::R480P => 480,
            ResizeResolution::R720P => 720,
            ResizeResolution::R1080P => 1080,
        }
    }
}

impl fmt::Display for ResizeResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}p", self.height())
    }
}

#[async_trait]
pub trait VideoTranscoder: Send + Sync {
    /// Re-encode `data` at `resolution`, returning the new container bytes.
    async fn reduce_video_size(
        &self,
        data: Bytes,
        format: VideoFormat,
        resolution: ResizeResolution,
    ) -> anyhow::Result<Vec<u8>>;
}
