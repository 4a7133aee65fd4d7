use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use super::transcoder::{ResizeResolution, VideoFormat, VideoTranscoder};

/// Scales video with an external `ffmpeg` binary.
#[derive(Debug, Clone)]
pub struct FfmpegVideoTranscoder {
    ffmpeg_path: String,
}

impl FfmpegVideoTranscoder {
    pub fn new(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    fn build_args(input_path: &Path, output_path: &Path, resolution: ResizeResolution) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            input_path.to_string_lossy().to_string(),
            "-vf".to_string(),
            // -2 keeps the width even, which libx264 requires
            format!("scale=-2:{}", resolution.height()),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-preset".to_string(),
            "fast".to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            output_path.to_string_lossy().to_string(),
        ]
    }
}

impl Default for FfmpegVideoTranscoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

#[async_trait]
impl VideoTranscoder for FfmpegVideoTranscoder {
    async fn reduce_video_size(
        &self,
        data: Bytes,
        format: VideoFormat,
        resolution: ResizeResolution,
    ) -> Result<Vec<u8>> {
        // Both files live in the directory, which is removed on every exit path.
        let work_dir = tempfile::tempdir().context("Failed to create temp directory")?;
        let input_path = work_dir.path().join(format!("input.{}", format.extension()));
        let output_path = work_dir.path().join(format!("output.{}", format.extension()));

        tokio::fs::write(&input_path, &data).await?;
        drop(data);

        let args = Self::build_args(&input_path, &output_path, resolution);
        let start = std::time::Instant::now();

        let output = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .context("Failed to execute ffmpeg")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("FFmpeg resize failed: {}", stderr));
        }

        let output_data = tokio::fs::read(&output_path).await?;

        tracing::debug!(
            resolution = %resolution,
            size_bytes = output_data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "FFmpeg resize complete"
        );

        Ok(output_data)
    }
}
