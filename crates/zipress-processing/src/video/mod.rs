//! Video size reduction

pub mod ffmpeg;
pub mod transcoder;

pub use ffmpeg::FfmpegVideoTranscoder;
pub use transcoder::{ResizeResolution, VideoFormat, VideoTranscoder};
