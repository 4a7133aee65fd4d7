//! Zipress Archive Processing Library
//!
//! This crate turns zip archives stored in a bucket into re-encoded media: streaming
//! extraction, zip-slip protection, routing to the image or video transcoder and
//! write-back under `resized/` or `compressed/`.

pub mod archive;
pub mod dispatcher;
pub mod error;
pub mod image;
pub mod path_guard;
pub mod pipeline;
pub mod report;
pub mod video;

// Re-export commonly used types
pub use archive::{ArchiveEntries, ArchiveExtractor, ZipEntries};
pub use dispatcher::{TranscodeDispatcher, VIDEO_TARGET_RESOLUTION};
pub use error::{DispatchError, ExtractError, PathTraversal, PipelineError};
pub use image::{EncodedImage, ImageTranscodeError, ImageTranscoder, LossyImageTranscoder};
pub use path_guard::{PathGuard, ResolvedPath};
pub use pipeline::{ArchivePipeline, PipelineConfig};
pub use report::{
    ArchiveMode, ArchiveReport, BatchReport, EntryOutcome, EntryReport, FailureReason, SkipReason,
};
pub use video::{FfmpegVideoTranscoder, ResizeResolution, VideoFormat, VideoTranscoder};

pub use tokio_util::sync::CancellationToken;
