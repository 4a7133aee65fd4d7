//! Shared helpers for pipeline integration tests.

#![allow(dead_code)]

pub mod fixtures;
pub mod storage;
pub mod transcoders;

use std::path::PathBuf;
use std::sync::Arc;
use zipress_core::ContentTypePolicy;
use zipress_processing::{
    ArchivePipeline, ImageTranscoder, PipelineConfig, TranscodeDispatcher, VideoTranscoder,
};
use zipress_storage::Storage;

pub fn test_config() -> PipelineConfig {
    PipelineConfig {
        trusted_root: PathBuf::from("/tmp/zipress-it/extract"),
        max_entry_bytes: 8 * 1024 * 1024,
        list_page_size: 2,
        skip_output_prefixes: true,
    }
}

pub fn build_pipeline(
    storage: Arc<dyn Storage>,
    image: Arc<dyn ImageTranscoder>,
    video: Arc<dyn VideoTranscoder>,
    policy: ContentTypePolicy,
) -> ArchivePipeline {
    let dispatcher = TranscodeDispatcher::new(image, video, policy);
    ArchivePipeline::new(storage, dispatcher, test_config())
}
