//! Configuration module
//!
//! Environment-driven settings for the storage backend and the extraction/transcode
//! pipeline. A `.env` file is honoured when present.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::models::MimeType;
use crate::storage_types::StorageBackend;

const EXTRACT_ROOT: &str = "/tmp/zipress/extract";
const MAX_ENTRY_SIZE_MB: u64 = 512;
const IMAGE_QUALITY: f32 = 0.5;
const FFMPEG_PATH: &str = "ffmpeg";
const LIST_PAGE_SIZE: usize = 1000;

/// Which MIME type is attached to a re-encoded artifact.
///
/// `Source` labels the artifact with the type of the original extension even when
/// the bytes were converted (a `.tif` entry is stored as JPEG bytes labelled
/// `image/tiff`). `Output` labels it with the encoded format instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentTypePolicy {
    #[default]
    Source,
    Output,
}

impl ContentTypePolicy {
    /// Resolve the content type for an artifact.
    pub fn resolve(self, source: MimeType, encoded: MimeType) -> MimeType {
        match self {
            ContentTypePolicy::Source => source,
            ContentTypePolicy::Output => encoded,
        }
    }
}

impl FromStr for ContentTypePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "source" => Ok(ContentTypePolicy::Source),
            "output" => Ok(ContentTypePolicy::Output),
            _ => Err(anyhow::anyhow!("Invalid content type policy: {}", s)),
        }
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO etc.)
    pub local_storage_path: Option<String>,
    pub list_page_size: usize,
    // Pipeline configuration
    pub extract_root: PathBuf,
    pub max_entry_size_bytes: u64,
    pub image_quality: f32,
    pub ffmpeg_path: String,
    pub content_type_policy: ContentTypePolicy,
    pub skip_output_prefixes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_backend: StorageBackend::Memory,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            local_storage_path: None,
            list_page_size: LIST_PAGE_SIZE,
            extract_root: PathBuf::from(EXTRACT_ROOT),
            max_entry_size_bytes: MAX_ENTRY_SIZE_MB * 1024 * 1024,
            image_quality: IMAGE_QUALITY,
            ffmpeg_path: FFMPEG_PATH.to_string(),
            content_type_policy: ContentTypePolicy::Source,
            skip_output_prefixes: true,
        }
    }
}

/// Parse an optional numeric variable, using `default` when it is unset.
fn number_var<T: FromStr>(name: &str, value: Option<String>, default: T) -> Result<T, anyhow::Error> {
    match value {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number, got {:?}", name, raw)),
        None => Ok(default),
    }
}

/// Convert a megabyte setting to bytes, refusing values that overflow `u64`.
fn mb_to_bytes(mb: u64) -> Result<u64, anyhow::Error> {
    mb.checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("MAX_ENTRY_SIZE_MB is too large: {}", mb))
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let storage_backend = env::var("STORAGE_BACKEND")
            .ok()
            .map(|s| s.parse::<StorageBackend>())
            .transpose()?
            .unwrap_or(StorageBackend::S3);

        let max_entry_size_mb = number_var(
            "MAX_ENTRY_SIZE_MB",
            env::var("MAX_ENTRY_SIZE_MB").ok(),
            MAX_ENTRY_SIZE_MB,
        )?;

        let image_quality = env::var("IMAGE_QUALITY")
            .unwrap_or_else(|_| IMAGE_QUALITY.to_string())
            .parse::<f32>()
            .map_err(|_| anyhow::anyhow!("IMAGE_QUALITY must be a number between 0.0 and 1.0"))?;

        let list_page_size =
            number_var("LIST_PAGE_SIZE", env::var("LIST_PAGE_SIZE").ok(), LIST_PAGE_SIZE)?;

        let content_type_policy = env::var("CONTENT_TYPE_POLICY")
            .ok()
            .map(|s| s.parse::<ContentTypePolicy>())
            .transpose()?
            .unwrap_or_default();

        let skip_output_prefixes = env::var("SKIP_OUTPUT_PREFIXES")
            .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "no"))
            .unwrap_or(true);

        let config = Config {
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION")
                .or_else(|_| env::var("AWS_REGION"))
                .ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            list_page_size,
            extract_root: env::var("EXTRACT_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(EXTRACT_ROOT)),
            max_entry_size_bytes: mb_to_bytes(max_entry_size_mb)?,
            image_quality,
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| FFMPEG_PATH.to_string()),
            content_type_policy,
            skip_output_prefixes,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(0.0..=1.0).contains(&self.image_quality) {
            return Err(anyhow::anyhow!(
                "IMAGE_QUALITY must be between 0.0 and 1.0, got {}",
                self.image_quality
            ));
        }
        if self.list_page_size == 0 {
            return Err(anyhow::anyhow!("LIST_PAGE_SIZE must be greater than zero"));
        }
        if self.max_entry_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_ENTRY_SIZE_MB must be greater than zero"));
        }
        if !self.extract_root.is_absolute() {
            return Err(anyhow::anyhow!(
                "EXTRACT_ROOT must be an absolute path, got {}",
                self.extract_root.display()
            ));
        }
        Ok(())
    }
}
