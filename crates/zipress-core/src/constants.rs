//! Key prefixes and defaults shared across crates.

/// Prefix for re-encoded image and video artifacts.
pub const RESIZED_PREFIX: &str = "resized/";

/// Prefix for archive members copied without transcoding.
pub const COMPRESSED_PREFIX: &str = "compressed/";

/// Prefixes written by the pipeline itself.
pub const OUTPUT_PREFIXES: [&str; 2] = [RESIZED_PREFIX, COMPRESSED_PREFIX];

/// Content type used when an extension is not recognized.
pub const OCTET_STREAM: &str = "application/octet-stream";
