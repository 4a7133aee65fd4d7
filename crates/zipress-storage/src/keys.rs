//! Artifact key derivation.

use crate::traits::{StorageError, StorageResult};
use zipress_core::constants::{COMPRESSED_PREFIX, OUTPUT_PREFIXES};

/// Key for a verbatim archive member: `compressed/{entry_name}`.
pub fn compressed_key(entry_name: &str) -> String {
    format!("{}{}", COMPRESSED_PREFIX, entry_name)
}

/// Whether a key was written by the pipeline itself.
pub fn is_output_key(key: &str) -> bool {
    OUTPUT_PREFIXES.iter().any(|prefix| key.starts_with(prefix))
}

/// Whether a key is a "directory" marker rather than an object.
pub fn is_directory_marker(key: &str) -> bool {
    key.ends_with('/')
}

/// Reject empty keys.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.trim().is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    Ok(())
}
