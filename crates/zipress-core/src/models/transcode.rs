use bytes::Bytes;

use super::mime::MimeType;

/// Re-encoded entry ready for a single `put`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeResult {
    pub mime_type: MimeType,
    pub content_length: u64,
    pub bytes: Bytes,
    pub destination_key: String,
}

impl TranscodeResult {
    pub fn new(mime_type: MimeType, bytes: impl Into<Bytes>, destination_key: String) -> Self {
        let bytes = bytes.into();
        Self {
            mime_type,
            content_length: bytes.len() as u64,
            bytes,
            destination_key,
        }
    }
}
