use bytes::Bytes;

use super::mime::{file_extension, MimeType};

/// One fully buffered file member of a zip archive.
///
/// Produced by the extractor once the entry's decompressed bytes have been drained,
/// owned by the pipeline until the entry has been dispatched, then dropped.
/// `payload.len() == declared_size` holds for every value the extractor hands out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub declared_size: u64,
    pub compressed_size: u64,
    pub payload: Bytes,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, compressed_size: u64, payload: impl Into<Bytes>) -> Self {
        let payload = payload.into();
        Self {
            name: name.into(),
            declared_size: payload.len() as u64,
            compressed_size,
            payload,
        }
    }

    /// Extension of the entry name, without the dot. Empty when there is none.
    pub fn extension(&self) -> &str {
        file_extension(&self.name)
    }

    /// MIME type derived from the entry's extension.
    pub fn mime_type(&self) -> MimeType {
        MimeType::from_extension(self.extension())
    }

    /// Directory markers are names ending with a path separator.
    pub fn is_directory_name(name: &str) -> bool {
        name.ends_with('/') || name.ends_with('\\')
    }
}
