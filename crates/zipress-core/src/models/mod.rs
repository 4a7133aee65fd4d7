//! Domain models for the extraction and transcode pipeline.

pub mod archive;
pub mod mime;
pub mod object;
pub mod transcode;

pub use archive::ArchiveEntry;
pub use mime::{file_extension, MimeType};
pub use object::StoredObjectRef;
pub use transcode::TranscodeResult;
