//! Lossy image re-encoding

pub mod transcoder;
pub mod writer;

pub use transcoder::{EncodedImage, ImageTranscodeError, ImageTranscoder, LossyImageTranscoder};
pub use writer::WriterFormat;
