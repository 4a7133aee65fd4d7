use image::{DynamicImage, ImageReader};
use std::io::Cursor;
use thiserror::Error;

use super::writer::{encode_jpeg, WriterFormat};

/// Quality of the unconditional JPEG pass that produces the final bytes.
pub const FINAL_JPEG_QUALITY: u8 = 75;

#[derive(Debug, Error)]
pub enum ImageTranscodeError {
    /// The payload is not a raster image this build can decode.
    #[error("Not a decodable image: {0}")]
    Undecodable(String),

    #[error("No image writer for extension {0:?}")]
    NoWriter(String),

    #[error("Image encoding failed: {0}")]
    Encode(String),
}

/// Output of a successful image transcode. Always JPEG.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Synchronous, CPU-bound image re-encoder. Callers run it on a blocking thread.
pub trait ImageTranscoder: Send + Sync {
    fn transcode(&self, data: &[u8], extension: &str) -> Result<EncodedImage, ImageTranscodeError>;
}

/// Two-pass lossy re-encode.
///
/// The first pass writes the decoded image with the writer for the source extension
/// at `quality`. The result is decoded again and written a second time as JPEG at
/// [`FINAL_JPEG_QUALITY`].
#[derive(Debug, Clone, Copy)]
pub struct LossyImageTranscoder {
    quality: f32,
}

impl LossyImageTranscoder {
    pub fn new(quality: f32) -> Self {
        Self { quality }
    }
}

impl Default for LossyImageTranscoder {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl ImageTranscoder for LossyImageTranscoder {
    fn transcode(&self, data: &[u8], extension: &str) -> Result<EncodedImage, ImageTranscodeError> {
        let img = decode(data).map_err(ImageTranscodeError::Undecodable)?;

        let writer = WriterFormat::for_extension(extension)
            .ok_or_else(|| ImageTranscodeError::NoWriter(extension.to_string()))?;

        let first_pass = writer
            .encode(&img, self.quality)
            .map_err(|e| ImageTranscodeError::Encode(e.to_string()))?;
        drop(img);

        let intermediate = decode(&first_pass).map_err(ImageTranscodeError::Encode)?;
        let bytes = encode_jpeg(&intermediate, FINAL_JPEG_QUALITY)
            .map_err(|e| ImageTranscodeError::Encode(e.to_string()))?;

        Ok(EncodedImage {
            bytes,
            width: intermediate.width(),
            height: intermediate.height(),
        })
    }
}

fn decode(data: &[u8]) -> Result<DynamicImage, String> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| e.to_string())?;
    reader.decode().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    fn encoded(format: ImageFormat) -> Vec<u8> {
        let img = RgbImage::from_fn(40, 30, |x, y| Rgb([(x * 6) as u8, (y * 8) as u8, 90]));
        let mut buffer = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buffer), format)
            .unwrap();
        buffer
    }

    fn is_jpeg(bytes: &[u8]) -> bool {
        bytes.starts_with(&[0xFF, 0xD8, 0xFF])
    }

    #[test]
    fn test_png_source_ends_as_jpeg() {
        let result = LossyImageTranscoder::default()
            .transcode(&encoded(ImageFormat::Png), "png")
            .unwrap();
        assert!(is_jpeg(&result.bytes));
        assert_eq!((result.width, result.height), (40, 30));
    }

    #[test]
    fn test_tiff_source_ends_as_jpeg() {
        let result = LossyImageTranscoder::default()
            .transcode(&encoded(ImageFormat::Tiff), "tif")
            .unwrap();
        assert!(is_jpeg(&result.bytes));
    }

    #[test]
    fn test_non_image_payload_is_undecodable() {
        let err = LossyImageTranscoder::default()
            .transcode(b"just some text, not pixels", "txt")
            .unwrap_err();
        assert!(matches!(err, ImageTranscodeError::Undecodable(_)));
    }

    #[test]
    fn test_decodable_payload_without_writer() {
        let err = LossyImageTranscoder::default()
            .transcode(&encoded(ImageFormat::Png), "dat")
            .unwrap_err();
        assert!(matches!(err, ImageTranscodeError::NoWriter(ext) if ext == "dat"));
    }
}
