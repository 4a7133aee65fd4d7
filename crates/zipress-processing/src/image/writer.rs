use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

/// Encoder chosen for the first lossy pass, keyed by source extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
    WebP,
}

impl WriterFormat {
    /// `tif`/`tiff` sources are written with the JPEG encoder. Returns `None` when
    /// no writer exists for the extension.
    pub fn for_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "tif" | "tiff" => Some(WriterFormat::Jpeg),
            "png" => Some(WriterFormat::Png),
            "gif" => Some(WriterFormat::Gif),
            "bmp" => Some(WriterFormat::Bmp),
            "webp" => Some(WriterFormat::WebP),
            _ => None,
        }
    }

    /// Encode `img` with a quality factor on the 0.0-1.0 scale.
    ///
    /// Only JPEG honours the factor directly; PNG maps it to a compression level and
    /// the remaining writers ignore it.
    pub fn encode(self, img: &DynamicImage, quality: f32) -> anyhow::Result<Vec<u8>> {
        match self {
            WriterFormat::Jpeg => encode_jpeg(img, quality_percent(quality)),
            WriterFormat::Png => {
                let mut buffer = Vec::new();
                let encoder = PngEncoder::new_with_quality(
                    Cursor::new(&mut buffer),
                    png_compression(quality),
                    FilterType::Adaptive,
                );
                img.write_with_encoder(encoder)?;
                Ok(buffer)
            }
            WriterFormat::Gif => write_rgba(img, ImageFormat::Gif),
            WriterFormat::Bmp => write_rgba(img, ImageFormat::Bmp),
            WriterFormat::WebP => write_rgba(img, ImageFormat::WebP),
        }
    }
}

fn quality_percent(quality: f32) -> u8 {
    (quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8
}

fn png_compression(quality: f32) -> CompressionType {
    if quality >= 0.67 {
        CompressionType::Fast
    } else if quality <= 0.33 {
        CompressionType::Best
    } else {
        CompressionType::Default
    }
}

fn write_rgba(img: &DynamicImage, format: ImageFormat) -> anyhow::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    DynamicImage::ImageRgba8(img.to_rgba8()).write_to(&mut Cursor::new(&mut buffer), format)?;
    Ok(buffer)
}

/// Baseline JPEG through mozjpeg, quality on the 1-100 scale.
pub(crate) fn encode_jpeg(img: &DynamicImage, quality: u8) -> anyhow::Result<Vec<u8>> {
    let rgb_img = img.to_rgb8();
    let (width, height) = rgb_img.dimensions();

    let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
    comp.set_size(width as usize, height as usize);
    comp.set_quality(quality as f32);
    comp.set_optimize_coding(true);

    let mut comp = comp.start_compress(Vec::new())?;
    comp.write_scanlines(&rgb_img)?;
    let jpeg_data = comp.finish()?;

    Ok(jpeg_data)
}
