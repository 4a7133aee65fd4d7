use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Content types recognized by extension.
///
/// The table is fixed at build time. Anything not listed maps to
/// [`MimeType::OctetStream`], so classification never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MimeType {
    // Images
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/gif")]
    Gif,
    #[serde(rename = "image/bmp")]
    Bmp,
    #[serde(rename = "image/tiff")]
    Tiff,
    #[serde(rename = "image/webp")]
    WebP,
    #[serde(rename = "image/svg+xml")]
    Svg,
    #[serde(rename = "image/x-icon")]
    Icon,
    // Videos
    #[serde(rename = "video/mp4")]
    Mp4,
    #[serde(rename = "video/quicktime")]
    QuickTime,
    #[serde(rename = "video/x-msvideo")]
    Avi,
    #[serde(rename = "video/x-matroska")]
    Matroska,
    #[serde(rename = "video/webm")]
    WebM,
    // Audio
    #[serde(rename = "audio/mpeg")]
    Mp3,
    #[serde(rename = "audio/wav")]
    Wav,
    // Documents
    #[serde(rename = "application/pdf")]
    Pdf,
    #[serde(rename = "application/zip")]
    Zip,
    #[serde(rename = "application/json")]
    Json,
    #[serde(rename = "text/plain")]
    Text,
    #[serde(rename = "text/csv")]
    Csv,
    #[serde(rename = "text/html")]
    Html,
    #[serde(rename = "application/octet-stream")]
    OctetStream,
}

impl MimeType {
    /// Classify a file extension (without the dot). Case-insensitive.
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => MimeType::Jpeg,
            "png" => MimeType::Png,
            "gif" => MimeType::Gif,
            "bmp" => MimeType::Bmp,
            "tif" | "tiff" => MimeType::Tiff,
            "webp" => MimeType::WebP,
            "svg" => MimeType::Svg,
            "ico" => MimeType::Icon,
            "mp4" => MimeType::Mp4,
            "mov" => MimeType::QuickTime,
            "avi" => MimeType::Avi,
            "mkv" => MimeType::Matroska,
            "webm" => MimeType::WebM,
            "mp3" => MimeType::Mp3,
            "wav" => MimeType::Wav,
            "pdf" => MimeType::Pdf,
            "zip" => MimeType::Zip,
            "json" => MimeType::Json,
            "txt" => MimeType::Text,
            "csv" => MimeType::Csv,
            "htm" | "html" => MimeType::Html,
            _ => MimeType::OctetStream,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MimeType::Jpeg => "image/jpeg",
            MimeType::Png => "image/png",
            MimeType::Gif => "image/gif",
            MimeType::Bmp => "image/bmp",
            MimeType::Tiff => "image/tiff",
            MimeType::WebP => "image/webp",
            MimeType::Svg => "image/svg+xml",
            MimeType::Icon => "image/x-icon",
            MimeType::Mp4 => "video/mp4",
            MimeType::QuickTime => "video/quicktime",
            MimeType::Avi => "video/x-msvideo",
            MimeType::Matroska => "video/x-matroska",
            MimeType::WebM => "video/webm",
            MimeType::Mp3 => "audio/mpeg",
            MimeType::Wav => "audio/wav",
            MimeType::Pdf => "application/pdf",
            MimeType::Zip => "application/zip",
            MimeType::Json => "application/json",
            MimeType::Text => "text/plain",
            MimeType::Csv => "text/csv",
            MimeType::Html => "text/html",
            MimeType::OctetStream => crate::constants::OCTET_STREAM,
        }
    }
}

impl Display for MimeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Extension of the last path segment, without the dot.
///
/// Returns an empty string when the last segment has no dot.
pub fn file_extension(name: &str) -> &str {
    let file_name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match file_name.rfind('.') {
        Some(idx) => &file_name[idx + 1..],
        None => "",
    }
}
