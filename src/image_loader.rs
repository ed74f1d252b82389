//! Image loading from files and base64 data URLs
//!
//! The capture surface uploads photos as `data:image/...;base64,` URLs, and
//! command-line use passes file paths. Both end up as an RGBA buffer.
//!
//! ## Supported Formats
//!
//! Decoding goes through the `image` crate: JPEG, PNG, GIF (first frame),
//! WebP, TIFF and BMP.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{DynamicImage, ImageReader, RgbaImage};

use crate::error::{AnalysisError, Result};

/// Supported image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    /// GIF image (first frame only)
    Gif,
    WebP,
    Tiff,
    Bmp,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<ImageFormat> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "gif" => Some(ImageFormat::Gif),
            "webp" => Some(ImageFormat::WebP),
            "tiff" | "tif" => Some(ImageFormat::Tiff),
            "bmp" => Some(ImageFormat::Bmp),
            _ => None,
        }
    }
}

/// Load an image file as RGBA
///
/// # Errors
///
/// Returns `ImageLoadError` if the extension is not supported, or the file
/// cannot be opened or decoded
pub fn load_image(path: &Path) -> Result<RgbaImage> {
    if ImageFormat::from_extension(path).is_none() {
        return Err(AnalysisError::ImageLoadError {
            message: format!("Unknown image format for file: {}", path.display()),
            source: None,
        });
    }

    let reader = ImageReader::open(path).map_err(|e| {
        AnalysisError::image_load(format!("Failed to open image file: {}", path.display()), e)
    })?;

    let img: DynamicImage = reader.decode().map_err(|e| {
        AnalysisError::image_load(format!("Failed to decode image: {}", path.display()), e)
    })?;

    log::debug!("loaded {} ({}x{})", path.display(), img.width(), img.height());
    Ok(img.to_rgba8())
}

/// Decode a base64 image, with or without a `data:image/...;base64,` prefix
///
/// # Errors
///
/// Returns `ImageLoadError` if the payload is not valid base64 or not a
/// decodable image
pub fn load_data_url(data: &str) -> Result<RgbaImage> {
    let payload = strip_data_url_prefix(data.trim());
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| AnalysisError::image_load("Could not decode base64 image data", e))?;
    decode_bytes(&bytes)
}

/// Decode an in-memory encoded image
pub fn decode_bytes(bytes: &[u8]) -> Result<RgbaImage> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| AnalysisError::image_load("Could not decode image", e))?;
    log::debug!("decoded {} bytes ({}x{})", bytes.len(), img.width(), img.height());
    Ok(img.to_rgba8())
}

fn strip_data_url_prefix(data: &str) -> &str {
    if data.starts_with("data:") {
        match data.split_once(',') {
            Some((_, payload)) => payload,
            None => data,
        }
    } else {
        data
    }
}
