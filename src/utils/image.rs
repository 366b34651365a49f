//! Image normalization for vision uploads
//!
//! Uploaded bytes must decode to a real raster image before any network
//! call is made. Oversized pictures are scaled down and everything is
//! re-encoded as JPEG so the inline payload stays within the vision API's
//! comfort zone.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::GenericImageView;

/// Longest edge allowed before the image is scaled down.
const MAX_DIMENSION: u32 = 1536;
const JPEG_QUALITY: u8 = 95;

/// Base64 JPEG payload ready for the vision API's `inline_data` part.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub mime_type: &'static str,
    pub base64_data: String,
}

#[derive(Debug)]
pub struct InvalidImageError {
    reason: String,
}

impl InvalidImageError {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for InvalidImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid image: {}", self.reason)
    }
}

impl std::error::Error for InvalidImageError {}

/// Decode, downscale if needed, and re-encode the upload as base64 JPEG.
pub fn encode_for_upload(bytes: &[u8]) -> Result<EncodedImage, InvalidImageError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| InvalidImageError::new(format!("decode failed: {e}")))?;

    let (width, height) = decoded.dimensions();
    let scaled = if width.max(height) > MAX_DIMENSION {
        decoded.thumbnail(MAX_DIMENSION, MAX_DIMENSION)
    } else {
        decoded
    };

    // JPEG has no alpha channel; flatten before encoding.
    let rgb = scaled.to_rgb8();
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY)
        .encode_image(&rgb)
        .map_err(|e| InvalidImageError::new(format!("re-encode failed: {e}")))?;

    Ok(EncodedImage {
        mime_type: "image/jpeg",
        base64_data: BASE64.encode(&buffer),
    })
}
