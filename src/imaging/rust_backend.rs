//! Pure Rust codec backend, everything statically linked.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::load_from_memory` (format sniffed) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder::new_with_quality` |
//!
//! JPEG has no alpha channel, so RGBA and 16-bit inputs are flattened to
//! 8-bit RGB before encoding.

use super::backend::{BackendError, ImageBackend};
use super::params::Quality;
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;

/// Pure Rust backend using the `image` crate ecosystem.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBackend for RustBackend {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError> {
        if bytes.is_empty() {
            return Err(BackendError::Decode("empty input".into()));
        }
        image::load_from_memory(bytes).map_err(|e| BackendError::Decode(e.to_string()))
    }

    fn encode(&self, image: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
        let mut out = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut out, quality.as_u8());
        let result = match image {
            DynamicImage::ImageRgb8(_) | DynamicImage::ImageLuma8(_) => {
                image.write_with_encoder(encoder)
            }
            other => DynamicImage::ImageRgb8(other.to_rgb8()).write_with_encoder(encoder),
        };
        result.map_err(|e| BackendError::Encode(format!("JPEG encode failed: {e}")))?;
        Ok(out)
    }
}
