//! High-level image operations built on an [`ImageBackend`].
//!
//! These are the functions the rest of the crate calls. They take the
//! backend as a trait object so the controller can hold one
//! `Arc<dyn ImageBackend>` and tests can swap in a mock.
//!
//! | Function | What it does |
//! |---|---|
//! | [`compress`] | encode at a quality, decode back into a new [`RawImage`] |
//! | [`encode_for_upload`] | encode into the byte payload for the store |
//! | [`decode`] | bytes → [`RawImage`], keeping an optional source name |

use super::backend::{BackendError, ImageBackend, RawImage};
use super::params::Quality;
use tracing::debug;

/// Re-encode `image` at `quality` and decode the result.
///
/// The output keeps the input's name. The input is only borrowed, so the
/// caller decides whether to keep or drop the uncompressed buffer.
pub fn compress(
    backend: &dyn ImageBackend,
    image: &RawImage,
    quality: Quality,
) -> Result<RawImage, BackendError> {
    let encoded = backend.encode(image.pixels(), quality)?;
    let pixels = backend.decode(&encoded)?;
    debug!(
        quality = quality.value(),
        raw_bytes = image.byte_len(),
        encoded_bytes = encoded.len(),
        "compressed image"
    );
    let compressed = RawImage::new(pixels);
    Ok(match image.name() {
        Some(name) => compressed.with_name(name),
        None => compressed,
    })
}

/// Encode `image` into the bytes handed to the upload client.
pub fn encode_for_upload(
    backend: &dyn ImageBackend,
    image: &RawImage,
    quality: Quality,
) -> Result<Vec<u8>, BackendError> {
    backend.encode(image.pixels(), quality)
}

/// Decode encoded bytes into a [`RawImage`].
pub fn decode(
    backend: &dyn ImageBackend,
    bytes: &[u8],
    name: Option<&str>,
) -> Result<RawImage, BackendError> {
    let image = RawImage::new(backend.decode(bytes)?);
    Ok(match name {
        Some(name) => image.with_name(name),
        None => image,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::RustBackend;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use image::{DynamicImage, Rgb, RgbImage};

    fn photo(width: u32, height: u32) -> RawImage {
        RawImage::new(DynamicImage::ImageRgb8(RgbImage::from_fn(
            width,
            height,
            |x, y| {
                Rgb([
                    (x * 255 / width) as u8,
                    (y * 255 / height) as u8,
                    ((x * 7 + y * 13) % 255) as u8,
                ])
            },
        )))
    }

    #[test]
    fn compress_encodes_then_decodes() {
        let backend = MockBackend::new();
        let out = compress(&backend, &photo(4, 4), Quality::CAPTURE).unwrap();

        assert_eq!(out.dimensions().width, 1);
        let ops = backend.get_operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(
            ops[0],
            RecordedOp::Encode {
                width: 4,
                height: 4,
                quality: 80
            }
        ));
        assert!(matches!(ops[1], RecordedOp::Decode { .. }));
    }

    #[test]
    fn compress_keeps_name() {
        let backend = MockBackend::new();
        let img = photo(2, 2).with_name("dusk.jpg");
        let out = compress(&backend, &img, Quality::CAPTURE).unwrap();
        assert_eq!(out.name(), Some("dusk.jpg"));
    }

    #[test]
    fn compress_propagates_decode_failure() {
        let backend = MockBackend::failing_decode();
        let result = compress(&backend, &photo(2, 2), Quality::CAPTURE);
        assert!(matches!(result, Err(BackendError::Decode(_))));
    }

    #[test]
    fn compress_preserves_dimensions_with_real_codec() {
        let backend = RustBackend::new();
        let out = compress(&backend, &photo(96, 64), Quality::CAPTURE).unwrap();
        assert_eq!(out.dimensions(), photo(96, 64).dimensions());
    }

    #[test]
    fn recompression_size_settles() {
        // JPEG generation loss converges: after the first pass, repeated
        // re-encodes at the same quality stay within a small band.
        let backend = RustBackend::new();
        let quality = Quality::CAPTURE;
        let mut current = compress(&backend, &photo(128, 96), quality).unwrap();
        let baseline = encode_for_upload(&backend, &current, quality).unwrap().len() as f64;

        for _ in 0..5 {
            current = compress(&backend, &current, quality).unwrap();
            let size = encode_for_upload(&backend, &current, quality).unwrap().len() as f64;
            let delta = (size - baseline).abs() / baseline;
            assert!(
                delta <= 0.10,
                "re-encode drifted {:.1}% (baseline {baseline}, now {size})",
                delta * 100.0
            );
        }
    }

    #[test]
    fn encode_for_upload_uses_requested_quality() {
        let backend = MockBackend::new();
        let bytes = encode_for_upload(&backend, &photo(1, 1), Quality::UPLOAD).unwrap();
        assert_eq!(bytes[0], 100);
    }

    #[test]
    fn decode_attaches_name() {
        let backend = MockBackend::new();
        let img = decode(&backend, b"xx", Some("cat.png")).unwrap();
        assert_eq!(img.name(), Some("cat.png"));

        let img = decode(&backend, b"xx", None).unwrap();
        assert_eq!(img.name(), None);
    }
}
