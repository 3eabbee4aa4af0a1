//! Image codec backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two primitives every backend must
//! support: decode bytes into pixels, and encode pixels into lossy bytes.
//! Compression is built on top of those two in
//! [`operations`](super::operations).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate's pure-Rust codecs.

use super::params::Quality;
use image::DynamicImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Pixel dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// A decoded in-memory pixel buffer, before or after compression.
///
/// Carries the name of the source it came from (a file name, a camera
/// capture label) when one is known; the upload path uses it as the readable
/// part of the destination key. The pixels are never mutated after
/// construction: compression produces a new `RawImage`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    pixels: DynamicImage,
    name: Option<String>,
}

impl RawImage {
    pub fn new(pixels: DynamicImage) -> Self {
        Self { pixels, name: None }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.pixels.width(),
            height: self.pixels.height(),
        }
    }

    /// Size of the decoded pixel data in bytes.
    pub fn byte_len(&self) -> usize {
        self.pixels.as_bytes().len()
    }
}

/// Trait for image codec backends.
///
/// `Send + Sync` because the controller shares one backend between the
/// caller and the spawned upload task.
pub trait ImageBackend: Send + Sync {
    /// Decode an encoded image (format sniffed from content).
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError>;

    /// Encode pixels as a lossy image at the given quality.
    fn encode(&self, image: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock backend that records operations without running a codec.
    ///
    /// `encode` returns the raw pixel bytes prefixed by the quality; `decode`
    /// hands back a fixed 1x1 image. Either can be switched to fail.
    #[derive(Default)]
    pub struct MockBackend {
        pub fail_decode: bool,
        pub fail_encode: bool,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Decode { len: usize },
        Encode { width: u32, height: u32, quality: u32 },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_decode() -> Self {
            Self {
                fail_decode: true,
                ..Self::default()
            }
        }

        pub fn failing_encode() -> Self {
            Self {
                fail_encode: true,
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }
    }

    impl ImageBackend for MockBackend {
        fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Decode { len: bytes.len() });
            if self.fail_decode {
                return Err(BackendError::Decode("mock decode failure".into()));
            }
            Ok(DynamicImage::new_rgb8(1, 1))
        }

        fn encode(&self, image: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Encode {
                width: image.width(),
                height: image.height(),
                quality: quality.value(),
            });
            if self.fail_encode {
                return Err(BackendError::Encode("mock encode failure".into()));
            }
            let mut out = vec![quality.as_u8()];
            out.extend_from_slice(image.as_bytes());
            Ok(out)
        }
    }

    #[test]
    fn mock_records_encode() {
        let backend = MockBackend::new();
        let bytes = backend
            .encode(&DynamicImage::new_rgb8(2, 3), Quality::new(90))
            .unwrap();

        assert_eq!(bytes[0], 90);
        assert_eq!(bytes.len(), 1 + 2 * 3 * 3);
        assert_eq!(
            backend.get_operations(),
            vec![RecordedOp::Encode {
                width: 2,
                height: 3,
                quality: 90
            }]
        );
    }

    #[test]
    fn mock_decode_can_fail() {
        let backend = MockBackend::failing_decode();
        assert!(matches!(
            backend.decode(b"garbage"),
            Err(BackendError::Decode(_))
        ));
        assert_eq!(
            backend.get_operations(),
            vec![RecordedOp::Decode { len: 7 }]
        );
    }

    #[test]
    fn raw_image_reports_dimensions_and_name() {
        let img = RawImage::new(DynamicImage::new_rgb8(4, 2)).with_name("beach.png");
        assert_eq!(
            img.dimensions(),
            Dimensions {
                width: 4,
                height: 2
            }
        );
        assert_eq!(img.name(), Some("beach.png"));
        assert_eq!(img.byte_len(), 4 * 2 * 3);
    }
}
