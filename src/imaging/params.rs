//! Parameter types for image operations.
//!
//! - [`Quality`]: lossy encoding quality (1–100). Clamped on construction.
//!
//! The two qualities the pipeline actually uses are named here so callers
//! don't scatter magic numbers: [`Quality::CAPTURE`] for acquisition-time
//! compression and [`Quality::UPLOAD`] for the payload sent to the store.

/// Quality setting for lossy image encoding (1-100).
///
/// Out-of-range input is clamped rather than rejected: `0` becomes `1`,
/// anything above `100` becomes `100`. The JPEG encoder has no meaningful
/// quality 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    /// Quality applied when a photo enters the pipeline (capture or pick).
    pub const CAPTURE: Quality = Quality(80);
    /// Quality applied to the bytes handed to the upload client.
    pub const UPLOAD: Quality = Quality(100);

    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Quality as the `u8` the `image` encoders expect.
    pub fn as_u8(self) -> u8 {
        // Always within 1..=100
        self.0 as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::CAPTURE
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
