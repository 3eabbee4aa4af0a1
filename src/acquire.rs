//! Acquisition sources: turning a photo into an `ImageSelected` event.
//!
//! There are two ways a photo enters the pipeline, and both end in the same
//! compression step:
//!
//! | Source | Input | Path |
//! |---|---|---|
//! | Camera capture | already-decoded pixels | compress |
//! | Picked content | encoded bytes (reader or file) | decode → compress |
//!
//! A photo that cannot be decoded never reaches the controller:
//! [`selection`] logs the failure and yields no event.

use crate::imaging::{BackendError, ImageBackend, Quality, RawImage, compress, decode};
use crate::state::Event;
use image::DynamicImage;
use std::io::Read;
use std::path::Path;
use tracing::warn;

/// Compress a freshly captured frame.
pub fn from_capture(
    backend: &dyn ImageBackend,
    pixels: DynamicImage,
    quality: Quality,
) -> Result<RawImage, BackendError> {
    compress(backend, &RawImage::new(pixels), quality)
}

/// Read encoded bytes from `reader`, decode, and compress.
pub fn from_reader(
    backend: &dyn ImageBackend,
    mut reader: impl Read,
    name: Option<&str>,
    quality: Quality,
) -> Result<RawImage, BackendError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let image = decode(backend, &bytes, name)?;
    compress(backend, &image, quality)
}

/// Read a photo from disk; its file name becomes the image name.
pub fn from_path(
    backend: &dyn ImageBackend,
    path: &Path,
    quality: Quality,
) -> Result<RawImage, BackendError> {
    let file = std::fs::File::open(path)?;
    let name = path.file_name().and_then(|n| n.to_str());
    from_reader(backend, std::io::BufReader::new(file), name, quality)
}

/// Turn an acquisition result into the event to send, if any.
pub fn selection(result: Result<RawImage, BackendError>) -> Option<Event> {
    match result {
        Ok(image) => Some(Event::ImageSelected(image)),
        Err(e) => {
            warn!(error = %e, "could not read selected image, ignoring");
            None
        }
    }
}
