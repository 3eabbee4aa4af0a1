//! Image compression in pure Rust, no system codecs.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::load_from_memory` |
//! | **Encode** | `JpegEncoder::new_with_quality` |
//! | **Compress** | encode at a quality, decode back |
//!
//! The module is split into:
//! - **Parameters**: [`Quality`] and its named presets
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`], plus [`RawImage`]
//! - **Operations**: compress / encode / decode on top of a backend

pub mod backend;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend, RawImage};
pub use operations::{compress, decode, encode_for_upload};
pub use params::Quality;
pub use rust_backend::RustBackend;
