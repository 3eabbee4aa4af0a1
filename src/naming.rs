//! Destination key derivation for uploaded objects.
//!
//! Every upload lands at a fresh key so two uploads of the same photo never
//! overwrite each other:
//!
//! ```text
//! <prefix>/<uuid v4>/<fragment>.jpg
//! images/0b6f.../Beach-at-dusk.jpg
//! ```
//!
//! The fragment keeps the key readable. It comes from the source file stem
//! when one is known; characters outside `[A-Za-z0-9_-]` collapse into a
//! single `-`, so keys never need URL escaping.

use uuid::Uuid;

/// Fragment used when the image has no usable name (camera capture).
const FALLBACK_FRAGMENT: &str = "image";

/// Extension of every uploaded object; the payload is always JPEG.
const EXTENSION: &str = "jpg";

/// Build the object key for an upload.
///
/// - `("images", id, Some("IMG_0001.HEIC"))` → `images/<id>/IMG_0001.jpg`
/// - `("images", id, None)` → `images/<id>/image.jpg`
/// - `("", id, Some("a.png"))` → `<id>/a.jpg`
pub fn destination_key(prefix: &str, id: Uuid, name: Option<&str>) -> String {
    let fragment = name
        .map(name_fragment)
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| FALLBACK_FRAGMENT.to_string());
    if prefix.is_empty() {
        format!("{id}/{fragment}.{EXTENSION}")
    } else {
        format!("{prefix}/{id}/{fragment}.{EXTENSION}")
    }
}

/// Sanitize a source name into a key-safe fragment.
///
/// Only the last path segment is used and its extension is dropped:
/// - `"Beach at dusk.png"` → `"Beach-at-dusk"`
/// - `"/tmp/photos/cat.jpeg"` → `"cat"`
/// - `"ünïcode!!.jpg"` → `"n-code"`
/// - `"..."` → `""`
pub fn name_fragment(name: &str) -> String {
    let last = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let stem = match last.rfind('.') {
        Some(0) | None => last,
        Some(dot) => &last[..dot],
    };

    let mut out = String::with_capacity(stem.len());
    let mut pending_dash = false;
    for c in stem.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }
    out
}
