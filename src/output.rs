//! CLI output formatting, the terminal stand-in for a presentation layer.
//!
//! # Output Format
//!
//! ## Upload
//!
//! ```text
//! 001 ready      harbor.jpg 1200x800
//! 002 uploading  harbor.jpg 1200x800
//! 003 uploading  harbor.jpg 1200x800
//! 004 ready      harbor.jpg 1200x800
//! Uploaded: https://store.example.com/images/6f1c.../harbor.jpg
//! ```
//!
//! A failed attempt shows the error message on the settled line:
//!
//! ```text
//! 004 failed     harbor.jpg 1200x800
//!     Error: No internet connection.
//! ```
//!
//! ## Compress
//!
//! ```text
//! harbor.jpg 1200x800
//!     Quality: 80
//!     Size: 2.4 MB → 183.2 KB (92% smaller)
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>` or `String`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure and do no I/O.

use crate::classify::ErrorKind;
use crate::imaging::{Quality, RawImage};
use crate::state::{PipelineState, Settlement};
use serde::Serialize;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Human-readable byte count (binary units, one decimal).
fn format_bytes(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// `name WxH`, or `(unnamed) WxH` for captures.
fn image_label(image: &RawImage) -> String {
    let dims = image.dimensions();
    format!(
        "{} {}x{}",
        image.name().unwrap_or("(unnamed)"),
        dims.width,
        dims.height
    )
}

/// Short phase word for a snapshot.
fn phase(state: &PipelineState) -> &'static str {
    match (state.is_loading, state.error_message.is_some()) {
        (true, _) => "uploading",
        (false, true) => "failed",
        (false, false) if state.has_image() => "ready",
        (false, false) => "idle",
    }
}

// ============================================================================
// Upload output
// ============================================================================

/// Format one published snapshot as display lines.
pub fn format_transition(index: usize, state: &PipelineState) -> Vec<String> {
    let mut lines = Vec::new();
    let label = state
        .image
        .as_deref()
        .map(image_label)
        .unwrap_or_else(|| "(no image)".to_string());
    lines.push(format!(
        "{} {:<10} {}",
        format_index(index),
        phase(state),
        label
    ));
    if let Some(message) = &state.error_message {
        lines.push(format!("    Error: {}", message));
    }
    lines
}

/// Format how an upload attempt ended.
pub fn format_settlement(settlement: Option<&Settlement>) -> String {
    match settlement {
        Some(Settlement::Uploaded { url }) => format!("Uploaded: {}", url),
        Some(Settlement::Failed { kind }) => {
            format!("Upload failed ({})", kind.message_key())
        }
        None => "Nothing uploaded".to_string(),
    }
}

/// Machine-readable summary of a finished run (`--json`).
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub url: Option<String>,
    pub error_kind: Option<ErrorKind>,
    pub error_message: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl RunSummary {
    pub fn new(state: &PipelineState, settlement: Option<&Settlement>) -> Self {
        let dims = state.image.as_deref().map(RawImage::dimensions);
        let (url, error_kind) = match settlement {
            Some(Settlement::Uploaded { url }) => (Some(url.clone()), None),
            Some(Settlement::Failed { kind }) => (None, Some(*kind)),
            None => (None, None),
        };
        Self {
            url,
            error_kind,
            error_message: state.error_message.clone(),
            width: dims.map(|d| d.width),
            height: dims.map(|d| d.height),
        }
    }
}

/// Print one transition to stdout.
pub fn print_transition(index: usize, state: &PipelineState) {
    for line in format_transition(index, state) {
        println!("{}", line);
    }
}

// ============================================================================
// Compress output
// ============================================================================

/// Format the result of a standalone compression.
pub fn format_compression(
    image: &RawImage,
    quality: Quality,
    before: usize,
    after: usize,
) -> Vec<String> {
    let mut lines = vec![image_label(image)];
    lines.push(format!("    Quality: {}", quality));
    let saved = if before > 0 && after < before {
        format!(" ({}% smaller)", (before - after) * 100 / before)
    } else {
        String::new()
    };
    lines.push(format!(
        "    Size: {} → {}{}",
        format_bytes(before),
        format_bytes(after),
        saved
    ));
    lines
}

/// Print compression output to stdout.
pub fn print_compression(image: &RawImage, quality: Quality, before: usize, after: usize) {
    for line in format_compression(image, quality, before, after) {
        println!("{}", line);
    }
}
