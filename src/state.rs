//! Pipeline state, events, and the reducer that ties them together.
//!
//! [`PipelineState`] is an immutable snapshot. Nothing mutates one in place:
//! every update computes a new snapshot from the previous one
//! ([`PipelineState::with_image`], [`PipelineState::apply`]) and the
//! controller publishes it wholesale.
//!
//! ## Upload outcome sequence
//!
//! ```text
//! Loading(true)  →  Success | Error  →  Loading(false)
//! is_loading=T      error cleared/set   is_loading=F
//! error cleared
//! ```

use crate::classify::ErrorKind;
use crate::config::MessagesConfig;
use crate::imaging::RawImage;
use crate::upload::UploadError;
use std::sync::Arc;

/// Snapshot of what the presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineState {
    /// Most recently selected image, shared between snapshots.
    pub image: Option<Arc<RawImage>>,
    /// True only between upload start and upload completion.
    pub is_loading: bool,
    /// Display text of the last failure; cleared on success and on a new attempt.
    pub error_message: Option<String>,
}

impl PipelineState {
    /// Snapshot with `image` selected. Loading flag and error are kept.
    pub fn with_image(&self, image: Arc<RawImage>) -> Self {
        Self {
            image: Some(image),
            ..self.clone()
        }
    }

    /// Snapshot after one step of the upload sequence.
    pub fn apply(&self, outcome: &UploadOutcome, messages: &MessagesConfig) -> Self {
        match outcome {
            UploadOutcome::Loading(true) => Self {
                is_loading: true,
                error_message: None,
                ..self.clone()
            },
            UploadOutcome::Loading(false) => Self {
                is_loading: false,
                ..self.clone()
            },
            UploadOutcome::Success { .. } => Self {
                error_message: None,
                ..self.clone()
            },
            UploadOutcome::Error { kind, .. } => Self {
                error_message: Some(messages.message_for(*kind).to_string()),
                ..self.clone()
            },
        }
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}

/// User intents forwarded by the presentation layer.
#[derive(Debug)]
pub enum Event {
    ImageSelected(RawImage),
    UploadRequested,
}

/// One step of an upload attempt. Internal sequencing only.
#[derive(Debug)]
pub enum UploadOutcome {
    Loading(bool),
    Success { url: String },
    Error { kind: ErrorKind, cause: UploadError },
}

/// How an upload attempt ended, as reported to whoever awaits it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Uploaded { url: String },
    Failed { kind: ErrorKind },
}
