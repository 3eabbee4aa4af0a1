//! # photo-upload
//!
//! Pick or capture a photo, compress it, and upload it to an object store,
//! with every step reflected in an observable state snapshot.
//!
//! # Architecture: Acquire → Compress → Upload
//!
//! ```text
//! acquire    file / camera   →  RawImage        (decode + compress at quality 80)
//! controller ImageSelected   →  PipelineState   (image recorded)
//! controller UploadRequested →  Loading(true)   (published immediately)
//!            encode q100 → key → UploadClient::upload()
//!                            →  Success | Error(classified)
//!                            →  Loading(false)
//! ```
//!
//! The controller is the only stateful piece. Everything around it is a
//! plain function or a trait object it was handed at construction:
//!
//! - the codec is an [`imaging::ImageBackend`],
//! - the store is an [`upload::UploadClient`],
//! - failures are turned into an [`classify::ErrorKind`] by a pure function,
//! - display text comes from [`config::MessagesConfig`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`acquire`] | Camera capture and file/reader sources → `ImageSelected` events |
//! | [`imaging`] | `RawImage`, the codec backend trait, and compression |
//! | [`upload`] | `UploadClient` trait and the HTTP `PUT` implementation |
//! | [`naming`] | Destination key derivation (`prefix/uuid/name.jpg`) |
//! | [`classify`] | Fault → `ErrorKind` classification |
//! | [`state`] | `PipelineState`, `Event`, `UploadOutcome`, and the reducer |
//! | [`controller`] | Event handling, single-flight uploads, state publication |
//! | [`config`] | TOML configuration loading, layering, and validation |
//! | [`output`] | CLI rendering of transitions and compression results |
//! | [`logging`] | `tracing` subscriber setup |
//!
//! # Design Decisions
//!
//! ## Injected Store Client
//!
//! The controller never looks a store up globally. It receives an
//! `Arc<dyn UploadClient>`, which is what lets the tests script success,
//! failure, and a held-open upload without a network.
//!
//! ## Single-Flight Uploads
//!
//! A second upload request while one is running is ignored, not queued. Two
//! concurrent attempts would race on the same loading flag and error slot.
//!
//! ## Latest-Value State
//!
//! State lives in a `tokio::sync::watch` channel: a subscriber always reads
//! the current snapshot, late subscribers included. Callers that need every
//! intermediate snapshot pass a transition sender to the controller.
//!
//! ## Error Policy
//!
//! A new upload attempt clears the previous error, and so does a successful
//! settle. Selecting a different image does not.

pub mod acquire;
pub mod classify;
pub mod config;
pub mod controller;
pub mod imaging;
pub mod logging;
pub mod naming;
pub mod output;
pub mod state;
pub mod upload;

pub use classify::{ErrorKind, classify};
pub use controller::{PipelineController, PipelineSettings};
pub use state::{Event, PipelineState, Settlement, UploadOutcome};
pub use upload::{HttpUploadClient, UploadClient, UploadError};
