//! The pipeline controller: events in, state snapshots out.
//!
//! ## State publication
//!
//! The current [`PipelineState`] lives in a `tokio::sync::watch` channel, so
//! subscribers always see the latest snapshot (late subscribers included).
//! A watch channel may skip intermediate values for a slow reader, so the
//! controller can also mirror every snapshot onto an ordered transition
//! stream (`std::sync::mpsc`). Both are written inside the watch channel's
//! write lock, which keeps the two views in the same order.
//!
//! ## Upload sequence
//!
//! ```text
//! handle(UploadRequested)
//!   ├─ no image          → ignored
//!   ├─ upload in flight  → ignored (single-flight)
//!   └─ Loading(true)     (applied before handle returns)
//!        spawn: encode(upload quality) → key → client.upload()
//!               → Success | Error(classified)
//!               → Loading(false)
//! ```
//!
//! ## Cancellation
//!
//! Dropping the controller (or calling [`PipelineController::shutdown`])
//! closes it: the in-flight task is aborted and no further snapshots are
//! published. The store may still have received the bytes.
//!
//! A panic inside the store client or the codec settles the attempt as an
//! `UnknownError`, like any other failure.

use crate::classify::{ErrorKind, classify};
use crate::config::{MessagesConfig, UploaderConfig};
use crate::imaging::{ImageBackend, Quality, RawImage, encode_for_upload};
use crate::naming::destination_key;
use crate::state::{Event, PipelineState, Settlement, UploadOutcome};
use crate::upload::{UploadClient, UploadError};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Upload-path settings the controller needs at runtime.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub upload_quality: Quality,
    pub key_prefix: String,
    pub messages: MessagesConfig,
}

impl PipelineSettings {
    pub fn from_config(config: &UploaderConfig) -> Self {
        Self {
            upload_quality: config.compression.upload(),
            key_prefix: config.upload.key_prefix.clone(),
            messages: config.messages.clone(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&UploaderConfig::default())
    }
}

/// State shared between the controller handle and its upload task.
struct Shared {
    state: watch::Sender<PipelineState>,
    transitions: Option<Sender<PipelineState>>,
    client: Arc<dyn UploadClient>,
    backend: Arc<dyn ImageBackend>,
    settings: PipelineSettings,
    in_flight: AtomicBool,
    closed: AtomicBool,
}

impl Shared {
    /// Publish `next(current)` as the new snapshot. No-op once closed.
    ///
    /// `closed` is checked under the watch write lock, the same lock
    /// [`Shared::close`] sets it under.
    fn publish(&self, next: impl FnOnce(&PipelineState) -> PipelineState) {
        self.state.send_if_modified(|current| {
            if self.closed.load(Ordering::Acquire) {
                return false;
            }
            let snapshot = next(current);
            if let Some(tx) = &self.transitions {
                // Receiver gone just means nobody is listening.
                let _ = tx.send(snapshot.clone());
            }
            *current = snapshot;
            true
        });
    }

    /// Mark the controller closed. Returns `false` if it already was.
    fn close(&self) -> bool {
        let mut first = false;
        self.state.send_if_modified(|_| {
            first = !self.closed.swap(true, Ordering::AcqRel);
            false
        });
        first
    }

    fn apply(&self, outcome: &UploadOutcome) {
        self.publish(|current| {
            let next = current.apply(outcome, &self.settings.messages);
            if matches!(outcome, UploadOutcome::Loading(false)) {
                // Released under the write lock so a new request can't slip
                // its Loading(true) in before this Loading(false).
                self.in_flight.store(false, Ordering::Release);
            }
            next
        });
    }

    async fn upload_once(&self, image: &RawImage) -> Result<String, UploadError> {
        let bytes = encode_for_upload(self.backend.as_ref(), image, self.settings.upload_quality)?;
        let key = destination_key(&self.settings.key_prefix, Uuid::new_v4(), image.name());
        info!(%key, bytes = bytes.len(), "uploading image");
        self.client.upload(bytes, &key).await
    }

    async fn run_upload(self: Arc<Self>, image: Arc<RawImage>) -> Settlement {
        let attempt = AssertUnwindSafe(self.upload_once(&image))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(UploadError::Other("upload task panicked".into())));
        let settlement = match attempt {
            Ok(url) => {
                info!(%url, "upload succeeded");
                self.apply(&UploadOutcome::Success { url: url.clone() });
                Settlement::Uploaded { url }
            }
            Err(cause) => {
                let kind = classify(&cause);
                warn!(error = %cause, ?kind, "upload failed");
                self.apply(&UploadOutcome::Error { kind, cause });
                Settlement::Failed { kind }
            }
        };
        self.apply(&UploadOutcome::Loading(false));
        settlement
    }
}

/// The most recent upload task.
///
/// `abort` outlives `task`: `wait_idle` takes the join handle, but the
/// upload must stay cancellable if that wait is abandoned.
#[derive(Default)]
struct UploadSlot {
    task: Option<JoinHandle<Settlement>>,
    abort: Option<AbortHandle>,
}

/// Orchestrates image selection and uploads for one session.
pub struct PipelineController {
    shared: Arc<Shared>,
    upload: Mutex<UploadSlot>,
}

impl PipelineController {
    /// Create a controller in the initial state `(no image, not loading, no error)`.
    ///
    /// When `transitions` is given, every published snapshot is also sent
    /// there, in order.
    pub fn new(
        client: Arc<dyn UploadClient>,
        backend: Arc<dyn ImageBackend>,
        settings: PipelineSettings,
        transitions: Option<Sender<PipelineState>>,
    ) -> Self {
        let (state, _) = watch::channel(PipelineState::default());
        Self {
            shared: Arc::new(Shared {
                state,
                transitions,
                client,
                backend,
                settings,
                in_flight: AtomicBool::new(false),
                closed: AtomicBool::new(false),
            }),
            upload: Mutex::new(UploadSlot::default()),
        }
    }

    /// Handle one user intent.
    ///
    /// Returns `true` if the event changed anything. Must be called from
    /// within a Tokio runtime: an accepted upload request spawns a task.
    pub fn handle(&self, event: Event) -> bool {
        if self.shared.closed.load(Ordering::Acquire) {
            debug!("controller closed, event dropped");
            return false;
        }
        match event {
            Event::ImageSelected(image) => {
                let image = Arc::new(image);
                debug!(
                    width = image.dimensions().width,
                    height = image.dimensions().height,
                    name = image.name(),
                    "image selected"
                );
                self.shared.publish(|current| current.with_image(image));
                true
            }
            Event::UploadRequested => self.start_upload(),
        }
    }

    fn start_upload(&self) -> bool {
        let Some(image) = self.shared.state.borrow().image.clone() else {
            debug!("upload requested with no image selected, ignoring");
            return false;
        };
        if self
            .shared
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("upload already in flight, ignoring request");
            return false;
        }

        self.shared.apply(&UploadOutcome::Loading(true));
        let task = tokio::spawn(Arc::clone(&self.shared).run_upload(image));
        let mut slot = self.upload.lock().unwrap_or_else(|e| e.into_inner());
        slot.abort = Some(task.abort_handle());
        slot.task = Some(task);
        true
    }

    /// Current snapshot.
    pub fn state(&self) -> PipelineState {
        self.shared.state.borrow().clone()
    }

    /// Latest-value subscription; the receiver starts at the current snapshot.
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.shared.state.subscribe()
    }

    pub fn is_uploading(&self) -> bool {
        self.shared.in_flight.load(Ordering::Acquire)
    }

    /// Wait for the most recent upload to settle.
    ///
    /// Returns `None` if no upload was started since the last call, or if
    /// it was cancelled.
    pub async fn wait_idle(&self) -> Option<Settlement> {
        let task = self
            .upload
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .task
            .take()?;
        match task.await {
            Ok(settlement) => Some(settlement),
            Err(e) if e.is_panic() => Some(Settlement::Failed {
                kind: ErrorKind::UnknownError,
            }),
            Err(_) => None,
        }
    }

    /// Close the controller: abort any in-flight upload, stop publishing.
    pub fn shutdown(&self) {
        if !self.shared.close() {
            return;
        }
        let abort = self
            .upload
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .abort
            .take();
        if let Some(abort) = abort {
            if !abort.is_finished() {
                info!("session ended with upload in flight, cancelling");
            }
            abort.abort();
        }
    }
}

impl Drop for PipelineController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
