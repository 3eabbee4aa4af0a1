//! Upload boundary.
//!
//! The controller never talks to a store directly; it is handed an
//! [`UploadClient`] at construction. The production implementation is
//! [`HttpUploadClient`], which `PUT`s the bytes to an HTTP object store.
//! Tests inject a scripted client instead.

mod http;

pub use http::HttpUploadClient;

use crate::imaging::BackendError;
use async_trait::async_trait;
use thiserror::Error;

/// Everything that can go wrong between "encode the image" and "got a URL".
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("image encoding failed: {0}")]
    Encode(#[from] BackendError),
    #[error("store responded with HTTP {0}")]
    Status(u16),
    /// The request did not complete within the client's timeout.
    #[error("upload timed out")]
    Timeout,
    /// The store could not be reached (connect, DNS).
    #[error("network error: {0}")]
    Network(String),
    /// Any other transport failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(String),
}

/// A store that accepts bytes under a key and hands back a retrievable URL.
///
/// One call is one attempt; implementations must not retry on their own.
#[async_trait]
pub trait UploadClient: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, key: &str) -> Result<String, UploadError>;
}
