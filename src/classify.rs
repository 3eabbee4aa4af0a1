//! Fault classification.
//!
//! [`classify`] maps any error into one of six [`ErrorKind`]s. It walks the
//! `source()` chain and stops at the first error it recognizes, so a
//! `reqwest` timeout wrapped in an application error still classifies as a
//! timeout. Anything unrecognized is [`ErrorKind::UnknownError`].
//!
//! | Cause | Kind |
//! |---|---|
//! | HTTP status 400–499 | `ClientError` |
//! | HTTP status 500–599 | `ServerError` |
//! | any other non-success status, redirect loops | `HttpError` |
//! | connect/DNS failure, reset, broken pipe | `NetworkError` |
//! | request or I/O timeout | `TimeoutError` |
//! | everything else | `UnknownError` |

use crate::imaging::BackendError;
use crate::upload::UploadError;
use serde::Serialize;
use std::error::Error;
use std::io;

/// Longest source chain inspected before giving up. Also bounds how deep
/// custom `io::Error` payloads are unwrapped at each link.
const MAX_CHAIN_DEPTH: usize = 32;

/// Closed set of failure categories surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ClientError,
    ServerError,
    HttpError,
    NetworkError,
    TimeoutError,
    UnknownError,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 6] = [
        ErrorKind::ClientError,
        ErrorKind::ServerError,
        ErrorKind::HttpError,
        ErrorKind::NetworkError,
        ErrorKind::TimeoutError,
        ErrorKind::UnknownError,
    ];

    /// Stable lookup key for localized message catalogs.
    pub fn message_key(self) -> &'static str {
        match self {
            ErrorKind::ClientError => "error_client",
            ErrorKind::ServerError => "error_server",
            ErrorKind::HttpError => "error_http",
            ErrorKind::NetworkError => "no_internet",
            ErrorKind::TimeoutError => "error_timeout",
            ErrorKind::UnknownError => "unexpected_error",
        }
    }

    /// Kind for a non-success HTTP status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            400..=499 => ErrorKind::ClientError,
            500..=599 => ErrorKind::ServerError,
            _ => ErrorKind::HttpError,
        }
    }
}

/// Classify a fault. Total: never panics, unknown causes map to `UnknownError`.
pub fn classify(cause: &(dyn Error + 'static)) -> ErrorKind {
    let mut current = Some(cause);
    for budget in (0..MAX_CHAIN_DEPTH).rev() {
        let Some(err) = current else { break };
        if let Some(kind) = classify_one(err, budget) {
            return kind;
        }
        current = err.source();
    }
    ErrorKind::UnknownError
}

/// Classify a single error. `budget` is how many nested io payloads may
/// still be unwrapped below this one.
fn classify_one(err: &(dyn Error + 'static), budget: usize) -> Option<ErrorKind> {
    if let Some(e) = err.downcast_ref::<UploadError>() {
        return classify_upload(e, budget);
    }
    if let Some(e) = err.downcast_ref::<reqwest::Error>() {
        return classify_reqwest(e);
    }
    if let Some(e) = err.downcast_ref::<io::Error>() {
        return classify_io(e, budget);
    }
    if err.downcast_ref::<BackendError>().is_some() {
        return Some(ErrorKind::UnknownError);
    }
    None
}

fn classify_upload(err: &UploadError, budget: usize) -> Option<ErrorKind> {
    match err {
        UploadError::Status(status) => Some(ErrorKind::from_status(*status)),
        UploadError::Timeout => Some(ErrorKind::TimeoutError),
        UploadError::Network(_) => Some(ErrorKind::NetworkError),
        UploadError::Encode(_) => Some(ErrorKind::UnknownError),
        UploadError::Http(e) => classify_reqwest(e),
        UploadError::Io(e) => classify_io(e, budget),
        UploadError::Other(_) => None,
    }
}

fn classify_reqwest(err: &reqwest::Error) -> Option<ErrorKind> {
    if err.is_timeout() {
        return Some(ErrorKind::TimeoutError);
    }
    if err.is_connect() {
        return Some(ErrorKind::NetworkError);
    }
    if let Some(status) = err.status() {
        return Some(ErrorKind::from_status(status.as_u16()));
    }
    if err.is_redirect() {
        return Some(ErrorKind::HttpError);
    }
    // Body/request errors usually wrap a transport error further down.
    None
}

fn classify_io(err: &io::Error, budget: usize) -> Option<ErrorKind> {
    use io::ErrorKind as Io;
    match err.kind() {
        Io::TimedOut => Some(ErrorKind::TimeoutError),
        Io::ConnectionRefused
        | Io::ConnectionReset
        | Io::ConnectionAborted
        | Io::NotConnected
        | Io::AddrInUse
        | Io::AddrNotAvailable
        | Io::BrokenPipe
        | Io::UnexpectedEof
        | Io::HostUnreachable
        | Io::NetworkUnreachable
        | Io::NetworkDown => Some(ErrorKind::NetworkError),
        // Custom io errors keep their payload out of `source()`.
        _ if budget > 0 => err
            .get_ref()
            .and_then(|inner| classify_one(inner, budget - 1)),
        _ => None,
    }
}
