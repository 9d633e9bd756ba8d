//! Error and Result types.
use crate::content_range::ContentRangeError;
use http::{Method, StatusCode};
use std::io;
use thiserror::Error;

/// Boxed error of an underlying transport.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("invalid HTTP method `{0}`")]
    InvalidMethod(Method),
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] http::Error),
    #[error("http request: {0}")]
    Transport(#[source] BoxError),
    #[error("http status {0}")]
    HttpStatus(StatusCode),
    #[error("no content-range header in partial response")]
    MissingContentRange,
    #[error("http request: {0}")]
    ContentRange(#[from] ContentRangeError),
    #[error("invalid `{0}` header")]
    InvalidHeader(&'static str),
    #[error(
        "received different range than requested (req={req_first}-{req_last}, resp={first}-{last})"
    )]
    RangeMismatch {
        req_first: u64,
        req_last: u64,
        first: u64,
        last: u64,
    },
    #[error("content-length mismatch in http response (expected {expected}, got {actual:?})")]
    ContentLengthMismatch { expected: u64, actual: Option<u64> },
    #[error("validation failed")]
    ValidationFailed,
    #[error("server does not support range requests")]
    NoRangeSupport,
    #[error("server suddenly stopped supporting range requests")]
    RangeSupportLost,
    #[error("store size limit of {limit} bytes reached")]
    StoreLimitExceeded { limit: u64 },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Coarse classification of [`HttpError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid prototype request
    Construction,
    /// Network or I/O failure
    Transport,
    /// Malformed or inconsistent response
    Protocol,
    /// The resource changed since the probe
    ValidationFailed,
    /// Server ignores Range requests
    RangeUnsupported,
    StoreLimitExceeded,
}

impl HttpError {
    /// Classify the error, e.g. to decide whether a retry makes sense.
    pub fn kind(&self) -> ErrorKind {
        use HttpError::*;
        match self {
            InvalidMethod(_) | InvalidRequest(_) => ErrorKind::Construction,
            Transport(_) | Io(_) => ErrorKind::Transport,
            HttpStatus(_)
            | MissingContentRange
            | ContentRange(_)
            | InvalidHeader(_)
            | RangeMismatch { .. }
            | ContentLengthMismatch { .. } => ErrorKind::Protocol,
            ValidationFailed => ErrorKind::ValidationFailed,
            NoRangeSupport | RangeSupportLost => ErrorKind::RangeUnsupported,
            StoreLimitExceeded { .. } => ErrorKind::StoreLimitExceeded,
        }
    }

    pub(crate) fn transport<E: Into<BoxError>>(error: E) -> Self {
        HttpError::Transport(error.into())
    }
}

impl From<HttpError> for io::Error {
    fn from(error: HttpError) -> Self {
        match error {
            HttpError::Io(e) => e,
            e => io::Error::new(io::ErrorKind::Other, e),
        }
    }
}

pub type Result<T> = std::result::Result<T, HttpError>;
