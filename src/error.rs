//! Error types and the [`Error`] trait.
//!
//! All errors in this library implement the [`Error`] trait, which extends
//! [`std::error::Error`] with retry semantics. [`BoxedError`] provides
//! type-erased error handling while preserving retryability. [`HttpError`]
//! is the failure reported for a response with a non-success status.

use std::convert::Infallible;

use http::StatusCode;
use snafu::{AsErrorSource, Snafu};

use crate::platform::MaybeSendSync;

/// Errors that may occur in the library.
pub trait Error: std::error::Error + AsErrorSource + MaybeSendSync + 'static {
    /// If true, this indicates that a failed request may succeed if retried.
    fn is_retryable(&self) -> bool;
}

impl Error for Infallible {
    fn is_retryable(&self) -> bool {
        false
    }
}

/// A boxed error that can be used without type parameters.
#[derive(Debug, Snafu)]
#[snafu(transparent)]
pub struct BoxedError {
    source: Box<dyn Error>,
}

impl BoxedError {
    /// Create a new boxed error from a generic `Error`.
    pub fn from_err<E: Error + 'static>(err: E) -> Self {
        Self {
            source: Box::new(err),
        }
    }
}

impl Error for BoxedError {
    fn is_retryable(&self) -> bool {
        self.source.is_retryable()
    }
}

/// The error reported when a response carries a non-success HTTP status.
///
/// Raised before any of the response body is read. The display form is
/// `"{status} {status_text}"`, e.g. `404 Not Found`.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(display("{} {status_text}", status.as_u16()))]
pub struct HttpError {
    /// The HTTP status code of the response.
    pub status: StatusCode,
    /// The status text accompanying the status code.
    pub status_text: String,
}

impl HttpError {
    /// Creates an `HttpError` from a status code and status text.
    #[must_use]
    pub fn new(status: StatusCode, status_text: impl Into<String>) -> Self {
        HttpSnafu {
            status,
            status_text: status_text.into(),
        }
        .build()
    }

    /// Creates an `HttpError` from a status code, using its canonical reason
    /// as the status text.
    #[must_use]
    pub fn from_status(status: StatusCode) -> Self {
        Self {
            status,
            status_text: status.canonical_reason().unwrap_or_default().to_owned(),
        }
    }
}

impl Error for HttpError {
    fn is_retryable(&self) -> bool {
        self.status.is_server_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_message_is_status_then_text() {
        let err = HttpError::from_status(StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "404 Not Found");
        assert_eq!(err, HttpError::new(StatusCode::NOT_FOUND, "Not Found"));
    }

    #[test]
    fn only_server_errors_are_retryable() {
        assert!(HttpError::from_status(StatusCode::INTERNAL_SERVER_ERROR).is_retryable());
        assert!(!HttpError::from_status(StatusCode::BAD_REQUEST).is_retryable());
    }
}
