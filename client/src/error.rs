//! Error type for the liuyao API client.
//!
//! # Design
//! A single enum covers every way a call can fail: the transport itself,
//! the response body not being JSON, a non-2xx status, or an unserializable
//! payload. `Display` yields the human-readable message callers show to
//! users — for `HttpError` that is the server-supplied `error` text verbatim
//! (or the generic `request failed: <status>` fallback), with the status
//! code still available structurally.

use std::fmt;

/// Errors returned by [`LiuyaoClient`](crate::LiuyaoClient) and
/// [`Api`](crate::Api) operations.
#[derive(Debug)]
pub enum ApiError {
    /// The transport failed before an HTTP response was produced
    /// (DNS, connection refused, timeout, interrupted body read).
    TransportError(String),

    /// The server answered with a non-2xx status. `message` is the response
    /// body's `error` field when present, otherwise `request failed: <status>`.
    HttpError { status: u16, message: String },

    /// The response body could not be parsed as JSON.
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    SerializationError(String),
}

impl ApiError {
    /// The HTTP status code, for errors that carry one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::TransportError(msg) => write!(f, "{msg}"),
            ApiError::HttpError { message, .. } => write!(f, "{message}"),
            ApiError::DeserializationError(msg) => {
                write!(f, "deserialization failed: {msg}")
            }
            ApiError::SerializationError(msg) => {
                write!(f, "serialization failed: {msg}")
            }
        }
    }
}

impl std::error::Error for ApiError {}
