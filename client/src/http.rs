//! HTTP types describing requests and responses as plain data.
//!
//! # Design
//! The core of the crate builds `HttpRequest` values and parses
//! `HttpResponse` values without touching the network. Execution lives
//! behind the [`Transport`](crate::transport::Transport) seam, so everything
//! here is deterministic and easy to test. All fields use owned types so
//! values can be captured and replayed freely by test doubles.

/// HTTP method for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Whether a request with this method may carry a body.
    ///
    /// Only POST, PUT, and PATCH requests are ever given a body; GET and
    /// DELETE drop any payload they are handed.
    pub fn allows_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

/// An HTTP request described as plain data.
///
/// Built by [`LiuyaoClient`](crate::LiuyaoClient) `build_*` methods and
/// executed by a [`Transport`](crate::transport::Transport) implementation.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Full target URL (base URL plus endpoint suffix).
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
///
/// Produced by a transport after executing an `HttpRequest`, then handed to
/// [`LiuyaoClient::parse_response`](crate::LiuyaoClient::parse_response).
/// Response headers are never consumed by this client and are not carried.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}
