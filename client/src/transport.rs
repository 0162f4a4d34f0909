//! HTTP execution for requests built by `LiuyaoClient`.
//!
//! # Design
//! `Transport` is the seam between the stateless client and the network. The
//! production implementation, `UreqTransport`, executes requests with a
//! blocking ureq agent; tests swap in fakes that return canned responses
//! without opening sockets.

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes an `HttpRequest` and returns the raw `HttpResponse`.
///
/// Implementations report only transport-level failures such as connection
/// errors or truncated bodies. Status interpretation stays with
/// `LiuyaoClient::parse_response`, so 4xx/5xx responses come back as `Ok`.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Blocking `Transport` backed by a ureq agent.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the client
/// handle status interpretation.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let headers = &request.headers;
        let result = match (&request.method, &request.body) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(&request.url), headers).call(),
            (HttpMethod::Delete, _) => {
                with_headers(self.agent.delete(&request.url), headers).call()
            }
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(&request.url), headers).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => {
                with_headers(self.agent.post(&request.url), headers).send_empty()
            }
            (HttpMethod::Put, Some(body)) => {
                with_headers(self.agent.put(&request.url), headers).send(body.as_bytes())
            }
            (HttpMethod::Put, None) => {
                with_headers(self.agent.put(&request.url), headers).send_empty()
            }
            (HttpMethod::Patch, Some(body)) => {
                with_headers(self.agent.patch(&request.url), headers).send(body.as_bytes())
            }
            (HttpMethod::Patch, None) => {
                with_headers(self.agent.patch(&request.url), headers).send_empty()
            }
        };

        let mut response = result.map_err(|e| ApiError::TransportError(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::TransportError(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

/// Apply the request's headers to a ureq builder, whichever body typestate
/// it is in.
fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
