//! Stateless HTTP request builder and response parser for the liuyao API.
//!
//! # Design
//! `LiuyaoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each endpoint is covered by a `build_*` method that produces an
//! `HttpRequest`, and every response is consumed by `parse_response`, which
//! decodes the JSON envelope and maps non-2xx statuses to errors. The caller
//! executes the actual HTTP round-trip between the two, keeping this module
//! deterministic and free of I/O dependencies.

use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

const CONTENT_TYPE: &str = "Content-Type";
const JSON_MIME: &str = "application/json";

/// Synchronous, stateless client for the liuyao API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network. The backend wraps every reply in a JSON envelope;
/// successful replies come back as raw `Value`s so callers decide how much
/// structure to impose, and failed replies carry their `error` field out
/// through `ApiError`.
#[derive(Debug, Clone)]
pub struct LiuyaoClient {
    base_url: String,
}

impl LiuyaoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Builds a request for an arbitrary endpoint.
    ///
    /// `payload` is serialized to JSON and attached as the body, but only for
    /// methods that carry one (POST, PUT, PATCH); for other methods it is
    /// ignored. Every request starts with `Content-Type: application/json`,
    /// and `extra_headers` are merged on top with case-insensitive name
    /// matching, so callers can override the content type or add their own
    /// headers.
    pub fn build_request<P: Serialize>(
        &self,
        endpoint: &str,
        method: HttpMethod,
        payload: Option<&P>,
        extra_headers: &[(&str, &str)],
    ) -> Result<HttpRequest, ApiError> {
        let body = match payload {
            Some(payload) if method.allows_body() => Some(
                serde_json::to_string(payload)
                    .map_err(|e| ApiError::SerializationError(e.to_string()))?,
            ),
            _ => None,
        };
        Ok(self.assemble(endpoint, method, body, extra_headers))
    }

    pub fn build_analyze<P: Serialize>(&self, data: &P) -> Result<HttpRequest, ApiError> {
        self.build_request("/analyze", HttpMethod::Post, Some(data), &[])
    }

    pub fn build_chat<P: Serialize>(&self, data: &P) -> Result<HttpRequest, ApiError> {
        self.build_request("/chat", HttpMethod::Post, Some(data), &[])
    }

    pub fn build_history(&self) -> HttpRequest {
        self.assemble("/history", HttpMethod::Get, None, &[])
    }

    pub fn build_delete_history(&self, record_id: &str) -> HttpRequest {
        self.assemble(
            &format!("/history/{record_id}"),
            HttpMethod::Delete,
            None,
            &[],
        )
    }

    pub fn build_health(&self) -> HttpRequest {
        self.assemble("/health", HttpMethod::Get, None, &[])
    }

    pub fn build_models(&self) -> HttpRequest {
        self.assemble("/models", HttpMethod::Get, None, &[])
    }

    pub fn build_fetch_models<P: Serialize>(&self, data: &P) -> Result<HttpRequest, ApiError> {
        self.build_request("/settings/fetch-models", HttpMethod::Post, Some(data), &[])
    }

    pub fn build_add_model<P: Serialize>(&self, data: &P) -> Result<HttpRequest, ApiError> {
        self.build_request("/settings/models", HttpMethod::Post, Some(data), &[])
    }

    pub fn build_custom_models(&self) -> HttpRequest {
        self.assemble("/settings/models", HttpMethod::Get, None, &[])
    }

    pub fn build_delete_model(&self, model_id: u32) -> HttpRequest {
        self.assemble(
            &format!("/settings/models/{model_id}"),
            HttpMethod::Delete,
            None,
            &[],
        )
    }

    /// Decodes a response envelope, turning non-2xx statuses into errors.
    ///
    /// The body is decoded before the status is checked, so a non-JSON error
    /// page surfaces as a deserialization failure rather than an HTTP error.
    /// For a failed status the message is taken from the envelope's `error`
    /// field when it is a non-empty string, with `request failed: <status>`
    /// as the fallback.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Value, ApiError> {
        let envelope: Value = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))?;

        if !(200..300).contains(&response.status) {
            let message = envelope
                .get("error")
                .and_then(Value::as_str)
                .filter(|text| !text.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("request failed: {}", response.status));
            return Err(ApiError::HttpError {
                status: response.status,
                message,
            });
        }

        Ok(envelope)
    }

    fn assemble(
        &self,
        endpoint: &str,
        method: HttpMethod,
        body: Option<String>,
        extra_headers: &[(&str, &str)],
    ) -> HttpRequest {
        let mut headers = vec![(CONTENT_TYPE.to_string(), JSON_MIME.to_string())];
        for (name, value) in extra_headers {
            match headers.iter().position(|(n, _)| n.eq_ignore_ascii_case(name)) {
                Some(i) => headers[i] = (name.to_string(), value.to_string()),
                None => headers.push((name.to_string(), value.to_string())),
            }
        }

        HttpRequest {
            method,
            url: format!("{}{}", self.base_url, endpoint),
            headers,
            body,
        }
    }
}
