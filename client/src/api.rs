//! Executing front door for the liuyao API.
//!
//! # Design
//! `Api` glues the stateless `LiuyaoClient` to a `Transport`: each call
//! builds a request, executes it, and parses the reply envelope. Failures on
//! the wire or in the reply are logged against the endpoint before being
//! propagated, so callers can surface the error message directly while the
//! log keeps the context. Payload serialization failures happen before any
//! request exists and are returned without logging.

use serde::Serialize;
use serde_json::Value;

use crate::client::LiuyaoClient;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::transport::{Transport, UreqTransport};

/// Backend address used when `LIUYAO_BASE_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

const BASE_URL_ENV: &str = "LIUYAO_BASE_URL";

/// Executing client for the liuyao API.
///
/// Generic over the transport so tests can swap the network for a fake; the
/// default is the blocking `UreqTransport`.
pub struct Api<T: Transport = UreqTransport> {
    client: LiuyaoClient,
    transport: T,
}

impl Api<UreqTransport> {
    pub fn new(base_url: &str) -> Self {
        Self::with_transport(base_url, UreqTransport::new())
    }

    /// Creates a client from `LIUYAO_BASE_URL`, falling back to
    /// [`DEFAULT_BASE_URL`].
    pub fn from_env() -> Self {
        let base_url =
            std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(&base_url)
    }
}

impl<T: Transport> Api<T> {
    pub fn with_transport(base_url: &str, transport: T) -> Self {
        Self {
            client: LiuyaoClient::new(base_url),
            transport,
        }
    }

    /// Sends a request to an arbitrary endpoint and returns the parsed
    /// envelope.
    ///
    /// `payload` is attached as a JSON body for methods that carry one;
    /// `extra_headers` are merged over the default `Content-Type`.
    pub fn request<P: Serialize>(
        &self,
        endpoint: &str,
        method: HttpMethod,
        payload: Option<&P>,
        extra_headers: &[(&str, &str)],
    ) -> Result<Value, ApiError> {
        let request = self
            .client
            .build_request(endpoint, method, payload, extra_headers)?;
        self.dispatch(endpoint, &request)
    }

    pub fn get(&self, endpoint: &str) -> Result<Value, ApiError> {
        self.request(endpoint, HttpMethod::Get, None::<&Value>, &[])
    }

    pub fn post<P: Serialize>(&self, endpoint: &str, payload: &P) -> Result<Value, ApiError> {
        self.request(endpoint, HttpMethod::Post, Some(payload), &[])
    }

    pub fn put<P: Serialize>(&self, endpoint: &str, payload: &P) -> Result<Value, ApiError> {
        self.request(endpoint, HttpMethod::Put, Some(payload), &[])
    }

    pub fn delete(&self, endpoint: &str) -> Result<Value, ApiError> {
        self.request(endpoint, HttpMethod::Delete, None::<&Value>, &[])
    }

    pub fn analyze<P: Serialize>(&self, data: &P) -> Result<Value, ApiError> {
        let request = self.client.build_analyze(data)?;
        self.dispatch("/analyze", &request)
    }

    pub fn chat<P: Serialize>(&self, data: &P) -> Result<Value, ApiError> {
        let request = self.client.build_chat(data)?;
        self.dispatch("/chat", &request)
    }

    pub fn history(&self) -> Result<Value, ApiError> {
        self.dispatch("/history", &self.client.build_history())
    }

    pub fn delete_history(&self, record_id: &str) -> Result<Value, ApiError> {
        let request = self.client.build_delete_history(record_id);
        self.dispatch(&format!("/history/{record_id}"), &request)
    }

    pub fn health(&self) -> Result<Value, ApiError> {
        self.dispatch("/health", &self.client.build_health())
    }

    pub fn models(&self) -> Result<Value, ApiError> {
        self.dispatch("/models", &self.client.build_models())
    }

    pub fn fetch_models<P: Serialize>(&self, data: &P) -> Result<Value, ApiError> {
        let request = self.client.build_fetch_models(data)?;
        self.dispatch("/settings/fetch-models", &request)
    }

    pub fn add_model<P: Serialize>(&self, data: &P) -> Result<Value, ApiError> {
        let request = self.client.build_add_model(data)?;
        self.dispatch("/settings/models", &request)
    }

    pub fn custom_models(&self) -> Result<Value, ApiError> {
        self.dispatch("/settings/models", &self.client.build_custom_models())
    }

    pub fn delete_model(&self, model_id: u32) -> Result<Value, ApiError> {
        let request = self.client.build_delete_model(model_id);
        self.dispatch(&format!("/settings/models/{model_id}"), &request)
    }

    fn dispatch(&self, endpoint: &str, request: &HttpRequest) -> Result<Value, ApiError> {
        let outcome = self
            .transport
            .execute(request)
            .and_then(|response| self.client.parse_response(response));
        if let Err(error) = &outcome {
            tracing::error!("api request error ({}): {}", endpoint, error);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpResponse;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    const BASE_URL: &str = "http://localhost:5000/api";

    type Seen = Arc<Mutex<Vec<HttpRequest>>>;

    /// Transport that records every request and answers with a canned
    /// response.
    struct FakeTransport {
        status: u16,
        body: String,
        seen: Seen,
    }

    impl Transport for FakeTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(HttpResponse {
                status: self.status,
                body: self.body.clone(),
            })
        }
    }

    struct FailingTransport;

    impl Transport for FailingTransport {
        fn execute(&self, _request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            Err(ApiError::TransportError("connection refused".to_string()))
        }
    }

    fn api_with(status: u16, body: &str) -> (Api<FakeTransport>, Seen) {
        let seen: Seen = Arc::default();
        let transport = FakeTransport {
            status,
            body: body.to_string(),
            seen: Arc::clone(&seen),
        };
        (Api::with_transport(BASE_URL, transport), seen)
    }

    fn last(seen: &Seen) -> HttpRequest {
        seen.lock().unwrap().last().cloned().expect("no request sent")
    }

    #[test]
    fn get_resolves_with_parsed_envelope() {
        let (api, seen) = api_with(200, r#"{"status": "ok"}"#);
        let value = api.get("/health").unwrap();
        assert_eq!(value, json!({"status": "ok"}));

        let request = last(&seen);
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url, format!("{BASE_URL}/health"));
        assert!(request.body.is_none());
    }

    #[test]
    fn post_sends_serialized_payload() {
        let (api, seen) = api_with(200, r#"{"success": true}"#);
        let payload = json!({"question": "will it rain", "hexagram_info": "info"});
        api.post("/analyze", &payload).unwrap();

        let request = last(&seen);
        assert_eq!(request.method, HttpMethod::Post);
        let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, payload);
    }

    #[test]
    fn put_sends_serialized_payload() {
        let (api, seen) = api_with(200, r#"{"success": true}"#);
        let payload = json!({"name": "renamed-model", "description": "updated"});
        api.put("/settings/models/1", &payload).unwrap();

        let request = last(&seen);
        assert_eq!(request.method, HttpMethod::Put);
        assert_eq!(request.url, format!("{BASE_URL}/settings/models/1"));
        let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, payload);
    }

    #[test]
    fn request_passes_extra_headers_through() {
        let (api, seen) = api_with(200, r#"{"ok": true}"#);
        api.request(
            "/analyze",
            HttpMethod::Post,
            Some(&json!({})),
            &[("Authorization", "Bearer token")],
        )
        .unwrap();

        let request = last(&seen);
        assert!(request
            .headers
            .iter()
            .any(|(n, v)| n == "Authorization" && v == "Bearer token"));
        assert!(request
            .headers
            .iter()
            .any(|(n, v)| n == "Content-Type" && v == "application/json"));
    }

    #[test]
    fn analyze_targets_analyze_endpoint() {
        let (api, seen) = api_with(200, r#"{"success": true, "record_id": "abc"}"#);
        let value = api.analyze(&json!({"question": "q", "hexagram_info": "h"})).unwrap();
        assert_eq!(value["record_id"], "abc");
        assert_eq!(last(&seen).url, format!("{BASE_URL}/analyze"));
    }

    #[test]
    fn delete_history_interpolates_record_id() {
        let (api, seen) = api_with(200, r#"{"success": true}"#);
        api.delete_history("42").unwrap();

        let request = last(&seen);
        assert_eq!(request.method, HttpMethod::Delete);
        assert_eq!(request.url, format!("{BASE_URL}/history/42"));
    }

    #[test]
    fn delete_model_interpolates_model_id() {
        let (api, seen) = api_with(200, r#"{"success": true}"#);
        api.delete_model(3).unwrap();
        assert_eq!(last(&seen).url, format!("{BASE_URL}/settings/models/3"));
    }

    #[test]
    fn failed_status_surfaces_error_field() {
        let (api, _) = api_with(404, r#"{"error": "record not found"}"#);
        let error = api.delete_history("42").unwrap_err();
        assert_eq!(error.to_string(), "record not found");
        assert_eq!(error.status(), Some(404));
    }

    #[test]
    fn failed_status_without_error_field_uses_fallback() {
        let (api, _) = api_with(500, r#"{}"#);
        let error = api.get("/health").unwrap_err();
        assert_eq!(error.to_string(), "request failed: 500");
    }

    #[test]
    fn transport_failure_propagates() {
        let api = Api::with_transport(BASE_URL, FailingTransport);
        let error = api.get("/health").unwrap_err();
        assert!(matches!(error, ApiError::TransportError(_)));
        assert_eq!(error.to_string(), "connection refused");
    }

    #[test]
    fn serialization_failure_skips_the_transport() {
        let (api, seen) = api_with(200, r#"{"ok": true}"#);

        // Maps with non-string keys cannot be serialized to JSON.
        let mut payload = BTreeMap::new();
        payload.insert((1u8, 2u8), "value");

        let error = api.post("/analyze", &payload).unwrap_err();
        assert!(matches!(error, ApiError::SerializationError(_)));
        assert!(seen.lock().unwrap().is_empty());
    }
}
