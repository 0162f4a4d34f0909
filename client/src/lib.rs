//! HTTP client for the liuyao divination backend.
//!
//! # Overview
//! Wraps the backend's JSON API behind two layers. `LiuyaoClient` builds
//! `HttpRequest` values and parses `HttpResponse` values without touching the
//! network, so request construction and envelope handling stay deterministic
//! and testable. `Api` pairs that client with a `Transport` to execute the
//! round-trip, with a blocking ureq transport as the default.
//!
//! # Design
//! - `LiuyaoClient` is stateless — it holds only `base_url`.
//! - Every request carries `Content-Type: application/json`; callers merge
//!   extra headers on top, overriding by case-insensitive name.
//! - Bodies are attached only for methods that carry one (POST, PUT, PATCH).
//! - Responses are decoded as JSON before the status is checked; non-2xx
//!   replies surface their `error` field as the error message.
//! - Payloads and replies are untyped `serde_json::Value`s. The backend's
//!   envelopes vary per endpoint, so callers pick the fields they need;
//!   integration tests against the mock server catch schema drift.

pub mod api;
pub mod client;
pub mod error;
pub mod http;
pub mod transport;

pub use api::{Api, DEFAULT_BASE_URL};
pub use client::LiuyaoClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
