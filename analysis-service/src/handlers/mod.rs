//! HTTP handlers.

pub mod analyze;
pub mod failure;
pub mod probes;

use axum::Json;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::contract::SCHEMA_VERSION;

/// Version headers echoed from the relay on analyze responses.
#[derive(Debug, Clone)]
pub struct RelayHeaders {
    pub proxy_version: String,
    pub model: String,
    pub build_id: String,
}

impl Default for RelayHeaders {
    fn default() -> Self {
        Self {
            proxy_version: "unknown".to_string(),
            model: "unknown".to_string(),
            build_id: "unknown".to_string(),
        }
    }
}

fn header_value(value: &str) -> HeaderValue {
    HeaderValue::from_str(value).unwrap_or_else(|_| HeaderValue::from_static("unknown"))
}

/// JSON response stamped with the worker version and schema version headers.
pub(crate) fn versioned_json<T: Serialize>(
    status: StatusCode,
    body: T,
    worker_version: &str,
) -> Response {
    let mut response = (status, Json(body)).into_response();
    let headers = response.headers_mut();
    headers.insert("x-worker-version", header_value(worker_version));
    headers.insert("schema_version", header_value(&SCHEMA_VERSION.to_string()));
    response
}

/// Analyze response: versioned JSON plus the relay's version headers.
pub(crate) fn analyze_response<T: Serialize>(
    status: StatusCode,
    body: T,
    worker_version: &str,
    relay: &RelayHeaders,
) -> Response {
    let mut response = versioned_json(status, body, worker_version);
    let headers = response.headers_mut();
    headers.insert("x-proxy-version", header_value(&relay.proxy_version));
    headers.insert("x-openai-model", header_value(&relay.model));
    headers.insert("x-build-id", header_value(&relay.build_id));
    response
}
