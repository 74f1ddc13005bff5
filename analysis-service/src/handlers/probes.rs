//! Liveness and relay-reachability probes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use serde_json::json;

use super::versioned_json;
use crate::contract::SCHEMA_VERSION;
use crate::startup::AppState;

pub async fn ping(State(state): State<AppState>) -> Response {
    let worker_version = &state.config.worker.version;
    versioned_json(
        StatusCode::OK,
        json!({
            "ok": true,
            "schema_version": SCHEMA_VERSION,
            "worker_version": worker_version,
        }),
        worker_version,
    )
}

pub async fn version(State(state): State<AppState>) -> Response {
    let worker_version = &state.config.worker.version;
    versioned_json(
        StatusCode::OK,
        json!({
            "ok": true,
            "version": worker_version,
            "worker_version": worker_version,
            "schema_version": SCHEMA_VERSION,
        }),
        worker_version,
    )
}

/// Probe the relay's ping endpoint and report what it answered. Always 200;
/// a dead relay shows up in `proxy_status`/`proxy_ping`, not as our failure.
pub async fn proxy_ping(State(state): State<AppState>) -> Response {
    let worker_version = state.config.worker.version.clone();
    let base_url = state.config.relay.base_url.trim_end_matches('/').to_string();

    let (ping_url, status, body) = match state.upstream.ping().await {
        Ok(ping) => (ping.url, ping.status, ping.body),
        Err(err) => {
            tracing::warn!(error = %err, "Relay ping failed");
            (
                format!("{}/ping", base_url),
                0,
                json!({ "error": err.to_string() }),
            )
        }
    };

    versioned_json(
        StatusCode::OK,
        json!({
            "ok": true,
            "proxy_base_url": base_url,
            "proxy_ping_url": ping_url,
            "proxy_status": status,
            "proxy_ping": body,
            "worker_version": worker_version,
            "schema_version": SCHEMA_VERSION,
        }),
        &worker_version,
    )
}
