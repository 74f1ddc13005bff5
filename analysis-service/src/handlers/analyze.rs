//! The analyze endpoint: validate the upload, forward to the relay, and
//! normalize whatever comes back into the response contract.
//!
//! Every reply on this route is a fully-shaped normalized result. Client
//! mistakes (bad image) answer 422; relay trouble still answers 200 so the
//! app can render the retry guidance.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::Response;
use serde::Deserialize;
use serde_json::{Value, json};
use validator::{Validate, ValidationError};

use super::{RelayHeaders, analyze_response, failure};
use crate::contract::{self, ContextInput, NormalizeMeta};
use crate::services::image;
use crate::services::providers::UpstreamReply;
use crate::startup::AppState;

#[derive(Debug, Default, Deserialize, Validate)]
pub struct AnalyzeRequest {
    #[serde(default)]
    #[validate(length(min = 10), custom(function = not_placeholder))]
    pub image: String,
    #[serde(default)]
    pub context: Value,
    #[serde(default)]
    pub context_input: Value,
}

fn not_placeholder(image: &str) -> Result<(), ValidationError> {
    if image.trim() == "test" {
        return Err(ValidationError::new("placeholder_image"));
    }
    Ok(())
}

pub async fn analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let worker_version = state.config.worker.version.clone();

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !content_type.contains("application/json") {
        tracing::warn!(content_type, "Rejecting analyze request: not JSON");
        return invalid_image(&worker_version, &ContextInput::default());
    }

    // Body parsing is lenient on purpose; anything malformed reads as an
    // empty request and fails the image validation below.
    let request: AnalyzeRequest = serde_json::from_str(&body).unwrap_or_default();

    let raw_context = if request.context.is_object() {
        request.context.clone()
    } else if request.context_input.is_object() {
        request.context_input.clone()
    } else {
        json!({})
    };
    let context = ContextInput::from_value(&raw_context);

    if request.validate().is_err() {
        tracing::warn!(image_len = request.image.len(), "Rejecting analyze request: invalid image field");
        return invalid_image(&worker_version, &context);
    }
    if !image::meets_minimum_size(&request.image) {
        tracing::warn!("Rejecting analyze request: image undecodable or too small");
        return invalid_image(&worker_version, &context);
    }

    let forward = json!({
        "image": request.image,
        "context": raw_context,
    });

    match state.upstream.analyze(&forward).await {
        Ok(reply) => relay_reply(&worker_version, reply, &context),
        Err(err) => {
            tracing::error!(error = %err, "Relay call failed");
            let candidate =
                failure::proxy_error_candidate(&worker_version, "unknown", "unknown", &err.to_string());
            let meta = NormalizeMeta {
                worker_version: worker_version.clone(),
                proxy_version: None,
                model_used: None,
            };
            let normalized = contract::normalize(&candidate, &meta, &context);
            analyze_response(
                StatusCode::OK,
                normalized,
                &worker_version,
                &RelayHeaders::default(),
            )
        }
    }
}

fn relay_reply(worker_version: &str, reply: UpstreamReply, context: &ContextInput) -> Response {
    let proxy_version = reply
        .proxy_version
        .clone()
        .unwrap_or_else(|| "unknown".to_string());
    let relay_headers = RelayHeaders {
        proxy_version: proxy_version.clone(),
        model: reply.model.clone().unwrap_or_else(|| "unknown".to_string()),
        build_id: reply
            .build_id
            .clone()
            .unwrap_or_else(|| "unknown".to_string()),
    };

    let data = reply.data;
    let model_used = data
        .get("model_used")
        .and_then(Value::as_str)
        .map(|s| s.to_string())
        .or_else(|| reply.model.clone())
        .unwrap_or_else(|| "unknown".to_string());
    let meta = NormalizeMeta {
        worker_version: worker_version.to_string(),
        proxy_version: Some(proxy_version.clone()),
        model_used: Some(model_used.clone()),
    };

    let upstream_failed = !reply.status_ok
        || matches!(data.get("ok"), Some(Value::Bool(false)))
        || data.get("error").is_some_and(|e| !e.is_null());

    let candidate = if upstream_failed {
        // A failure that already speaks the contract (carries an error_code)
        // is normalized as-is; anything else becomes a relay-error result.
        if data.get("error_code").and_then(Value::as_str).is_some() {
            data
        } else {
            let message = if reply.raw_text.is_empty() {
                format!("proxy status {}", reply.status)
            } else {
                reply.raw_text.clone()
            };
            failure::proxy_error_candidate(worker_version, &proxy_version, &model_used, &message)
        }
    } else if matches!(data.get("ok"), Some(Value::Bool(true))) {
        contract::legacy::upgrade(data)
    } else {
        data
    };

    let normalized = contract::normalize(&candidate, &meta, context);
    if !normalized.is_stool_image() {
        tracing::info!(
            confidence = normalized.confidence,
            reason = %normalized.explanation,
            "Image classified as not stool"
        );
    }

    analyze_response(StatusCode::OK, normalized, worker_version, &relay_headers)
}

fn invalid_image(worker_version: &str, context: &ContextInput) -> Response {
    let candidate = failure::invalid_image_candidate(worker_version);
    let meta = NormalizeMeta {
        worker_version: worker_version.to_string(),
        proxy_version: None,
        model_used: None,
    };
    let normalized = contract::normalize(&candidate, &meta, context);
    analyze_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        normalized,
        worker_version,
        &RelayHeaders::default(),
    )
}
