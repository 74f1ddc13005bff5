//! Upstream analyzer abstraction and implementations.
//!
//! The service never talks to a model API directly; requests go through an
//! analysis relay that owns the prompt and the model selection. The trait
//! keeps the transport swappable (relay in production, mock in tests).

pub mod mock;
pub mod relay;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Error type for upstream operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Upstream not configured: {0}")]
    NotConfigured(String),

    #[error("Upstream API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// What the relay answered. The body is kept as raw JSON; shaping it into
/// the response contract is the normalizer's job, not the transport's.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    /// HTTP-level success of the relay call.
    pub status_ok: bool,
    pub status: u16,
    /// Parsed body; an unparseable body is replaced by a
    /// `BAD_PROXY_RESPONSE` error object carrying the raw text.
    pub data: Value,
    /// Raw body text, kept for error messages.
    pub raw_text: String,
    pub proxy_version: Option<String>,
    pub model: Option<String>,
    pub build_id: Option<String>,
}

/// Result of probing the relay's own ping endpoint.
#[derive(Debug, Clone)]
pub struct UpstreamPing {
    pub url: String,
    pub status: u16,
    pub body: Value,
}

/// Transport to the analysis relay.
#[async_trait]
pub trait UpstreamAnalyzer: Send + Sync {
    /// Forward an analyze request body and return the relay's reply.
    async fn analyze(&self, body: &Value) -> Result<UpstreamReply, ProviderError>;

    /// Probe the relay's health endpoint.
    async fn ping(&self) -> Result<UpstreamPing, ProviderError>;
}
