//! HTTP transport to the analysis relay.

use super::{ProviderError, UpstreamAnalyzer, UpstreamPing, UpstreamReply};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

/// Relay-backed analyzer. The relay owns model access; this side only
/// forwards the request body and surfaces version headers.
pub struct RelayAnalyzer {
    base_url: String,
    client: Client,
}

impl RelayAnalyzer {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

fn header_value(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl UpstreamAnalyzer for RelayAnalyzer {
    async fn analyze(&self, body: &Value) -> Result<UpstreamReply, ProviderError> {
        let url = self.endpoint("analyze");

        tracing::debug!(url = %url, "Forwarding analyze request to relay");
        let start = std::time::Instant::now();

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let status = response.status();
        let proxy_version = header_value(&response, "x-proxy-version");
        let model = header_value(&response, "x-openai-model");
        let build_id = header_value(&response, "x-build-id");

        let raw_text = response.text().await.unwrap_or_default();

        tracing::debug!(
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            proxy_version = proxy_version.as_deref().unwrap_or("unknown"),
            model = model.as_deref().unwrap_or("unknown"),
            "Relay replied"
        );
        if !status.is_success() {
            let preview: String = raw_text.chars().take(200).collect();
            tracing::warn!(
                status = status.as_u16(),
                body_preview = %preview,
                "Relay returned an error status"
            );
        }

        let data = serde_json::from_str(&raw_text).unwrap_or_else(|_| {
            json!({
                "ok": false,
                "error": "BAD_PROXY_RESPONSE",
                "message": raw_text,
            })
        });

        Ok(UpstreamReply {
            status_ok: status.is_success(),
            status: status.as_u16(),
            data,
            raw_text,
            proxy_version,
            model,
            build_id,
        })
    }

    async fn ping(&self) -> Result<UpstreamPing, ProviderError> {
        let url = self.endpoint("ping");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or_else(|_| json!({ "raw": text }));

        Ok(UpstreamPing { url, status, body })
    }
}
