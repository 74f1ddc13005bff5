//! Mock analyzer for tests.

use super::{ProviderError, UpstreamAnalyzer, UpstreamPing, UpstreamReply};
use async_trait::async_trait;
use serde_json::{Value, json};

/// Canned-reply analyzer. Tests build one per scenario instead of standing
/// up a relay.
pub struct MockAnalyzer {
    reply: Option<Value>,
    status: u16,
    proxy_version: Option<String>,
    model: Option<String>,
}

impl MockAnalyzer {
    /// Succeeding relay that returns `reply` with version headers set.
    pub fn replying(reply: Value) -> Self {
        Self {
            reply: Some(reply),
            status: 200,
            proxy_version: Some("mock-proxy-1".to_string()),
            model: Some("mock-model".to_string()),
        }
    }

    /// Relay that answers with an HTTP error status and the given body.
    pub fn erroring(status: u16, reply: Value) -> Self {
        Self {
            reply: Some(reply),
            status,
            proxy_version: Some("mock-proxy-1".to_string()),
            model: None,
        }
    }

    /// Relay that is unreachable at the network level.
    pub fn unreachable() -> Self {
        Self {
            reply: None,
            status: 0,
            proxy_version: None,
            model: None,
        }
    }
}

#[async_trait]
impl UpstreamAnalyzer for MockAnalyzer {
    async fn analyze(&self, _body: &Value) -> Result<UpstreamReply, ProviderError> {
        let reply = self
            .reply
            .as_ref()
            .ok_or_else(|| ProviderError::NetworkError("connection refused".to_string()))?;

        Ok(UpstreamReply {
            status_ok: (200..300).contains(&self.status),
            status: self.status,
            data: reply.clone(),
            raw_text: reply.to_string(),
            proxy_version: self.proxy_version.clone(),
            model: self.model.clone(),
            build_id: Some("mock-build".to_string()),
        })
    }

    async fn ping(&self) -> Result<UpstreamPing, ProviderError> {
        if self.reply.is_none() {
            return Err(ProviderError::NetworkError(
                "connection refused".to_string(),
            ));
        }
        Ok(UpstreamPing {
            url: "mock://relay/ping".to_string(),
            status: 200,
            body: json!({ "ok": true }),
        })
    }
}
