use std::sync::Arc;

use analysis_service::config::AnalysisConfig;
use analysis_service::services::providers::UpstreamAnalyzer;
use analysis_service::services::providers::relay::RelayAnalyzer;
use analysis_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_tracing("analysis-service", "info");

    let config = AnalysisConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    let upstream: Arc<dyn UpstreamAnalyzer> = Arc::new(RelayAnalyzer::new(&config.relay.base_url));
    tracing::info!(relay = %config.relay.base_url, "Initialized relay analyzer");

    let app = Application::build(config, upstream).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    app.run_until_stopped().await
}
