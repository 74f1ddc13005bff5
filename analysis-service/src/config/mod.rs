use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;

/// Default relay endpoint used outside production.
const DEFAULT_RELAY_BASE_URL: &str = "https://stool-ai-app.onrender.com";

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub relay: RelayConfig,
    pub worker: WorkerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// Version string stamped into response bodies and headers.
    pub version: String,
}

impl AnalysisConfig {
    pub fn load() -> Result<Self, AppError> {
        Ok(AnalysisConfig {
            common: core_config::Config::load()?,
            relay: RelayConfig {
                base_url: core_config::require_env(
                    "RELAY_BASE_URL",
                    Some(DEFAULT_RELAY_BASE_URL),
                )?,
            },
            worker: WorkerConfig {
                version: core_config::require_env("WORKER_VERSION", Some("dev"))?,
            },
        })
    }
}
