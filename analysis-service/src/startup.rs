//! Application startup and lifecycle management.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::{Method, header};
use axum::routing::{get, post};
use service_core::error::AppError;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::AnalysisConfig;
use crate::handlers::{analyze, probes};
use crate::services::providers::UpstreamAnalyzer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: AnalysisConfig,
    pub upstream: Arc<dyn UpstreamAnalyzer>,
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration and upstream.
    pub async fn build(
        config: AnalysisConfig,
        upstream: Arc<dyn UpstreamAnalyzer>,
    ) -> Result<Self, AppError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port,
            relay = %config.relay.base_url,
            worker_version = %config.worker.version,
            "Analysis service ready"
        );

        let state = AppState { config, upstream };

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);
        axum::serve(self.listener, router).await
    }
}

/// Assemble the router with CORS and request tracing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(probes::ping))
        .route("/version", get(probes::version))
        .route("/proxy_ping", get(probes::proxy_ping))
        .route("/analyze", post(analyze::analyze))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
                .max_age(Duration::from_secs(86400)),
        )
        .with_state(state)
}
