//! Report API server implementation
//!
//! HTTP REST API server using Axum. Provides endpoints for normalize,
//! alerts, months and plan.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use super::handlers;
use crate::config::NormalizerConfig;
use crate::error::{ReportError, ReportResult};

/// Listen address and the normalizer settings served to every request
#[derive(Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub normalizer: NormalizerConfig,
}

impl ApiConfig {
    /// Socket address to bind; the host must be an IP literal
    pub fn addr(&self) -> ReportResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ReportError::Validation(format!("invalid listen host '{}'", self.host)))
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub version: String,
    pub config: NormalizerConfig,
}

impl AppState {
    pub fn new(config: NormalizerConfig) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            config,
        }
    }
}

/// Router with every endpoint, CORS and request tracing
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/version", get(handlers::version))
        // Core API endpoints
        .route("/api/v1/normalize", post(handlers::normalize))
        .route("/api/v1/alerts", post(handlers::alerts))
        .route("/api/v1/months", post(handlers::months))
        .route("/api/v1/plan", post(handlers::plan))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the API server
pub async fn run_api_server(config: ApiConfig) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "report_server=info,report_normalizer=info,tower_http=info".into()),
        )
        .init();

    let addr = config.addr()?;
    info!(
        overview = %config.normalizer.overview_sheet,
        accuracy = %config.normalizer.accuracy_sheet,
        "📊 Report API Server starting on http://{}",
        addr
    );
    let app = build_router(Arc::new(AppState::new(config.normalizer)));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Report API Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server...");
}
