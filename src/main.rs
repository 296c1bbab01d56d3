//! Startup Hunter - guided idea-to-MVP chat journey
//!
//! An HTTP/SSE server that walks each session through trend discovery, idea
//! selection, proposal, build and test.

mod api;
mod backend;
mod config;
mod conversation;
mod integrations;
mod runtime;
mod script;
mod state_machine;

use api::{create_router, AppState};
use backend::{AnalysisBackend, HttpAnalysisBackend, LoggingBackend, UnconfiguredBackend};
use config::AppConfig;
use runtime::RuntimeManager;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "startup_hunter=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = AppConfig::from_env()?;

    // Analysis backend
    let backend: Arc<dyn AnalysisBackend> = match &config.backend_url {
        Some(url) => {
            let http = HttpAnalysisBackend::new(url, config.backend_timeout)?;
            tracing::info!(
                url = %http.base_url(),
                timeout_secs = config.backend_timeout.as_secs(),
                "Using analysis backend"
            );
            Arc::new(http)
        }
        None => {
            tracing::warn!("No analysis backend configured. Set STARTUP_HUNTER_BACKEND_URL; using scripted trends.");
            Arc::new(UnconfiguredBackend)
        }
    };
    let backend = Arc::new(LoggingBackend::new(backend));

    if config.timing.scale_percent != 100 {
        tracing::info!(scale_percent = config.timing.scale_percent, "Scripted delays scaled");
    }

    // Create application state
    let state = AppState::new(RuntimeManager::new(backend, config.timing));

    // Expire idle sessions
    if let Some(ttl) = config.session_ttl {
        let runtime = Arc::clone(&state.runtime);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(SWEEP_INTERVAL.min(ttl));
            loop {
                ticker.tick().await;
                let expired = runtime.sweep_idle(ttl).await;
                if expired > 0 {
                    tracing::info!(expired, "Expired idle sessions");
                }
            }
        });
    }

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new().gzip(true).br(true).deflate(true);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(compression);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Startup Hunter server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
