//! GridAI API Server
//!
//! REST API for site bankability assessment
//!
//! Usage:
//!   cargo run --bin gridai_api
//!
//! Environment:
//!   PORT / GRIDAI_PORT          - Server port (default: 8080)
//!   GRIDAI_HOST                 - Server host (default: 0.0.0.0)
//!   GRIDAI_PROVIDER             - synthetic | http (default: synthetic)
//!   GRIDAI_PROVIDER_URL         - Feature service base URL (http provider)
//!   GRIDAI_PROVIDER_TIMEOUT_MS  - Provider deadline (default: 5000)
//!   GRIDAI_SEED                 - Seed for the synthetic provider
//!   GRIDAI_RATE_LIMIT           - Requests per client per minute (default: 100)
//!   GRIDAI_TRUST_FORWARDED      - Key rate limits on X-Forwarded-For (default: false)
//!   RUST_LOG                    - Log filter (default: info)

use gridai::api::{create_router, start_cleanup_task, AppState};
use gridai::utils::constants::APP_VERSION;
use gridai::{ServiceConfig, TelemetryCollector};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    print_banner();

    let config = ServiceConfig::from_env()?;

    let telemetry = Arc::new(TelemetryCollector::new());
    let telemetry_for_shutdown = telemetry.clone();

    let state = Arc::new(AppState::from_config(&config, telemetry)?);

    // Start background cleanup task for rate limiter
    start_cleanup_task(state.rate_limiter.clone());
    info!("🧹 Background cleanup task started");

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("🚀 GridAI API starting on http://{}", addr);
    info!("");
    info!("Endpoints:");
    info!("  POST /api/analyze-grid    - Site bankability assessment");
    info!("  POST /v1/analyze          - Site bankability assessment");
    info!("  POST /v1/analyze/batch    - Batch assessment (up to 100 sites)");
    info!("  GET  /v1/stats            - Assessment statistics");
    info!("  GET  /v1/health           - Health check");
    info!("");
    info!("Press Ctrl+C for graceful shutdown");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("⚠️ Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    // Peer addresses feed the per-client rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal)
    .await?;

    info!("🛑 Shutdown signal received, cleaning up...");
    println!("{}", telemetry_for_shutdown.get_stats().summary());
    info!("👋 GridAI API shutdown complete");

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    ==============================================================
       G R I D A I
       Interconnection Bankability API   v{}
    ==============================================================
    "#,
        APP_VERSION
    );
}
