//! Meet Service
//!
//! HTTP and WebSocket server for meeting rooms, admission control and
//! signaling relay.
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment
//! 2. Initialize tracing
//! 3. Initialize Prometheus metrics recorder
//! 4. Bind the listener and mark the service ready
//! 5. Serve until SIGINT/SIGTERM, then drain and close signaling sockets

#![warn(clippy::pedantic)]

use common::config::ObservabilityConfig;
use common::logging::init_tracing;
use meet_service::config::{Config, DEFAULT_LOG_DIRECTIVES};
use meet_service::observability::{init_metrics_recorder, HealthState};
use meet_service::routes::{self, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            let _ = init_tracing(&ObservabilityConfig::new(DEFAULT_LOG_DIRECTIVES));
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    init_tracing(&config.observability)?;

    info!("Starting Meet Service");
    info!(
        bind_address = %config.bind_address,
        frontend_base_url = %config.frontend_base_url,
        transcripts_dir = %config.transcripts_dir.display(),
        default_participant_limit = ?config.default_participant_limit,
        signaling_idle_timeout_seconds = config.signaling_idle_timeout_seconds,
        "Configuration loaded successfully"
    );

    let metrics_handle = init_metrics_recorder().map_err(|e| {
        error!("Failed to initialize metrics recorder: {}", e);
        e
    })?;

    let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;
    let drain_seconds = config.drain_seconds;

    let health_state = Arc::new(HealthState::new());
    let state = Arc::new(AppState::new(config));
    let shutdown_token = state.shutdown.clone();

    let app = routes::build_routes(state, Arc::clone(&health_state), Some(metrics_handle));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    health_state.set_ready();
    info!("Meet Service listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(health_state, shutdown_token, drain_seconds))
    .await?;

    info!("Meet Service shutdown complete");

    Ok(())
}

/// Listens for shutdown signals (SIGTERM, SIGINT).
///
/// Marks the service not ready, waits out the drain period, then cancels
/// `shutdown_token` so open signaling connections close.
async fn shutdown_signal(
    health_state: Arc<HealthState>,
    shutdown_token: CancellationToken,
    drain_seconds: u64,
) {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    health_state.set_not_ready();

    if drain_seconds > 0 {
        warn!("Draining connections for {} seconds...", drain_seconds);
        tokio::time::sleep(Duration::from_secs(drain_seconds)).await;
        info!("Drain period complete");
    } else {
        info!("Skipping drain period (DRAIN_SECONDS=0)");
    }

    shutdown_token.cancel();
}
