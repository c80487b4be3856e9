//! F1 Lap Telemetry Server
//!
//! Receives F1 2020 UDP telemetry, keeps the live session snapshot and logs
//! every telemetry sample to CSV.

use anyhow::{Context, Result};
use flt_adapters::F12020Decoder;
use flt_server::{api, config::ServerConfig, ingest, sinks, state::AppState};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting F1 Lap Telemetry Server");

    let config = ServerConfig::from_env().context("Invalid configuration")?;
    info!(
        udp = %config.udp_bind,
        log = %config.log_path.display(),
        tracked = ?config.tracked_vehicle,
        "Configuration loaded"
    );

    let socket = ingest::bind_socket(config.udp_bind).await?;
    let sink = sinks::create_sink(&config.log_path)
        .with_context(|| format!("Failed to open telemetry log {}", config.log_path.display()))?;

    let http_bind = config.http_bind;
    let decoder = F12020Decoder::tracking(config.tracked_vehicle);
    let state = AppState::from_config(config);
    let cancel = CancellationToken::new();

    // Log writes block, so ingestion gets its own thread off the async workers
    let ingestor = ingest::Ingestor::new(decoder, sink, &state);
    let runtime = tokio::runtime::Handle::current();
    let ingest_cancel = cancel.clone();
    let ingest_task = tokio::task::spawn_blocking(move || {
        runtime.block_on(ingestor.run(socket, ingest_cancel))
    });

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown requested");
                shutdown.cancel();
            }
            Err(e) => error!("Unable to listen for shutdown signal: {}", e),
        }
    });

    // Start server
    let app = api::create_router(state);
    let listener = tokio::net::TcpListener::bind(http_bind)
        .await
        .with_context(|| format!("Failed to bind snapshot API on {}", http_bind))?;
    info!("Snapshot API listening on http://{}", http_bind);

    let http_cancel = cancel.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { http_cancel.cancelled().await })
        .await?;

    // Waits for the final log flush
    ingest_task.await.context("Ingestion thread panicked")?;
    info!("Shutdown complete");

    Ok(())
}
