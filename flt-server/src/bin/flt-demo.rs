//! Demo sender
//!
//! Streams synthetic F1 2020 lap data and car telemetry datagrams at 60Hz so
//! the server can be exercised without the game. Target address comes from
//! `FLT_DEMO_TARGET` (default 127.0.0.1:20777).

use anyhow::{Context, Result};
use flt_adapters::DemoSession;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::info;

const TICK: Duration = Duration::from_micros(16_667); // ~60Hz

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let target: SocketAddr = std::env::var("FLT_DEMO_TARGET")
        .unwrap_or_else(|_| "127.0.0.1:20777".to_string())
        .parse()
        .context("FLT_DEMO_TARGET is not a socket address")?;

    let socket = UdpSocket::bind("0.0.0.0:0")
        .await
        .context("Failed to bind demo socket")?;
    let mut session = DemoSession::new(0, rand_session_uid());
    info!(%target, track_length_m = session.track_length(), "Sending demo telemetry");

    let mut interval = tokio::time::interval(TICK);
    let mut last_lap = session.lap();
    loop {
        interval.tick().await;
        for datagram in session.next_datagrams(TICK.as_secs_f32()) {
            socket.send_to(&datagram, target).await?;
        }
        if session.lap() != last_lap {
            last_lap = session.lap();
            info!(lap = last_lap, "Demo car started a new lap");
        }
    }
}

/// Session ids only need to differ between runs
fn rand_session_uid() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(1)
}
