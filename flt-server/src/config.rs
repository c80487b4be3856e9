//! Server configuration from environment variables

use anyhow::{bail, Context, Result};
use flt_adapters::f1_2020::NUM_CARS;
use flt_core::TrackedVehicle;
use serde::Serialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_UDP_BIND: &str = "FLT_UDP_BIND";
pub const ENV_HTTP_BIND: &str = "FLT_HTTP_BIND";
pub const ENV_LOG_PATH: &str = "FLT_LOG_PATH";
pub const ENV_VEHICLE_INDEX: &str = "FLT_VEHICLE_INDEX";
pub const ENV_POLL_INTERVAL_MS: &str = "FLT_POLL_INTERVAL_MS";

/// Port the game broadcasts telemetry to
pub const DEFAULT_UDP_PORT: u16 = 20777;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerConfig {
    /// Where telemetry datagrams are received
    pub udp_bind: SocketAddr,

    /// Where the snapshot API listens
    pub http_bind: SocketAddr,

    /// CSV telemetry log, truncated at startup
    pub log_path: PathBuf,

    pub tracked_vehicle: TrackedVehicle,

    /// Snapshot period of the streaming endpoint
    pub poll_interval_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            udp_bind: SocketAddr::from(([0, 0, 0, 0], DEFAULT_UDP_PORT)),
            http_bind: SocketAddr::from(([127, 0, 0, 1], 9100)),
            log_path: PathBuf::from("f1_full_telemetry.csv"),
            tracked_vehicle: TrackedVehicle::Player,
            poll_interval_ms: 10,
        }
    }
}

impl ServerConfig {
    /// Load from the process environment, falling back to defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variable names
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_UDP_BIND) {
            config.udp_bind = value
                .parse()
                .with_context(|| format!("{ENV_UDP_BIND} is not a socket address: {value:?}"))?;
        }
        if let Some(value) = lookup(ENV_HTTP_BIND) {
            config.http_bind = value
                .parse()
                .with_context(|| format!("{ENV_HTTP_BIND} is not a socket address: {value:?}"))?;
        }
        if let Some(value) = lookup(ENV_LOG_PATH) {
            if value.trim().is_empty() {
                bail!("{ENV_LOG_PATH} must not be empty");
            }
            config.log_path = PathBuf::from(value);
        }
        if let Some(value) = lookup(ENV_VEHICLE_INDEX) {
            let index: u8 = value
                .trim()
                .parse()
                .with_context(|| format!("{ENV_VEHICLE_INDEX} is not a vehicle index: {value:?}"))?;
            if usize::from(index) >= NUM_CARS {
                bail!("{ENV_VEHICLE_INDEX} must be below {NUM_CARS}, got {index}");
            }
            config.tracked_vehicle = TrackedVehicle::Fixed(index);
        }
        if let Some(value) = lookup(ENV_POLL_INTERVAL_MS) {
            let ms: u64 = value
                .trim()
                .parse()
                .with_context(|| format!("{ENV_POLL_INTERVAL_MS} is not a number: {value:?}"))?;
            if ms == 0 {
                bail!("{ENV_POLL_INTERVAL_MS} must be greater than zero");
            }
            config.poll_interval_ms = ms;
        }

        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}
