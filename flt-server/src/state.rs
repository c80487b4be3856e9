//! Application state management
//!
//! The [`SessionStore`] is the only state shared between the ingestion task
//! and presentation consumers. Every packet is applied under a single write
//! lock, so a reader sees either all of a packet's changes or none of them.

use crate::config::ServerConfig;
use chrono::Utc;
use flt_core::{LapUpdate, SessionState, TelemetryUpdate, TrackLengthEstimator, TrackedVehicle};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Latest session snapshot, written by the ingestion task
    pub store: SessionStore,

    /// Ingestion counters
    pub stats: Arc<IngestStats>,

    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new() -> Self {
        Self::from_config(ServerConfig::default())
    }

    pub fn from_config(config: ServerConfig) -> Self {
        Self {
            store: SessionStore::new(config.tracked_vehicle),
            stats: Arc::new(IngestStats::default()),
            config: Arc::new(config),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Session store
// ============================================================================

struct StoreInner {
    tracked: TrackedVehicle,
    state: SessionState,
    estimator: TrackLengthEstimator,
}

impl StoreInner {
    /// Whether a packet for `vehicle_index` may update the state.
    ///
    /// In player mode every packet is the player's, so the tracked index
    /// follows whatever the game reports.
    fn admit(&mut self, vehicle_index: u8) -> bool {
        match self.tracked {
            TrackedVehicle::Fixed(index) => index == vehicle_index,
            TrackedVehicle::Player => {
                if self.state.vehicle_index != Some(vehicle_index) {
                    info!(
                        previous = ?self.state.vehicle_index,
                        vehicle_index,
                        "Tracking player vehicle"
                    );
                    self.state.vehicle_index = Some(vehicle_index);
                }
                true
            }
        }
    }
}

/// Single-writer, multi-reader holder of the current [`SessionState`]
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl SessionStore {
    pub fn new(tracked: TrackedVehicle) -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreInner {
                tracked,
                state: SessionState::new(tracked),
                estimator: TrackLengthEstimator::new(),
            })),
        }
    }

    /// Apply lap progress and run track length detection.
    ///
    /// Returns `false` if the packet is for a vehicle that is not tracked.
    pub async fn apply_lap_update(&self, update: &LapUpdate) -> bool {
        let mut inner = self.inner.write().await;
        if !inner.admit(update.vehicle_index) {
            return false;
        }

        if let Some(length) = inner.estimator.observe(update) {
            info!(track_length_m = length.0, "Track length detected");
        }

        let track_length = inner.estimator.estimate();
        let state = &mut inner.state;
        state.lap = update.current_lap_num;
        state.lap_distance = update.lap_distance;
        state.total_distance = update.total_distance;
        state.track_length = track_length;
        state.updated_at = Some(Utc::now());
        true
    }

    /// Mirror the latest telemetry sample.
    ///
    /// Returns `false` if the packet is for a vehicle that is not tracked.
    pub async fn apply_telemetry_update(&self, update: &TelemetryUpdate) -> bool {
        let mut inner = self.inner.write().await;
        if !inner.admit(update.vehicle_index) {
            return false;
        }

        inner.state.telemetry = *update;
        inner.state.updated_at = Some(Utc::now());
        true
    }

    /// Owned copy of the current state
    pub async fn snapshot(&self) -> SessionState {
        self.inner.read().await.state.clone()
    }
}

// ============================================================================
// Ingestion counters
// ============================================================================

/// Monotonic counters updated by the ingestion task
#[derive(Debug, Default)]
pub struct IngestStats {
    pub datagrams: AtomicU64,
    pub decode_failures: AtomicU64,
    pub unrecognized: AtomicU64,
    pub ignored_vehicle: AtomicU64,
    pub lap_updates: AtomicU64,
    pub telemetry_updates: AtomicU64,
    pub rows_written: AtomicU64,
    pub row_failures: AtomicU64,
}

impl IngestStats {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        StatsSnapshot {
            datagrams: load(&self.datagrams),
            decode_failures: load(&self.decode_failures),
            unrecognized: load(&self.unrecognized),
            ignored_vehicle: load(&self.ignored_vehicle),
            lap_updates: load(&self.lap_updates),
            telemetry_updates: load(&self.telemetry_updates),
            rows_written: load(&self.rows_written),
            row_failures: load(&self.row_failures),
        }
    }
}

/// Serializable view of [`IngestStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub datagrams: u64,
    pub decode_failures: u64,
    pub unrecognized: u64,
    pub ignored_vehicle: u64,
    pub lap_updates: u64,
    pub telemetry_updates: u64,
    pub rows_written: u64,
    pub row_failures: u64,
}
