//! Read-only snapshot API and SSE stream for presentation clients

use crate::config::ServerConfig;
use crate::state::{AppState, StatsSnapshot};
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Json, Router,
};
use flt_core::SessionState;
use futures::stream::{Stream, StreamExt as FuturesStreamExt};
use serde::Serialize;
use std::convert::Infallible;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::IntervalStream;
use tower_http::cors::CorsLayer;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/session", get(session_snapshot))
        .route("/api/session/stream", get(session_stream))
        .route("/api/stats", get(ingest_stats))
        .route("/api/config", get(server_config))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// === Session Endpoints ===

/// Session snapshot plus the derived values the dashboard displays
#[derive(Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub state: SessionState,
    pub throttle_pct: f32,
    pub brake_pct: f32,
    pub steer_pct: f32,
    pub lap_progress: Option<f32>,
}

impl From<SessionState> for SessionView {
    fn from(state: SessionState) -> Self {
        let telemetry = &state.telemetry;
        Self {
            throttle_pct: telemetry.throttle.as_percent(),
            brake_pct: telemetry.brake.as_percent(),
            steer_pct: telemetry.steer.as_percent(),
            lap_progress: state.lap_progress(),
            state,
        }
    }
}

async fn session_snapshot(State(state): State<AppState>) -> Json<SessionView> {
    Json(SessionView::from(state.store.snapshot().await))
}

/// Push a snapshot every poll interval
async fn session_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut interval = tokio::time::interval(state.config.poll_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let store = state.store.clone();
    let stream = IntervalStream::new(interval)
        .then(move |_| {
            let store = store.clone();
            async move { store.snapshot().await }
        })
        .filter_map(|snapshot| async move {
            match serde_json::to_string(&SessionView::from(snapshot)) {
                Ok(json) => Some(Ok(Event::default().data(json))),
                Err(e) => {
                    tracing::error!("Failed to serialize session snapshot: {}", e);
                    None
                }
            }
        });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

// === Diagnostics Endpoints ===

async fn ingest_stats(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.stats.snapshot())
}

async fn server_config(State(state): State<AppState>) -> Json<ServerConfig> {
    Json(state.config.as_ref().clone())
}
