//! F1 Lap Telemetry Server Library
//!
//! Exposes server components for integration testing.

pub mod api;
pub mod config;
pub mod ingest;
pub mod sinks;
pub mod state;
