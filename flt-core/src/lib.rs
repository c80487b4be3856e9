//! F1 Lap Telemetry Core Library
//!
//! This crate provides the packet model, session state, track length
//! estimation and log record types shared by decoders and the ingestion
//! server.

pub mod adapter;
pub mod error;
pub mod model;
pub mod record;
pub mod track;
pub mod units;

pub use adapter::PacketDecoder;
pub use error::{DecodeError, IngestError, WriteError};
pub use model::{LapUpdate, Packet, SessionState, TelemetryUpdate, TrackedVehicle};
pub use record::LogRecord;
pub use track::TrackLengthEstimator;
