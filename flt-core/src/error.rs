//! Error taxonomy for ingestion, decoding and log persistence

use std::net::SocketAddr;
use thiserror::Error;

/// A datagram that could not be turned into a packet.
///
/// Always recoverable: the ingestion loop drops the datagram and carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("datagram of {len} bytes exceeds the {max} byte limit")]
    Oversized { len: usize, max: usize },

    #[error("datagram of {len} bytes is too short for a packet header")]
    MissingHeader { len: usize },

    #[error("packet format {format} is not supported (expected {expected})")]
    UnsupportedFormat { format: u16, expected: u16 },

    #[error("packet id {packet_id} needs {expected} bytes, got {actual}")]
    Truncated {
        packet_id: u8,
        expected: usize,
        actual: usize,
    },

    #[error("vehicle index {index} is out of range (max {max})")]
    VehicleIndexOutOfRange { index: u8, max: usize },
}

/// Failure to append or flush a log record
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write log row: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush log: {0}")]
    Io(#[from] std::io::Error),
}

/// Fatal startup failures of the ingestion loop
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to bind UDP socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}
