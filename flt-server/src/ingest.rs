//! Telemetry ingestion loop
//!
//! This module handles:
//! - Binding the UDP socket the game sends datagrams to
//! - Decoding datagrams into packets
//! - Applying packets to the session store
//! - Appending one log row per tracked telemetry sample
//!
//! Datagrams are handled strictly one at a time in arrival order.
//! Sink writes are synchronous, so the server drives [`Ingestor::run`] on a
//! blocking-pool thread.

use crate::sinks::RecordSink;
use crate::state::{AppState, IngestStats, SessionStore};
use flt_core::adapter::{PacketDecoder, MAX_DATAGRAM_LEN};
use flt_core::{IngestError, LogRecord, Packet};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, trace, warn};

/// Bind the telemetry socket. Failure is fatal; there is no retry.
pub async fn bind_socket(addr: SocketAddr) -> Result<UdpSocket, IngestError> {
    UdpSocket::bind(addr)
        .await
        .map_err(|source| IngestError::Bind { addr, source })
}

/// Owns the decoder and log sink; the only writer of the session store
pub struct Ingestor<D, S> {
    decoder: D,
    sink: S,
    store: SessionStore,
    stats: Arc<IngestStats>,
}

impl<D: PacketDecoder, S: RecordSink> Ingestor<D, S> {
    pub fn new(decoder: D, sink: S, state: &AppState) -> Self {
        Self {
            decoder,
            sink,
            store: state.store.clone(),
            stats: state.stats.clone(),
        }
    }

    /// Receive until `cancel` fires, then flush the sink and hand it back
    pub async fn run(mut self, socket: UdpSocket, cancel: CancellationToken) -> S {
        // One spare byte so oversized datagrams reach the decoder as oversized
        let mut buf = [0u8; MAX_DATAGRAM_LEN + 1];

        info!(
            decoder = self.decoder.name(),
            addr = ?socket.local_addr().ok(),
            "Ingestion loop started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                recv = socket.recv_from(&mut buf) => {
                    match recv {
                        Ok((len, _source)) => self.handle_datagram(&buf[..len]).await,
                        Err(e) => warn!("UDP receive error: {}", e),
                    }
                }
            }
        }

        if let Err(e) = self.sink.flush() {
            error!("Failed to flush telemetry log on shutdown: {}", e);
        }
        info!(stats = ?self.stats.snapshot(), "Ingestion loop stopped");
        self.sink
    }

    /// Decode and dispatch a single datagram
    pub async fn handle_datagram(&mut self, datagram: &[u8]) {
        IngestStats::bump(&self.stats.datagrams);

        let packet = match self.decoder.decode(datagram) {
            Ok(packet) => packet,
            Err(e) => {
                trace!("Dropping datagram: {}", e);
                IngestStats::bump(&self.stats.decode_failures);
                return;
            }
        };

        match packet {
            Packet::Lap(update) => {
                if self.store.apply_lap_update(&update).await {
                    IngestStats::bump(&self.stats.lap_updates);
                } else {
                    IngestStats::bump(&self.stats.ignored_vehicle);
                }
            }
            Packet::Telemetry(update) => {
                if !self.store.apply_telemetry_update(&update).await {
                    IngestStats::bump(&self.stats.ignored_vehicle);
                    return;
                }
                IngestStats::bump(&self.stats.telemetry_updates);

                let snapshot = self.store.snapshot().await;
                let record = LogRecord::from_snapshot(&snapshot);
                match self.sink.append(&record) {
                    Ok(()) => IngestStats::bump(&self.stats.rows_written),
                    Err(e) => {
                        IngestStats::bump(&self.stats.row_failures);
                        error!(frame_id = record.frame_id, "Failed to append telemetry row: {}", e);
                    }
                }
            }
            Packet::Unrecognized { packet_id } => {
                trace!(packet_id, "Ignoring packet kind");
                IngestStats::bump(&self.stats.unrecognized);
            }
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
