//! Packet decoding adapter trait definition

use crate::error::DecodeError;
use crate::model::Packet;

/// Largest datagram the ingestion loop will hand to a decoder
pub const MAX_DATAGRAM_LEN: usize = 2048;

/// Trait for game-specific datagram decoders
///
/// Each decoder is responsible for:
/// - Identifying the packet kind from the datagram header
/// - Selecting the entry of the vehicle the packet is about
/// - Converting the game-specific layout to a typed [`Packet`]
///
/// Decoders must never panic on malformed input. Packet kinds the ingestion
/// engine does not consume are reported as [`Packet::Unrecognized`].
pub trait PacketDecoder: Send + Sync {
    /// Get the name of this decoder (e.g., "F1 2020")
    fn name(&self) -> &str;

    /// Decode a single datagram
    fn decode(&self, datagram: &[u8]) -> Result<Packet, DecodeError>;
}
