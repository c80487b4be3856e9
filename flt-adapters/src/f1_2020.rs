//! F1 2020 UDP telemetry decoder
//!
//! Decodes the two packet kinds the ingestion engine consumes: lap data and
//! car telemetry. Every packet carries one entry per car; only the entry of
//! the tracked car is extracted. By default that is the player's car as named
//! in each header, so a reassigned player index is followed.
//!
//! All values are little-endian and packed without padding.

use flt_core::{
    adapter::{PacketDecoder, MAX_DATAGRAM_LEN},
    error::DecodeError,
    model::{packet_id, LapUpdate, Packet, TelemetryUpdate, TrackedVehicle, Wheels},
    units::*,
};

// ============================================================================
// Layout
// ============================================================================

pub const PACKET_FORMAT: u16 = 2020;
pub const HEADER_LEN: usize = 24;
pub const NUM_CARS: usize = 22;

const LAP_DATA_ENTRY_LEN: usize = 53;
const CAR_TELEMETRY_ENTRY_LEN: usize = 58;
const CAR_TELEMETRY_TRAILER_LEN: usize = 7;

pub const LAP_DATA_PACKET_LEN: usize = HEADER_LEN + NUM_CARS * LAP_DATA_ENTRY_LEN;
pub const CAR_TELEMETRY_PACKET_LEN: usize =
    HEADER_LEN + NUM_CARS * CAR_TELEMETRY_ENTRY_LEN + CAR_TELEMETRY_TRAILER_LEN;

/// Offsets inside a lap data entry
mod lap_entry {
    pub const LAP_DISTANCE: usize = 32;
    pub const TOTAL_DISTANCE: usize = 36;
    pub const CURRENT_LAP_NUM: usize = 45;
}

/// Offsets inside a car telemetry entry
mod telemetry_entry {
    pub const SPEED: usize = 0;
    pub const THROTTLE: usize = 2;
    pub const STEER: usize = 6;
    pub const BRAKE: usize = 10;
    pub const CLUTCH: usize = 14;
    pub const GEAR: usize = 15;
    pub const ENGINE_RPM: usize = 16;
    pub const DRS: usize = 18;
    pub const REV_LIGHTS_PERCENT: usize = 19;
    pub const BRAKES_TEMPERATURE: usize = 20;
    pub const TYRES_SURFACE_TEMPERATURE: usize = 28;
    pub const TYRES_INNER_TEMPERATURE: usize = 32;
    pub const ENGINE_TEMPERATURE: usize = 36;
    pub const TYRES_PRESSURE: usize = 38;
    pub const SURFACE_TYPE: usize = 54;
}

/// Offsets of the fields following the car telemetry entries
mod telemetry_trailer {
    use super::*;

    const BASE: usize = HEADER_LEN + NUM_CARS * CAR_TELEMETRY_ENTRY_LEN;
    pub const BUTTON_STATUS: usize = BASE;
    pub const MFD_PANEL_INDEX: usize = BASE + 4;
    pub const MFD_PANEL_INDEX_SECONDARY: usize = BASE + 5;
    pub const SUGGESTED_GEAR: usize = BASE + 6;
}

// ============================================================================
// Header
// ============================================================================

/// Header shared by every packet kind (24 bytes at offset 0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacketHeader {
    pub packet_format: u16,
    pub game_major_version: u8,
    pub game_minor_version: u8,
    pub packet_version: u8,
    pub packet_id: u8,
    pub session_uid: u64,
    pub session_time: f32,
    pub frame_identifier: u32,
    pub player_car_index: u8,
    pub secondary_player_car_index: u8,
}

impl PacketHeader {
    /// Header for a packet about `player_car_index`
    pub fn new(packet_id: u8, session_uid: u64, player_car_index: u8) -> Self {
        Self {
            packet_format: PACKET_FORMAT,
            game_major_version: 1,
            game_minor_version: 0,
            packet_version: 1,
            packet_id,
            session_uid,
            session_time: 0.0,
            frame_identifier: 0,
            player_car_index,
            secondary_player_car_index: 255,
        }
    }

    pub fn parse(buf: &[u8]) -> Result<Self, DecodeError> {
        if buf.len() < HEADER_LEN {
            return Err(DecodeError::MissingHeader { len: buf.len() });
        }
        Ok(Self {
            packet_format: read_u16(buf, 0),
            game_major_version: buf[2],
            game_minor_version: buf[3],
            packet_version: buf[4],
            packet_id: buf[5],
            session_uid: read_u64(buf, 6),
            session_time: read_f32(buf, 14),
            frame_identifier: read_u32(buf, 18),
            player_car_index: buf[22],
            secondary_player_car_index: buf[23],
        })
    }

    fn write(&self, buf: &mut [u8]) {
        write_u16(buf, 0, self.packet_format);
        buf[2] = self.game_major_version;
        buf[3] = self.game_minor_version;
        buf[4] = self.packet_version;
        buf[5] = self.packet_id;
        write_u64(buf, 6, self.session_uid);
        write_f32(buf, 14, self.session_time);
        write_u32(buf, 18, self.frame_identifier);
        buf[22] = self.player_car_index;
        buf[23] = self.secondary_player_car_index;
    }
}

// ============================================================================
// Decoder
// ============================================================================

/// Decoder for the F1 2020 packet format
#[derive(Debug, Clone, Copy, Default)]
pub struct F12020Decoder {
    target: TrackedVehicle,
}

impl F12020Decoder {
    /// Decoder that follows the player's car
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder that extracts the entry of `target`
    pub fn tracking(target: TrackedVehicle) -> Self {
        Self { target }
    }

    /// Index of the car entry to extract from a packet with `header`
    fn vehicle_index(&self, header: &PacketHeader) -> u8 {
        match self.target {
            TrackedVehicle::Player => header.player_car_index,
            TrackedVehicle::Fixed(index) => index,
        }
    }
}

impl PacketDecoder for F12020Decoder {
    fn name(&self) -> &str {
        "F1 2020"
    }

    fn decode(&self, datagram: &[u8]) -> Result<Packet, DecodeError> {
        if datagram.len() > MAX_DATAGRAM_LEN {
            return Err(DecodeError::Oversized {
                len: datagram.len(),
                max: MAX_DATAGRAM_LEN,
            });
        }

        let header = PacketHeader::parse(datagram)?;
        if header.packet_format != PACKET_FORMAT {
            return Err(DecodeError::UnsupportedFormat {
                format: header.packet_format,
                expected: PACKET_FORMAT,
            });
        }

        let index = self.vehicle_index(&header);
        match header.packet_id {
            packet_id::LAP_DATA => {
                let entry = car_entry(
                    datagram,
                    &header,
                    index,
                    LAP_DATA_ENTRY_LEN,
                    LAP_DATA_PACKET_LEN,
                )?;
                Ok(Packet::Lap(decode_lap_entry(entry, index)))
            }
            packet_id::CAR_TELEMETRY => {
                let entry = car_entry(
                    datagram,
                    &header,
                    index,
                    CAR_TELEMETRY_ENTRY_LEN,
                    CAR_TELEMETRY_PACKET_LEN,
                )?;
                Ok(Packet::Telemetry(decode_telemetry(datagram, entry, index, &header)))
            }
            other => Ok(Packet::Unrecognized { packet_id: other }),
        }
    }
}

/// Slice out the entry of car `index` after validating the packet length
fn car_entry<'a>(
    datagram: &'a [u8],
    header: &PacketHeader,
    index: u8,
    entry_len: usize,
    packet_len: usize,
) -> Result<&'a [u8], DecodeError> {
    if datagram.len() < packet_len {
        return Err(DecodeError::Truncated {
            packet_id: header.packet_id,
            expected: packet_len,
            actual: datagram.len(),
        });
    }

    match entry_offset(index, entry_len) {
        Some(start) => Ok(&datagram[start..start + entry_len]),
        None => Err(DecodeError::VehicleIndexOutOfRange {
            index,
            max: NUM_CARS - 1,
        }),
    }
}

fn decode_lap_entry(entry: &[u8], vehicle_index: u8) -> LapUpdate {
    LapUpdate {
        vehicle_index,
        current_lap_num: entry[lap_entry::CURRENT_LAP_NUM] as u32,
        lap_distance: Meters(read_f32(entry, lap_entry::LAP_DISTANCE)),
        total_distance: Meters(read_f32(entry, lap_entry::TOTAL_DISTANCE)),
    }
}

fn decode_telemetry(
    datagram: &[u8],
    entry: &[u8],
    vehicle_index: u8,
    header: &PacketHeader,
) -> TelemetryUpdate {
    use telemetry_entry::*;

    TelemetryUpdate {
        vehicle_index,
        frame_id: header.frame_identifier,
        session_time: Seconds(header.session_time),
        speed_kmh: read_u16(entry, SPEED),
        throttle: Input(read_f32(entry, THROTTLE)),
        steer: Input(read_f32(entry, STEER)),
        brake: Input(read_f32(entry, BRAKE)),
        clutch: entry[CLUTCH],
        gear: entry[GEAR] as i8,
        engine_rpm: read_u16(entry, ENGINE_RPM),
        drs: entry[DRS] != 0,
        rev_lights_percent: entry[REV_LIGHTS_PERCENT],
        brake_temp: Wheels::from_wire_order(std::array::from_fn(|i| {
            read_u16(entry, BRAKES_TEMPERATURE + i * 2)
        })),
        tyre_surface_temp: Wheels::from_wire_order(read_u8x4(entry, TYRES_SURFACE_TEMPERATURE)),
        tyre_inner_temp: Wheels::from_wire_order(read_u8x4(entry, TYRES_INNER_TEMPERATURE)),
        engine_temp: read_u16(entry, ENGINE_TEMPERATURE),
        tyre_pressure: Wheels::from_wire_order(std::array::from_fn(|i| {
            Psi(read_f32(entry, TYRES_PRESSURE + i * 4))
        })),
        surface_type: Wheels::from_wire_order(read_u8x4(entry, SURFACE_TYPE)),
        button_status: read_u32(datagram, telemetry_trailer::BUTTON_STATUS),
        mfd_panel_index: datagram[telemetry_trailer::MFD_PANEL_INDEX],
        mfd_panel_index_secondary: datagram[telemetry_trailer::MFD_PANEL_INDEX_SECONDARY],
        suggested_gear: datagram[telemetry_trailer::SUGGESTED_GEAR] as i8,
    }
}

// ============================================================================
// Encoder (synthetic sources)
// ============================================================================

/// Encode a lap data packet whose player entry is `lap`.
///
/// The header's packet id and player index are taken from the update; all
/// other cars' entries are zeroed.
pub fn encode_lap_data(header: &PacketHeader, lap: &LapUpdate) -> Vec<u8> {
    let mut buf = vec![0u8; LAP_DATA_PACKET_LEN];
    let header = PacketHeader {
        packet_id: packet_id::LAP_DATA,
        player_car_index: lap.vehicle_index,
        ..*header
    };
    header.write(&mut buf);
    write_lap_entry(&mut buf, lap);
    buf
}

/// Overwrite the entry of `lap.vehicle_index` in an encoded lap data packet.
///
/// Indices outside the car table are skipped.
pub fn write_lap_entry(datagram: &mut [u8], lap: &LapUpdate) {
    let Some(entry) = entry_mut(datagram, lap.vehicle_index, LAP_DATA_ENTRY_LEN) else {
        return;
    };
    write_f32(entry, lap_entry::LAP_DISTANCE, lap.lap_distance.0);
    write_f32(entry, lap_entry::TOTAL_DISTANCE, lap.total_distance.0);
    entry[lap_entry::CURRENT_LAP_NUM] = lap.current_lap_num.min(u8::MAX as u32) as u8;
}

/// Encode a car telemetry packet whose player entry is `telemetry`.
///
/// Frame identifier and session time in the header come from the update.
pub fn encode_car_telemetry(header: &PacketHeader, telemetry: &TelemetryUpdate) -> Vec<u8> {
    let mut buf = vec![0u8; CAR_TELEMETRY_PACKET_LEN];
    let header = PacketHeader {
        packet_id: packet_id::CAR_TELEMETRY,
        player_car_index: telemetry.vehicle_index,
        frame_identifier: telemetry.frame_id,
        session_time: telemetry.session_time.0,
        ..*header
    };
    header.write(&mut buf);
    write_car_telemetry_entry(&mut buf, telemetry);

    write_u32(&mut buf, telemetry_trailer::BUTTON_STATUS, telemetry.button_status);
    buf[telemetry_trailer::MFD_PANEL_INDEX] = telemetry.mfd_panel_index;
    buf[telemetry_trailer::MFD_PANEL_INDEX_SECONDARY] = telemetry.mfd_panel_index_secondary;
    buf[telemetry_trailer::SUGGESTED_GEAR] = telemetry.suggested_gear as u8;
    buf
}

/// Overwrite the entry of `telemetry.vehicle_index` in an encoded car
/// telemetry packet. Header and trailer fields are left untouched.
pub fn write_car_telemetry_entry(datagram: &mut [u8], telemetry: &TelemetryUpdate) {
    use telemetry_entry::*;

    let Some(entry) = entry_mut(datagram, telemetry.vehicle_index, CAR_TELEMETRY_ENTRY_LEN) else {
        return;
    };
    write_u16(entry, SPEED, telemetry.speed_kmh);
    write_f32(entry, THROTTLE, telemetry.throttle.0);
    write_f32(entry, STEER, telemetry.steer.0);
    write_f32(entry, BRAKE, telemetry.brake.0);
    entry[CLUTCH] = telemetry.clutch;
    entry[GEAR] = telemetry.gear as u8;
    write_u16(entry, ENGINE_RPM, telemetry.engine_rpm);
    entry[DRS] = u8::from(telemetry.drs);
    entry[REV_LIGHTS_PERCENT] = telemetry.rev_lights_percent;
    for (i, temp) in telemetry.brake_temp.to_wire_order().into_iter().enumerate() {
        write_u16(entry, BRAKES_TEMPERATURE + i * 2, temp);
    }
    entry[TYRES_SURFACE_TEMPERATURE..TYRES_SURFACE_TEMPERATURE + 4]
        .copy_from_slice(&telemetry.tyre_surface_temp.to_wire_order());
    entry[TYRES_INNER_TEMPERATURE..TYRES_INNER_TEMPERATURE + 4]
        .copy_from_slice(&telemetry.tyre_inner_temp.to_wire_order());
    write_u16(entry, ENGINE_TEMPERATURE, telemetry.engine_temp);
    for (i, pressure) in telemetry.tyre_pressure.to_wire_order().into_iter().enumerate() {
        write_f32(entry, TYRES_PRESSURE + i * 4, pressure.0);
    }
    entry[SURFACE_TYPE..SURFACE_TYPE + 4]
        .copy_from_slice(&telemetry.surface_type.to_wire_order());
}

fn entry_mut(datagram: &mut [u8], vehicle_index: u8, entry_len: usize) -> Option<&mut [u8]> {
    let start = entry_offset(vehicle_index, entry_len)?;
    datagram.get_mut(start..start + entry_len)
}

fn entry_offset(vehicle_index: u8, entry_len: usize) -> Option<usize> {
    let index = vehicle_index as usize;
    (index < NUM_CARS).then(|| HEADER_LEN + index * entry_len)
}

// ============================================================================
// Binary helpers
//
// Callers validate lengths before reading; offsets are always in range.
// ============================================================================

fn read_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

fn read_u64(buf: &[u8], offset: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[offset..offset + 8]);
    u64::from_le_bytes(bytes)
}

fn read_f32(buf: &[u8], offset: usize) -> f32 {
    f32::from_bits(read_u32(buf, offset))
}

fn read_u8x4(buf: &[u8], offset: usize) -> [u8; 4] {
    [buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]]
}

fn write_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn write_u32(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn write_u64(buf: &mut [u8], offset: usize, value: u64) {
    buf[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}

fn write_f32(buf: &mut [u8], offset: usize, value: f32) {
    write_u32(buf, offset, value.to_bits());
}
