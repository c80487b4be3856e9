//! Typed packet and session state model
//!
//! Decoders produce [`Packet`]s; the ingestion engine folds them into a
//! [`SessionState`] that presentation consumers read as owned snapshots.

use crate::units::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Packet kind identifiers in the reference protocol
pub mod packet_id {
    pub const LAP_DATA: u8 = 2;
    pub const CAR_TELEMETRY: u8 = 6;
}

/// A decoded datagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Packet {
    Lap(LapUpdate),
    Telemetry(TelemetryUpdate),
    /// A well-formed packet of a kind the engine does not consume
    Unrecognized { packet_id: u8 },
}

impl Packet {
    /// Vehicle the packet describes, if it is a consumed kind
    pub fn vehicle_index(&self) -> Option<u8> {
        match self {
            Packet::Lap(lap) => Some(lap.vehicle_index),
            Packet::Telemetry(telemetry) => Some(telemetry.vehicle_index),
            Packet::Unrecognized { .. } => None,
        }
    }
}

/// Lap progress of a single vehicle
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LapUpdate {
    pub vehicle_index: u8,

    /// Current lap number (0 before the first start line crossing)
    pub current_lap_num: u32,

    /// Distance since the start/finish line; negative before the first crossing
    pub lap_distance: Meters,

    /// Distance covered since the session began
    pub total_distance: Meters,
}

/// Per-wheel values (Front-Left, Front-Right, Rear-Left, Rear-Right)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Wheels<T> {
    pub front_left: T,
    pub front_right: T,
    pub rear_left: T,
    pub rear_right: T,
}

impl<T: Copy> Wheels<T> {
    pub fn new(front_left: T, front_right: T, rear_left: T, rear_right: T) -> Self {
        Self {
            front_left,
            front_right,
            rear_left,
            rear_right,
        }
    }

    /// Build from the game's wire order: RL, RR, FL, FR
    pub fn from_wire_order([rl, rr, fl, fr]: [T; 4]) -> Self {
        Self::new(fl, fr, rl, rr)
    }

    /// Values in the game's wire order: RL, RR, FL, FR
    pub fn to_wire_order(&self) -> [T; 4] {
        [
            self.rear_left,
            self.rear_right,
            self.front_left,
            self.front_right,
        ]
    }

    /// Values in FL, FR, RL, RR order
    pub fn all_wheels(&self) -> [T; 4] {
        [
            self.front_left,
            self.front_right,
            self.rear_left,
            self.rear_right,
        ]
    }
}

/// Car telemetry sample of a single vehicle
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryUpdate {
    pub vehicle_index: u8,

    /// Frame identifier from the packet header
    pub frame_id: u32,

    /// Session timestamp from the packet header
    pub session_time: Seconds,

    pub speed_kmh: u16,

    /// 0.0 to 1.0
    pub throttle: Input,

    /// -1.0 (full left) to 1.0 (full right)
    pub steer: Input,

    /// 0.0 to 1.0
    pub brake: Input,

    /// Clutch application, 0 to 100
    pub clutch: u8,

    /// -1 = reverse, 0 = neutral, 1+ = forward gears
    pub gear: i8,

    pub engine_rpm: u16,
    pub drs: bool,
    pub rev_lights_percent: u8,

    /// Celsius
    pub brake_temp: Wheels<u16>,
    /// Celsius
    pub tyre_surface_temp: Wheels<u8>,
    /// Celsius
    pub tyre_inner_temp: Wheels<u8>,
    /// Celsius
    pub engine_temp: u16,

    pub tyre_pressure: Wheels<Psi>,

    /// Driving surface id under each tyre
    pub surface_type: Wheels<u8>,

    /// Bit flags of the buttons currently pressed
    pub button_status: u32,

    /// 255 = MFD closed
    pub mfd_panel_index: u8,
    pub mfd_panel_index_secondary: u8,

    /// 0 when there is no suggestion
    pub suggested_gear: i8,
}

/// Which vehicle's packets the session state follows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "index", rename_all = "snake_case")]
pub enum TrackedVehicle {
    /// Lock onto the vehicle of the first accepted packet
    #[default]
    Player,
    /// Follow one fixed vehicle index
    Fixed(u8),
}

/// Latest known state of the tracked vehicle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Vehicle being tracked; `None` until the first packet in player mode
    pub vehicle_index: Option<u8>,

    pub lap: u32,
    pub lap_distance: Meters,
    pub total_distance: Meters,

    /// Inferred circuit length, set once per process
    pub track_length: Option<Meters>,

    /// Most recent telemetry sample
    pub telemetry: TelemetryUpdate,

    /// When any field last changed
    pub updated_at: Option<DateTime<Utc>>,
}

impl SessionState {
    pub fn new(tracked: TrackedVehicle) -> Self {
        let vehicle_index = match tracked {
            TrackedVehicle::Player => None,
            TrackedVehicle::Fixed(index) => Some(index),
        };
        Self {
            vehicle_index,
            ..Self::default()
        }
    }

    /// Fraction of the estimated track covered on this lap
    pub fn lap_progress(&self) -> Option<f32> {
        self.track_length
            .filter(|len| len.0 > 0.0)
            .map(|len| (self.lap_distance.0 / len.0).clamp(0.0, 1.0))
    }
}
