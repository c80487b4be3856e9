//! Demo session that generates synthetic F1 2020 datagrams
//!
//! Drives a single car around a segment-based circuit with straights,
//! braking zones, corners and acceleration phases. The session starts on an
//! out lap (lap 0) shortly before the start/finish line, so the first line
//! crossing exercises track length detection just like a real session.

use crate::f1_2020::{encode_car_telemetry, encode_lap_data, PacketHeader};
use flt_core::{
    model::{packet_id, LapUpdate, TelemetryUpdate, Wheels},
    units::*,
};

// =============================================================================
// Track definition: a sequence of segments that form a lap
// =============================================================================

#[derive(Clone, Copy)]
enum SegmentKind {
    Straight,   // Full throttle, top speed
    Braking,    // Heavy braking into a corner
    Corner,     // Constant-ish speed cornering
    Accel,      // Accelerating out of a corner
}

#[derive(Clone, Copy)]
struct TrackSegment {
    kind: SegmentKind,
    length: f32,         // meters
    target_speed: f32,   // m/s at end of segment
    steering: f32,       // peak steering input (signed: + = right)
}

/// A 4655 m circuit with a long main straight and a slow final sector
fn demo_track() -> Vec<TrackSegment> {
    use SegmentKind::*;
    let seg = |kind, length, target_speed, steering| TrackSegment { kind, length, target_speed, steering };
    vec![
        // Main straight
        seg(Straight, 1000.0, 88.0, 0.0),
        // T1-T2: heavy braking into a right-left
        seg(Braking,   120.0, 35.0, 0.02),
        seg(Corner,    180.0, 33.0, 0.35),
        seg(Accel,     250.0, 60.0, 0.1),
        seg(Straight,  400.0, 70.0, 0.0),
        // T3: long fast left
        seg(Braking,    90.0, 40.0, -0.02),
        seg(Corner,    300.0, 45.0, -0.22),
        seg(Accel,     250.0, 62.0, -0.05),
        // Back straight
        seg(Straight,  700.0, 80.0, 0.0),
        // Chicane, quick right-left
        seg(Braking,   110.0, 30.0, 0.05),
        seg(Corner,    140.0, 28.0, 0.30),
        seg(Corner,    140.0, 27.0, -0.32),
        seg(Accel,     200.0, 50.0, -0.05),
        seg(Straight,  275.0, 68.0, 0.0),
        // Final hairpin and run to the line
        seg(Braking,   100.0, 25.0, -0.03),
        seg(Corner,    150.0, 22.0, -0.42),
        seg(Accel,     250.0, 60.0, -0.1),
    ]
}

// =============================================================================
// Interpolation state derived from track position
// =============================================================================

struct CarState {
    kind: SegmentKind,
    speed: f32,
    throttle: f32,
    brake: f32,
    steering: f32,
    gear: i8,
    rpm: f32,
}

fn compute_car_state(track: &[TrackSegment], lap_distance: f32) -> CarState {
    let lap_length: f32 = track.iter().map(|s| s.length).sum();
    let d = lap_distance.rem_euclid(lap_length);

    // Find current segment
    let mut start = 0.0_f32;
    let mut seg_idx = track.len() - 1;
    for (i, seg) in track.iter().enumerate() {
        if start + seg.length > d {
            seg_idx = i;
            break;
        }
        start += seg.length;
    }
    if seg_idx == track.len() - 1 {
        start = lap_length - track[seg_idx].length;
    }

    let seg = track[seg_idx];
    let seg_t = ((d - start) / seg.length).clamp(0.0, 1.0);

    let prev_target_speed = if seg_idx > 0 {
        track[seg_idx - 1].target_speed
    } else {
        track[track.len() - 1].target_speed
    };

    let smooth_t = smoothstep(seg_t);
    let speed = lerp(prev_target_speed, seg.target_speed, smooth_t);

    let (throttle, brake) = match seg.kind {
        SegmentKind::Straight => (0.95 + 0.05 * (1.0 - seg_t), 0.0),
        SegmentKind::Braking => (0.0, (1.0 - smooth_t * 0.3).clamp(0.0, 1.0)),
        SegmentKind::Corner => (0.2 + 0.3 * seg_t, 0.0),
        SegmentKind::Accel => (0.5 + 0.5 * smooth_t, 0.0),
    };

    // Steering: ramp in during first half, ramp out during second half
    let steer_envelope = if seg_t < 0.5 {
        smoothstep(seg_t * 2.0)
    } else {
        smoothstep((1.0 - seg_t) * 2.0)
    };

    let gear = speed_to_gear(speed);
    let rpm = speed_to_rpm(speed, gear);

    CarState {
        kind: seg.kind,
        speed,
        throttle,
        brake,
        steering: seg.steering * steer_envelope,
        gear,
        rpm,
    }
}

fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn speed_to_gear(speed_ms: f32) -> i8 {
    let kph = speed_ms * 3.6;
    match kph {
        x if x < 80.0 => 1,
        x if x < 120.0 => 2,
        x if x < 150.0 => 3,
        x if x < 180.0 => 4,
        x if x < 210.0 => 5,
        x if x < 240.0 => 6,
        x if x < 275.0 => 7,
        _ => 8,
    }
}

const MAX_RPM: f32 = 12_000.0;
const IDLE_RPM: f32 = 4_000.0;

fn speed_to_rpm(speed_ms: f32, gear: i8) -> f32 {
    // Lower gear = higher RPM for same speed
    let ratio = match gear {
        1 => 450.0,
        2 => 300.0,
        3 => 240.0,
        4 => 200.0,
        5 => 172.0,
        6 => 150.0,
        7 => 133.0,
        _ => 122.0,
    };
    (speed_ms * ratio).clamp(IDLE_RPM, MAX_RPM)
}

/// Simple deterministic noise from a seed
fn noise(seed: f32) -> f32 {
    let x = (seed * 12.9898 + 78.233).sin() * 43_758.547;
    x - x.floor()
}

/// Small jitter centered around 0
fn jitter(seed: f32, amplitude: f32) -> f32 {
    (noise(seed) - 0.5) * 2.0 * amplitude
}

// =============================================================================
// DemoSession
// =============================================================================

/// Distance before the line at which the out lap starts
const OUT_LAP_START_BEFORE_LINE: f32 = 400.0;

pub struct DemoSession {
    track: Vec<TrackSegment>,
    track_length: f32,
    header: PacketHeader,
    frame: u32,
    session_time: f32,
    lap_num: u32,
    lap_distance: f32,
    total_distance: f32,
    brake_temp: f32,
}

impl DemoSession {
    pub fn new(vehicle_index: u8, session_uid: u64) -> Self {
        let track = demo_track();
        let track_length: f32 = track.iter().map(|s| s.length).sum();
        Self {
            track,
            track_length,
            header: PacketHeader::new(packet_id::LAP_DATA, session_uid, vehicle_index),
            frame: 0,
            session_time: 0.0,
            lap_num: 0,
            lap_distance: track_length - OUT_LAP_START_BEFORE_LINE,
            total_distance: 0.0,
            brake_temp: 300.0,
        }
    }

    /// Length of the simulated circuit in meters
    pub fn track_length(&self) -> f32 {
        self.track_length
    }

    pub fn lap(&self) -> u32 {
        self.lap_num
    }

    /// Advance the car by `dt` seconds and produce the samples for the new
    /// position.
    pub fn advance(&mut self, dt: f32) -> (LapUpdate, TelemetryUpdate) {
        let car = compute_car_state(&self.track, self.lap_distance);

        let travelled = car.speed * dt;
        self.lap_distance += travelled;
        self.total_distance += travelled;
        if self.lap_distance >= self.track_length {
            self.lap_distance -= self.track_length;
            self.lap_num += 1;
        }
        self.frame = self.frame.wrapping_add(1);
        self.session_time += dt;

        // Brakes heat up under braking and cool towards ambient otherwise
        self.brake_temp = if car.brake > 0.0 {
            (self.brake_temp + 600.0 * car.brake * dt).min(1000.0)
        } else {
            (self.brake_temp - 40.0 * dt).max(250.0)
        };

        let n = self.frame as f32; // noise seed
        let vehicle_index = self.header.player_car_index;

        let lap = LapUpdate {
            vehicle_index,
            current_lap_num: self.lap_num,
            lap_distance: Meters(self.lap_distance),
            total_distance: Meters(self.total_distance),
        };

        let brake_front = (self.brake_temp + jitter(n, 5.0)) as u16;
        let brake_rear = (self.brake_temp * 0.85 + jitter(n + 1.0, 5.0)) as u16;
        let surface = |base: f32, seed: f32| (base + jitter(n + seed, 2.0)) as u8;

        let telemetry = TelemetryUpdate {
            vehicle_index,
            frame_id: self.frame,
            session_time: Seconds(self.session_time),
            speed_kmh: (car.speed * 3.6) as u16,
            throttle: Input(car.throttle),
            steer: Input(car.steering),
            brake: Input(car.brake),
            clutch: 0,
            gear: car.gear,
            engine_rpm: car.rpm as u16,
            drs: matches!(car.kind, SegmentKind::Straight) && self.lap_num >= 2,
            rev_lights_percent: (((car.rpm - IDLE_RPM) / (MAX_RPM - IDLE_RPM)) * 100.0)
                .clamp(0.0, 100.0) as u8,
            brake_temp: Wheels::new(brake_front, brake_front, brake_rear, brake_rear),
            tyre_surface_temp: Wheels::new(
                surface(92.0, 2.0),
                surface(93.0, 3.0),
                surface(88.0, 4.0),
                surface(89.0, 5.0),
            ),
            tyre_inner_temp: Wheels::new(100, 100, 97, 97),
            engine_temp: 105,
            tyre_pressure: Wheels::new(Psi(23.0), Psi(23.0), Psi(21.5), Psi(21.5)),
            surface_type: Wheels::default(),
            button_status: 0,
            mfd_panel_index: 255,
            mfd_panel_index_secondary: 255,
            suggested_gear: 0,
        };

        (lap, telemetry)
    }

    /// Advance and encode the samples as a lap data datagram followed by a
    /// car telemetry datagram.
    pub fn next_datagrams(&mut self, dt: f32) -> [Vec<u8>; 2] {
        let (lap, telemetry) = self.advance(dt);
        let header = PacketHeader {
            session_time: self.session_time,
            frame_identifier: self.frame,
            ..self.header
        };
        [
            encode_lap_data(&header, &lap),
            encode_car_telemetry(&header, &telemetry),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_track_length() {
        let session = DemoSession::new(0, 1);
        assert!((session.track_length() - 4655.0).abs() < 0.01);
    }

    #[test]
    fn test_compute_car_state_wraps_distance() {
        let track = demo_track();
        let a = compute_car_state(&track, 10.0);
        let b = compute_car_state(&track, 4655.0 + 10.0);
        assert!((a.speed - b.speed).abs() < 0.01);
    }

    #[test]
    fn test_braking_segment_has_no_throttle() {
        let track = demo_track();
        // 1000 m straight, then braking
        let state = compute_car_state(&track, 1010.0);
        assert!(matches!(state.kind, SegmentKind::Braking));
        assert_eq!(state.throttle, 0.0);
        assert!(state.brake > 0.5);
    }

    #[test]
    fn test_speed_to_gear_monotonic() {
        let gears: Vec<i8> = (0..100).map(|v| speed_to_gear(v as f32)).collect();
        assert!(gears.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_rpm_within_limits() {
        for v in 0..100 {
            let speed = v as f32;
            let rpm = speed_to_rpm(speed, speed_to_gear(speed));
            assert!((IDLE_RPM..=MAX_RPM).contains(&rpm));
        }
    }
}
