//! Integration tests for the DemoSession

use flt_adapters::{DemoSession, F12020Decoder};
use flt_core::model::Packet;
use flt_core::{PacketDecoder, TrackLengthEstimator};

const DT: f32 = 1.0 / 60.0;

#[test]
fn test_demo_session_starts_on_out_lap() {
    let mut session = DemoSession::new(0, 42);
    let (lap, _) = session.advance(DT);
    assert_eq!(lap.current_lap_num, 0);
    assert!(lap.lap_distance.0 > session.track_length() - 500.0);
}

#[test]
fn test_demo_session_crosses_the_line() {
    let mut session = DemoSession::new(0, 42);
    for _ in 0..(60 * 30) {
        session.advance(DT);
        if session.lap() == 1 {
            return;
        }
    }
    panic!("demo session never crossed the start/finish line");
}

#[test]
fn test_demo_frames_are_sequential() {
    let mut session = DemoSession::new(3, 42);
    let (_, first) = session.advance(DT);
    let (_, second) = session.advance(DT);
    assert_eq!(first.vehicle_index, 3);
    assert_eq!(second.frame_id, first.frame_id + 1);
    assert!(second.session_time > first.session_time);
}

#[test]
fn test_demo_datagrams_decode() {
    let decoder = F12020Decoder::new();
    let mut session = DemoSession::new(7, 42);
    let [lap, telemetry] = session.next_datagrams(DT);

    match decoder.decode(&lap).unwrap() {
        Packet::Lap(update) => assert_eq!(update.vehicle_index, 7),
        other => panic!("expected lap packet, got {:?}", other),
    }
    match decoder.decode(&telemetry).unwrap() {
        Packet::Telemetry(update) => {
            assert_eq!(update.vehicle_index, 7);
            assert_eq!(update.frame_id, 1);
            assert!(update.speed_kmh > 0);
        }
        other => panic!("expected telemetry packet, got {:?}", other),
    }
}

#[test]
fn test_demo_session_triggers_track_length_estimate() {
    let mut session = DemoSession::new(0, 42);
    let mut estimator = TrackLengthEstimator::new();
    for _ in 0..(60 * 30) {
        let (lap, _) = session.advance(DT);
        estimator.observe(&lap);
    }

    let estimate = estimator.estimate().expect("estimate after crossing the line");
    // The last sample before the line is within one tick of the full length
    assert!(estimate.0 <= session.track_length());
    assert!(estimate.0 > session.track_length() - 10.0);
}
