//! Integration tests for the F1 2020 decoder

use flt_adapters::f1_2020::{
    encode_car_telemetry, encode_lap_data, write_car_telemetry_entry, write_lap_entry,
    PacketHeader, CAR_TELEMETRY_PACKET_LEN, LAP_DATA_PACKET_LEN,
};
use flt_adapters::F12020Decoder;
use flt_core::model::{packet_id, LapUpdate, Packet, TelemetryUpdate, Wheels};
use flt_core::units::*;
use flt_core::{DecodeError, PacketDecoder, TrackedVehicle};

fn header(vehicle_index: u8) -> PacketHeader {
    PacketHeader::new(packet_id::LAP_DATA, 0x1234_5678_9ABC_DEF0, vehicle_index)
}

fn sample_telemetry(vehicle_index: u8) -> TelemetryUpdate {
    TelemetryUpdate {
        vehicle_index,
        frame_id: 812,
        session_time: Seconds(73.5),
        speed_kmh: 301,
        throttle: Input(0.75),
        steer: Input(-0.25),
        brake: Input(0.5),
        clutch: 12,
        gear: -1,
        engine_rpm: 11_900,
        drs: true,
        rev_lights_percent: 95,
        brake_temp: Wheels::new(700, 701, 600, 601),
        tyre_surface_temp: Wheels::new(95, 96, 90, 91),
        tyre_inner_temp: Wheels::new(101, 102, 99, 100),
        engine_temp: 110,
        tyre_pressure: Wheels::new(Psi(23.5), Psi(23.25), Psi(21.5), Psi(21.75)),
        surface_type: Wheels::new(0, 1, 2, 3),
        button_status: 0x0800,
        mfd_panel_index: 2,
        mfd_panel_index_secondary: 255,
        suggested_gear: 6,
    }
}

#[test]
fn test_decoder_name() {
    assert_eq!(F12020Decoder::new().name(), "F1 2020");
}

#[test]
fn test_decode_lap_data_for_player_car() {
    let lap = LapUpdate {
        vehicle_index: 5,
        current_lap_num: 3,
        lap_distance: Meters(120.5),
        total_distance: Meters(3120.5),
    };
    let datagram = encode_lap_data(&header(5), &lap);
    assert_eq!(datagram.len(), LAP_DATA_PACKET_LEN);

    let packet = F12020Decoder::new().decode(&datagram).unwrap();
    assert_eq!(packet, Packet::Lap(lap));
}

#[test]
fn test_decode_negative_lap_distance() {
    let lap = LapUpdate {
        vehicle_index: 0,
        current_lap_num: 0,
        lap_distance: Meters(-250.0),
        total_distance: Meters(0.0),
    };
    let datagram = encode_lap_data(&header(0), &lap);

    match F12020Decoder::new().decode(&datagram).unwrap() {
        Packet::Lap(decoded) => assert_eq!(decoded.lap_distance, Meters(-250.0)),
        other => panic!("expected lap packet, got {:?}", other),
    }
}

#[test]
fn test_decode_car_telemetry_for_player_car() {
    let telemetry = sample_telemetry(19);
    let datagram = encode_car_telemetry(&header(19), &telemetry);
    assert_eq!(datagram.len(), CAR_TELEMETRY_PACKET_LEN);

    let packet = F12020Decoder::new().decode(&datagram).unwrap();
    assert_eq!(packet, Packet::Telemetry(telemetry));
}

#[test]
fn test_wheel_arrays_use_wire_order_rl_rr_fl_fr() {
    let telemetry = sample_telemetry(0);
    let datagram = encode_car_telemetry(&header(0), &telemetry);

    // First brake temperature on the wire belongs to the rear-left wheel
    let entry = 24;
    let first = u16::from_le_bytes([datagram[entry + 20], datagram[entry + 21]]);
    assert_eq!(first, 600);
}

#[test]
fn test_unrecognized_packet_id() {
    let mut datagram = encode_lap_data(&header(0), &LapUpdate::default());
    datagram[5] = 1; // session packet

    let packet = F12020Decoder::new().decode(&datagram).unwrap();
    assert_eq!(packet, Packet::Unrecognized { packet_id: 1 });
}

#[test]
fn test_empty_datagram_is_an_error() {
    assert_eq!(
        F12020Decoder::new().decode(&[]),
        Err(DecodeError::MissingHeader { len: 0 })
    );
}

#[test]
fn test_truncated_lap_data() {
    let datagram = encode_lap_data(&header(0), &LapUpdate::default());
    let result = F12020Decoder::new().decode(&datagram[..600]);
    assert_eq!(
        result,
        Err(DecodeError::Truncated {
            packet_id: packet_id::LAP_DATA,
            expected: LAP_DATA_PACKET_LEN,
            actual: 600,
        })
    );
}

#[test]
fn test_truncated_car_telemetry_trailer() {
    let datagram = encode_car_telemetry(&header(0), &sample_telemetry(0));
    let result = F12020Decoder::new().decode(&datagram[..CAR_TELEMETRY_PACKET_LEN - 1]);
    assert!(matches!(result, Err(DecodeError::Truncated { .. })));
}

#[test]
fn test_oversized_datagram() {
    let result = F12020Decoder::new().decode(&[0u8; 4096]);
    assert_eq!(
        result,
        Err(DecodeError::Oversized {
            len: 4096,
            max: 2048
        })
    );
}

#[test]
fn test_spectator_vehicle_index_is_out_of_range() {
    let lap = LapUpdate {
        vehicle_index: 255,
        ..LapUpdate::default()
    };
    let datagram = encode_lap_data(&header(255), &lap);
    assert_eq!(
        F12020Decoder::new().decode(&datagram),
        Err(DecodeError::VehicleIndexOutOfRange { index: 255, max: 21 })
    );
}

#[test]
fn test_other_packet_format_is_rejected() {
    // A later season's telemetry packet is longer and would pass the length check
    let mut datagram = encode_car_telemetry(&header(0), &sample_telemetry(0));
    datagram.resize(1347, 0);
    datagram[0..2].copy_from_slice(&2021u16.to_le_bytes());

    assert_eq!(
        F12020Decoder::new().decode(&datagram),
        Err(DecodeError::UnsupportedFormat {
            format: 2021,
            expected: 2020
        })
    );
}

#[test]
fn test_player_decoder_follows_header_index() {
    let decoder = F12020Decoder::new();
    for player in [0u8, 3, 21] {
        let lap = LapUpdate {
            vehicle_index: player,
            current_lap_num: 2,
            lap_distance: Meters(800.0),
            total_distance: Meters(5800.0),
        };
        let datagram = encode_lap_data(&header(player), &lap);
        assert_eq!(decoder.decode(&datagram).unwrap(), Packet::Lap(lap));
    }
}

#[test]
fn test_fixed_decoder_reads_non_player_car() {
    let player_lap = LapUpdate {
        vehicle_index: 0,
        current_lap_num: 4,
        lap_distance: Meters(100.0),
        total_distance: Meters(15_000.0),
    };
    let rival_lap = LapUpdate {
        vehicle_index: 5,
        current_lap_num: 3,
        lap_distance: Meters(2500.0),
        total_distance: Meters(12_000.0),
    };
    let mut datagram = encode_lap_data(&header(0), &player_lap);
    write_lap_entry(&mut datagram, &rival_lap);

    let decoder = F12020Decoder::tracking(TrackedVehicle::Fixed(5));
    assert_eq!(decoder.decode(&datagram).unwrap(), Packet::Lap(rival_lap));

    // The player's own entry is untouched
    assert_eq!(
        F12020Decoder::new().decode(&datagram).unwrap(),
        Packet::Lap(player_lap)
    );
}

#[test]
fn test_fixed_decoder_reads_non_player_telemetry() {
    let mut datagram = encode_car_telemetry(&header(0), &sample_telemetry(0));
    let rival = TelemetryUpdate {
        speed_kmh: 180,
        gear: 4,
        ..sample_telemetry(12)
    };
    write_car_telemetry_entry(&mut datagram, &rival);

    match F12020Decoder::tracking(TrackedVehicle::Fixed(12)).decode(&datagram).unwrap() {
        Packet::Telemetry(update) => {
            assert_eq!(update.vehicle_index, 12);
            assert_eq!(update.speed_kmh, 180);
            assert_eq!(update.gear, 4);
            // Header fields are shared by every car
            assert_eq!(update.frame_id, 812);
        }
        other => panic!("expected telemetry packet, got {:?}", other),
    }
}

#[test]
fn test_fixed_decoder_index_out_of_range() {
    let datagram = encode_lap_data(&header(0), &LapUpdate::default());
    assert_eq!(
        F12020Decoder::tracking(TrackedVehicle::Fixed(22)).decode(&datagram),
        Err(DecodeError::VehicleIndexOutOfRange { index: 22, max: 21 })
    );
}

#[test]
fn test_garbage_never_panics() {
    for decoder in [
        F12020Decoder::new(),
        F12020Decoder::tracking(TrackedVehicle::Fixed(21)),
    ] {
        for len in [0usize, 1, 23, 24, 25, 100, 1189, 1190, 1306, 1307, 2048] {
            for fill in [0x00u8, 0x02, 0x06, 0xFF] {
                let mut datagram = vec![fill; len];
                if len >= 2 {
                    datagram[0..2].copy_from_slice(&2020u16.to_le_bytes());
                }
                let _ = decoder.decode(&datagram);
            }
        }
    }
}
