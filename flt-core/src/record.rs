//! Log record synthesis
//!
//! A [`LogRecord`] joins the lap-derived fields of the session state with the
//! telemetry sample that was just applied, flattened into one CSV row.

use crate::model::{SessionState, TelemetryUpdate};
use crate::units::{Meters, Seconds};
use serde::Serialize;

/// Column names, in row order
pub const LOG_HEADER: [&str; 39] = [
    "FrameID",
    "SessionTime",
    "Lap",
    "LapDistance_m",
    "TotalDistance_m",
    "Speed_kmh",
    "Throttle",
    "Steer",
    "Brake",
    "Clutch",
    "Gear",
    "EngineRPM",
    "DRS",
    "RevLightsPercent",
    "BrakeTemp_FL",
    "BrakeTemp_FR",
    "BrakeTemp_RL",
    "BrakeTemp_RR",
    "TyreSurfTemp_FL",
    "TyreSurfTemp_FR",
    "TyreSurfTemp_RL",
    "TyreSurfTemp_RR",
    "TyreInnerTemp_FL",
    "TyreInnerTemp_FR",
    "TyreInnerTemp_RL",
    "TyreInnerTemp_RR",
    "EngineTemperature",
    "TyrePressure_FL",
    "TyrePressure_FR",
    "TyrePressure_RL",
    "TyrePressure_RR",
    "SurfaceType_FL",
    "SurfaceType_FR",
    "SurfaceType_RL",
    "SurfaceType_RR",
    "ButtonStatus",
    "MFDPanelIndex",
    "MFDPanelIndexSecondaryPlayer",
    "SuggestedGear",
];

/// One persisted telemetry sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub frame_id: u32,
    pub session_time: Seconds,
    pub lap: u32,
    pub lap_distance: Meters,
    pub total_distance: Meters,
    pub telemetry: TelemetryUpdate,
}

impl LogRecord {
    /// Build the record for the telemetry sample held by `state`
    pub fn from_snapshot(state: &SessionState) -> Self {
        let telemetry = state.telemetry;
        Self {
            frame_id: telemetry.frame_id,
            session_time: telemetry.session_time,
            lap: state.lap,
            lap_distance: state.lap_distance,
            total_distance: state.total_distance,
            telemetry,
        }
    }

    /// Render as CSV fields matching [`LOG_HEADER`]
    pub fn to_row(&self) -> Vec<String> {
        let t = &self.telemetry;
        let mut row = Vec::with_capacity(LOG_HEADER.len());

        row.push(self.frame_id.to_string());
        row.push(fixed3(self.session_time.0));
        row.push(self.lap.to_string());
        row.push(fixed3(self.lap_distance.0));
        row.push(fixed3(self.total_distance.0));

        row.push(t.speed_kmh.to_string());
        row.push(fixed3(t.throttle.0));
        row.push(fixed3(t.steer.0));
        row.push(fixed3(t.brake.0));
        row.push(t.clutch.to_string());
        row.push(t.gear.to_string());
        row.push(t.engine_rpm.to_string());
        row.push(u8::from(t.drs).to_string());
        row.push(t.rev_lights_percent.to_string());

        row.extend(t.brake_temp.all_wheels().iter().map(u16::to_string));
        row.extend(t.tyre_surface_temp.all_wheels().iter().map(u8::to_string));
        row.extend(t.tyre_inner_temp.all_wheels().iter().map(u8::to_string));
        row.push(t.engine_temp.to_string());
        row.extend(t.tyre_pressure.all_wheels().iter().map(|p| fixed3(p.0)));
        row.extend(t.surface_type.all_wheels().iter().map(u8::to_string));

        row.push(t.button_status.to_string());
        row.push(t.mfd_panel_index.to_string());
        row.push(t.mfd_panel_index_secondary.to_string());
        row.push(t.suggested_gear.to_string());

        row
    }
}

fn fixed3(value: f32) -> String {
    format!("{:.3}", value)
}
