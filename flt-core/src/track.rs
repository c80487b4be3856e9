//! Track length estimation from lap distance samples
//!
//! The protocol never states the circuit length. When the car crosses the
//! start/finish line onto lap 1, lap distance drops from roughly the full
//! track length to a small value; the last sample before that drop is taken
//! as the track length and kept for the rest of the process.

use crate::model::LapUpdate;
use crate::units::Meters;

/// Minimum drop in lap distance that counts as a line crossing.
///
/// Smaller decreases are telemetry jitter.
pub const CROSSING_THRESHOLD_M: f32 = 100.0;

#[derive(Debug, Clone, Default)]
pub struct TrackLengthEstimator {
    previous_lap_distance: Meters,
    estimate: Option<Meters>,
}

impl TrackLengthEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one lap sample.
    ///
    /// Returns the estimate only on the sample that first produced it.
    pub fn observe(&mut self, update: &LapUpdate) -> Option<Meters> {
        let detected = if self.estimate.is_none()
            && update.current_lap_num == 1
            && self.previous_lap_distance > update.lap_distance + CROSSING_THRESHOLD_M
        {
            self.estimate = Some(self.previous_lap_distance);
            self.estimate
        } else {
            None
        };

        self.previous_lap_distance = update.lap_distance;
        detected
    }

    pub fn estimate(&self) -> Option<Meters> {
        self.estimate
    }
}
