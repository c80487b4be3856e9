//! Type-safe wrappers for physical units
//!
//! Newtype wrappers around f32 so distances, times and pressures cannot be
//! mixed up when they flow from packets into the session state and log.
//!
//! All unit types serialize with 4 decimal places to reduce JSON payload size.

use serde::{Deserialize, Serialize};
use std::ops::Add;

/// Round f32 to 4 decimal places for compact JSON serialization
fn round4<S: serde::Serializer>(val: &f32, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f32((*val * 10000.0).round() / 10000.0)
}

/// Meters
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Meters(#[serde(serialize_with = "round4")] pub f32);

impl Add<f32> for Meters {
    type Output = Meters;

    fn add(self, rhs: f32) -> Meters {
        Meters(self.0 + rhs)
    }
}

/// Seconds (session timestamps)
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Seconds(#[serde(serialize_with = "round4")] pub f32);

/// Pounds per square inch (tyre pressure as reported by the game)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Psi(#[serde(serialize_with = "round4")] pub f32);

/// Normalised pedal/steering input.
///
/// Pedals are 0.0 to 1.0, steering is -1.0 (full left) to 1.0 (full right).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Input(#[serde(serialize_with = "round4")] pub f32);

impl Input {
    /// Get as percentage (0-100, or -100-100 for steering)
    pub fn as_percent(&self) -> f32 {
        self.0 * 100.0
    }
}
