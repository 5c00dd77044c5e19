//! Parameters structure for DistanceCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::time::Duration;
use serde::{Deserialize, Serialize};

use crate::{
    hal::Side,
    pid::{ControlGains, DerivativeMode, LoopLimits},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for distance control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Params {

    /// Loop gains
    pub gains: ControlGains,

    /// Loop limits, in encoder ticks. The convergence tolerance is the slack
    /// band of the exit test, measured short of the target.
    pub limits: LoopLimits,

    /// Time between two iterations of the loop.
    ///
    /// Units: milliseconds
    #[serde(default = "crate::default_period_ms")]
    pub period_ms: u64,

    #[serde(default)]
    pub derivative_mode: DerivativeMode,

    pub geometry: Geometry,
}

/// Wheel and encoder geometry used to convert distances into ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {

    /// Circumference of a drive wheel.
    ///
    /// Units: same length unit as the requested distances
    pub wheel_circumference: f64,

    /// Encoder ticks per wheel revolution.
    pub ticks_per_revolution: f64,

    /// Factor converting a raw encoder reading into target ticks, accounting
    /// for gearing between the encoder and the wheel.
    pub encoder_scale: f64,

    /// The side whose encoder is sampled.
    pub encoder_side: Side,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

impl Geometry {
    /// Unsigned tick target for a signed distance.
    pub fn distance_to_ticks(&self, distance: f64) -> f64 {
        distance.abs() / self.wheel_circumference * self.ticks_per_revolution
    }

    /// Unsigned scaled reading for a raw encoder position.
    pub fn scale_reading(&self, raw: f64) -> f64 {
        raw.abs() * self.encoder_scale
    }
}
