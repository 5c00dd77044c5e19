//! # Hardware abstraction
//!
//! Traits the controllers use to read the robot's sensors and command its
//! drive sides. A hardware binding implements them on whatever struct owns
//! the devices; [`crate::sim::SimRobot`] implements them for simulation and
//! tests.
//!
//! All calls are synchronous and infallible from the controllers' point of
//! view.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::time::Duration;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// One side of a differential (tank) drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Gyroscope heading.
pub trait HeadingSensor {
    /// Cumulative heading in degrees. Not wrapped into any range.
    fn heading_deg(&mut self) -> f64;
}

/// Per-side wheel encoders.
pub trait DriveEncoders {
    /// Encoder position of the given side since its last reset.
    fn position_ticks(&mut self, side: Side) -> f64;

    /// Re-zero the encoder of the given side.
    fn reset_position(&mut self, side: Side);
}

/// Per-side drive actuators.
pub trait DriveActuator {
    /// Spin a side with a signed voltage demand.
    fn apply_voltage(&mut self, side: Side, volts: f64);

    /// Stop a side and actively hold it at zero velocity.
    fn brake_stop(&mut self, side: Side);

    /// Stop driving a side and let it spin down freely.
    fn coast_stop(&mut self, side: Side);
}

/// Pacing of the control loops.
pub trait Clock {
    /// Block for the given duration.
    fn sleep(&mut self, duration: Duration);

    /// Monotonic time since an arbitrary fixed point.
    fn elapsed(&self) -> Duration;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Side {
    /// Both sides, left first.
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// Index of this side into per-side arrays.
    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1
        }
    }
}
