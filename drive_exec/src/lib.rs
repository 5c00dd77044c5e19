//! # Drive library.
//!
//! PID motion control for a differential drive robot: turn in place to a
//! gyro heading, or drive straight for an encoder distance. The executable
//! and the integration tests use the items defined here.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Motion diagnostics - the report produced by every motion and where it goes
pub mod diag;

/// Distance control - drives a straight line for a given distance
pub mod distance_ctrl;

/// Hardware abstraction - sensor, actuator and clock traits
pub mod hal;

/// Heading control - turns in place to a given heading
pub mod heading_ctrl;

/// Robot parameters - per-robot tuning loaded from the params directory
pub mod params;

/// PID loop - the iteration shared by both controllers
pub mod pid;

/// Simulated robot - first-order lag model used for tuning and tests
pub mod sim;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Control period used when a parameter file doesn't give one.
///
/// Units: milliseconds
pub const DEFAULT_PERIOD_MS: u64 = 15;

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

pub(crate) fn default_period_ms() -> u64 {
    DEFAULT_PERIOD_MS
}
