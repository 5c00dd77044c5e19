//! Parameters structure for HeadingCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::time::Duration;
use serde::{Deserialize, Serialize};

use crate::pid::{ControlGains, DerivativeMode, LoopLimits};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for heading control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Params {

    /// Loop gains
    pub gains: ControlGains,

    /// Loop limits. The output cap is in volts and the tolerance and integral
    /// band in degrees.
    pub limits: LoopLimits,

    /// Time between two iterations of the loop.
    ///
    /// Units: milliseconds
    #[serde(default = "crate::default_period_ms")]
    pub period_ms: u64,

    #[serde(default)]
    pub derivative_mode: DerivativeMode,

    #[serde(default)]
    pub wrap_policy: WrapPolicy,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// How the raw `target - heading` difference is turned into an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapPolicy {
    /// Use the raw difference. The robot may unwind through several
    /// revolutions if the target and the gyro disagree on the range.
    None,

    /// Wrap the difference into (-180, 180] so the robot always takes the
    /// shortest way round.
    Shortest
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for WrapPolicy {
    fn default() -> Self {
        WrapPolicy::None
    }
}

impl Params {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}
