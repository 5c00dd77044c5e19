//! # Robot parameters
//!
//! One parameter file describes one robot: the tuned heading and distance
//! loops plus the constants of its simulated counterpart. Files live in the
//! `params` directory and are loaded through [`util::params`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::{distance_ctrl, heading_ctrl, pid::LoopLimits, sim::SimParams};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Per-robot configuration record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RobotParams {
    /// Heading (turn) loop parameters
    pub heading: heading_ctrl::Params,

    /// Distance (drive) loop parameters
    pub distance: distance_ctrl::Params,

    /// Simulated robot constants
    pub sim: SimParams,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors raised while loading or checking robot parameters.
#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("Could not load the robot parameters: {0}")]
    Load(#[from] util::params::LoadError),

    #[error("Invalid {ctrl} parameter `{name}`: {reason}")]
    Invalid {
        ctrl: &'static str,
        name: &'static str,
        reason: &'static str
    }
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RobotParams {

    /// Load and validate a parameter file from the `params` directory.
    pub fn load(param_file_path: &str) -> Result<Self, ParamsError> {
        let params: Self = util::params::load(param_file_path)?;
        params.validate()?;
        Ok(params)
    }

    /// Load and validate a parameter file from an explicit path.
    pub fn load_path<P: AsRef<Path>>(path: P) -> Result<Self, ParamsError> {
        let params: Self = util::params::load_path(path)?;
        params.validate()?;
        Ok(params)
    }

    /// Check that the parameters describe loops that can run.
    ///
    /// An integral band no wider than the convergence tolerance is allowed
    /// (the integral then never engages) but logged as a warning.
    pub fn validate(&self) -> Result<(), ParamsError> {
        check_limits("heading", &self.heading.limits)?;
        check_limits("distance", &self.distance.limits)?;

        if self.heading.period_ms == 0 {
            return Err(invalid("heading", "period_ms", "must be non-zero"));
        }
        if self.distance.period_ms == 0 {
            return Err(invalid("distance", "period_ms", "must be non-zero"));
        }

        let geometry = &self.distance.geometry;
        if !is_positive(geometry.wheel_circumference) {
            return Err(invalid("distance", "wheel_circumference", "must be positive"));
        }
        if !is_positive(geometry.ticks_per_revolution) {
            return Err(invalid("distance", "ticks_per_revolution", "must be positive"));
        }
        if !is_positive(geometry.encoder_scale) {
            return Err(invalid("distance", "encoder_scale", "must be positive"));
        }

        if !(self.sim.response > 0.0 && self.sim.response <= 1.0) {
            return Err(invalid("sim", "response", "must be in (0, 1]"));
        }

        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn check_limits(ctrl: &'static str, limits: &LoopLimits) -> Result<(), ParamsError> {
    if !is_positive(limits.output_cap) {
        return Err(invalid(ctrl, "output_cap", "must be positive"));
    }
    if !(limits.integral_band >= 0.0) {
        return Err(invalid(ctrl, "integral_band", "must not be negative"));
    }
    if !(limits.convergence_tolerance >= 0.0) {
        return Err(invalid(ctrl, "convergence_tolerance", "must not be negative"));
    }
    if limits.max_iterations == 0 {
        return Err(invalid(ctrl, "max_iterations", "must be non-zero"));
    }

    if limits.integral_band <= limits.convergence_tolerance {
        warn!(
            "{} integral band ({}) is not wider than the convergence tolerance ({}), \
             the integral term will never engage",
            ctrl,
            limits.integral_band,
            limits.convergence_tolerance
        );
    }

    Ok(())
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn invalid(ctrl: &'static str, name: &'static str, reason: &'static str) -> ParamsError {
    ParamsError::Invalid { ctrl, name, reason }
}
