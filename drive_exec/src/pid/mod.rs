//! # PID loop module
//!
//! This module provides the single PID iteration shared by the heading and
//! distance controllers. It holds no state of its own: the caller owns a
//! [`LoopState`] for the duration of one motion, passes it in each iteration
//! and gets the updated copy back alongside the actuator command.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use util::maths::clamp_abs;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Proportional, integral and derivative weights of a loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlGains {
    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Derivative gain
    pub k_d: f64,
}

/// Output and termination limits of a loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopLimits {
    /// Maximum magnitude of the actuator command.
    ///
    /// Units: volts
    pub output_cap: f64,

    /// The integral only accumulates while `|error|` is strictly below this
    /// band, and is reset to zero outside of it.
    pub integral_band: f64,

    /// Error magnitude at or below which the target is considered reached.
    pub convergence_tolerance: f64,

    /// Hard cap on the number of iterations of one motion.
    pub max_iterations: u32,
}

/// Per-motion state of a loop.
///
/// Zeroed at the start of each motion and dropped at the end of it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LoopState {
    /// Error used in the most recent iteration
    pub error: f64,

    /// Error used in the iteration before the most recent one
    pub prev_error: f64,

    /// Derivative computed in the most recent iteration
    pub derivative: f64,

    /// The integral accumulation
    pub integral: f64,

    /// Number of iterations run so far
    pub num_iters: u32,
}

/// One PID iteration with fixed gains and limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidLoop {
    gains: ControlGains,
    limits: LoopLimits,
    derivative_mode: DerivativeMode,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// How the derivative term is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivativeMode {
    /// `error - prev_error`, relying on the control period being constant.
    FixedStep,

    /// `(error - prev_error) / dt` with `dt` measured in seconds between
    /// samples. Falls back to the fixed step difference when no `dt` is
    /// available (first iteration of a motion).
    Measured,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for DerivativeMode {
    fn default() -> Self {
        DerivativeMode::FixedStep
    }
}

impl PidLoop {

    /// Create a new loop with a fixed step derivative.
    pub fn new(gains: ControlGains, limits: LoopLimits) -> Self {
        Self {
            gains,
            limits,
            derivative_mode: DerivativeMode::FixedStep,
        }
    }

    /// Set the derivative mode used by this loop.
    pub fn with_derivative_mode(mut self, derivative_mode: DerivativeMode) -> Self {
        self.derivative_mode = derivative_mode;
        self
    }

    pub fn gains(&self) -> &ControlGains {
        &self.gains
    }

    pub fn limits(&self) -> &LoopLimits {
        &self.limits
    }

    /// Run one iteration for the given error.
    ///
    /// `dt_s` is the time since the previous sample, only consumed in
    /// [`DerivativeMode::Measured`].
    ///
    /// Returns the saturated actuator command and the updated state. The
    /// input state is not modified.
    pub fn step(&self, state: &LoopState, error: f64, dt_s: Option<f64>) -> (f64, LoopState) {

        let delta = error - state.error;

        let derivative = match (self.derivative_mode, dt_s) {
            (DerivativeMode::Measured, Some(dt)) if dt > 0.0 => delta / dt,
            _ => delta
        };

        // Only accumulate close to the target. Outside the band (or exactly
        // on target) the integral is dropped entirely rather than frozen.
        let integral = if error != 0.0 && error.abs() < self.limits.integral_band {
            state.integral + error
        }
        else {
            0.0
        };

        let command = clamp_abs(
            error * self.gains.k_p
                + derivative * self.gains.k_d
                + integral * self.gains.k_i,
            self.limits.output_cap
        );

        let next = LoopState {
            error,
            prev_error: state.error,
            derivative,
            integral,
            num_iters: state.num_iters + 1,
        };

        (command, next)
    }

    /// Termination test evaluated before each iteration: keep going while
    /// the error is outside tolerance and the iteration cap isn't reached.
    pub fn should_continue(&self, error: f64, state: &LoopState) -> bool {
        !self.is_converged(error) && state.num_iters < self.limits.max_iterations
    }

    /// Whether the error is within the convergence tolerance.
    pub fn is_converged(&self, error: f64) -> bool {
        error.abs() <= self.limits.convergence_tolerance
    }
}
