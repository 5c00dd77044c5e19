//! # Distance control module
//!
//! Drives the robot in a straight line for a given distance. Both encoders
//! are re-zeroed at the start of each drive, the requested distance is
//! converted into an unsigned tick target, and the same PID command is sent
//! to both sides, negated for a negative (reverse) distance. Once the loop
//! exits both sides are coast-stopped.
//!
//! The loop keeps running while the scaled reading is short of the target,
//! or short of it by more than the slack band (the convergence tolerance).
//! Both tests are signed, so the first sample at or past the target ends the
//! drive. An overshoot is accepted as is and never driven back.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace};

// Internal
pub use params::*;
use crate::{
    diag::{DiagnosticsSink, MotionKind, MotionReport, Outcome},
    hal::{Clock, DriveActuator, DriveEncoders, Side},
    pid::{LoopState, PidLoop},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Distance controller.
#[derive(Debug, Clone)]
pub struct DistanceCtrl {
    params: Params,

    pid: PidLoop,

    /// Number of drives started so far
    num_drives: u32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DistanceCtrl {

    /// Create a new distance controller from its parameters.
    pub fn new(params: Params) -> Self {
        Self {
            pid: PidLoop::new(params.gains, params.limits)
                .with_derivative_mode(params.derivative_mode),
            params,
            num_drives: 0,
        }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Number of drives run by this controller.
    pub fn num_drives(&self) -> u32 {
        self.num_drives
    }

    /// Drive a signed distance, forwards if positive and backwards if
    /// negative.
    ///
    /// The direction is fixed from the sign of `distance` when the call
    /// starts. As for turns, hitting the iteration cap is reported through
    /// the outcome rather than as an error.
    pub fn drive<R, S>(&mut self, robot: &mut R, sink: &mut S, distance: f64) -> MotionReport
    where
        R: DriveEncoders + DriveActuator + Clock,
        S: DiagnosticsSink + ?Sized
    {
        self.num_drives += 1;

        for &side in Side::BOTH.iter() {
            robot.reset_position(side);
        }

        let target_ticks = self.params.geometry.distance_to_ticks(distance);
        let direction = if distance < 0.0 { -1.0 } else { 1.0 };

        debug!(
            "Drive #{} for {:.2} ({:.1} ticks)",
            self.num_drives,
            distance,
            target_ticks
        );

        let mut state = LoopState::default();
        let mut last_sample_s: Option<f64> = None;
        let mut error = self.distance_error(robot, target_ticks);

        while self.should_continue(error, &state) {
            let now_s = robot.elapsed().as_secs_f64();
            let dt_s = last_sample_s.map(|t| now_s - t);
            last_sample_s = Some(now_s);

            let (command, next) = self.pid.step(&state, error, dt_s);
            state = next;

            trace!(
                "iter {}: error {:.3}, deriv {:.3}, integral {:.3}, cmd {:.4} V",
                state.num_iters,
                state.error,
                state.derivative,
                state.integral,
                command
            );

            for &side in Side::BOTH.iter() {
                robot.apply_voltage(side, direction * command);
            }

            robot.sleep(self.params.period());

            error = self.distance_error(robot, target_ticks);
        }

        let outcome = match self.is_settled(error) {
            true => Outcome::Converged,
            false => Outcome::TimedOut
        };

        for &side in Side::BOTH.iter() {
            robot.coast_stop(side);
        }

        let final_error = self.distance_error(robot, target_ticks);

        let report = MotionReport {
            kind: MotionKind::Drive,
            number: self.num_drives,
            target: target_ticks,
            num_iters: state.num_iters,
            final_error,
            final_derivative: final_error - state.error,
            outcome,
        };

        sink.report(&report);

        report
    }

    /// Whether the loop should run another iteration for the given remaining
    /// tick count.
    fn should_continue(&self, remaining: f64, state: &LoopState) -> bool {
        !self.is_settled(remaining)
            && state.num_iters < self.pid.limits().max_iterations
    }

    /// The reading has reached or passed the target.
    fn is_settled(&self, remaining: f64) -> bool {
        let slack = self.pid.limits().convergence_tolerance;

        !(remaining > 0.0 || remaining > slack)
    }

    /// Sample the configured encoder and get the remaining ticks.
    fn distance_error<R: DriveEncoders>(&self, robot: &mut R, target_ticks: f64) -> f64 {
        let geometry = &self.params.geometry;
        let raw = robot.position_ticks(geometry.encoder_side);

        target_ticks - geometry.scale_reading(raw)
    }
}
