//! # Heading control module
//!
//! Turns the robot in place to a gyro heading. The PID command is applied as
//! `+command` volts on the left side and `-command` volts on the right side,
//! so the robot pivots about its centre. Once the loop exits both sides are
//! brake-stopped, since coasting out of a turn overshoots.

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
    hal::{Clock, DriveActuator, HeadingSensor, Side},
    pid::{LoopState, PidLoop},
};
use util::maths::wrap_180_deg;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Heading controller.
///
/// Only the motion counter and the commanded heading carry over between
/// calls; every turn starts from a zeroed [`LoopState`].
#[derive(Debug, Clone)]
pub struct HeadingCtrl {
    params: Params,

    pid: PidLoop,

    /// Number of turns started so far
    num_turns: u32,

    /// Target of the most recent turn, used as the base of relative turns.
    ///
    /// Units: degrees
    commanded_heading_deg: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl HeadingCtrl {

    /// Create a new heading controller from its parameters.
    pub fn new(params: Params) -> Self {
        Self {
            pid: PidLoop::new(params.gains, params.limits)
                .with_derivative_mode(params.derivative_mode),
            params,
            num_turns: 0,
            commanded_heading_deg: 0.0,
        }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Number of turns run by this controller.
    pub fn num_turns(&self) -> u32 {
        self.num_turns
    }

    /// Target of the most recent turn.
    pub fn commanded_heading_deg(&self) -> f64 {
        self.commanded_heading_deg
    }

    /// Turn relative to the last commanded heading (not the measured one), so
    /// that errors don't accumulate over a sequence of relative turns.
    pub fn turn_by<R, S>(&mut self, robot: &mut R, sink: &mut S, delta_deg: f64) -> MotionReport
    where
        R: HeadingSensor + DriveActuator + Clock,
        S: DiagnosticsSink + ?Sized
    {
        let target_deg = self.commanded_heading_deg + delta_deg;
        self.turn_to(robot, sink, target_deg)
    }

    /// Turn to an absolute heading.
    ///
    /// Runs until the heading error is within tolerance or the iteration cap
    /// is reached, then brakes both sides and reports. Reaching the cap is
    /// not an error, the returned report's outcome says which case happened.
    pub fn turn_to<R, S>(&mut self, robot: &mut R, sink: &mut S, target_deg: f64) -> MotionReport
    where
        R: HeadingSensor + DriveActuator + Clock,
        S: DiagnosticsSink + ?Sized
    {
        self.num_turns += 1;
        self.commanded_heading_deg = target_deg;

        let mut state = LoopState::default();
        let mut last_sample_s: Option<f64> = None;
        let mut error = self.heading_error(robot, target_deg);

        debug!(
            "Turn #{} to {:.2} deg, initial error {:.2} deg",
            self.num_turns,
            target_deg,
            error
        );

        while self.pid.should_continue(error, &state) {
            let now_s = robot.elapsed().as_secs_f64();
            let dt_s = last_sample_s.map(|t| now_s - t);
            last_sample_s = Some(now_s);

            let (command, next) = self.pid.step(&state, error, dt_s);
            state = next;

            trace!(
                "iter {}: error {:.4}, deriv {:.4}, integral {:.4}, cmd {:.4} V",
                state.num_iters,
                state.error,
                state.derivative,
                state.integral,
                command
            );

            robot.apply_voltage(Side::Left, command);
            robot.apply_voltage(Side::Right, -command);

            robot.sleep(self.params.period());

            error = self.heading_error(robot, target_deg);
        }

        let outcome = match self.pid.is_converged(error) {
            true => Outcome::Converged,
            false => Outcome::TimedOut
        };

        for &side in Side::BOTH.iter() {
            robot.brake_stop(side);
        }

        let final_error = self.heading_error(robot, target_deg);

        let report = MotionReport {
            kind: MotionKind::Turn,
            number: self.num_turns,
            target: target_deg,
            num_iters: state.num_iters,
            final_error,
            final_derivative: final_error - state.error,
            outcome,
        };

        sink.report(&report);

        report
    }

    /// Sample the gyro and get the error to the target under the configured
    /// wrap policy.
    fn heading_error<R: HeadingSensor>(&self, robot: &mut R, target_deg: f64) -> f64 {
        let raw = target_deg - robot.heading_deg();

        match self.params.wrap_policy {
            WrapPolicy::None => raw,
            WrapPolicy::Shortest => wrap_180_deg(raw)
        }
    }
}
