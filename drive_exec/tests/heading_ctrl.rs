//! Integration tests for the heading controller

use std::time::Duration;

use drive_lib::{
    diag::{MotionKind, MotionReport, Outcome},
    hal::{Clock, DriveActuator, HeadingSensor, Side},
    heading_ctrl::{HeadingCtrl, Params, WrapPolicy},
    pid::{ControlGains, DerivativeMode, LoopLimits},
    sim::{ActuatorEvent, SimParams, SimRobot},
};

// ============================================================================
// HELPERS
// ============================================================================

fn params() -> Params {
    Params {
        gains: ControlGains { k_p: 0.15, k_i: 0.009, k_d: 0.001 },
        limits: LoopLimits {
            output_cap: 8.0,
            integral_band: 16.0,
            convergence_tolerance: 0.5,
            max_iterations: 700,
        },
        period_ms: 15,
        derivative_mode: DerivativeMode::FixedStep,
        wrap_policy: WrapPolicy::None,
    }
}

fn sim_at(initial_heading_deg: f64) -> SimRobot {
    SimRobot::new(SimParams {
        turn_gain: 0.2,
        drive_gain: 5.0,
        response: 1.0,
        initial_heading_deg,
    })
}

/// Replays a fixed heading trace, moving to the next sample on each sleep and
/// holding the last sample once the trace runs out.
struct TraceRobot {
    trace: Vec<f64>,
    idx: usize,
    left: Vec<f64>,
    right: Vec<f64>,
    braked: usize,
}

impl TraceRobot {
    fn new(trace: Vec<f64>) -> Self {
        Self { trace, idx: 0, left: Vec::new(), right: Vec::new(), braked: 0 }
    }
}

impl HeadingSensor for TraceRobot {
    fn heading_deg(&mut self) -> f64 {
        self.trace[self.idx.min(self.trace.len() - 1)]
    }
}

impl DriveActuator for TraceRobot {
    fn apply_voltage(&mut self, side: Side, volts: f64) {
        match side {
            Side::Left => self.left.push(volts),
            Side::Right => self.right.push(volts),
        }
    }

    fn brake_stop(&mut self, _side: Side) {
        self.braked += 1;
    }

    fn coast_stop(&mut self, _side: Side) {
        panic!("A turn must never coast");
    }
}

impl Clock for TraceRobot {
    fn sleep(&mut self, _duration: Duration) {
        self.idx += 1;
    }

    fn elapsed(&self) -> Duration {
        Duration::from_millis(15 * self.idx as u64)
    }
}

// ============================================================================
// CONVERGENCE TESTS
// ============================================================================

#[test]
fn test_turn_90_end_to_end() {
    let mut ctrl = HeadingCtrl::new(params());
    let mut robot = sim_at(0.0);
    let mut reports: Vec<MotionReport> = Vec::new();

    let report = ctrl.turn_to(&mut robot, &mut reports, 90.0);

    assert!(
        robot.heading() >= 89.5 && robot.heading() <= 90.5,
        "Turn ended at {} deg",
        robot.heading()
    );
    assert!(report.num_iters < 700);
    assert_eq!(report.outcome, Outcome::Converged);
    assert_eq!(report.kind, MotionKind::Turn);
    assert_eq!(report.number, 1);
    assert_eq!(report.final_error, 90.0 - robot.heading());

    // Last two actuator calls are brakes on both sides
    let events = robot.events();
    let n = events.len();
    assert_eq!(
        &events[n - 2..],
        &[ActuatorEvent::Brake(Side::Left), ActuatorEvent::Brake(Side::Right)]
    );
    assert_eq!(n, 2 * report.num_iters as usize + 2);

    // The sink got the same report
    assert_eq!(reports, vec![report]);
}

#[test]
fn test_first_commands_saturate() {
    let mut ctrl = HeadingCtrl::new(params());
    let mut robot = sim_at(0.0);

    ctrl.turn_to(&mut robot, &mut Vec::new(), 90.0);

    let left = robot.voltages(Side::Left);
    assert_eq!(left[0], 8.0);
    assert!(left.iter().all(|v| v.abs() <= 8.0));
}

#[test]
fn test_measured_derivative_converges() {
    let mut p = params();
    p.derivative_mode = DerivativeMode::Measured;

    let mut ctrl = HeadingCtrl::new(p);
    let mut robot = sim_at(0.0);

    let report = ctrl.turn_to(&mut robot, &mut Vec::new(), 90.0);

    assert_eq!(report.outcome, Outcome::Converged);
    assert!((robot.heading() - 90.0).abs() <= 0.5);
}

#[test]
fn test_iteration_cap() {
    let mut p = params();
    p.limits.max_iterations = 5;

    let mut ctrl = HeadingCtrl::new(p);
    let mut robot = sim_at(0.0);

    let report = ctrl.turn_to(&mut robot, &mut Vec::new(), 90.0);

    assert_eq!(report.outcome, Outcome::TimedOut);
    assert_eq!(report.num_iters, 5);
    assert!(!report.converged());

    // Gave up but still brakes like a converged turn
    let events = robot.events();
    assert_eq!(events.len(), 12);
    assert_eq!(events[10], ActuatorEvent::Brake(Side::Left));
    assert_eq!(events[11], ActuatorEvent::Brake(Side::Right));
}

#[test]
fn test_already_on_target() {
    let mut ctrl = HeadingCtrl::new(params());
    let mut robot = sim_at(45.2);

    let report = ctrl.turn_to(&mut robot, &mut Vec::new(), 45.0);

    assert_eq!(report.num_iters, 0);
    assert_eq!(report.outcome, Outcome::Converged);
    assert_eq!(
        robot.events(),
        &[ActuatorEvent::Brake(Side::Left), ActuatorEvent::Brake(Side::Right)]
    );
}

// ============================================================================
// SYMMETRY TESTS
// ============================================================================

#[test]
fn test_differential_command() {
    let mut ctrl = HeadingCtrl::new(params());
    let mut robot = sim_at(0.0);

    ctrl.turn_to(&mut robot, &mut Vec::new(), 60.0);

    let left = robot.voltages(Side::Left);
    let right = robot.voltages(Side::Right);

    assert_eq!(left.len(), right.len());
    for (l, r) in left.iter().zip(right.iter()) {
        assert_eq!(*l, -*r);
    }
}

#[test]
fn test_mirrored_target_mirrors_commands() {
    let mut pos_robot = sim_at(0.0);
    let mut neg_robot = sim_at(0.0);

    HeadingCtrl::new(params()).turn_to(&mut pos_robot, &mut Vec::new(), 90.0);
    HeadingCtrl::new(params()).turn_to(&mut neg_robot, &mut Vec::new(), -90.0);

    for &side in Side::BOTH.iter() {
        let pos = pos_robot.voltages(side);
        let neg = neg_robot.voltages(side);

        assert_eq!(pos.len(), neg.len());
        for (p, n) in pos.iter().zip(neg.iter()) {
            assert_eq!(*p, -*n);
        }
    }

    assert_eq!(pos_robot.heading(), -neg_robot.heading());
}

#[test]
fn test_negated_trace_negates_commands() {
    let trace = vec![0.0, 5.0, 12.0, 20.0, 26.0, 29.8];
    let neg_trace = trace.iter().map(|h| -h).collect();

    let mut pos_robot = TraceRobot::new(trace);
    let mut neg_robot = TraceRobot::new(neg_trace);

    let pos_report = HeadingCtrl::new(params()).turn_to(&mut pos_robot, &mut Vec::new(), 30.0);
    let neg_report = HeadingCtrl::new(params()).turn_to(&mut neg_robot, &mut Vec::new(), -30.0);

    assert_eq!(pos_report.num_iters, 5);
    assert_eq!(neg_report.num_iters, 5);
    assert_eq!(pos_robot.braked, 2);

    for i in 0..5 {
        assert_eq!(pos_robot.left[i], -neg_robot.left[i]);
        assert_eq!(pos_robot.right[i], -neg_robot.right[i]);
        assert_eq!(pos_robot.left[i], -pos_robot.right[i]);
    }

    assert_eq!(pos_report.final_error, -neg_report.final_error);
}

// ============================================================================
// WRAP POLICY TESTS
// ============================================================================

#[test]
fn test_no_wrap_unwinds() {
    let mut ctrl = HeadingCtrl::new(params());
    let mut robot = sim_at(350.0);

    let report = ctrl.turn_to(&mut robot, &mut Vec::new(), 10.0);

    // The raw error is -340 so the robot turns the long way round
    assert_eq!(report.outcome, Outcome::Converged);
    assert!((robot.heading() - 10.0).abs() <= 0.5);
    assert!(robot.voltages(Side::Left)[0] < 0.0);
}

#[test]
fn test_shortest_wrap() {
    let mut p = params();
    p.wrap_policy = WrapPolicy::Shortest;

    let mut ctrl = HeadingCtrl::new(p);
    let mut robot = sim_at(350.0);

    let wrapped = ctrl.turn_to(&mut robot, &mut Vec::new(), 10.0);

    // Crosses 360 going forwards, 20 degrees instead of 340
    assert_eq!(wrapped.outcome, Outcome::Converged);
    assert!((robot.heading() - 370.0).abs() <= 0.5);
    assert!(robot.voltages(Side::Left)[0] > 0.0);

    let unwrapped = HeadingCtrl::new(params())
        .turn_to(&mut sim_at(350.0), &mut Vec::new(), 10.0);
    assert!(wrapped.num_iters < unwrapped.num_iters);
}

// ============================================================================
// RELATIVE TURN TESTS
// ============================================================================

#[test]
fn test_relative_turns_accumulate() {
    let mut ctrl = HeadingCtrl::new(params());
    let mut robot = sim_at(0.0);
    let mut reports: Vec<MotionReport> = Vec::new();

    ctrl.turn_by(&mut robot, &mut reports, 45.0);
    ctrl.turn_by(&mut robot, &mut reports, 45.0);

    assert_eq!(ctrl.num_turns(), 2);
    assert_eq!(ctrl.commanded_heading_deg(), 90.0);
    assert!((robot.heading() - 90.0).abs() <= 0.5);

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].target, 45.0);
    assert_eq!(reports[1].target, 90.0);
    assert_eq!(reports[1].number, 2);
}

#[test]
fn test_absolute_turn_rebases_relative() {
    let mut ctrl = HeadingCtrl::new(params());
    let mut robot = sim_at(0.0);

    ctrl.turn_to(&mut robot, &mut Vec::new(), 90.0);
    let report = ctrl.turn_by(&mut robot, &mut Vec::new(), -30.0);

    assert_eq!(report.target, 60.0);
    assert!((robot.heading() - 60.0).abs() <= 0.5);
}
