//! # Simulated robot
//!
//! A differential drive robot with a first-order lag between the voltage
//! demand on each side and that side's velocity. The model advances by one
//! step on each call to [`Clock::sleep`], which the controllers call once per
//! iteration:
//!
//! ```text
//! v[side]     += response * (demand[side] - v[side])
//! heading     += turn_gain * (v[left] - v[right]) / 2
//! pos[side]   += drive_gain * v[side]
//! ```
//!
//! With `response = 1` the heading reduces to
//! `heading[n+1] = heading[n] + turn_gain * command[n]` during a turn.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::thread;
use std::time::Duration;
use serde::{Deserialize, Serialize};

// Internal
use crate::hal::{Clock, DriveActuator, DriveEncoders, HeadingSensor, Side};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Constants of the simulated robot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimParams {
    /// Heading change per step per volt of differential demand.
    ///
    /// Units: degrees/volt
    pub turn_gain: f64,

    /// Encoder change per step per volt.
    ///
    /// Units: raw encoder units/volt
    pub drive_gain: f64,

    /// Fraction of the gap between demand and velocity closed each step.
    /// Must be in (0, 1].
    #[serde(default = "default_response")]
    pub response: f64,

    /// Gyro heading at start up.
    ///
    /// Units: degrees
    #[serde(default)]
    pub initial_heading_deg: f64,
}

/// Simulated robot implementing every hardware trait.
#[derive(Debug, Clone)]
pub struct SimRobot {
    params: SimParams,

    heading_deg: f64,

    pos: [f64; 2],

    demand_v: [f64; 2],

    vel: [f64; 2],

    elapsed: Duration,

    /// If set, sleeping also blocks the calling thread.
    realtime: bool,

    events: Vec<ActuatorEvent>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An actuator call received by the simulated robot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActuatorEvent {
    Voltage(Side, f64),
    Brake(Side),
    Coast(Side),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimRobot {
    pub fn new(params: SimParams) -> Self {
        Self {
            heading_deg: params.initial_heading_deg,
            params,
            pos: [0.0; 2],
            demand_v: [0.0; 2],
            vel: [0.0; 2],
            elapsed: Duration::from_secs(0),
            realtime: false,
            events: Vec::new(),
        }
    }

    /// Make [`Clock::sleep`] block in wall-clock time as well.
    pub fn with_realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    /// Current true heading.
    pub fn heading(&self) -> f64 {
        self.heading_deg
    }

    /// Current raw encoder position of a side.
    pub fn position(&self, side: Side) -> f64 {
        self.pos[side.index()]
    }

    /// All actuator calls received so far, oldest first.
    pub fn events(&self) -> &[ActuatorEvent] {
        &self.events
    }

    /// Voltage demands sent to one side, oldest first.
    pub fn voltages(&self, side: Side) -> Vec<f64> {
        self.events
            .iter()
            .filter_map(|e| match *e {
                ActuatorEvent::Voltage(s, v) if s == side => Some(v),
                _ => None
            })
            .collect()
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Advance the model by one step.
    fn step(&mut self) {
        for i in 0..2 {
            self.vel[i] += self.params.response * (self.demand_v[i] - self.vel[i]);
        }

        self.heading_deg += self.params.turn_gain * (self.vel[0] - self.vel[1]) / 2.0;

        for i in 0..2 {
            self.pos[i] += self.params.drive_gain * self.vel[i];
        }
    }
}

impl HeadingSensor for SimRobot {
    fn heading_deg(&mut self) -> f64 {
        self.heading_deg
    }
}

impl DriveEncoders for SimRobot {
    fn position_ticks(&mut self, side: Side) -> f64 {
        self.pos[side.index()]
    }

    fn reset_position(&mut self, side: Side) {
        self.pos[side.index()] = 0.0;
    }
}

impl DriveActuator for SimRobot {
    fn apply_voltage(&mut self, side: Side, volts: f64) {
        self.demand_v[side.index()] = volts;
        self.events.push(ActuatorEvent::Voltage(side, volts));
    }

    fn brake_stop(&mut self, side: Side) {
        self.demand_v[side.index()] = 0.0;
        self.vel[side.index()] = 0.0;
        self.events.push(ActuatorEvent::Brake(side));
    }

    fn coast_stop(&mut self, side: Side) {
        self.demand_v[side.index()] = 0.0;
        self.events.push(ActuatorEvent::Coast(side));
    }
}

impl Clock for SimRobot {
    fn sleep(&mut self, duration: Duration) {
        if self.realtime {
            thread::sleep(duration);
        }

        self.elapsed += duration;
        self.step();
    }

    fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

fn default_response() -> f64 {
    1.0
}

#[cfg(test)]
mod test {
    use super::*;

    fn sim(response: f64) -> SimRobot {
        SimRobot::new(SimParams {
            turn_gain: 0.2,
            drive_gain: 5.0,
            response,
            initial_heading_deg: 0.0,
        })
    }

    #[test]
    fn test_turn_step() {
        let mut s = sim(1.0);
        s.apply_voltage(Side::Left, 8.0);
        s.apply_voltage(Side::Right, -8.0);
        s.sleep(Duration::from_millis(15));

        assert!((s.heading() - 1.6).abs() < 1e-12);
        assert_eq!(s.position(Side::Left), 40.0);
        assert_eq!(s.position(Side::Right), -40.0);
        assert_eq!(s.elapsed(), Duration::from_millis(15));
    }

    #[test]
    fn test_lag() {
        let mut s = sim(0.5);
        s.apply_voltage(Side::Left, 4.0);
        s.apply_voltage(Side::Right, 4.0);
        s.sleep(Duration::from_millis(15));
        assert_eq!(s.position(Side::Left), 10.0);
        s.sleep(Duration::from_millis(15));
        assert_eq!(s.position(Side::Left), 25.0);

        // Heading is untouched by a straight drive
        assert_eq!(s.heading(), 0.0);
    }

    #[test]
    fn test_brake_and_coast() {
        let mut s = sim(0.5);
        s.apply_voltage(Side::Left, 4.0);
        s.apply_voltage(Side::Right, 4.0);
        s.sleep(Duration::from_millis(15));

        s.brake_stop(Side::Left);
        s.coast_stop(Side::Right);
        s.sleep(Duration::from_millis(15));

        // Braked side holds, coasting side keeps rolling at half speed
        assert_eq!(s.position(Side::Left), 10.0);
        assert_eq!(s.position(Side::Right), 15.0);

        assert_eq!(
            &s.events()[2..],
            &[ActuatorEvent::Brake(Side::Left), ActuatorEvent::Coast(Side::Right)]
        );
    }
}
