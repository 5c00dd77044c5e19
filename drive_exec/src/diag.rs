//! # Motion diagnostics
//!
//! Every motion ends with a [`MotionReport`] which is both returned to the
//! caller and pushed to a [`DiagnosticsSink`]. Sinks are fire-and-forget: a
//! sink which fails to record a report only logs a warning.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};
use serde::Serialize;

// Internal
use util::{
    archive::{ArchiveError, Archiver},
    session::Session
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Session-relative path of the motion report archive.
pub const REPORT_ARCH_PATH: &str = "motion_reports.csv";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Summary of one completed motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MotionReport {
    /// Which controller ran the motion
    pub kind: MotionKind,

    /// Running count of motions of this kind, starting at 1
    pub number: u32,

    /// Target of the motion, degrees for turns and encoder ticks for drives
    pub target: f64,

    /// Number of loop iterations run
    pub num_iters: u32,

    /// Error sampled after the stop command
    pub final_error: f64,

    /// Final error minus the error of the last iteration
    pub final_derivative: f64,

    /// Whether the loop converged or hit its iteration cap
    pub outcome: Outcome,
}

/// Sink which logs each report.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

/// Sink which appends each report to a CSV archive in the session.
pub struct ArchiveSink {
    archiver: Archiver
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MotionKind {
    Turn,
    Drive
}

/// How a motion ended.
///
/// Both outcomes stop the robot and return in the same way, this only lets
/// the caller tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    /// The loop reached its convergence condition
    Converged,

    /// The loop ran out of iterations first
    TimedOut
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Destination for motion reports, e.g. a driver display or log.
pub trait DiagnosticsSink {
    fn report(&mut self, report: &MotionReport);
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotionReport {
    pub fn converged(&self) -> bool {
        self.outcome == Outcome::Converged
    }
}

impl DiagnosticsSink for LogSink {
    fn report(&mut self, report: &MotionReport) {
        match report.outcome {
            Outcome::Converged => info!(
                "{:?} #{}: iter {}, error {:.5}, derivative {:.5}",
                report.kind,
                report.number,
                report.num_iters,
                report.final_error,
                report.final_derivative
            ),
            Outcome::TimedOut => warn!(
                "{:?} #{} hit the iteration cap: iter {}, error {:.5}, derivative {:.5}",
                report.kind,
                report.number,
                report.num_iters,
                report.final_error,
                report.final_derivative
            )
        }
    }
}

impl ArchiveSink {
    /// Create a new sink archiving into the given session.
    pub fn new(session: &Session) -> Result<Self, ArchiveError> {
        Ok(Self {
            archiver: Archiver::from_path(session, REPORT_ARCH_PATH)?
        })
    }
}

impl DiagnosticsSink for ArchiveSink {
    fn report(&mut self, report: &MotionReport) {
        if let Err(e) = self.archiver.serialise(report) {
            warn!("Could not archive {:?} report #{}: {}", report.kind, report.number, e);
        }
    }
}

/// Collects reports in memory.
impl DiagnosticsSink for Vec<MotionReport> {
    fn report(&mut self, report: &MotionReport) {
        self.push(*report);
    }
}

/// Fans a report out to several sinks.
impl<A, B> DiagnosticsSink for (A, B)
where
    A: DiagnosticsSink,
    B: DiagnosticsSink
{
    fn report(&mut self, report: &MotionReport) {
        self.0.report(report);
        self.1.report(report);
    }
}
