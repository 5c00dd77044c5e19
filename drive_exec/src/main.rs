//! Drive tuning executable entry point.
//!
//! # Usage
//!
//! Runs a single motion against the simulated robot described by a robot
//! parameter file and reports the loop's diagnostics:
//!
//! ```text
//! drive_exec [--robot robot_2022.toml] [--realtime] [-v] turn <deg>
//! drive_exec [--robot robot_2022.toml] [--realtime] [-v] turn-by <deg>
//! drive_exec [--robot robot_2022.toml] [--realtime] [-v] drive <distance>
//! ```
//!
//! This mirrors the tuning procedure for the loops: run a motion, read back
//! the iteration count, final error and derivative, adjust the parameter file
//! and repeat. The report is also archived to the session's
//! `arch/motion_reports.csv`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{Report, eyre::WrapErr};
use log::{debug, info};
use structopt::{clap::AppSettings, StructOpt};

// Internal
use drive_lib::{
    diag::{ArchiveSink, LogSink},
    distance_ctrl::DistanceCtrl,
    hal::Side,
    heading_ctrl::HeadingCtrl,
    params::RobotParams,
    sim::SimRobot,
};
use util::{
    logger::{logger_init, LevelFilter, LogLevels},
    session::Session,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(
    name = "drive_exec",
    about = "Run a PID motion against the simulated robot and report the loop diagnostics"
)]
struct Opt {
    /// Robot parameter file, relative to the params directory
    #[structopt(short, long, default_value = "robot_2022.toml")]
    robot: String,

    /// Pace the simulation in wall-clock time
    #[structopt(long)]
    realtime: bool,

    /// Print every loop iteration, not just the per-motion lines
    #[structopt(short, long)]
    verbose: bool,

    #[structopt(subcommand)]
    motion: Motion,
}

#[derive(Debug, StructOpt)]
enum Motion {
    /// Turn to an absolute heading in degrees
    #[structopt(setting = AppSettings::AllowNegativeNumbers)]
    Turn { target_deg: f64 },

    /// Turn by a relative angle in degrees
    #[structopt(setting = AppSettings::AllowNegativeNumbers)]
    TurnBy { delta_deg: f64 },

    /// Drive a signed distance, negative drives in reverse
    #[structopt(setting = AppSettings::AllowNegativeNumbers)]
    Drive { distance: f64 },
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("drive_exec", &opt.robot)
        .wrap_err("Failed to create the session")?;

    // Initialise logger, the log file always keeps every loop iteration
    let stdout_level = match opt.verbose {
        true => LevelFilter::Trace,
        false => LevelFilter::Debug
    };
    logger_init(LogLevels::with_stdout(stdout_level), &session)
        .wrap_err("Failed to initialise logging")?;

    info!("PID Drive Tuning Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opt);

    // ---- LOAD PARAMETERS ----

    let params = RobotParams::load(&opt.robot)
        .wrap_err_with(|| format!("Could not load robot params from {}", opt.robot))?;

    info!("Robot parameters loaded from {}", opt.robot);
    debug!("{:#?}", params);

    // ---- INITIALISE ----

    let mut robot = SimRobot::new(params.sim).with_realtime(opt.realtime);
    let mut heading_ctrl = HeadingCtrl::new(params.heading);
    let mut distance_ctrl = DistanceCtrl::new(params.distance);

    let archive_sink = ArchiveSink::new(&session)
        .wrap_err("Failed to initialise the motion report archive")?;
    let mut sink = (LogSink, archive_sink);

    // ---- RUN ----

    let report = match opt.motion {
        Motion::Turn { target_deg } =>
            heading_ctrl.turn_to(&mut robot, &mut sink, target_deg),
        Motion::TurnBy { delta_deg } =>
            heading_ctrl.turn_by(&mut robot, &mut sink, delta_deg),
        Motion::Drive { distance } =>
            distance_ctrl.drive(&mut robot, &mut sink, distance),
    };

    info!(
        "Simulated robot finished at heading {:.3} deg, left {:.1}, right {:.1}",
        robot.heading(),
        robot.position(Side::Left),
        robot.position(Side::Right)
    );
    info!("Outcome: {:?} after {} iterations", report.outcome, report.num_iters);

    // ---- SHUTDOWN ----

    info!("End of execution");

    Ok(())
}
