//! # Logger
//!
//! Every line goes to both stdout and the session's log file, stamped with
//! the seconds elapsed since the session epoch. The two outputs filter
//! independently: a tuning run usually keeps stdout at `Debug` (one line per
//! motion) while the file keeps every `Trace` line of every loop iteration.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use colored::{ColoredString, Colorize};
use log::{info, Level, Record};
use thiserror::Error;

// Internal
use crate::session::{self, Session};

pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Minimum levels of the two log outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLevels {
    pub stdout: LevelFilter,
    pub file: LevelFilter,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Log output {0} must keep at least `INFO` lines, found `{1}`")]
    LevelTooQuiet(&'static str, LevelFilter),

    #[error("Could not open the session log file: {0}")]
    LogFileError(std::io::Error),

    #[error("A logger has already been set: {0}")]
    AlreadySet(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LogLevels {
    /// Full trace in the file, the given level on stdout.
    pub fn with_stdout(stdout: LevelFilter) -> Self {
        Self {
            stdout,
            file: LevelFilter::Trace,
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the global logger for this session.
///
/// Can only succeed once per process, later calls return
/// [`LoggerInitError::AlreadySet`].
pub fn logger_init(levels: LogLevels, session: &Session) -> Result<(), LoggerInitError> {
    check_level("stdout", levels.stdout)?;
    check_level("file", levels.file)?;

    let log_file = fern::log_file(&session.log_file_path)
        .map_err(LoggerInitError::LogFileError)?;

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("{} {}", prefix(record), message))
        })
        .level(levels.stdout.max(levels.file))
        .chain(
            fern::Dispatch::new()
                .level(levels.stdout)
                .chain(std::io::stdout())
        )
        .chain(
            fern::Dispatch::new()
                .level(levels.file)
                .chain(log_file)
        )
        .apply()
        .map_err(LoggerInitError::AlreadySet)?;

    info!("Logging initialised");
    if let Ok(epoch) = session::get_epoch() {
        info!("    Session epoch: {}", epoch);
    }
    info!("    stdout level: {:?}, file level: {:?}", levels.stdout, levels.file);
    info!("    Log file: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn check_level(output: &'static str, level: LevelFilter) -> Result<(), LoggerInitError> {
    match level < Level::Info {
        true => Err(LoggerInitError::LevelTooQuiet(output, level)),
        false => Ok(())
    }
}

/// Line prefix, the module path is only shown on debug and trace lines.
fn prefix(record: &Record) -> String {
    let tag = level_tag(record.level());
    let elapsed = session::get_elapsed_seconds();

    match record.level() > Level::Info {
        true => format!("[{:10.6} {}] {}:", elapsed, tag, record.target()),
        false => format!("[{:10.6} {}]", elapsed, tag)
    }
}

fn level_tag(level: Level) -> ColoredString {
    match level {
        Level::Trace => "TRC".dimmed().italic(),
        Level::Debug => "DBG".dimmed(),
        Level::Info  => "INF".normal(),
        Level::Warn  => "WRN".yellow(),
        Level::Error => "ERR".red().bold()
    }
}
