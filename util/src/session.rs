//! # Sessions
//!
//! A session is one run of an executable. It owns a timestamped directory
//! under `<sw_root>/sessions/` holding the run's log file and an `arch`
//! directory for CSV archives, and fixes the process-wide epoch used to
//! timestamp log lines.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use chrono::{DateTime, Utc};
use conquer_once::OnceCell;
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

// Internal
use crate::{host, time};

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

static SESSION_EPOCH: OnceCell<DateTime<Utc>> = OnceCell::uninit();

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Directory holding all sessions, relative to the software root.
pub const SESSIONS_DIR: &str = "sessions";

/// Name of the archive directory inside a session.
pub const ARCH_DIR: &str = "arch";

/// Timestamp used in session directory names, e.g. `20221104_153012`.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Session {
    /// `<sw_root>/sessions/<exec>_<tag>_<timestamp>`
    pub session_root: PathBuf,

    /// Archive directory of the session
    pub arch_root: PathBuf,

    /// `<session_root>/<exec>.log`
    pub log_file_path: PathBuf,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("The software root is not set ({} missing)", host::SW_ROOT_ENV_VAR)]
    SwRootNotSet,

    #[error("Could not create {0:?}: {1}")]
    CannotCreateDir(PathBuf, std::io::Error),

    #[error("A session has already been started in this process")]
    AlreadyStarted,

    #[error("No session has been started in this process")]
    NotStarted,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Session {
    /// Start the session of this process.
    ///
    /// `tag` identifies what the run is about (e.g. the robot parameter file)
    /// and is sanitised into the directory name. Only one session can be
    /// started per process.
    pub fn new(exec_name: &str, tag: &str) -> Result<Self, SessionError> {
        let root = host::get_sw_root().map_err(|_| SessionError::SwRootNotSet)?;

        SESSION_EPOCH
            .try_init_once(Utc::now)
            .map_err(|_| SessionError::AlreadyStarted)?;
        let epoch = get_epoch()?;

        let session_root = root
            .join(SESSIONS_DIR)
            .join(session_dir_name(exec_name, tag, epoch));
        let arch_root = session_root.join(ARCH_DIR);

        create_dir(&session_root)?;
        create_dir(&arch_root)?;

        Ok(Session {
            log_file_path: session_root.join(format!("{}.log", exec_name)),
            session_root,
            arch_root,
        })
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Seconds elapsed since the session epoch, or `NaN` before the session has
/// started.
pub fn get_elapsed_seconds() -> f64 {
    match SESSION_EPOCH.get() {
        Some(epoch) => time::duration_to_seconds(Utc::now() - *epoch)
            .unwrap_or(std::f64::NAN),
        None => std::f64::NAN,
    }
}

pub fn get_epoch() -> Result<&'static DateTime<Utc>, SessionError> {
    SESSION_EPOCH.get().ok_or(SessionError::NotStarted)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn create_dir(path: &Path) -> Result<(), SessionError> {
    fs::create_dir_all(path).map_err(|e| SessionError::CannotCreateDir(path.to_path_buf(), e))
}

/// Build `<exec>_<tag>_<timestamp>`, dropping any tag extension and replacing
/// characters which are awkward in a path.
fn session_dir_name(exec_name: &str, tag: &str, epoch: &DateTime<Utc>) -> String {
    let stem = Path::new(tag)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(tag);

    let clean: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();

    match clean.is_empty() {
        true => format!("{}_{}", exec_name, epoch.format(TIMESTAMP_FORMAT)),
        false => format!("{}_{}_{}", exec_name, clean, epoch.format(TIMESTAMP_FORMAT))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_session_dir_name() {
        let epoch = Utc.with_ymd_and_hms(2022, 11, 4, 15, 30, 12).unwrap();

        assert_eq!(
            session_dir_name("drive_exec", "robot_2022.toml", &epoch),
            "drive_exec_robot_2022_20221104_153012"
        );
        assert_eq!(
            session_dir_name("drive_exec", "bots/robot v5.toml", &epoch),
            "drive_exec_robot_v5_20221104_153012"
        );
        assert_eq!(
            session_dir_name("drive_exec", "", &epoch),
            "drive_exec_20221104_153012"
        );
    }

    #[test]
    fn test_elapsed_before_start() {
        // Sessions are never started in unit tests
        assert!(get_elapsed_seconds().is_nan());
        assert!(matches!(get_epoch(), Err(SessionError::NotStarted)));
    }
}
