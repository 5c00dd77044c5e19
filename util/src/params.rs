//! # Parameter files
//!
//! Parameters are TOML files deserialised straight into the owning module's
//! `Params` struct. Named files are looked up in `<sw_root>/params/`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::de::DeserializeOwned;
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::host;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Directory holding parameter files, relative to the software root.
pub const PARAMS_DIR: &str = "params";

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("The software root is not set ({} missing)", host::SW_ROOT_ENV_VAR)]
    SwRootNotSet,

    #[error("Cannot read the parameter file {0:?}: {1}")]
    FileLoadError(PathBuf, std::io::Error),

    #[error("Cannot deserialise the parameters: {0}")]
    DeserialiseError(toml::de::Error)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a named parameter file from the params directory.
pub fn load<P>(param_file_path: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned
{
    let path = host::get_sw_root()
        .map_err(|_| LoadError::SwRootNotSet)?
        .join(PARAMS_DIR)
        .join(param_file_path);

    load_path(path)
}

/// Load a parameter file from an explicit path.
pub fn load_path<P, F>(path: F) -> Result<P, LoadError>
where
    P: DeserializeOwned,
    F: AsRef<Path>
{
    let path = path.as_ref();
    let params_str = fs::read_to_string(path)
        .map_err(|e| LoadError::FileLoadError(path.to_path_buf(), e))?;

    from_str(&params_str)
}

/// Parse parameters from an in-memory TOML string.
pub fn from_str<P>(params_str: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned
{
    toml::from_str(params_str).map_err(LoadError::DeserialiseError)
}
