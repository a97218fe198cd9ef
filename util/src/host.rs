//! Host platform utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::env;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Environment variable giving the root of the software directory tree.
///
/// Parameter files and session directories are resolved relative to this
/// root.
pub const SW_ROOT_ENV_VAR: &str = "UR5E_SW_ROOT";

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the software root directory from the environment.
///
/// Returns `Err(())` if the environment variable is not set, callers shall
/// map this onto their own "root not set" error variant.
pub fn get_sw_root() -> Result<PathBuf, ()> {
    match env::var(SW_ROOT_ENV_VAR) {
        Ok(v) => Ok(PathBuf::from(v)),
        Err(_) => Err(()),
    }
}
