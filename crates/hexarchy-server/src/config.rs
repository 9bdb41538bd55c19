//! Server configuration from the environment.

use std::env;
use std::path::PathBuf;

/// Environment variable naming the snapshot directory.
pub const SAVE_DIR_VAR: &str = "HEXARCHY_SAVE_DIR";

/// Runtime configuration for the server process.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Directory snapshots are written to.
    pub save_dir: PathBuf,
}

impl ServerConfig {
    /// Read configuration from the environment, with defaults.
    pub fn from_env() -> Self {
        let save_dir = env::var(SAVE_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./saves"));
        Self { save_dir }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from("./saves"),
        }
    }
}
