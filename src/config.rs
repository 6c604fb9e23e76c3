use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Storage key for the timer collection
pub const TIMERS_KEY: &str = "items";

/// Storage key for the to-do collection
pub const TODOS_KEY: &str = "todos";

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Directory where collection files are stored
    pub data_dir: PathBuf,

    /// Length of generated record identifiers
    pub id_length: usize,
}

impl Config {
    /// Builds a configuration rooted at the given data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Config {
            data_dir,
            id_length: 8,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        // Fall back to the working directory when no platform dir resolves
        let data_dir = ProjectDirs::from("", "", "ticklist")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        Self::with_data_dir(data_dir)
    }
}
