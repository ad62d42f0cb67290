//! Configuration file loading and parsing.

use crate::conflict::ConflictDetector;
use crate::errors::Error;
use crate::memory_types::DEFAULT_MAX_RESULTS;
use serde::Deserialize;
use std::path::PathBuf;

use super::paths;

/// Configuration loaded from TOML file.
#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub storage_dir: PathBuf,

    #[serde(default = "default_conflict_threshold")]
    pub conflict_threshold: f64,

    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_conflict_threshold() -> f64 {
    ConflictDetector::DEFAULT_THRESHOLD
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

/// Load configuration from `<config dir>/memquality/config.toml` if present.
pub fn load_from_file() -> Result<Option<ConfigFile>, Error> {
    let config_path = paths::config_file_path();

    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file {}: {e}",
                config_path.display()
            ))
        })?;

        let config: ConfigFile = toml::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config file {}: {e}",
                config_path.display()
            ))
        })?;

        Ok(Some(config))
    } else {
        Ok(None)
    }
}
