//! Configuration system for memquality.

mod env_parser;
mod loader;
mod overrides;
mod paths;
mod validation;

#[cfg(test)]
mod tests_utils;

use crate::conflict::ConflictDetector;
use crate::errors::Error;
use crate::memory_types::DEFAULT_MAX_RESULTS;
use serde::Deserialize;
use std::path::PathBuf;

pub use loader::ConfigFile;

/// Configuration values with priority: defaults < config file < env vars.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory holding the snapshot file.
    #[serde(default)]
    pub storage_dir: PathBuf,

    /// Upper (exclusive) similarity bound for semantic conflicts.
    #[serde(default)]
    pub conflict_threshold: f64,

    /// Default cap on search results.
    #[serde(default)]
    pub max_results: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_dir: paths::default_storage_dir(),
            conflict_threshold: ConflictDetector::DEFAULT_THRESHOLD,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl Config {
    /// Load configuration with defaults, file values, and environment overrides.
    pub fn load() -> Result<Self, Error> {
        let file_config = loader::load_from_file()?;

        let mut config = Config::default();

        if let Some(mut file) = file_config {
            paths::expand_tilde(&mut file.storage_dir);
            config.merge_from_file(file);
        }

        overrides::apply_env_overrides(
            &mut config.storage_dir,
            &mut config.conflict_threshold,
            &mut config.max_results,
        )?;

        config.validate()?;

        Ok(config)
    }

    /// Merge configuration from a file into this config.
    fn merge_from_file(&mut self, file: ConfigFile) {
        if !file.storage_dir.as_os_str().is_empty() {
            self.storage_dir = file.storage_dir;
        }
        self.conflict_threshold = file.conflict_threshold;
        self.max_results = file.max_results;
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), Error> {
        let validator = validation::ConfigValidator {
            storage_dir: self.storage_dir.clone(),
            conflict_threshold: self.conflict_threshold,
            max_results: self.max_results,
        };

        validator.validate()
    }
}
