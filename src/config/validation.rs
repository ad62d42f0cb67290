//! Configuration validation logic.

use crate::errors::Error;
use crate::memory::store::MAX_SEARCH_LIMIT;
use std::path::PathBuf;

/// Validates configuration values.
pub struct ConfigValidator {
    /// Directory holding the snapshot.
    pub storage_dir: PathBuf,
    /// Upper bound for semantic conflict similarity.
    pub conflict_threshold: f64,
    /// Default cap on search results.
    pub max_results: usize,
}

impl ConfigValidator {
    /// Validate all configuration values for correctness and constraints.
    ///
    /// Checks that:
    /// - Conflict threshold is between 0.0 and 1.0 and finite
    /// - Max results is between 1 and `MAX_SEARCH_LIMIT`
    /// - Storage directory is not empty
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if any validation check fails.
    pub fn validate(&self) -> Result<(), Error> {
        self.validate_conflict_threshold()?;
        self.validate_max_results()?;
        self.validate_storage_dir()?;

        Ok(())
    }

    fn validate_conflict_threshold(&self) -> Result<(), Error> {
        if !self.conflict_threshold.is_finite() {
            return Err(Error::Config(
                "Invalid conflict threshold: NaN and infinity are not allowed".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.conflict_threshold) {
            return Err(Error::Config(format!(
                "Invalid conflict threshold: {} (must be between 0.0 and 1.0)",
                self.conflict_threshold
            )));
        }

        Ok(())
    }

    fn validate_max_results(&self) -> Result<(), Error> {
        if self.max_results == 0 || self.max_results > MAX_SEARCH_LIMIT {
            return Err(Error::Config(format!(
                "Invalid max results: {} (must be between 1 and {MAX_SEARCH_LIMIT})",
                self.max_results
            )));
        }

        Ok(())
    }

    fn validate_storage_dir(&self) -> Result<(), Error> {
        if self.storage_dir.as_os_str().is_empty() {
            return Err(Error::Config("Storage directory cannot be empty".to_string()));
        }

        Ok(())
    }
}
