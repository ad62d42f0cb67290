//! Environment variable parsing utilities for configuration.

use crate::errors::Error;
use std::path::PathBuf;
use std::str::FromStr;

use super::paths;

/// Parse environment variable as a path, expanding tilde.
fn parse_env_path(name: &str, value: &str) -> Result<PathBuf, Error> {
    if value.trim().is_empty() {
        return Err(Error::Config(format!("{name} cannot be empty")));
    }
    Ok(paths::expand_tilde_path(&PathBuf::from(value)))
}

/// Parse environment variable as a number; range checks happen in validation.
fn parse_env_number<T>(name: &str, value: &str) -> Result<T, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if value.trim().is_empty() {
        return Err(Error::Config(format!("{name} cannot be empty")));
    }
    value
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("Invalid {name} value: {e}")))
}

/// Apply MEMQUALITY_STORAGE_DIR environment variable override.
pub fn apply_storage_dir_override(storage_dir: &mut PathBuf) -> Result<(), Error> {
    if let Ok(val) = std::env::var("MEMQUALITY_STORAGE_DIR") {
        *storage_dir = parse_env_path("MEMQUALITY_STORAGE_DIR", &val)?;
    }
    Ok(())
}

/// Apply MEMQUALITY_CONFLICT_THRESHOLD environment variable override.
pub fn apply_conflict_threshold_override(conflict_threshold: &mut f64) -> Result<(), Error> {
    if let Ok(val) = std::env::var("MEMQUALITY_CONFLICT_THRESHOLD") {
        *conflict_threshold = parse_env_number("MEMQUALITY_CONFLICT_THRESHOLD", &val)?;
    }
    Ok(())
}

/// Apply MEMQUALITY_MAX_RESULTS environment variable override.
pub fn apply_max_results_override(max_results: &mut usize) -> Result<(), Error> {
    if let Ok(val) = std::env::var("MEMQUALITY_MAX_RESULTS") {
        *max_results = parse_env_number("MEMQUALITY_MAX_RESULTS", &val)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_path_empty() {
        let result = parse_env_path("TEST_VAR", "   ");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_parse_env_path_valid() {
        let result = parse_env_path("TEST_VAR", "/var/lib/memquality");
        assert_eq!(result.unwrap(), PathBuf::from("/var/lib/memquality"));
    }

    #[test]
    fn test_parse_env_float_invalid() {
        let result: Result<f64, _> = parse_env_number("TEST_FLOAT", "invalid");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_parse_env_float_valid() {
        let result: Result<f64, _> = parse_env_number("TEST_FLOAT", " 0.5 ");
        assert_eq!(result.unwrap(), 0.5);
    }

    #[test]
    fn test_parse_env_usize_rejects_negative() {
        let result: Result<usize, _> = parse_env_number("TEST_USIZE", "-3");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
