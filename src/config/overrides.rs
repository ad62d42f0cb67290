//! Environment variable overrides for configuration.

use crate::errors::Error;
use std::path::PathBuf;

use super::env_parser;

/// Apply environment variable overrides to configuration.
pub fn apply_env_overrides(
    storage_dir: &mut PathBuf,
    conflict_threshold: &mut f64,
    max_results: &mut usize,
) -> Result<(), Error> {
    env_parser::apply_storage_dir_override(storage_dir)?;
    env_parser::apply_conflict_threshold_override(conflict_threshold)?;
    env_parser::apply_max_results_override(max_results)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests_utils::{ENV_MUTEX, cleanup_env_vars};

    const VARS: [&str; 3] = [
        "MEMQUALITY_STORAGE_DIR",
        "MEMQUALITY_CONFLICT_THRESHOLD",
        "MEMQUALITY_MAX_RESULTS",
    ];

    #[test]
    fn test_env_var_overrides_config() {
        let _guard = ENV_MUTEX.lock().unwrap();
        cleanup_env_vars(&VARS);

        // SAFETY: ENV_MUTEX serializes every test touching the environment.
        unsafe {
            std::env::set_var("MEMQUALITY_STORAGE_DIR", "/custom/store");
            std::env::set_var("MEMQUALITY_CONFLICT_THRESHOLD", "0.9");
            std::env::set_var("MEMQUALITY_MAX_RESULTS", "42");
        }

        let mut storage_dir = PathBuf::from("/default");
        let mut conflict_threshold = 0.7;
        let mut max_results = 10;

        apply_env_overrides(&mut storage_dir, &mut conflict_threshold, &mut max_results).unwrap();

        assert_eq!(storage_dir, PathBuf::from("/custom/store"));
        assert_eq!(conflict_threshold, 0.9);
        assert_eq!(max_results, 42);

        cleanup_env_vars(&VARS);
    }

    #[test]
    fn test_unset_env_vars_leave_values_untouched() {
        let _guard = ENV_MUTEX.lock().unwrap();
        cleanup_env_vars(&VARS);

        let mut storage_dir = PathBuf::from("/default");
        let mut conflict_threshold = 0.7;
        let mut max_results = 10;

        apply_env_overrides(&mut storage_dir, &mut conflict_threshold, &mut max_results).unwrap();

        assert_eq!(storage_dir, PathBuf::from("/default"));
        assert_eq!(conflict_threshold, 0.7);
        assert_eq!(max_results, 10);
    }

    #[test]
    fn test_empty_env_var_is_an_error() {
        let _guard = ENV_MUTEX.lock().unwrap();
        cleanup_env_vars(&VARS);

        // SAFETY: ENV_MUTEX serializes every test touching the environment.
        unsafe {
            std::env::set_var("MEMQUALITY_MAX_RESULTS", "");
        }

        let mut storage_dir = PathBuf::from("/default");
        let mut conflict_threshold = 0.7;
        let mut max_results = 10;
        let result =
            apply_env_overrides(&mut storage_dir, &mut conflict_threshold, &mut max_results);
        assert!(matches!(result, Err(Error::Config(_))));

        cleanup_env_vars(&VARS);
    }
}
