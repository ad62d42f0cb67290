//! Default locations and tilde (`~`) expansion.

use std::path::{Path, PathBuf};

/// Home directory, falling back to `$HOME` and then the working directory.
fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."))
    })
}

/// `~/.memquality/store`.
pub fn default_storage_dir() -> PathBuf {
    home_dir().join(".memquality").join("store")
}

/// `<config dir>/memquality/config.toml`, e.g. `~/.config/memquality/config.toml`.
pub fn config_file_path() -> PathBuf {
    let config_dir = dirs::config_dir().unwrap_or_else(|| home_dir().join(".config"));
    config_dir.join("memquality").join("config.toml")
}

/// Expand a leading `~` in place.
pub fn expand_tilde(path: &mut PathBuf) {
    *path = expand_tilde_path(path);
}

/// Expand a leading `~`, returning a new path.
pub fn expand_tilde_path(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home_dir().join(rest),
        Err(_) => path.to_path_buf(),
    }
}
