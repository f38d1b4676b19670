//! Platform configuration paths
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/appcheck/`
//! - macOS: `~/Library/Application Support/appcheck/`
//! - Windows: `%APPDATA%\appcheck\`

use std::io;
use std::path::PathBuf;

/// Project name used for configuration lookup
const PROJECT_NAME: &str = "appcheck";

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", PROJECT_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Ensure the configuration directory exists
pub fn ensure_config_dir() -> io::Result<Option<PathBuf>> {
    if let Some(dir) = config_dir() {
        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(Some(dir))
    } else {
        Ok(None)
    }
}
