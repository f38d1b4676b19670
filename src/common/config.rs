//! Configuration file handling
//!
//! Harness-wide defaults that suite files and CLI flags can override.

use serde::Deserialize;
use std::path::PathBuf;

use super::paths::config_path;
use super::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,

    /// Artifact archive settings
    #[serde(default)]
    pub archive: ArchiveConfig,
}

/// Timeout settings in seconds
#[derive(Debug, Clone, Deserialize)]
pub struct Timeouts {
    /// Default bound for a synchronous run when the case declares none
    #[serde(default = "default_run")]
    pub run_default_secs: u64,

    /// Default warm-up duration for a supervised run
    #[serde(default = "default_supervise")]
    pub supervise_default_secs: u64,

    /// How long a process gets to honor the interrupt before a forced kill
    #[serde(default = "default_graceful")]
    pub graceful_wait_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            run_default_secs: default_run(),
            supervise_default_secs: default_supervise(),
            graceful_wait_secs: default_graceful(),
        }
    }
}

fn default_run() -> u64 {
    60
}
fn default_supervise() -> u64 {
    5
}
fn default_graceful() -> u64 {
    10
}

/// Artifact archive configuration
#[derive(Debug, Deserialize)]
pub struct ArchiveConfig {
    /// Directory verified artifacts are moved into
    #[serde(default = "default_archive_dir")]
    pub dir: PathBuf,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            dir: default_archive_dir(),
        }
    }
}

fn default_archive_dir() -> PathBuf {
    PathBuf::from("output")
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if the file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                let content = std::fs::read_to_string(&path)
                    .map_err(|e| super::Error::Config(format!(
                        "Failed to read '{}': {}",
                        path.display(),
                        e
                    )))?;
                return toml::from_str(&content)
                    .map_err(|e| super::Error::ConfigParse(e.to_string()));
            }
        }
        Ok(Self::default())
    }
}
