//! Suite file schema
//!
//! Defines the data structures for deserializing YAML suite files.
//! Only declared fields are interpreted; the files may carry anything
//! else for the reader's benefit.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::common::{Error, Result};

use super::command::DEFAULT_PATH_FLAGS;

/// A complete suite loaded from a YAML file
#[derive(Deserialize, Debug)]
pub struct SuiteConfig {
    /// Optional display name for the suite
    pub name: Option<String>,
    /// Root the application under test is installed at; --base-dir overrides
    pub base_dir: Option<PathBuf>,
    /// Flags whose following token is a path resolved against the base directory
    #[serde(default = "default_path_flags")]
    pub path_flags: Vec<String>,
    /// The declared test cases, run in order
    pub cases: Vec<CaseConfig>,
}

/// One declared test case
#[derive(Deserialize, Debug)]
pub struct CaseConfig {
    /// Stable display name, also used to key archived artifacts
    pub name: String,
    /// Shell-style command line for the application under test
    pub command: Option<String>,
    /// Run as a long-lived process and interrupt it after `run_for_sec`
    #[serde(default)]
    pub supervised: bool,
    /// Bound for a synchronous run, in seconds
    pub timeout_sec: Option<u64>,
    /// How long a supervised process is left running, in seconds
    pub run_for_sec: Option<u64>,
    /// Expected substring of captured stdout
    pub expected_output: Option<String>,
    /// Expected artifact path, relative to the working directory
    pub expected_result: Option<PathBuf>,
    /// Expected exact directory contents
    pub expected_files: Option<DirectoryExpectation>,
    /// Per-case override of the suite's path flags
    pub path_flags: Option<Vec<String>>,
}

/// Exact-contents expectation for a directory
#[derive(Deserialize, Debug)]
pub struct DirectoryExpectation {
    /// Directory to list
    pub directory: PathBuf,
    /// File names the directory must contain, and nothing else
    pub files: Vec<String>,
}

fn default_path_flags() -> Vec<String> {
    DEFAULT_PATH_FLAGS.iter().map(|s| s.to_string()).collect()
}

impl SuiteConfig {
    /// Load and parse a suite file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::SuiteRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| Error::SuiteParse {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }
}
