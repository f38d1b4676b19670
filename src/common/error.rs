//! Error types for the harness
//!
//! Every failure path carries enough detail to reproduce the failing
//! invocation: attempted paths, exit codes, captured output.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum Error {
    // === Setup Errors ===
    #[error("Base directory '{0}' not found. All relative paths in commands are resolved against it; check --base-dir or the suite's 'base_dir' key")]
    BaseDirMissing(String),

    #[error("No base directory supplied. Pass --base-dir or set 'base_dir' in the suite file")]
    BaseDirUnset,

    #[error("Failed to read suite '{path}': {error}")]
    SuiteRead { path: String, error: String },

    #[error("Failed to parse suite '{path}': {error}")]
    SuiteParse { path: String, error: String },

    #[error("Case '{case}': {message}")]
    CaseConfig { case: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === Launch Errors ===
    #[error("Executable not found: '{path}'. Check the command and the base directory")]
    ExecutableNotFound { path: String },

    #[error("Failed to launch '{command}': {error}")]
    LaunchFailed { command: String, error: String },

    // === Execution Errors ===
    #[error("Command exited with code {code}\nstderr:\n{stderr}")]
    CommandFailed { code: i32, stderr: String },

    #[error("Command did not finish within {0} seconds")]
    RunTimeout(u64),

    // === Outcome Errors ===
    #[error("Expected output '{expected}' not found in stdout. Full output:\n{actual}")]
    OutputMismatch { expected: String, actual: String },

    #[error("Expected artifact '{0}' was not produced")]
    ArtifactMissing(String),

    #[error("Directory '{0}' does not exist")]
    DirectoryMissing(String),

    #[error("Directory '{directory}' does not match the expected contents\n  missing: {missing:?}\n  unexpected: {unexpected:?}")]
    DirectoryMismatch {
        directory: String,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    // === Supervision Errors ===
    #[error("Process ignored the interrupt and had to be force-killed after {0} seconds")]
    Unresponsive(u64),

    #[error("Supervision error: {0}")]
    Supervision(String),

    // === Suite Errors ===
    #[error("{failed} of {total} case(s) failed")]
    SuiteFailed { failed: usize, total: usize },

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a case configuration error
    pub fn case_config(case: &str, message: impl Into<String>) -> Self {
        Self::CaseConfig {
            case: case.to_string(),
            message: message.into(),
        }
    }
}
