//! Synchronous process execution
//!
//! Runs a resolved command to completion, bounded by a timeout, with
//! stdout and stderr captured in full. There is no retry logic: each
//! invocation either succeeds once or fails the case.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time;

use crate::common::{Error, Result};

use super::command::CommandSpec;

/// Captured output of a completed run
#[derive(Debug)]
pub struct RunOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Execute a command and block until it exits or the timeout elapses
///
/// A timed-out child is killed, never abandoned. Failure cases:
/// the executable does not exist, the process exits non-zero, or the
/// timeout elapses.
pub async fn run_to_completion(spec: &CommandSpec, timeout: Duration) -> Result<RunOutput> {
    let (program, args) = spec.argv();

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    tracing::debug!("running: {}", spec);

    let child = cmd.spawn().map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::ExecutableNotFound {
            path: program.to_string(),
        },
        _ => Error::LaunchFailed {
            command: spec.to_string(),
            error: e.to_string(),
        },
    })?;

    // Dropping the wait future on timeout kills the child via kill_on_drop.
    let output = match time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result?,
        Err(_) => return Err(Error::RunTimeout(timeout.as_secs())),
    };

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    if !output.status.success() {
        return Err(Error::CommandFailed {
            code: output.status.code().unwrap_or(-1),
            stderr,
        });
    }

    tracing::debug!("completed: {} ({} bytes of stdout)", spec, stdout.len());

    Ok(RunOutput { stdout, stderr })
}
