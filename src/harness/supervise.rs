//! Supervised execution of long-running processes
//!
//! Models an application that never exits on its own and must be stopped
//! externally. Cancellation is two-phase: a graceful interrupt first,
//! then a forced kill if the process does not exit within a bounded wait.
//! Every exit path either observes the process exiting or kills it; an
//! orphaned process is never left behind.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tokio::time;

use crate::common::{Error, Result};

use super::command::CommandSpec;

/// Supervision state machine:
/// Launched → Running → TerminationRequested → GracefulExit | ForcedExit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisionState {
    Launched,
    Running,
    TerminationRequested,
    GracefulExit,
    ForcedExit,
}

/// The subset of child-process operations supervision needs
///
/// Implemented for `tokio::process::Child`; tests inject fakes to drive
/// each transition without spawning real processes.
#[async_trait]
pub trait ProcessHandle: Send {
    /// OS process id, if the process has not been reaped
    fn id(&self) -> Option<u32>;

    /// Deliver the graceful interrupt (Ctrl+C equivalent)
    fn interrupt(&mut self) -> Result<()>;

    /// Wait for the process to exit; callers bound this externally
    async fn wait(&mut self) -> Result<ExitStatus>;

    /// Forcibly terminate the process and reap it
    async fn kill(&mut self) -> Result<()>;
}

#[async_trait]
impl ProcessHandle for Child {
    fn id(&self) -> Option<u32> {
        Child::id(self)
    }

    #[cfg(unix)]
    fn interrupt(&mut self) -> Result<()> {
        let pid = Child::id(self)
            .ok_or_else(|| Error::Supervision("process already exited".to_string()))?;
        let rc = unsafe { libc::kill(pid as i32, libc::SIGINT) };
        if rc != 0 {
            return Err(Error::Supervision(format!(
                "failed to deliver SIGINT to pid {pid}"
            )));
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn interrupt(&mut self) -> Result<()> {
        Err(Error::Supervision(
            "graceful interrupt is only supported on unix".to_string(),
        ))
    }

    async fn wait(&mut self) -> Result<ExitStatus> {
        Ok(Child::wait(self).await?)
    }

    async fn kill(&mut self) -> Result<()> {
        Ok(Child::kill(self).await?)
    }
}

/// Drives one supervised process through the state machine
pub struct Supervisor<H: ProcessHandle> {
    handle: H,
    state: SupervisionState,
}

/// Start the command in the background and hand it to a supervisor
pub fn launch(spec: &CommandSpec) -> Result<Supervisor<Child>> {
    let (program, args) = spec.argv();

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let child = cmd.spawn().map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::ExecutableNotFound {
            path: program.to_string(),
        },
        _ => Error::LaunchFailed {
            command: spec.to_string(),
            error: e.to_string(),
        },
    })?;

    tracing::debug!("launched: {} (pid {:?})", spec, child.id());

    Ok(Supervisor::new(child))
}

impl<H: ProcessHandle> Supervisor<H> {
    pub fn new(handle: H) -> Self {
        Self {
            handle,
            state: SupervisionState::Launched,
        }
    }

    pub fn state(&self) -> SupervisionState {
        self.state
    }

    pub fn pid(&self) -> Option<u32> {
        self.handle.id()
    }

    /// Let the process run for the configured duration
    pub async fn let_run(&mut self, run_for: Duration) {
        self.state = SupervisionState::Running;
        time::sleep(run_for).await;
    }

    /// Deliver the graceful interrupt
    ///
    /// A delivery failure escalates straight to a kill before reporting.
    pub async fn request_termination(&mut self) -> Result<()> {
        self.state = SupervisionState::TerminationRequested;
        tracing::debug!("interrupting pid {:?}", self.handle.id());
        if let Err(e) = self.handle.interrupt() {
            let _ = self.handle.kill().await;
            self.state = SupervisionState::ForcedExit;
            return Err(e);
        }
        Ok(())
    }

    /// Wait up to `grace` for the process to honor the interrupt
    ///
    /// A process still alive after the bound is force-killed and the
    /// run reported as a failure.
    pub async fn await_exit(&mut self, grace: Duration) -> Result<ExitStatus> {
        match time::timeout(grace, self.handle.wait()).await {
            Ok(Ok(status)) => {
                self.state = SupervisionState::GracefulExit;
                tracing::debug!("graceful exit: {status}");
                Ok(status)
            }
            Ok(Err(e)) => {
                let _ = self.handle.kill().await;
                self.state = SupervisionState::ForcedExit;
                Err(e)
            }
            Err(_) => {
                let _ = self.handle.kill().await;
                self.state = SupervisionState::ForcedExit;
                Err(Error::Unresponsive(grace.as_secs()))
            }
        }
    }

    /// Run the full sequence: warm up, interrupt, bounded wait
    pub async fn run(mut self, run_for: Duration, grace: Duration) -> Result<ExitStatus> {
        self.let_run(run_for).await;
        self.request_termination().await?;
        self.await_exit(grace).await
    }
}
