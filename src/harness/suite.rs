//! Test case collection and execution
//!
//! A suite file is expanded into a sequence of immutable TestCase values
//! before anything runs; malformed cases surface as setup errors naming
//! the case. Execution is fully sequential, one subprocess at a time.

use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use crate::common::config::Timeouts;
use crate::common::{Error, Result};

use super::command::CommandSpec;
use super::config::{CaseConfig, SuiteConfig};
use super::runner;
use super::supervise;
use super::verify::Check;

/// How a case drives the application under test
#[derive(Debug, Clone)]
pub enum Execution {
    /// Block until exit, bounded by a timeout
    Completion {
        command: CommandSpec,
        timeout: Duration,
    },
    /// Let it run, interrupt, then wait bounded for a graceful exit
    Supervised {
        command: CommandSpec,
        run_for: Duration,
        grace: Duration,
    },
    /// No process; the check inspects existing filesystem state
    InspectOnly,
}

/// A fully resolved, immutable test case
#[derive(Debug, Clone)]
pub struct TestCase {
    pub name: String,
    pub execution: Execution,
    pub check: Check,
}

/// Verdict for one executed case
#[derive(Debug, Serialize)]
pub struct CaseResult {
    pub name: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Expand a suite into test cases, resolving commands against `base`
pub fn collect(suite: &SuiteConfig, base: &Path, defaults: &Timeouts) -> Result<Vec<TestCase>> {
    suite
        .cases
        .iter()
        .map(|case| build_case(case, base, &suite.path_flags, defaults))
        .collect()
}

fn build_case(
    case: &CaseConfig,
    base: &Path,
    suite_flags: &[String],
    defaults: &Timeouts,
) -> Result<TestCase> {
    let check = build_check(case)?;

    let command = match &case.command {
        Some(raw) => {
            let spec = CommandSpec::parse(raw)
                .map_err(|e| Error::case_config(&case.name, e.to_string()))?;
            let flags = case.path_flags.as_deref().unwrap_or(suite_flags);
            Some(spec.resolve(base, flags))
        }
        None => None,
    };

    let execution = match (command, case.supervised) {
        (Some(command), true) => Execution::Supervised {
            command,
            run_for: Duration::from_secs(
                case.run_for_sec.unwrap_or(defaults.supervise_default_secs),
            ),
            grace: Duration::from_secs(defaults.graceful_wait_secs),
        },
        (Some(command), false) => Execution::Completion {
            command,
            timeout: Duration::from_secs(case.timeout_sec.unwrap_or(defaults.run_default_secs)),
        },
        (None, true) => {
            return Err(Error::case_config(
                &case.name,
                "supervised case is missing required field 'command'",
            ));
        }
        (None, false) => {
            if !matches!(check, Check::DirectoryContents { .. }) {
                return Err(Error::case_config(
                    &case.name,
                    "missing required field 'command'",
                ));
            }
            Execution::InspectOnly
        }
    };

    Ok(TestCase {
        name: case.name.clone(),
        execution,
        check,
    })
}

fn build_check(case: &CaseConfig) -> Result<Check> {
    let mut checks = Vec::new();

    if let Some(needle) = &case.expected_output {
        checks.push(Check::OutputContains {
            needle: needle.clone(),
        });
    }
    if let Some(path) = &case.expected_result {
        checks.push(Check::ArtifactCreated { path: path.clone() });
    }
    if let Some(dir) = &case.expected_files {
        checks.push(Check::DirectoryContents {
            directory: dir.directory.clone(),
            expected: dir.files.clone(),
        });
    }

    if checks.len() > 1 {
        return Err(Error::case_config(
            &case.name,
            "declares more than one of 'expected_output', 'expected_result', 'expected_files'",
        ));
    }

    let check = checks.pop().unwrap_or(Check::None);

    match &check {
        Check::None if !case.supervised => Err(Error::case_config(
            &case.name,
            "declares no expectation; only supervised cases may omit one",
        )),
        Check::OutputContains { .. } if case.supervised => Err(Error::case_config(
            &case.name,
            "'expected_output' cannot be used with a supervised case; stdout is not captured",
        )),
        _ => Ok(check),
    }
}

/// Run one case end to end: prepare, execute, verify, archive
pub async fn run_case(case: &TestCase, archive_dir: &Path) -> Result<()> {
    case.check.prepare()?;

    match &case.execution {
        Execution::Completion { command, timeout } => {
            let output = runner::run_to_completion(command, *timeout).await?;
            case.check.verify(&output.stdout)?;
        }
        Execution::Supervised {
            command,
            run_for,
            grace,
        } => {
            let supervisor = supervise::launch(command)?;
            supervisor.run(*run_for, *grace).await?;
            case.check.verify("")?;
        }
        Execution::InspectOnly => {
            case.check.verify("")?;
        }
    }

    case.check.archive(&case.name, archive_dir)?;
    Ok(())
}
