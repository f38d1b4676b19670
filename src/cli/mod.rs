//! CLI command handling
//!
//! Dispatches CLI commands and formats console output.

use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::harness::{collect, run_case, suite::CaseResult, Execution, SuiteConfig, TestCase};

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            suite,
            base_dir,
            filter,
            archive_dir,
            json,
            verbose,
        } => {
            run_suite(&suite, base_dir, filter, archive_dir, json, verbose).await
        }

        Commands::List { suite } => list_suite(&suite),
    }
}

async fn run_suite(
    suite_path: &Path,
    base_dir: Option<PathBuf>,
    filter: Option<String>,
    archive_dir: Option<PathBuf>,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let config = Config::load()?;
    let suite = SuiteConfig::load(suite_path)?;

    // Base directory is fatal to get wrong, before any case runs.
    let base = base_dir
        .or_else(|| suite.base_dir.clone())
        .ok_or(Error::BaseDirUnset)?;
    if !base.is_dir() {
        return Err(Error::BaseDirMissing(base.display().to_string()));
    }

    let archive_dir = archive_dir.unwrap_or_else(|| config.archive.dir.clone());

    let mut cases = collect(&suite, &base, &config.timeouts)?;
    if let Some(filter) = &filter {
        cases.retain(|case| case.name.contains(filter.as_str()));
    }

    let suite_name = suite
        .name
        .as_deref()
        .unwrap_or_else(|| suite_path.to_str().unwrap_or("suite"));

    println!(
        "\n{} {}",
        "Running Suite:".blue().bold(),
        suite_name.white().bold()
    );
    println!("  base directory: {}", base.display().to_string().dimmed());

    let mut results = Vec::with_capacity(cases.len());

    for case in &cases {
        if verbose {
            print_case_command(case);
        }

        match run_case(case, &archive_dir).await {
            Ok(()) => {
                println!("  {} {}", "✓".green(), case.name);
                results.push(CaseResult {
                    name: case.name.clone(),
                    passed: true,
                    error: None,
                });
            }
            Err(e) => {
                println!("  {} {}: {}", "✗".red(), case.name, e);
                results.push(CaseResult {
                    name: case.name.clone(),
                    passed: false,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else if failed == 0 {
        println!(
            "\n{} {} case(s) passed\n",
            "✓".green().bold(),
            total
        );
    } else {
        println!(
            "\n{} {} of {} case(s) failed\n",
            "✗".red().bold(),
            failed,
            total
        );
    }

    if failed > 0 {
        return Err(Error::SuiteFailed { failed, total });
    }

    Ok(())
}

fn print_case_command(case: &TestCase) {
    match &case.execution {
        Execution::Completion { command, .. } => {
            println!("  $ {}", command.to_string().dimmed());
        }
        Execution::Supervised { command, run_for, .. } => {
            println!(
                "  $ {} {}",
                command.to_string().dimmed(),
                format!("(supervised, {}s)", run_for.as_secs()).dimmed()
            );
        }
        Execution::InspectOnly => {}
    }
}

fn list_suite(suite_path: &Path) -> Result<()> {
    let suite = SuiteConfig::load(suite_path)?;

    if let Some(name) = &suite.name {
        println!("{}", name.bold());
    }

    for case in &suite.cases {
        let kind = if case.supervised {
            "supervised"
        } else if case.command.is_some() {
            "run"
        } else {
            "inspect"
        };

        let expectation = if case.expected_output.is_some() {
            "expects output"
        } else if case.expected_result.is_some() {
            "expects artifact"
        } else if case.expected_files.is_some() {
            "expects directory contents"
        } else {
            "expects clean shutdown"
        };

        println!("  {} [{}] {}", case.name, kind, expectation.dimmed());
    }

    println!("{} case(s)", suite.cases.len());

    Ok(())
}
