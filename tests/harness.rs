//! End-to-end tests for the harness CLI
//!
//! These tests build fake applications as shell scripts, declare suites
//! against them, and drive the real binary, asserting on its exit status
//! and console output.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Test context with paths and cleanup
struct TestContext {
    /// Temporary directory for this test; also the harness working dir
    temp_dir: tempfile::TempDir,
    /// Path to the harness binary
    harness_bin: PathBuf,
    /// Directory the fake applications are installed in
    app_dir: PathBuf,
    /// Config directory (XDG_CONFIG_HOME)
    config_dir: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

        let app_dir = temp_dir.path().join("app");
        let config_dir = temp_dir.path().join("config");
        fs::create_dir_all(&app_dir).expect("Failed to create app dir");
        fs::create_dir_all(&config_dir).expect("Failed to create config dir");

        Self {
            temp_dir,
            harness_bin: find_harness_binary(),
            app_dir,
            config_dir,
        }
    }

    /// Install a fake application as an executable shell script
    fn install_app(&self, name: &str, script: &str) -> PathBuf {
        let path = self.app_dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{script}\n")).expect("Failed to write script");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .expect("Failed to set permissions");
        path
    }

    /// Write a suite file and return its path
    fn write_suite(&self, yaml: &str) -> PathBuf {
        let path = self.temp_dir.path().join("suite.yaml");
        fs::write(&path, yaml).expect("Failed to write suite");
        path
    }

    /// Write a harness config shortening the graceful-wait bound
    fn create_config(&self, graceful_wait_secs: u64) {
        let config_path = self.config_dir.join("appcheck").join("config.toml");
        fs::create_dir_all(config_path.parent().unwrap()).expect("Failed to create config dir");
        fs::write(
            &config_path,
            format!("[timeouts]\ngraceful_wait_secs = {graceful_wait_secs}\n"),
        )
        .expect("Failed to write config");
    }

    /// Run the harness with the given arguments
    fn run_harness(&self, args: &[&str]) -> HarnessOutput {
        let output: Output = Command::new(&self.harness_bin)
            .args(args)
            .current_dir(self.temp_dir.path())
            .env("XDG_CONFIG_HOME", &self.config_dir)
            .env("NO_COLOR", "1")
            .output()
            .expect("Failed to run harness");

        HarnessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
        }
    }

    fn run_suite(&self, suite: &Path, extra: &[&str]) -> HarnessOutput {
        let mut args = vec![
            "run",
            suite.to_str().unwrap(),
            "--base-dir",
            self.app_dir.to_str().unwrap(),
        ];
        args.extend_from_slice(extra);
        self.run_harness(&args)
    }
}

/// Output from a harness invocation
#[derive(Debug)]
struct HarnessOutput {
    stdout: String,
    stderr: String,
    success: bool,
}

/// Find the harness binary, building it if necessary
fn find_harness_binary() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let candidates = [
        PathBuf::from(manifest_dir).join("target/debug/appcheck"),
        PathBuf::from(manifest_dir).join("target/release/appcheck"),
    ];

    for candidate in &candidates {
        if candidate.exists() {
            return candidate.clone();
        }
    }

    let status = Command::new("cargo")
        .args(["build"])
        .current_dir(manifest_dir)
        .status()
        .expect("Failed to build harness");
    assert!(status.success(), "Failed to build harness");

    candidates[0].clone()
}

// ============== Tests ==============

#[test]
fn test_substring_check_passes() {
    let ctx = TestContext::new();
    ctx.install_app("classify", r#"echo "class: cat"; echo "score: 0.91""#);

    let suite = ctx.write_suite(
        r#"
cases:
  - name: classify_cat
    command: "classify -i cat.jpg"
    expected_output: "class: cat"
    timeout_sec: 10
"#,
    );

    let output = ctx.run_suite(&suite, &[]);
    assert!(output.success, "stderr: {}", output.stderr);
    assert!(output.stdout.contains("classify_cat"));
    assert!(output.stdout.contains("1 case(s) passed"));
}

#[test]
fn test_substring_failure_includes_full_output() {
    let ctx = TestContext::new();
    ctx.install_app("classify", r#"echo "class: dog""#);

    let suite = ctx.write_suite(
        r#"
cases:
  - name: classify_cat
    command: "classify -i cat.jpg"
    expected_output: "class: cat"
    timeout_sec: 10
"#,
    );

    let output = ctx.run_suite(&suite, &[]);
    assert!(!output.success);
    // Diagnostic carries the actual stdout for inspection.
    assert!(output.stdout.contains("class: dog"), "{}", output.stdout);
}

#[test]
fn test_nonzero_exit_reports_code_and_stderr() {
    let ctx = TestContext::new();
    ctx.install_app("crashy", "echo boom >&2; exit 2");

    let suite = ctx.write_suite(
        r#"
cases:
  - name: crashy_case
    command: "crashy"
    expected_output: anything
    timeout_sec: 10
"#,
    );

    let output = ctx.run_suite(&suite, &[]);
    assert!(!output.success);
    assert!(output.stdout.contains("code 2"), "{}", output.stdout);
    assert!(output.stdout.contains("boom"), "{}", output.stdout);
}

#[test]
fn test_missing_executable_is_attributed() {
    let ctx = TestContext::new();

    let suite = ctx.write_suite(
        r#"
cases:
  - name: ghost
    command: "no-such-app -i cat.jpg"
    expected_output: anything
"#,
    );

    let output = ctx.run_suite(&suite, &[]);
    assert!(!output.success);
    assert!(
        output.stdout.contains("Executable not found"),
        "{}",
        output.stdout
    );
    assert!(output.stdout.contains("no-such-app"), "{}", output.stdout);
}

#[test]
fn test_timeout_kills_and_fails() {
    let ctx = TestContext::new();
    ctx.install_app("slow", "sleep 30");

    let suite = ctx.write_suite(
        r#"
cases:
  - name: slow_case
    command: "slow"
    expected_output: anything
    timeout_sec: 1
"#,
    );

    let output = ctx.run_suite(&suite, &[]);
    assert!(!output.success);
    assert!(
        output.stdout.contains("did not finish within 1 seconds"),
        "{}",
        output.stdout
    );
}

#[test]
fn test_artifact_check_archives_result() {
    let ctx = TestContext::new();
    ctx.install_app("yolo", "echo detection > result.jpg");

    // A stale artifact from an earlier run must not count.
    fs::write(ctx.temp_dir.path().join("result.jpg"), b"stale").unwrap();

    let suite = ctx.write_suite(
        r#"
cases:
  - name: yolo_street
    command: "yolo -i street.jpg"
    expected_result: result.jpg
    timeout_sec: 10
"#,
    );

    let output = ctx.run_suite(&suite, &["--archive-dir", "archive"]);
    assert!(output.success, "stderr: {}", output.stderr);

    let archived = ctx.temp_dir.path().join("archive").join("yolo_street_result.jpg");
    assert!(archived.is_file());
    assert!(!ctx.temp_dir.path().join("result.jpg").exists());
}

#[test]
fn test_artifact_not_recreated_fails() {
    let ctx = TestContext::new();
    ctx.install_app("lazy", "true");

    fs::write(ctx.temp_dir.path().join("result.jpg"), b"stale").unwrap();

    let suite = ctx.write_suite(
        r#"
cases:
  - name: lazy_case
    command: "lazy"
    expected_result: result.jpg
    timeout_sec: 10
"#,
    );

    let output = ctx.run_suite(&suite, &[]);
    assert!(!output.success);
    assert!(
        output.stdout.contains("was not produced"),
        "{}",
        output.stdout
    );
    // The stale copy was removed pre-run and must stay gone.
    assert!(!ctx.temp_dir.path().join("result.jpg").exists());
}

#[test]
fn test_supervised_graceful_shutdown_passes() {
    let ctx = TestContext::new();
    ctx.install_app(
        "server",
        r#"trap 'exit 0' INT
while true; do sleep 0.1; done"#,
    );

    let suite = ctx.write_suite(
        r#"
cases:
  - name: server_runs
    command: "server -p pipeline.cfg"
    supervised: true
    run_for_sec: 1
"#,
    );

    let output = ctx.run_suite(&suite, &[]);
    assert!(output.success, "stderr: {}", output.stderr);
    assert!(output.stdout.contains("1 case(s) passed"));
}

#[test]
fn test_supervised_stubborn_process_fails() {
    let ctx = TestContext::new();
    ctx.create_config(1);
    ctx.install_app(
        "stubborn",
        r#"trap '' INT
while true; do sleep 0.1; done"#,
    );

    let suite = ctx.write_suite(
        r#"
cases:
  - name: stubborn_server
    command: "stubborn"
    supervised: true
    run_for_sec: 1
"#,
    );

    let output = ctx.run_suite(&suite, &[]);
    assert!(!output.success);
    assert!(
        output.stdout.contains("force-killed"),
        "{}",
        output.stdout
    );
}

#[test]
fn test_directory_contents_check() {
    let ctx = TestContext::new();
    let models = ctx.app_dir.join("models");
    fs::create_dir_all(&models).unwrap();
    fs::write(models.join("model.bin"), b"").unwrap();
    fs::write(models.join("labels.txt"), b"").unwrap();

    let suite = ctx.write_suite(&format!(
        r#"
cases:
  - name: assets_present
    expected_files:
      directory: {}
      files: [model.bin, labels.txt]
"#,
        models.display()
    ));

    let output = ctx.run_suite(&suite, &[]);
    assert!(output.success, "stdout: {}", output.stdout);
}

#[test]
fn test_missing_base_dir_is_fatal_before_any_case() {
    let ctx = TestContext::new();
    ctx.install_app("classify", "echo hi");

    let suite = ctx.write_suite(
        r#"
cases:
  - name: never_runs
    command: "classify"
    expected_output: hi
"#,
    );

    let output = ctx.run_harness(&[
        "run",
        suite.to_str().unwrap(),
        "--base-dir",
        "/no/such/base",
    ]);
    assert!(!output.success);
    assert!(
        output.stderr.contains("Base directory"),
        "{}",
        output.stderr
    );
    // No case was attempted.
    assert!(!output.stdout.contains("never_runs"));
}

#[test]
fn test_malformed_case_is_fatal_setup_error() {
    let ctx = TestContext::new();

    let suite = ctx.write_suite(
        r#"
cases:
  - name: aimless
    command: "classify"
"#,
    );

    let output = ctx.run_suite(&suite, &[]);
    assert!(!output.success);
    assert!(output.stderr.contains("aimless"), "{}", output.stderr);
}

#[test]
fn test_list_shows_cases_without_running() {
    let ctx = TestContext::new();

    let suite = ctx.write_suite(
        r#"
name: demo suite
cases:
  - name: classify_cat
    command: "classify -i cat.jpg"
    expected_output: "class: cat"
  - name: server_runs
    command: "server"
    supervised: true
"#,
    );

    let output = ctx.run_harness(&["list", suite.to_str().unwrap()]);
    assert!(output.success, "stderr: {}", output.stderr);
    assert!(output.stdout.contains("classify_cat"));
    assert!(output.stdout.contains("server_runs"));
    assert!(output.stdout.contains("2 case(s)"));
}

#[test]
fn test_json_summary() {
    let ctx = TestContext::new();
    ctx.install_app("classify", r#"echo "class: cat""#);

    let suite = ctx.write_suite(
        r#"
cases:
  - name: classify_cat
    command: "classify"
    expected_output: "class: cat"
"#,
    );

    let output = ctx.run_suite(&suite, &["--json"]);
    assert!(output.success, "stderr: {}", output.stderr);
    assert!(output.stdout.contains(r#""name": "classify_cat""#));
    assert!(output.stdout.contains(r#""passed": true"#));
}

#[test]
fn test_filter_selects_cases() {
    let ctx = TestContext::new();
    ctx.install_app("good", r#"echo ok"#);
    ctx.install_app("bad", "exit 1");

    let suite = ctx.write_suite(
        r#"
cases:
  - name: good_case
    command: "good"
    expected_output: ok
  - name: bad_case
    command: "bad"
    expected_output: ok
"#,
    );

    let output = ctx.run_suite(&suite, &["--filter", "good"]);
    assert!(output.success, "stdout: {}", output.stdout);
    assert!(!output.stdout.contains("bad_case"));
}
