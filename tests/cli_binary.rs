// tests/cli_binary.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::process::Command;

use tempfile::tempdir;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn dry_run_prints_config_on_stdout_and_logs_on_stderr() -> TestResult {
    init_tracing();
    let workdir = tempdir()?;

    let output = Command::new(env!("CARGO_BIN_EXE_change-detector"))
        .current_dir(workdir.path())
        .args(["watched", "--dry-run", "--log-level", "debug", "-i", "2s"])
        .output()?;

    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8(output.stdout)?;
    let stderr = String::from_utf8(output.stderr)?;

    assert!(stdout.contains("change-detector dry-run"), "{stdout}");
    assert!(stdout.contains("watch.dir = watched"), "{stdout}");
    assert!(stdout.contains("watch.interval = 2s"), "{stdout}");
    assert!(!stdout.contains("dry-run complete"), "log line on stdout: {stdout}");
    assert!(stderr.contains("dry-run complete"), "{stderr}");
    Ok(())
}

#[test]
fn invalid_settings_exit_with_error() -> TestResult {
    init_tracing();
    let workdir = tempdir()?;

    let output = Command::new(env!("CARGO_BIN_EXE_change-detector"))
        .current_dir(workdir.path())
        .args(["watched", "--dry-run", "--interval", "0s"])
        .output()?;

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("greater than zero"), "{stderr}");
    Ok(())
}
