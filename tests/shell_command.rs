// tests/shell_command.rs

#![cfg(unix)]

mod common;
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::fs;
use std::path::Path;
use std::time::Duration;

use change_detector::engine::{Runner, WatchConfig};
use change_detector::exec::{
    Action, BackgroundTask, ForeachAction, OnceAction, ParallelAction, ShellCommand,
};
use tempfile::tempdir;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn once_command_success() -> TestResult {
    init_tracing();
    let mut cmd = ShellCommand::new("true");
    with_timeout(OnceAction::call(&mut cmd)).await?;
    Ok(())
}

#[tokio::test]
async fn once_command_nonzero_exit_is_an_error() {
    init_tracing();
    let mut cmd = ShellCommand::new("exit 3");
    let err = with_timeout(OnceAction::call(&mut cmd)).await.unwrap_err();
    assert!(err.to_string().contains("exited with status 3"), "{err:#}");
}

#[tokio::test]
async fn foreach_command_receives_path_as_argument_and_env() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let out = dir.path().join("out.txt");
    let changed = dir.path().join("changed file.txt");

    let script = format!(
        "printf '%s|%s' \"$1\" \"$CHANGE_DETECTOR_FILE\" > '{}'",
        out.display()
    );
    let mut cmd = ShellCommand::new(script);
    with_timeout(ForeachAction::call(&mut cmd, &changed)).await?;

    let written = fs::read_to_string(&out)?;
    let expected = format!("{0}|{0}", changed.display());
    assert_eq!(written, expected);
    Ok(())
}

#[tokio::test]
async fn parallel_command_runs_in_background_until_terminated() -> TestResult {
    init_tracing();
    let mut cmd = ShellCommand::new("sleep 100");
    let mut task = ParallelAction::spawn(&mut cmd)?;

    assert!(task.is_running());
    task.terminate();
    with_timeout(task.join()).await;
    assert!(!task.is_running());
    Ok(())
}

#[tokio::test]
async fn parallel_command_that_exits_is_not_running() -> TestResult {
    init_tracing();
    let mut cmd = ShellCommand::new("exit 0");
    let mut task: Box<dyn BackgroundTask> = ParallelAction::spawn(&mut cmd)?;

    with_timeout(task.join()).await;
    assert!(!task.is_running());
    Ok(())
}

/// Pids written by the background command, one per line.
fn recorded_pids(path: &Path) -> Vec<u32> {
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .filter_map(|line| line.trim().parse().ok())
        .collect()
}

async fn wait_for_pids(path: &Path, count: usize) -> Vec<u32> {
    with_timeout(async {
        loop {
            let pids = recorded_pids(path);
            if pids.len() >= count {
                return pids;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
}

/// A killed child may linger as a zombie until it is reaped.
#[cfg(target_os = "linux")]
fn process_alive(pid: u32) -> bool {
    match fs::read_to_string(format!("/proc/{pid}/stat")) {
        Ok(stat) => !stat
            .rsplit(')')
            .next()
            .is_some_and(|rest| rest.trim_start().starts_with('Z')),
        Err(_) => false,
    }
}

#[tokio::test]
async fn runner_restarts_background_command_on_change() -> TestResult {
    init_tracing();
    let watched = tempdir()?;
    let scratch = tempdir()?;
    let file = watched.path().join("watched.txt");
    let pid_file = scratch.path().join("pids");
    fs::write(&file, "v1")?;

    let cmd = format!("echo $$ >> '{}'; exec sleep 100", pid_file.display());
    let config = WatchConfig::new(watched.path())
        .interval(Duration::from_millis(10))
        .action(Action::Parallel(Box::new(ShellCommand::new(cmd))));
    let mut runner = Runner::new(config)?;

    runner.run_cycle().await?;
    assert!(runner.has_live_background_task());
    let first = wait_for_pids(&pid_file, 1).await[0];

    let later = fs::metadata(&file)?.modified()? + Duration::from_secs(10);
    fs::File::options().write(true).open(&file)?.set_modified(later)?;

    runner.run_cycle().await?;
    assert!(runner.has_live_background_task());
    let pids = wait_for_pids(&pid_file, 2).await;
    assert_eq!(pids.len(), 2);
    assert_ne!(pids[0], pids[1]);
    assert_eq!(pids[0], first);

    #[cfg(target_os = "linux")]
    {
        with_timeout(async {
            while process_alive(first) {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(process_alive(pids[1]));
    }

    assert!(runner.terminate_background());
    Ok(())
}
