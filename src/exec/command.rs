// src/exec/command.rs

//! Shell-command reactions used by the CLI.

use std::path::Path;
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::exec::action::{ActionFuture, ForeachAction, OnceAction, ParallelAction};
use crate::exec::background::{BackgroundTask, ProcessTask};

/// Environment variable carrying the changed path for foreach commands.
pub const CHANGED_FILE_ENV: &str = "CHANGE_DETECTOR_FILE";

/// A command line executed through the platform shell.
///
/// - once: run and wait; a non-zero exit status is a failure.
/// - foreach: same, with the changed path passed as `$1` (appended to the
///   command line on Windows) and in [`CHANGED_FILE_ENV`].
/// - parallel: spawn and return a [`ProcessTask`] handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    cmd: String,
}

impl ShellCommand {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self { cmd: cmd.into() }
    }

    /// Build a shell command appropriate for the platform.
    fn command(&self, file: Option<&Path>) -> Command {
        let mut cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(&self.cmd);
            c
        } else {
            let mut c = Command::new("sh");
            // `sh -c CMD NAME ARG`: NAME becomes $0, ARG becomes $1.
            c.arg("-c").arg(&self.cmd).arg("change-detector");
            c
        };

        if let Some(file) = file {
            cmd.arg(file).env(CHANGED_FILE_ENV, file);
        }

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    fn spawn_child(&self, file: Option<&Path>) -> Result<Child> {
        let mut child = self
            .command(file)
            .spawn()
            .with_context(|| format!("spawning `{}`", self.cmd))?;

        forward_output(&self.cmd, &mut child);
        Ok(child)
    }

    async fn run_to_completion(&self, file: Option<&Path>) -> Result<()> {
        info!(cmd = %self.cmd, file = ?file, "starting command");

        let mut child = self.spawn_child(file)?;
        let status = child
            .wait()
            .await
            .with_context(|| format!("waiting for `{}`", self.cmd))?;

        let code = status.code().unwrap_or(-1);
        debug!(
            cmd = %self.cmd,
            exit_code = code,
            success = status.success(),
            "command exited"
        );

        if !status.success() {
            bail!("command `{}` exited with status {}", self.cmd, code);
        }
        Ok(())
    }
}

impl OnceAction for ShellCommand {
    fn id(&self) -> &str {
        &self.cmd
    }

    fn call(&mut self) -> ActionFuture<'_> {
        Box::pin(self.run_to_completion(None))
    }
}

impl ForeachAction for ShellCommand {
    fn id(&self) -> &str {
        &self.cmd
    }

    fn call<'a>(&'a mut self, path: &'a Path) -> ActionFuture<'a> {
        Box::pin(self.run_to_completion(Some(path)))
    }
}

impl ParallelAction for ShellCommand {
    fn id(&self) -> &str {
        &self.cmd
    }

    fn spawn(&mut self) -> Result<Box<dyn BackgroundTask>> {
        let child = self.spawn_child(None)?;
        info!(cmd = %self.cmd, pid = ?child.id(), "started background command");
        Ok(Box::new(ProcessTask::new(self.cmd.clone(), child)))
    }
}

/// Consume stdout/stderr so OS buffers don't fill; forward lines to the log.
fn forward_output(cmd: &str, child: &mut Child) {
    if let Some(stdout) = child.stdout.take() {
        spawn_line_logger(cmd.to_string(), stdout, false);
    }
    if let Some(stderr) = child.stderr.take() {
        spawn_line_logger(cmd.to_string(), stderr, true);
    }
}

fn spawn_line_logger<R>(cmd: String, stream: R, is_stderr: bool)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if is_stderr {
                warn!(cmd = %cmd, "stderr: {}", line);
            } else {
                info!(cmd = %cmd, "stdout: {}", line);
            }
        }
    });
}
