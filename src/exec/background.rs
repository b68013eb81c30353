// src/exec/background.rs

//! Handles for reactions running in the background (`parallel` mode).

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use tokio::process::Child;
use tokio::task::JoinHandle;
use tracing::debug;

/// A background reaction that the runner can poll and terminate.
///
/// The runner only ever looks at liveness; the outcome of a background
/// reaction is never inspected.
pub trait BackgroundTask: Send + fmt::Debug {
    /// Whether the reaction is still running.
    fn is_running(&mut self) -> bool;

    /// Stop the reaction immediately (no grace period).
    fn terminate(&mut self);

    /// Wait until the reaction has finished on its own.
    fn join(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Background reaction running as an OS child process.
///
/// The child is spawned with `kill_on_drop(true)`, so dropping the handle
/// also stops the process.
pub struct ProcessTask {
    action: String,
    child: Child,
}

impl ProcessTask {
    pub fn new(action: impl Into<String>, child: Child) -> Self {
        Self {
            action: action.into(),
            child,
        }
    }
}

impl fmt::Debug for ProcessTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessTask")
            .field("action", &self.action)
            .field("pid", &self.child.id())
            .finish()
    }
}

impl BackgroundTask for ProcessTask {
    fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    fn terminate(&mut self) {
        if let Err(e) = self.child.start_kill() {
            debug!(
                action = %self.action,
                error = %e,
                "failed to kill background process (already exited?)"
            );
        }
    }

    fn join(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            if let Err(e) = self.child.wait().await {
                debug!(action = %self.action, error = %e, "waiting for background process failed");
            }
        })
    }
}

/// Background reaction running as a Tokio task.
pub struct AsyncTask {
    action: String,
    handle: JoinHandle<()>,
}

impl AsyncTask {
    pub fn new(action: impl Into<String>, handle: JoinHandle<()>) -> Self {
        Self {
            action: action.into(),
            handle,
        }
    }
}

impl fmt::Debug for AsyncTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncTask")
            .field("action", &self.action)
            .field("finished", &self.handle.is_finished())
            .finish()
    }
}

impl BackgroundTask for AsyncTask {
    fn is_running(&mut self) -> bool {
        !self.handle.is_finished()
    }

    fn terminate(&mut self) {
        self.handle.abort();
    }

    fn join(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            if let Err(e) = (&mut self.handle).await {
                if !e.is_cancelled() {
                    debug!(action = %self.action, error = %e, "background task ended abnormally");
                }
            }
        })
    }
}
