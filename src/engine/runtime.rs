// src/engine/runtime.rs

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::errors::{DetectorError, Result};
use crate::exec::{Action, ActionMode, BackgroundTask};
use crate::fs::{FileSystem, RealFileSystem};
use crate::types::ActionFailurePolicy;
use crate::watch::{ChangeSet, FileRegistry, ScanOptions, Scanner};

use super::events::{EventSink, WatchEvent};
use super::watch_config::WatchConfig;

/// Result of a single poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleOutcome {
    pub cycle: u64,
    pub changes: ChangeSet,
    /// The mode that was dispatched, if any reaction fired.
    pub dispatched: Option<ActionMode>,
}

/// Summary returned by [`Runner::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
}

/// Drives the polling loop: wait one interval, scan, dispatch, repeat until
/// the runtime budget is spent.
///
/// The runner is the single owner of the registry (through its [`Scanner`]),
/// the remaining-runtime counter and the background task handle. Background
/// reactions receive nothing but their own closure or command.
pub struct Runner {
    scanner: Scanner,
    action: Action,
    interval: Duration,
    remaining: Duration,
    on_failure: ActionFailurePolicy,
    background: Option<Box<dyn BackgroundTask>>,
    events: EventSink,
    cycle: u64,
}

impl fmt::Debug for Runner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner")
            .field("scanner", &self.scanner)
            .field("action", &self.action)
            .field("interval", &self.interval)
            .field("remaining", &self.remaining)
            .field("background", &self.background)
            .finish_non_exhaustive()
    }
}

impl Runner {
    /// Runner scanning the real filesystem.
    pub fn new(config: WatchConfig) -> Result<Self> {
        Self::with_file_system(config, Arc::new(RealFileSystem))
    }

    pub fn with_file_system(config: WatchConfig, fs: Arc<dyn FileSystem>) -> Result<Self> {
        ensure_nonzero_interval(config.interval)?;

        let scanner = Scanner::new(
            fs,
            config.target_dir,
            ScanOptions {
                recursive: config.recursive,
                exclude_paths: config.exclude_paths,
                exclude_patterns: config.exclude_patterns,
                evict_missing: config.evict_missing,
            },
        )?;

        Ok(Self {
            scanner,
            action: config.action,
            interval: config.interval,
            remaining: config.runtime,
            on_failure: config.on_failure,
            background: None,
            events: EventSink::default(),
            cycle: 0,
        })
    }

    /// Receive [`WatchEvent`]s from now on.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<WatchEvent> {
        self.events.subscribe()
    }

    /// Change the wait between scans (default 5 seconds).
    pub fn change_interval(&mut self, interval: Duration) -> Result<()> {
        ensure_nonzero_interval(interval)?;
        self.interval = interval;
        Ok(())
    }

    /// Change how long the observation runs (default 60 seconds).
    pub fn change_runtime(&mut self, runtime: Duration) {
        self.remaining = runtime;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn remaining_runtime(&self) -> Duration {
        self.remaining
    }

    /// Number of cycles `run()` will perform with the current settings.
    pub fn planned_cycles(&self) -> u64 {
        (self.remaining.as_nanos() / self.interval.as_nanos()) as u64
    }

    /// Number of cycles performed so far.
    pub fn cycles(&self) -> u64 {
        self.cycle
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    pub fn registry(&self) -> &FileRegistry {
        self.scanner.registry()
    }

    /// Whether a background reaction started by this runner is still alive.
    pub fn has_live_background_task(&mut self) -> bool {
        self.background.as_mut().is_some_and(|task| task.is_running())
    }

    /// Terminate the live background reaction, if any.
    ///
    /// Returns true if a running task was terminated.
    pub fn terminate_background(&mut self) -> bool {
        match self.background.take() {
            Some(mut task) => {
                if !task.is_running() {
                    return false;
                }
                info!(?task, "terminating background reaction");
                task.terminate();
                true
            }
            None => false,
        }
    }

    /// Wait for the live background reaction to finish on its own.
    pub async fn join_background(&mut self) {
        if let Some(mut task) = self.background.take() {
            if task.is_running() {
                info!(?task, "waiting for background reaction to finish");
                task.join().await;
            }
        }
    }

    /// Main polling loop.
    ///
    /// Each iteration sleeps one interval, takes exactly one interval off the
    /// remaining runtime (time spent scanning or in reactions is not counted),
    /// then scans and dispatches. Iterations continue while at least one full
    /// interval of budget remains.
    pub async fn run(&mut self) -> Result<RunSummary> {
        info!(
            root = ?self.scanner.root(),
            recursive = self.scanner.is_recursive(),
            interval = ?self.interval,
            runtime = ?self.remaining,
            planned_cycles = self.planned_cycles(),
            action = ?self.action,
            "observation started"
        );

        let mut cycles = 0;
        while self.remaining >= self.interval {
            sleep(self.interval).await;
            self.remaining -= self.interval;

            self.run_cycle().await?;
            cycles += 1;
        }

        info!(cycles, "observation ends");
        self.events.emit(WatchEvent::ObservationEnded { cycles });

        Ok(RunSummary { cycles })
    }

    /// One scan + dispatch, without waiting and without touching the runtime
    /// budget.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome> {
        self.cycle += 1;
        let cycle = self.cycle;

        let changes = self.scanner.scan();
        info!(cycle, changed = %changes, "changed files");
        self.events.emit(WatchEvent::ScanCompleted {
            cycle,
            changes: changes.paths().to_vec(),
        });

        let dispatched = if changes.is_empty() {
            info!(cycle, "nothing happened");
            self.events
                .emit(WatchEvent::NothingHappened { cycle, changes: 0 });
            None
        } else {
            self.dispatch(cycle, &changes).await?
        };

        Ok(CycleOutcome {
            cycle,
            changes,
            dispatched,
        })
    }

    async fn dispatch(&mut self, cycle: u64, changes: &ChangeSet) -> Result<Option<ActionMode>> {
        let Self {
            action,
            background,
            events,
            on_failure,
            ..
        } = self;
        let policy = *on_failure;

        match action {
            Action::None => {
                info!(cycle, files = changes.len(), "no action configured; nothing happened");
                events.emit(WatchEvent::NothingHappened {
                    cycle,
                    changes: changes.len(),
                });
                Ok(None)
            }
            Action::Once(once) => {
                let res = once.call().await;
                settle(events, policy, cycle, ActionMode::Once, once.id(), None, res)?;
                Ok(Some(ActionMode::Once))
            }
            Action::Parallel(parallel) => {
                if let Some(mut previous) = background.take() {
                    if previous.is_running() {
                        info!(cycle, ?previous, "terminating previous background reaction");
                        previous.terminate();
                        events.emit(WatchEvent::BackgroundTaskReplaced {
                            cycle,
                            action: parallel.id().to_string(),
                        });
                    }
                }

                let res = parallel.spawn().map(|task| {
                    debug!(cycle, ?task, "background reaction started");
                    *background = Some(task);
                });
                settle(events, policy, cycle, ActionMode::Parallel, parallel.id(), None, res)?;
                Ok(Some(ActionMode::Parallel))
            }
            Action::Foreach(foreach) => {
                for path in changes.iter() {
                    let res = foreach.call(path).await;
                    settle(events, policy, cycle, ActionMode::Foreach, foreach.id(), Some(path), res)?;
                }
                Ok(Some(ActionMode::Foreach))
            }
        }
    }
}

fn ensure_nonzero_interval(interval: Duration) -> Result<()> {
    if interval.is_zero() {
        return Err(DetectorError::ConfigError(
            "poll interval must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

/// Log + emit the outcome of one reaction and apply the failure policy.
fn settle(
    events: &EventSink,
    policy: ActionFailurePolicy,
    cycle: u64,
    mode: ActionMode,
    action: &str,
    file: Option<&Path>,
    res: anyhow::Result<()>,
) -> Result<()> {
    match res {
        Ok(()) => {
            info!(cycle, %mode, action, file = ?file, "executed action");
            events.emit(WatchEvent::ActionExecuted {
                cycle,
                mode,
                action: action.to_string(),
                file: file.map(Path::to_path_buf),
            });
            Ok(())
        }
        Err(err) => {
            events.emit(WatchEvent::ActionFailed {
                cycle,
                mode,
                action: action.to_string(),
                file: file.map(Path::to_path_buf),
                error: format!("{err:#}"),
            });

            match policy {
                ActionFailurePolicy::Propagate => {
                    error!(cycle, %mode, action, file = ?file, error = %err, "action failed; stopping observation");
                    Err(DetectorError::ActionFailed {
                        mode,
                        action: action.to_string(),
                        source: err.into(),
                    })
                }
                ActionFailurePolicy::Continue => {
                    warn!(cycle, %mode, action, file = ?file, error = %err, "action failed; continuing");
                    Ok(())
                }
            }
        }
    }
}
