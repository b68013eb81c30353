// src/engine/watch_config.rs

use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::config::ConfigFile;
use crate::errors::{DetectorError, Result};
use crate::exec::{Action, ForeachAction, OnceAction, ParallelAction, ShellCommand};
use crate::types::ActionFailurePolicy;

/// Default wait between two scans.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Default total runtime budget of one observation.
pub const DEFAULT_RUNTIME: Duration = Duration::from_secs(60);

/// Everything a [`Runner`](super::Runner) needs to observe one directory.
///
/// ```no_run
/// use std::time::Duration;
/// use change_detector::engine::{Runner, WatchConfig};
/// use change_detector::exec::Action;
///
/// # async fn demo() -> change_detector::errors::Result<()> {
/// let config = WatchConfig::new("./src")
///     .recursive(true)
///     .interval(Duration::from_secs(2))
///     .action(Action::foreach("print", |path| {
///         println!("changed: {}", path.display());
///         Ok(())
///     }));
///
/// let mut runner = Runner::new(config)?;
/// runner.change_runtime(Duration::from_secs(24 * 60 * 60));
/// runner.run().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct WatchConfig {
    pub target_dir: PathBuf,
    pub recursive: bool,
    pub interval: Duration,
    pub runtime: Duration,
    pub action: Action,
    pub exclude_paths: Vec<PathBuf>,
    pub exclude_patterns: Vec<String>,
    pub evict_missing: bool,
    pub on_failure: ActionFailurePolicy,
}

impl WatchConfig {
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
            recursive: false,
            interval: DEFAULT_INTERVAL,
            runtime: DEFAULT_RUNTIME,
            action: Action::None,
            exclude_paths: Vec::new(),
            exclude_patterns: Vec::new(),
            evict_missing: false,
            on_failure: ActionFailurePolicy::default(),
        }
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn runtime(mut self, runtime: Duration) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    /// Never report (or descend into) this exact path.
    pub fn exclude_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.exclude_paths.push(path.into());
        self
    }

    /// Never report paths matching this glob (relative to the target dir).
    pub fn exclude_glob(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    pub fn evict_missing(mut self, evict: bool) -> Self {
        self.evict_missing = evict;
        self
    }

    pub fn on_failure(mut self, policy: ActionFailurePolicy) -> Self {
        self.on_failure = policy;
        self
    }
}

/// Build a shell-command based watch from a validated config file.
impl TryFrom<&ConfigFile> for WatchConfig {
    type Error = DetectorError;

    fn try_from(cfg: &ConfigFile) -> Result<Self> {
        let section = &cfg.action;
        let command = |c: &Option<String>| c.as_ref().map(|c| ShellCommand::new(c.clone()));

        let action = Action::resolve(
            command(&section.once).map(|c| Box::new(c) as Box<dyn OnceAction>),
            command(&section.parallel).map(|c| Box::new(c) as Box<dyn ParallelAction>),
            command(&section.foreach).map(|c| Box::new(c) as Box<dyn ForeachAction>),
            section.on_conflict,
        )?;

        let mut exclude_paths: Vec<PathBuf> =
            cfg.watch.exclude_paths.iter().map(PathBuf::from).collect();
        if cfg.watch.exclude_self {
            match std::env::current_exe() {
                Ok(exe) => exclude_paths.push(exe),
                Err(e) => debug!(error = %e, "cannot determine own executable; not excluding it"),
            }
        }

        Ok(Self {
            target_dir: cfg.target_dir().to_path_buf(),
            recursive: cfg.watch.recursive,
            interval: cfg.interval(),
            runtime: cfg.runtime(),
            action,
            exclude_paths,
            exclude_patterns: cfg.watch.exclude.clone(),
            evict_missing: cfg.watch.evict_missing,
            on_failure: section.on_failure,
        })
    }
}
