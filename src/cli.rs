// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::config::RawConfigFile;
use crate::types::{ActionConflictPolicy, ActionFailurePolicy};

/// Command-line arguments for `change-detector`.
///
/// Every flag overrides the corresponding setting of the config file.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "change-detector",
    version,
    about = "Poll a directory for new or modified files and run a command when they change.",
    long_about = None
)]
pub struct CliArgs {
    /// Directory to watch (overrides `[watch].dir`).
    #[arg(value_name = "DIR")]
    pub dir: Option<String>,

    /// Path to the config file (TOML).
    ///
    /// Default: `ChangeDetector.toml` in the current working directory, if it
    /// exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Also watch subdirectories.
    #[arg(short, long)]
    pub recursive: bool,

    /// Wait between scans, e.g. `5s`, `500ms`, `1m` (bare number = seconds).
    #[arg(short, long, value_name = "DURATION")]
    pub interval: Option<String>,

    /// Total observation time, e.g. `60s`, `24h`.
    #[arg(long, value_name = "DURATION")]
    pub runtime: Option<String>,

    /// Command to run once per cycle with changes.
    #[arg(long, value_name = "CMD")]
    pub once: Option<String>,

    /// Command to (re)start in the background on every cycle with changes.
    #[arg(long, value_name = "CMD")]
    pub parallel: Option<String>,

    /// Command to run for every changed file (path passed as `$1`).
    #[arg(long, value_name = "CMD")]
    pub foreach: Option<String>,

    /// Glob (relative to DIR) to ignore; may be given multiple times.
    #[arg(short, long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Forget deleted files so they are reported again if re-created.
    #[arg(long)]
    pub evict_missing: bool,

    /// What to do when more than one action is configured.
    #[arg(long, value_name = "POLICY")]
    pub on_conflict: Option<ActionConflictPolicy>,

    /// What to do when an action fails.
    #[arg(long, value_name = "POLICY")]
    pub on_failure: Option<ActionFailurePolicy>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CHANGE_DETECTOR_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Validate and print the effective configuration, but don't watch.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// Overlay command-line settings onto a (possibly default) raw config.
    pub fn apply_to(&self, raw: &mut RawConfigFile) {
        if let Some(dir) = &self.dir {
            raw.watch.dir = Some(dir.clone());
        }
        if self.recursive {
            raw.watch.recursive = true;
        }
        if let Some(interval) = &self.interval {
            raw.watch.interval = interval.clone();
        }
        if let Some(runtime) = &self.runtime {
            raw.watch.runtime = runtime.clone();
        }
        raw.watch.exclude.extend(self.exclude.iter().cloned());
        if self.evict_missing {
            raw.watch.evict_missing = true;
        }

        // An action given on the command line replaces those from the file.
        if self.once.is_some() || self.parallel.is_some() || self.foreach.is_some() {
            raw.action.once = self.once.clone();
            raw.action.parallel = self.parallel.clone();
            raw.action.foreach = self.foreach.clone();
        }
        if let Some(policy) = self.on_conflict {
            raw.action.on_conflict = policy;
        }
        if let Some(policy) = self.on_failure {
            raw.action.on_failure = policy;
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
