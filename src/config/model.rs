// src/config/model.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::types::{ActionConflictPolicy, ActionFailurePolicy};

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [watch]
/// dir = "src"
/// recursive = true
/// interval = "2s"
/// runtime = "1h"
/// exclude = ["**/*.swp"]
///
/// [action]
/// foreach = "echo changed: $1"
/// ```
///
/// All sections are optional and have reasonable defaults; `watch.dir` must be
/// supplied either here or on the command line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// What to watch and how often, from `[watch]`.
    #[serde(default)]
    pub watch: WatchSection,

    /// What to do when files change, from `[action]`.
    #[serde(default)]
    pub action: ActionSection,
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub watch: WatchSection,
    pub action: ActionSection,
    target_dir: PathBuf,
    interval: Duration,
    runtime: Duration,
}

impl ConfigFile {
    /// Assemble a config from parts that have already been validated.
    pub(crate) fn new_unchecked(
        watch: WatchSection,
        action: ActionSection,
        target_dir: PathBuf,
        interval: Duration,
        runtime: Duration,
    ) -> Self {
        Self {
            watch,
            action,
            target_dir,
            interval,
            runtime,
        }
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// Parsed `watch.interval`.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Parsed `watch.runtime`.
    pub fn runtime(&self) -> Duration {
        self.runtime
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Directory to observe.
    #[serde(default)]
    pub dir: Option<String>,

    /// Descend into subdirectories.
    #[serde(default)]
    pub recursive: bool,

    /// Wait between scans, e.g. `"5s"`, `"500ms"`. A bare number is seconds.
    #[serde(default = "default_interval")]
    pub interval: String,

    /// Total observation time, e.g. `"60s"`, `"24h"`.
    #[serde(default = "default_runtime")]
    pub runtime: String,

    /// Glob patterns (relative to `dir`) that are never reported.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Exact paths that are never reported.
    #[serde(default)]
    pub exclude_paths: Vec<String>,

    /// Exclude the running `change-detector` executable.
    #[serde(default = "default_exclude_self")]
    pub exclude_self: bool,

    /// Forget deleted files so they are reported again if re-created.
    #[serde(default)]
    pub evict_missing: bool,
}

fn default_interval() -> String {
    "5s".to_string()
}

fn default_runtime() -> String {
    "60s".to_string()
}

fn default_exclude_self() -> bool {
    true
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            dir: None,
            recursive: false,
            interval: default_interval(),
            runtime: default_runtime(),
            exclude: Vec::new(),
            exclude_paths: Vec::new(),
            exclude_self: default_exclude_self(),
            evict_missing: false,
        }
    }
}

/// `[action]` section.
///
/// At most one of `once`, `parallel` and `foreach` should be set; see
/// `on_conflict` for what happens otherwise.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionSection {
    /// Command run once per cycle with changes; the loop waits for it.
    #[serde(default)]
    pub once: Option<String>,

    /// Command started in the background; a still-running previous instance
    /// is killed first.
    #[serde(default)]
    pub parallel: Option<String>,

    /// Command run for each changed file (path as `$1`).
    #[serde(default)]
    pub foreach: Option<String>,

    /// `"priority"` (default) or `"reject"`.
    #[serde(default)]
    pub on_conflict: ActionConflictPolicy,

    /// `"propagate"` (default) or `"continue"`.
    #[serde(default)]
    pub on_failure: ActionFailurePolicy,
}

impl ActionSection {
    /// Names of the action slots that are set, in priority order.
    pub fn configured(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.once.is_some() {
            names.push("once");
        }
        if self.parallel.is_some() {
            names.push("parallel");
        }
        if self.foreach.is_some() {
            names.push("foreach");
        }
        names
    }
}
