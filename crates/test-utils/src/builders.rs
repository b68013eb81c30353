#![allow(dead_code)]

use change_detector::config::{ConfigFile, RawConfigFile};
use change_detector::types::{ActionConflictPolicy, ActionFailurePolicy};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new(dir: &str) -> Self {
        let mut config = RawConfigFile::default();
        config.watch.dir = Some(dir.to_string());
        // Keep the test binary out of the picture; tests use their own dirs.
        config.watch.exclude_self = false;
        Self { config }
    }

    pub fn recursive(mut self, val: bool) -> Self {
        self.config.watch.recursive = val;
        self
    }

    pub fn interval(mut self, val: &str) -> Self {
        self.config.watch.interval = val.to_string();
        self
    }

    pub fn runtime(mut self, val: &str) -> Self {
        self.config.watch.runtime = val.to_string();
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.config.watch.exclude.push(pattern.to_string());
        self
    }

    pub fn once(mut self, cmd: &str) -> Self {
        self.config.action.once = Some(cmd.to_string());
        self
    }

    pub fn parallel(mut self, cmd: &str) -> Self {
        self.config.action.parallel = Some(cmd.to_string());
        self
    }

    pub fn foreach(mut self, cmd: &str) -> Self {
        self.config.action.foreach = Some(cmd.to_string());
        self
    }

    pub fn on_conflict(mut self, policy: ActionConflictPolicy) -> Self {
        self.config.action.on_conflict = policy;
        self
    }

    pub fn on_failure(mut self, policy: ActionFailurePolicy) -> Self {
        self.config.action.on_failure = policy;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}
