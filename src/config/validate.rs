// src/config/validate.rs

use std::path::PathBuf;
use std::time::Duration;

use crate::config::model::{ActionSection, ConfigFile, RawConfigFile, WatchSection};
use crate::errors::{DetectorError, Result};
use crate::types::{parse_duration, ActionConflictPolicy};
use crate::watch::patterns::build_globset;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::DetectorError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let target_dir = validate_target_dir(&raw.watch)?;
        let interval = validate_interval(&raw.watch)?;
        let runtime = parse_field("watch.runtime", &raw.watch.runtime)?;
        validate_excludes(&raw.watch)?;
        validate_actions(&raw.action)?;

        Ok(ConfigFile::new_unchecked(
            raw.watch, raw.action, target_dir, interval, runtime,
        ))
    }
}

fn validate_target_dir(watch: &WatchSection) -> Result<PathBuf> {
    match watch.dir.as_deref().map(str::trim) {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => Err(DetectorError::ConfigError(
            "no directory to watch: set [watch].dir or pass DIR".to_string(),
        )),
    }
}

fn validate_interval(watch: &WatchSection) -> Result<Duration> {
    let interval = parse_field("watch.interval", &watch.interval)?;
    if interval.is_zero() {
        return Err(DetectorError::ConfigError(
            "[watch].interval must be greater than zero".to_string(),
        ));
    }
    Ok(interval)
}

fn parse_field(field: &str, value: &str) -> Result<Duration> {
    parse_duration(value).map_err(|e| {
        DetectorError::ConfigError(format!("[{field}] = {value:?}: {e}"))
    })
}

fn validate_excludes(watch: &WatchSection) -> Result<()> {
    build_globset(&watch.exclude)
        .map(|_| ())
        .map_err(|e| DetectorError::ConfigError(format!("[watch].exclude: {e:#}")))
}

fn validate_actions(action: &ActionSection) -> Result<()> {
    for (name, cmd) in [
        ("once", &action.once),
        ("parallel", &action.parallel),
        ("foreach", &action.foreach),
    ] {
        if let Some(cmd) = cmd {
            if cmd.trim().is_empty() {
                return Err(DetectorError::ConfigError(format!(
                    "[action].{name} must not be empty"
                )));
            }
        }
    }

    let configured = action.configured();
    if configured.len() > 1 && action.on_conflict == ActionConflictPolicy::Reject {
        return Err(DetectorError::ConfigError(format!(
            "only one of once/parallel/foreach may be configured with on_conflict = \"reject\" (got {})",
            configured.join(", ")
        )));
    }

    Ok(())
}
