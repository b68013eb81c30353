use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// What to do when more than one of `once` / `parallel` / `foreach` is
/// configured.
///
/// - `Priority`: keep only the first one in the order once > parallel >
///   foreach and warn about the others (default).
/// - `Reject`: treat the configuration as invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionConflictPolicy {
    Priority,
    Reject,
}

impl Default for ActionConflictPolicy {
    fn default() -> Self {
        ActionConflictPolicy::Priority
    }
}

impl FromStr for ActionConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "priority" => Ok(ActionConflictPolicy::Priority),
            "reject" => Ok(ActionConflictPolicy::Reject),
            other => Err(format!(
                "invalid on_conflict: {other} (expected \"priority\" or \"reject\")"
            )),
        }
    }
}

/// What the runner does when a once/foreach/parallel reaction fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionFailurePolicy {
    /// Stop the observation loop and return the error from `run()`.
    Propagate,
    /// Log the failure and keep polling.
    Continue,
}

impl Default for ActionFailurePolicy {
    fn default() -> Self {
        ActionFailurePolicy::Propagate
    }
}

impl FromStr for ActionFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "propagate" => Ok(ActionFailurePolicy::Propagate),
            "continue" => Ok(ActionFailurePolicy::Continue),
            other => Err(format!(
                "invalid on_failure: {other} (expected \"propagate\" or \"continue\")"
            )),
        }
    }
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
///
/// A bare number is taken as seconds, so `"5"` and `"5s"` are equivalent.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .unwrap_or(s.len());

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "" | "s" => Ok(Duration::from_secs(value)),
        "m" => scaled(value, 60),
        "h" => scaled(value, 60 * 60),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}

fn scaled(value: u64, factor: u64) -> Result<Duration, String> {
    value
        .checked_mul(factor)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration too large: {value} x {factor}s"))
}
