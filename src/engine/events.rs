// src/engine/events.rs

use std::path::PathBuf;

use tokio::sync::mpsc;

use crate::exec::ActionMode;

/// Observable events emitted by the [`Runner`](super::Runner).
///
/// Every event is also written to the log; the event stream exists so callers
/// can react programmatically without parsing log lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A scan finished; `changes` is the cycle's change set (may be empty).
    ScanCompleted { cycle: u64, changes: Vec<PathBuf> },
    /// A reaction ran (once/foreach) or was started (parallel).
    ActionExecuted {
        cycle: u64,
        mode: ActionMode,
        action: String,
        file: Option<PathBuf>,
    },
    /// A reaction failed.
    ActionFailed {
        cycle: u64,
        mode: ActionMode,
        action: String,
        file: Option<PathBuf>,
        error: String,
    },
    /// A still-running background reaction was terminated to make room for a
    /// new one.
    BackgroundTaskReplaced { cycle: u64, action: String },
    /// No reaction fired: either nothing changed or no action is configured.
    NothingHappened { cycle: u64, changes: usize },
    /// The runtime budget is exhausted.
    ObservationEnded { cycles: u64 },
}

/// Optional sender side of the event stream.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<WatchEvent>>,
}

impl EventSink {
    /// Attach a new receiver. A previous subscriber stops receiving events.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<WatchEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.tx = Some(tx);
        rx
    }

    pub fn emit(&self, event: WatchEvent) {
        if let Some(tx) = &self.tx {
            // A dropped receiver just means nobody is listening any more.
            let _ = tx.send(event);
        }
    }
}
