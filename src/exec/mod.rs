// src/exec/mod.rs

//! Reaction execution layer.
//!
//! - [`action`] defines the once / parallel / foreach reaction traits, the
//!   tagged [`Action`] and closure-backed implementations.
//! - [`background`] holds the [`BackgroundTask`] handle abstraction with a
//!   process-backed and a Tokio-task-backed implementation.
//! - [`command`] implements all three reaction shapes for shell commands,
//!   using `tokio::process::Command`.

pub mod action;
pub mod background;
pub mod command;

pub use action::{Action, ActionFuture, ActionMode, ForeachAction, OnceAction, ParallelAction};
pub use background::{AsyncTask, BackgroundTask, ProcessTask};
pub use command::{ShellCommand, CHANGED_FILE_ENV};
