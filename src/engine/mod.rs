// src/engine/mod.rs

//! Observation engine.
//!
//! - [`watch_config`] holds [`WatchConfig`], the library-level description of
//!   one watch (target dir, timing, action, exclusions).
//! - [`runtime`] implements the [`Runner`]: the bounded polling loop and the
//!   once / parallel / foreach dispatcher.
//! - [`events`] defines the [`WatchEvent`] stream the runner emits alongside
//!   its log output.

pub mod events;
pub mod runtime;
pub mod watch_config;

pub use events::{EventSink, WatchEvent};
pub use runtime::{CycleOutcome, RunSummary, Runner};
pub use watch_config::{WatchConfig, DEFAULT_INTERVAL, DEFAULT_RUNTIME};
