// src/watch/mod.rs

//! Polling-based change detection.
//!
//! This module is responsible for:
//! - Walking the watch root (optionally recursively) on every poll cycle.
//! - Remembering the last seen modification time of every file.
//! - Applying caller-supplied exclusions (exact paths and globs).
//!
//! It does **not** know about actions; it only turns the state of the
//! directory tree into a [`ChangeSet`].

pub mod changes;
pub mod path_utils;
pub mod patterns;
pub mod registry;
pub mod scanner;

pub use changes::ChangeSet;
pub use patterns::Exclusions;
pub use registry::FileRegistry;
pub use scanner::{ScanOptions, Scanner};
