// src/watch/registry.rs

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

/// Last observed modification time per file.
///
/// Entries are only written after a file was confirmed new or changed, so a
/// stored timestamp is never older than the last successful scan of that path.
/// Timestamps are compared with exact equality; filesystems with coarse
/// timestamp resolution can hide two writes that land in the same tick.
#[derive(Debug, Clone, Default)]
pub struct FileRegistry {
    entries: HashMap<PathBuf, SystemTime>,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Record `modified` for `path`.
    ///
    /// Returns true if the file is new or its timestamp differs from the one
    /// on record, in which case the registry is updated.
    pub fn observe(&mut self, path: &Path, modified: SystemTime) -> bool {
        match self.entries.get(path) {
            Some(known) if *known == modified => false,
            _ => {
                self.entries.insert(path.to_path_buf(), modified);
                true
            }
        }
    }

    pub fn get(&self, path: &Path) -> Option<SystemTime> {
        self.entries.get(path).copied()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.keys().map(PathBuf::as_path)
    }

    /// Drop every entry not contained in `present`.
    ///
    /// Returns how many entries were removed.
    pub fn retain_present(&mut self, present: &HashSet<PathBuf>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|path, _| present.contains(path));
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!(removed, "evicted registry entries for missing files");
        }
        removed
    }
}
