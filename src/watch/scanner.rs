// src/watch/scanner.rs

//! Directory walk + change tracking.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, trace, warn};

use crate::fs::FileSystem;
use crate::watch::changes::ChangeSet;
use crate::watch::patterns::Exclusions;
use crate::watch::registry::FileRegistry;

/// Settings for a [`Scanner`].
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub recursive: bool,
    pub exclude_paths: Vec<PathBuf>,
    pub exclude_patterns: Vec<String>,
    /// Forget files that disappeared from the tree, so that a file deleted
    /// and later re-created is reported again.
    pub evict_missing: bool,
}

/// Walks a directory tree and reports files that are new or changed since
/// the previous scan.
///
/// The scanner owns its [`FileRegistry`]; nothing else mutates it.
pub struct Scanner {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
    recursive: bool,
    exclusions: Exclusions,
    evict_missing: bool,
    registry: FileRegistry,
}

impl fmt::Debug for Scanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scanner")
            .field("root", &self.root)
            .field("recursive", &self.recursive)
            .field("exclusions", &self.exclusions)
            .field("registered", &self.registry.len())
            .finish_non_exhaustive()
    }
}

/// Per-scan bookkeeping.
#[derive(Default)]
struct Walk {
    visited: HashSet<PathBuf>,
    present: HashSet<PathBuf>,
    changed: Vec<PathBuf>,
}

impl Scanner {
    pub fn new(fs: Arc<dyn FileSystem>, root: impl Into<PathBuf>, options: ScanOptions) -> Result<Self> {
        let root = absolute_root(fs.as_ref(), root.into());

        let exclusions = Exclusions::build(
            fs.as_ref(),
            &options.exclude_paths,
            &options.exclude_patterns,
        )?;

        Ok(Self {
            fs,
            root,
            recursive: options.recursive,
            exclusions,
            evict_missing: options.evict_missing,
            registry: FileRegistry::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    pub fn registry(&self) -> &FileRegistry {
        &self.registry
    }

    /// Produce this cycle's [`ChangeSet`] and update the registry.
    ///
    /// A missing root, or a root that is not a directory, yields an empty
    /// change set. Unreadable directories are skipped.
    pub fn scan(&mut self) -> ChangeSet {
        if !self.fs.is_dir(&self.root) {
            debug!(root = ?self.root, "watch root missing or not a directory; nothing to observe");
            return ChangeSet::default();
        }

        let mut walk = Walk::default();
        let root = self.root.clone();
        self.walk_dir(&root, &mut walk);

        if self.evict_missing {
            self.registry.retain_present(&walk.present);
        }

        ChangeSet::new(walk.changed)
    }

    fn walk_dir(&mut self, dir: &Path, walk: &mut Walk) {
        let identity = self
            .fs
            .canonicalize(dir)
            .unwrap_or_else(|_| dir.to_path_buf());
        if !walk.visited.insert(identity) {
            debug!(?dir, "directory already visited in this scan; skipping");
            return;
        }

        let entries = match self.fs.read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(?dir, error = %err, "unable to list directory; skipping");
                return;
            }
        };

        // Depth-first: a subdirectory is walked where it appears in the listing.
        for path in entries {
            if self.exclusions.is_excluded(self.fs.as_ref(), &self.root, &path) {
                trace!(?path, "excluded");
                continue;
            }

            if self.fs.is_file(&path) {
                self.check_file(path, walk);
            } else if self.fs.is_dir(&path) {
                if self.recursive {
                    self.walk_dir(&path, walk);
                }
            } else {
                trace!(?path, "neither file nor directory; ignoring");
            }
        }
    }

    fn check_file(&mut self, path: PathBuf, walk: &mut Walk) {
        let modified = match self.fs.modified(&path) {
            Ok(modified) => modified,
            Err(err) => {
                debug!(?path, error = %err, "unable to read modification time; skipping");
                return;
            }
        };

        if self.evict_missing {
            walk.present.insert(path.clone());
        }

        if self.registry.observe(&path, modified) {
            trace!(?path, "file new or modified");
            walk.changed.push(path);
        }
    }
}

/// Canonical root if it exists, otherwise the input made absolute, so that
/// registry keys are absolute even for a root created later.
fn absolute_root(fs: &dyn FileSystem, root: PathBuf) -> PathBuf {
    if let Ok(canonical) = fs.canonicalize(&root) {
        return canonical;
    }
    match std::path::absolute(&root) {
        Ok(absolute) => absolute,
        Err(err) => {
            debug!(?root, error = %err, "cannot make watch root absolute; using it as given");
            root
        }
    }
}
