// src/watch/patterns.rs

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::fs::FileSystem;
use crate::watch::path_utils::relative_str;

/// Paths the scanner must never report or descend into.
///
/// Two kinds of exclusion are supported:
///
/// - exact paths (e.g. the running executable), compared after
///   canonicalization when the path exists;
/// - glob patterns, matched against the path relative to the watch root,
///   e.g. `"target/**"` or `"**/*.swp"`.
#[derive(Clone, Default)]
pub struct Exclusions {
    paths: HashSet<PathBuf>,
    patterns: Vec<String>,
    glob_set: Option<GlobSet>,
}

impl fmt::Debug for Exclusions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exclusions")
            .field("paths", &self.paths)
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl Exclusions {
    /// Compile exact paths and glob patterns into an exclusion set.
    pub fn build(fs: &dyn FileSystem, paths: &[PathBuf], patterns: &[String]) -> Result<Self> {
        let paths = paths
            .iter()
            .map(|p| fs.canonicalize(p).unwrap_or_else(|_| p.clone()))
            .collect();

        let glob_set = if patterns.is_empty() {
            None
        } else {
            Some(build_globset(patterns).context("building exclude globset")?)
        };

        Ok(Self {
            paths,
            patterns: patterns.to_vec(),
            glob_set,
        })
    }

    /// Returns true if `path` (found while walking `root`) is excluded.
    pub fn is_excluded(&self, fs: &dyn FileSystem, root: &Path, path: &Path) -> bool {
        if self.paths.contains(path) {
            return true;
        }
        if let Some(glob_set) = &self.glob_set {
            if let Some(rel) = relative_str(fs, root, path) {
                if glob_set.is_match(&rel) {
                    return true;
                }
            }
        }
        false
    }
}

/// Build a GlobSet from simple string patterns.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat)
            .with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
