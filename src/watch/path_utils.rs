// src/watch/path_utils.rs

//! Utility functions for path handling in the scanner.

use std::path::Path;

use crate::fs::FileSystem;

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// A direct `strip_prefix(root)` is tried first; if that fails (symlinked
/// roots, `/private/var` vs `/var` on macOS) both sides are canonicalized and
/// stripped again.
///
/// Returns `None` if the path cannot be related to `root`.
pub fn relative_str(fs: &dyn FileSystem, root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(to_slash(rel));
    }

    let root_canon = fs.canonicalize(root).ok()?;
    let path_canon = fs.canonicalize(path).ok()?;
    path_canon
        .strip_prefix(&root_canon)
        .ok()
        .map(to_slash)
}

fn to_slash(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}
