// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

/// Upper bound on link hops while resolving a path.
const MAX_LINK_HOPS: usize = 32;

#[derive(Debug, Clone)]
pub enum MockEntry {
    File { modified: SystemTime },
    Dir { children: Vec<String>, readable: bool }, // List of child names
    /// Symbolic link to another entry in the mock tree.
    Link(PathBuf),
}

/// In-memory filesystem with explicit modification times.
///
/// Children are listed in insertion order, which makes directory listing
/// order deterministic in tests.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut files = HashMap::new();
        // Ensure root exists
        files.insert(
            PathBuf::from("."),
            MockEntry::Dir {
                children: Vec::new(),
                readable: true,
            },
        );

        Self {
            files: Arc::new(Mutex::new(files)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, MockEntry>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add (or replace) a file with the given modification time.
    pub fn add_file(&self, path: impl AsRef<Path>, modified: SystemTime) {
        let path = path.as_ref();
        let mut files = self.lock();
        files.insert(path.to_path_buf(), MockEntry::File { modified });
        link_into_parent(&mut files, path);
    }

    /// Update the modification time of a file, creating it if needed.
    pub fn touch(&self, path: impl AsRef<Path>, modified: SystemTime) {
        self.add_file(path, modified);
    }

    /// Add an (empty) directory.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut files = self.lock();
        ensure_dir_entry(&mut files, path.as_ref());
    }

    /// Add a symbolic link at `link` pointing to `target`.
    pub fn add_link(&self, link: impl AsRef<Path>, target: impl AsRef<Path>) {
        let link = link.as_ref();
        let mut files = self.lock();
        files.insert(link.to_path_buf(), MockEntry::Link(target.as_ref().to_path_buf()));
        link_into_parent(&mut files, link);
    }

    /// Make a directory unreadable (listing it fails) or readable again.
    pub fn set_readable(&self, path: impl AsRef<Path>, value: bool) {
        let mut files = self.lock();
        if let Some(MockEntry::Dir { readable, .. }) = files.get_mut(path.as_ref()) {
            *readable = value;
        }
    }

    /// Remove a file or directory (including everything below it).
    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut files = self.lock();
        files.retain(|key, _| !key.starts_with(path));

        if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
            let parent = normalize_parent(parent);
            if let Some(MockEntry::Dir { children, .. }) = files.get_mut(parent) {
                let name = name.to_string_lossy();
                children.retain(|child| *child != name);
            }
        }
    }
}

fn normalize_parent(parent: &Path) -> &Path {
    if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    }
}

fn link_into_parent(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    // Ensure parent directories exist implicitly for simplicity in this mock
    if let Some(parent) = path.parent() {
        let parent = normalize_parent(parent);
        if parent == path {
            return;
        }
        ensure_dir_entry(files, parent);
        if let Some(MockEntry::Dir { children, .. }) = files.get_mut(parent) {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if !children.iter().any(|c| c == name) {
                    children.push(name.to_string());
                }
            }
        }
    }
}

fn ensure_dir_entry(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    if files.contains_key(path) {
        return;
    }
    files.insert(
        path.to_path_buf(),
        MockEntry::Dir {
            children: Vec::new(),
            readable: true,
        },
    );
    link_into_parent(files, path);
}

/// Follow links on every prefix of `path`.
fn resolve(files: &HashMap<PathBuf, MockEntry>, path: &Path) -> Option<PathBuf> {
    let mut current = PathBuf::new();
    let mut hops = 0;

    for component in path.components() {
        current.push(component);
        while let Some(MockEntry::Link(target)) = files.get(&current) {
            hops += 1;
            if hops > MAX_LINK_HOPS {
                return None;
            }
            current = target.clone();
        }
    }

    Some(current)
}

impl MockFileSystem {
    fn entry(&self, path: &Path) -> Option<MockEntry> {
        let files = self.lock();
        let resolved = resolve(&files, path)?;
        files.get(&resolved).cloned()
    }
}

impl FileSystem for MockFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        matches!(self.entry(path), Some(MockEntry::File { .. }))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.entry(path), Some(MockEntry::Dir { .. }))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        let files = self.lock();
        match resolve(&files, path) {
            Some(resolved) if files.contains_key(&resolved) => Ok(resolved),
            _ => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn modified(&self, path: &Path) -> Result<SystemTime> {
        match self.entry(path) {
            Some(MockEntry::File { modified }) => Ok(modified),
            Some(_) => Err(anyhow!("Not a file: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        match self.entry(path) {
            Some(MockEntry::Dir { readable: false, .. }) => {
                Err(anyhow!("Permission denied: {:?}", path))
            }
            Some(MockEntry::Dir { children, .. }) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}
