#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use change_detector::engine::{Runner, WatchConfig};
use change_detector::fs::mock::MockFileSystem;
use change_detector::watch::{ScanOptions, Scanner};

pub use change_detector_test_utils::{init_tracing, mtime, with_timeout};

/// Root of the mock trees used in tests.
pub const ROOT: &str = "/watched";

pub fn p(rel: &str) -> PathBuf {
    PathBuf::from(ROOT).join(rel)
}

/// Mock tree:
///
/// ```text
/// /watched/a.txt        (mtime 1)
/// /watched/b.txt        (mtime 2)
/// /watched/sub/c.txt    (mtime 3)
/// ```
pub fn sample_tree() -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_file(p("a.txt"), mtime(1));
    fs.add_file(p("b.txt"), mtime(2));
    fs.add_file(p("sub/c.txt"), mtime(3));
    fs
}

pub fn scanner(fs: &MockFileSystem, options: ScanOptions) -> Scanner {
    Scanner::new(Arc::new(fs.clone()), ROOT, options).expect("scanner")
}

pub fn runner(fs: &MockFileSystem, config: WatchConfig) -> Runner {
    Runner::with_file_system(config, Arc::new(fs.clone())).expect("runner")
}
