// tests/scanner_real_fs.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use change_detector::fs::RealFileSystem;
use change_detector::watch::{ScanOptions, Scanner};
use tempfile::tempdir;

type TestResult = Result<(), Box<dyn Error>>;

fn bump_mtime(path: &Path, by: Duration) -> TestResult {
    let modified = fs::metadata(path)?.modified()?;
    File::options().write(true).open(path)?.set_modified(modified + by)?;
    Ok(())
}

fn names(scanner_root: &Path, changes: &[std::path::PathBuf]) -> Vec<String> {
    changes
        .iter()
        .map(|p| {
            p.strip_prefix(scanner_root)
                .unwrap_or(p)
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

#[test]
fn detects_new_and_modified_files_on_disk() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    fs::write(dir.path().join("one.txt"), "1")?;
    fs::create_dir(dir.path().join("nested"))?;
    fs::write(dir.path().join("nested/two.txt"), "2")?;

    let mut scanner = Scanner::new(
        Arc::new(RealFileSystem),
        dir.path(),
        ScanOptions {
            recursive: true,
            ..ScanOptions::default()
        },
    )?;
    let root = scanner.root().to_path_buf();

    let first = scanner.scan();
    let mut first_names = names(&root, first.paths());
    first_names.sort();
    assert_eq!(first_names, vec!["nested/two.txt", "one.txt"]);
    assert!(scanner.scan().is_empty());

    bump_mtime(&root.join("nested/two.txt"), Duration::from_secs(5))?;
    fs::write(root.join("three.txt"), "3")?;

    let mut second_names = names(&root, scanner.scan().paths());
    second_names.sort();
    assert_eq!(second_names, vec!["nested/two.txt", "three.txt"]);
    Ok(())
}

#[test]
fn registry_keys_are_absolute() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    fs::write(dir.path().join("file.txt"), "x")?;

    let mut scanner = Scanner::new(Arc::new(RealFileSystem), dir.path(), ScanOptions::default())?;
    let changes = scanner.scan();

    assert_eq!(changes.len(), 1);
    assert!(changes.paths()[0].is_absolute());
    Ok(())
}

#[test]
fn missing_directory_on_disk_yields_nothing() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let missing = dir.path().join("nope");

    let mut scanner = Scanner::new(Arc::new(RealFileSystem), &missing, ScanOptions::default())?;
    assert!(scanner.scan().is_empty());
    Ok(())
}

#[test]
fn missing_relative_root_is_made_absolute() -> TestResult {
    init_tracing();
    let scanner = Scanner::new(
        Arc::new(RealFileSystem),
        "not-created-yet/by-any-test",
        ScanOptions::default(),
    )?;

    assert!(scanner.root().is_absolute());
    assert!(scanner.root().ends_with("not-created-yet/by-any-test"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn symlink_cycle_on_disk_terminates() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    fs::create_dir(dir.path().join("a"))?;
    fs::write(dir.path().join("a/file.txt"), "x")?;
    std::os::unix::fs::symlink(dir.path(), dir.path().join("a/loop"))?;

    let mut scanner = Scanner::new(
        Arc::new(RealFileSystem),
        dir.path(),
        ScanOptions {
            recursive: true,
            ..ScanOptions::default()
        },
    )?;

    let changes = scanner.scan();
    assert_eq!(changes.len(), 1);
    Ok(())
}
