// tests/scanner_mock_fs.rs

mod common;
use crate::common::{init_tracing, mtime, p, sample_tree, scanner, ROOT};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use change_detector::fs::mock::MockFileSystem;
use change_detector::watch::{ScanOptions, Scanner};

fn recursive() -> ScanOptions {
    ScanOptions {
        recursive: true,
        ..ScanOptions::default()
    }
}

#[test]
fn first_scan_reports_every_file_then_nothing() {
    init_tracing();
    let fs = sample_tree();
    let mut scanner = scanner(&fs, ScanOptions::default());

    let first = scanner.scan();
    assert_eq!(first.paths(), &[p("a.txt"), p("b.txt")]);
    assert_eq!(scanner.registry().get(&p("a.txt")), Some(mtime(1)));
    assert_eq!(scanner.registry().get(&p("b.txt")), Some(mtime(2)));

    let second = scanner.scan();
    assert!(second.is_empty(), "unexpected changes: {second}");
}

#[test]
fn modified_file_is_reported_once_with_new_timestamp() {
    init_tracing();
    let fs = sample_tree();
    let mut scanner = scanner(&fs, ScanOptions::default());
    scanner.scan();

    fs.touch(p("a.txt"), mtime(10));

    let changes = scanner.scan();
    assert_eq!(changes.paths(), &[p("a.txt")]);
    assert_eq!(scanner.registry().get(&p("a.txt")), Some(mtime(10)));

    assert!(scanner.scan().is_empty());
}

#[test]
fn older_timestamp_counts_as_change() {
    init_tracing();
    let fs = sample_tree();
    let mut scanner = scanner(&fs, ScanOptions::default());
    scanner.scan();

    // Equality, not ordering, decides.
    fs.touch(p("b.txt"), mtime(0));
    assert_eq!(scanner.scan().paths(), &[p("b.txt")]);
}

#[test]
fn new_file_is_reported_on_next_scan() {
    init_tracing();
    let fs = sample_tree();
    let mut scanner = scanner(&fs, ScanOptions::default());
    scanner.scan();

    fs.add_file(p("new.txt"), mtime(5));
    assert_eq!(scanner.scan().paths(), &[p("new.txt")]);
}

#[test]
fn non_recursive_scan_ignores_subdirectories() {
    init_tracing();
    let fs = sample_tree();
    let mut scanner = scanner(&fs, ScanOptions::default());

    let changes = scanner.scan();
    assert!(!changes.contains(&p("sub/c.txt")));

    fs.touch(p("sub/c.txt"), mtime(42));
    assert!(scanner.scan().is_empty());
    assert!(!scanner.registry().contains(&p("sub")));
    assert!(!scanner.registry().contains(&p("sub/c.txt")));
}

#[test]
fn recursive_scan_descends_where_the_directory_is_listed() {
    init_tracing();
    let fs = MockFileSystem::new();
    // Listing of the root: a.txt, sub/, z.txt
    fs.add_file(p("a.txt"), mtime(1));
    fs.add_file(p("sub/c.txt"), mtime(3));
    fs.add_file(p("sub/deeper/d.txt"), mtime(4));
    fs.add_file(p("z.txt"), mtime(2));

    let mut scanner = scanner(&fs, recursive());
    let changes = scanner.scan();

    assert_eq!(
        changes.paths(),
        &[p("a.txt"), p("sub/c.txt"), p("sub/deeper/d.txt"), p("z.txt")]
    );
    // Directories are never registered.
    assert_eq!(scanner.registry().len(), 4);
    assert!(!scanner.registry().contains(&p("sub")));
}

#[test]
fn empty_subdirectory_contributes_nothing() {
    init_tracing();
    let fs = sample_tree();
    fs.add_dir(p("empty"));

    let mut scanner = scanner(&fs, recursive());
    assert_eq!(scanner.scan().len(), 3);

    fs.add_file(p("empty/first.txt"), mtime(9));
    assert_eq!(scanner.scan().paths(), &[p("empty/first.txt")]);
}

#[test]
fn recursive_scan_reports_nested_modifications() {
    init_tracing();
    let fs = sample_tree();
    let mut scanner = scanner(&fs, recursive());
    scanner.scan();

    fs.touch(p("sub/c.txt"), mtime(30));
    assert_eq!(scanner.scan().paths(), &[p("sub/c.txt")]);
}

#[test]
fn missing_root_yields_empty_change_set() {
    init_tracing();
    let fs = MockFileSystem::new();
    let mut scanner = Scanner::new(Arc::new(fs), "/does/not/exist", recursive()).unwrap();

    assert!(scanner.scan().is_empty());
    assert!(scanner.registry().is_empty());
    assert_eq!(scanner.root(), Path::new("/does/not/exist"));
}

#[test]
fn root_that_is_a_file_yields_empty_change_set() {
    init_tracing();
    let fs = sample_tree();
    let mut scanner = Scanner::new(Arc::new(fs), p("a.txt"), recursive()).unwrap();

    assert!(scanner.scan().is_empty());
}

#[test]
fn root_created_later_is_picked_up() {
    init_tracing();
    let fs = MockFileSystem::new();
    let mut scanner = scanner(&fs, ScanOptions::default());
    assert!(scanner.scan().is_empty());

    fs.add_file(p("late.txt"), mtime(1));
    assert_eq!(scanner.scan().paths(), &[p("late.txt")]);
}

#[test]
fn unreadable_subdirectory_is_skipped() {
    init_tracing();
    let fs = sample_tree();
    fs.add_file(p("locked/secret.txt"), mtime(7));
    fs.add_file(p("open/visible.txt"), mtime(8));
    fs.set_readable(p("locked"), false);

    let mut scanner = scanner(&fs, recursive());
    let changes = scanner.scan();

    assert!(!changes.contains(&p("locked/secret.txt")));
    assert!(changes.contains(&p("open/visible.txt")));
    assert!(changes.contains(&p("sub/c.txt")));
}

#[test]
fn excluded_glob_never_appears() {
    init_tracing();
    let fs = sample_tree();
    fs.add_file(p("notes.swp"), mtime(4));
    fs.add_file(p("sub/other.swp"), mtime(5));

    let mut scanner = scanner(
        &fs,
        ScanOptions {
            recursive: true,
            exclude_patterns: vec!["**/*.swp".to_string()],
            ..ScanOptions::default()
        },
    );

    let changes = scanner.scan();
    assert_eq!(changes.paths(), &[p("a.txt"), p("b.txt"), p("sub/c.txt")]);

    fs.touch(p("notes.swp"), mtime(40));
    assert!(scanner.scan().is_empty());
}

#[test]
fn excluded_path_never_appears() {
    init_tracing();
    let fs = sample_tree();
    let mut scanner = scanner(
        &fs,
        ScanOptions {
            exclude_paths: vec![p("a.txt")],
            ..ScanOptions::default()
        },
    );

    assert_eq!(scanner.scan().paths(), &[p("b.txt")]);
    fs.touch(p("a.txt"), mtime(99));
    assert!(scanner.scan().is_empty());
    assert!(!scanner.registry().contains(&p("a.txt")));
}

#[test]
fn excluded_directory_is_not_descended_into() {
    init_tracing();
    let fs = sample_tree();
    fs.add_file(p("target/debug/bin"), mtime(6));

    let mut scanner = scanner(
        &fs,
        ScanOptions {
            recursive: true,
            exclude_patterns: vec!["target".to_string()],
            ..ScanOptions::default()
        },
    );

    let changes = scanner.scan();
    assert!(!changes.contains(&p("target/debug/bin")));
    assert_eq!(changes.len(), 3);
}

#[test]
fn symlink_loop_does_not_recurse_forever() {
    init_tracing();
    let fs = sample_tree();
    fs.add_link(p("sub/back"), PathBuf::from(ROOT));

    let mut scanner = scanner(&fs, recursive());
    let changes = scanner.scan();

    assert_eq!(changes.paths(), &[p("a.txt"), p("b.txt"), p("sub/c.txt")]);
}

#[test]
fn deleted_files_stay_registered_by_default() {
    init_tracing();
    let fs = sample_tree();
    let mut scanner = scanner(&fs, ScanOptions::default());
    scanner.scan();

    fs.remove(p("a.txt"));
    assert!(scanner.scan().is_empty());
    assert!(scanner.registry().contains(&p("a.txt")));

    // Re-created with the very same timestamp: indistinguishable.
    fs.add_file(p("a.txt"), mtime(1));
    assert!(scanner.scan().is_empty());
}

#[test]
fn evict_missing_forgets_deleted_files() {
    init_tracing();
    let fs = sample_tree();
    let mut scanner = scanner(
        &fs,
        ScanOptions {
            evict_missing: true,
            ..ScanOptions::default()
        },
    );
    scanner.scan();

    fs.remove(p("a.txt"));
    assert!(scanner.scan().is_empty());
    assert!(!scanner.registry().contains(&p("a.txt")));
    assert_eq!(scanner.registry().len(), 1);

    fs.add_file(p("a.txt"), mtime(1));
    assert_eq!(scanner.scan().paths(), &[p("a.txt")]);
}
