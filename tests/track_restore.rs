//! Track/restore engine tests
//!
//! Exercise the engine against a temporary home directory, including
//! failures injected at the symlink and compensating-move steps.

#![cfg(unix)]

use std::cell::Cell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use shelf_cli::engine::{restore, restore_with, track, track_with, LinkOps, SkipReason, SystemFs};
use shelf_cli::storage::{ShelfPaths, Shelves};
use shelf_cli::{ErrorKind, Manifest, ShelfError};
use tempfile::TempDir;

/// A home directory with a `.shelves` root and one empty shelf named `docs`
struct Fixture {
    _dir: TempDir,
    home: PathBuf,
    shelves: Shelves,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home").join("u");
        fs::create_dir_all(&home).unwrap();

        let shelves = Shelves::new(ShelfPaths::new(home.join(".shelves"), &home));
        shelves.create("docs").unwrap();

        Self {
            _dir: dir,
            home,
            shelves,
        }
    }

    fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.home.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn shelf_dir(&self) -> PathBuf {
        self.shelves.root().join("docs")
    }

    fn manifest(&self) -> Manifest {
        self.shelves.open("docs").unwrap().manifest().unwrap()
    }
}

/// Fails every symlink call; optionally fails every rename after the first
struct FailingLinks {
    fail_move_back: bool,
    renames: Cell<usize>,
}

impl FailingLinks {
    fn new(fail_move_back: bool) -> Self {
        Self {
            fail_move_back,
            renames: Cell::new(0),
        }
    }
}

impl LinkOps for FailingLinks {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let count = self.renames.get();
        self.renames.set(count + 1);

        if self.fail_move_back && count > 0 {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        SystemFs.rename(from, to)
    }

    fn symlink(&self, _target: &Path, _link: &Path) -> io::Result<()> {
        Err(io::Error::from(io::ErrorKind::PermissionDenied))
    }
}

/// Lets the first `allowed` symlinks through, then fails with permission denied
struct SymlinkBudget {
    allowed: Cell<usize>,
}

impl LinkOps for SymlinkBudget {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        SystemFs.rename(from, to)
    }

    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        let left = self.allowed.get();
        if left == 0 {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        self.allowed.set(left - 1);
        SystemFs.symlink(target, link)
    }
}

// =============================================================================
// Track
// =============================================================================

#[test]
fn track_moves_file_and_links_it_back() {
    let fx = Fixture::new();
    let original = fx.write("notes.txt", "remember the milk");

    let outcome = track(&fx.shelves, "docs", &original, None).unwrap();

    let shelved = fx.shelf_dir().join("notes.txt");
    assert_eq!(outcome.shelved, shelved);
    assert_eq!(outcome.link, original);
    assert!(fs::symlink_metadata(&original).unwrap().file_type().is_symlink());
    assert_eq!(fs::read_link(&original).unwrap(), shelved);
    assert_eq!(fs::read_to_string(&original).unwrap(), "remember the milk");
    assert_eq!(fs::read_to_string(&shelved).unwrap(), "remember the milk");

    let manifest = fx.manifest();
    assert_eq!(manifest.links.get("notes.txt").map(String::as_str), Some("notes.txt"));
    assert_eq!(
        manifest.link("notes.txt").unwrap().resolve(&fx.home),
        original
    );
}

#[test]
fn track_with_explicit_name_links_to_renamed_file() {
    let fx = Fixture::new();
    let original = fx.write(".config/nvim/init.lua", "set number");

    let outcome = track(&fx.shelves, "docs", &original, Some("nvim-init.lua")).unwrap();

    let shelved = fx.shelf_dir().join("nvim-init.lua");
    assert_eq!(outcome.shelved, shelved);
    assert_eq!(fs::read_link(&original).unwrap(), shelved);
    assert_eq!(
        fx.manifest().links["nvim-init.lua"],
        ".config/nvim/init.lua"
    );
}

#[test]
fn track_outside_home_stores_absolute_path() {
    let fx = Fixture::new();
    let elsewhere = TempDir::new().unwrap();
    let original = elsewhere.path().join("hosts");
    fs::write(&original, "127.0.0.1 localhost").unwrap();

    let outcome = track(&fx.shelves, "docs", &original, None).unwrap();

    assert!(!outcome.stored.is_relative());
    assert_eq!(
        fx.manifest().links["hosts"],
        original.to_str().unwrap()
    );
}

#[test]
fn track_name_collision_leaves_filesystem_untouched() {
    let fx = Fixture::new();
    fs::write(fx.shelf_dir().join("notes.txt"), "already shelved").unwrap();
    let original = fx.write("notes.txt", "mine");

    let err = track(&fx.shelves, "docs", &original, None).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert_eq!(fs::read_to_string(&original).unwrap(), "mine");
    assert!(!fs::symlink_metadata(&original).unwrap().file_type().is_symlink());
    assert_eq!(
        fs::read_to_string(fx.shelf_dir().join("notes.txt")).unwrap(),
        "already shelved"
    );
    assert!(fx.manifest().is_empty());
}

#[test]
fn track_cannot_use_manifest_name() {
    let fx = Fixture::new();
    let original = fx.write("shelf.json", "{}");

    let err = track(&fx.shelves, "docs", &original, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
}

#[test]
fn track_cannot_use_manifest_temp_name() {
    let fx = Fixture::new();
    let original = fx.write("shelf.json.tmp", "precious user data");

    let err = track(&fx.shelves, "docs", &original, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    // Nothing moved, nothing recorded
    assert!(!fs::symlink_metadata(&original).unwrap().file_type().is_symlink());
    assert_eq!(fs::read_to_string(&original).unwrap(), "precious user data");
    assert!(!fx.shelf_dir().join("shelf.json.tmp").exists());
    assert!(fx.manifest().is_empty());

    // Under another name the same file is shelved intact
    let outcome = track(&fx.shelves, "docs", &original, Some("scratch.tmp")).unwrap();
    assert_eq!(fs::read_to_string(&outcome.shelved).unwrap(), "precious user data");
    assert_eq!(fs::read_to_string(&original).unwrap(), "precious user data");
    assert_eq!(fx.manifest().len(), 1);
}

#[test]
fn track_rejects_symlink_source() {
    let fx = Fixture::new();
    let real = fx.write("real.txt", "x");
    let link = fx.home.join("link.txt");
    std::os::unix::fs::symlink(&real, &link).unwrap();

    let err = track(&fx.shelves, "docs", &link, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
}

#[test]
fn track_twice_rejects_already_shelved_file() {
    let fx = Fixture::new();
    let original = fx.write("notes.txt", "x");

    track(&fx.shelves, "docs", &original, None).unwrap();
    let err = track(&fx.shelves, "docs", &original, Some("other.txt")).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(fx.manifest().len(), 1);
}

#[test]
fn track_missing_source_or_shelf() {
    let fx = Fixture::new();

    let err = track(&fx.shelves, "docs", &fx.home.join("nope"), None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let original = fx.write("notes.txt", "x");
    let err = track(&fx.shelves, "missing", &original, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(original.is_file());
}

#[test]
fn track_blank_arguments_are_validation_errors() {
    let fx = Fixture::new();
    let original = fx.write("notes.txt", "x");

    let err = track(&fx.shelves, "", &original, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = track(&fx.shelves, "docs", Path::new(""), None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = track(&fx.shelves, "docs", &original, Some("  ")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn track_rejects_paths_inside_shelves_root() {
    let fx = Fixture::new();
    let inside = fx.shelf_dir().join("loose.txt");
    fs::write(&inside, "x").unwrap();

    let err = track(&fx.shelves, "docs", &inside, Some("moved.txt")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(inside.is_file());
}

#[test]
fn symlink_failure_moves_file_back() {
    let fx = Fixture::new();
    let original = fx.write("notes.txt", "precious");
    let before = fs::read(fx.shelf_dir().join("shelf.json")).unwrap();

    let err = track_with(&FailingLinks::new(false), &fx.shelves, "docs", &original, None)
        .unwrap_err();

    assert!(matches!(err, ShelfError::Symlink { .. }));
    assert_eq!(err.kind(), ErrorKind::Io);

    let metadata = fs::symlink_metadata(&original).unwrap();
    assert!(metadata.file_type().is_file());
    assert_eq!(fs::read_to_string(&original).unwrap(), "precious");
    assert!(!fx.shelf_dir().join("notes.txt").exists());
    assert_eq!(fs::read(fx.shelf_dir().join("shelf.json")).unwrap(), before);
}

#[test]
fn failed_move_back_is_reported_as_inconsistent() {
    let fx = Fixture::new();
    let original = fx.write("notes.txt", "precious");

    let err = track_with(&FailingLinks::new(true), &fx.shelves, "docs", &original, None)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Inconsistent);
    match err {
        ShelfError::CompensationFailed {
            original: reported,
            shelved,
            ..
        } => {
            assert_eq!(reported, original);
            assert_eq!(shelved, fx.shelf_dir().join("notes.txt"));
        }
        other => panic!("unexpected error: {other}"),
    }

    // The file is stranded in the shelf and the manifest does not know about it
    assert!(fx.shelf_dir().join("notes.txt").is_file());
    assert!(fx.manifest().is_empty());
}

// =============================================================================
// Restore
// =============================================================================

#[test]
fn restore_recreates_links_from_manifest() {
    let fx = Fixture::new();
    fs::write(fx.shelf_dir().join("notes.txt"), "hello").unwrap();
    fs::write(fx.shelf_dir().join("init.lua"), "set number").unwrap();

    let mut manifest = fx.manifest();
    manifest.links.insert("notes.txt".into(), "notes.txt".into());
    manifest.links.insert("init.lua".into(), ".config/nvim/init.lua".into());
    fx.shelves.open("docs").unwrap().manifest_store().save(&manifest).unwrap();

    let report = restore(&fx.shelves, "docs").unwrap();

    assert_eq!(report.created.len(), 2);
    assert!(report.skipped.is_empty());
    assert_eq!(
        fs::read_link(fx.home.join("notes.txt")).unwrap(),
        fx.shelf_dir().join("notes.txt")
    );
    assert_eq!(
        fs::read_to_string(fx.home.join(".config/nvim/init.lua")).unwrap(),
        "set number"
    );
    assert_eq!(fx.manifest(), manifest);
}

#[test]
fn track_then_restore_on_fresh_machine() {
    let fx = Fixture::new();
    let original = fx.write("notes.txt", "hello");
    track(&fx.shelves, "docs", &original, None).unwrap();

    // Simulate a new machine: the link is gone, the shelf is cloned
    fs::remove_file(&original).unwrap();

    let report = restore(&fx.shelves, "docs").unwrap();
    assert_eq!(report.created.len(), 1);
    assert_eq!(report.created[0].link, original);
    assert_eq!(fs::read_link(&original).unwrap(), fx.shelf_dir().join("notes.txt"));
}

#[test]
fn restore_twice_only_reports_existing_links() {
    let fx = Fixture::new();
    let a = fx.write("a.txt", "a");
    let b = fx.write("dir/b.txt", "b");
    track(&fx.shelves, "docs", &a, None).unwrap();
    track(&fx.shelves, "docs", &b, None).unwrap();
    fs::remove_file(&a).unwrap();
    fs::remove_file(&b).unwrap();

    let first = restore(&fx.shelves, "docs").unwrap();
    assert_eq!(first.created.len(), 2);

    let second = restore(&fx.shelves, "docs").unwrap();
    assert!(second.created.is_empty());
    assert_eq!(second.skipped.len(), 2);
    assert!(second
        .skipped
        .iter()
        .all(|s| s.reason == SkipReason::LinkExists));
}

#[test]
fn restore_never_overwrites_existing_content() {
    let fx = Fixture::new();
    let original = fx.write("notes.txt", "shelved");
    track(&fx.shelves, "docs", &original, None).unwrap();

    fs::remove_file(&original).unwrap();
    fs::write(&original, "user content").unwrap();

    let report = restore(&fx.shelves, "docs").unwrap();

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].reason, SkipReason::LinkExists);
    assert_eq!(fs::read_to_string(&original).unwrap(), "user content");
}

#[test]
fn restore_skips_stale_symlinks() {
    let fx = Fixture::new();
    fs::write(fx.shelf_dir().join("notes.txt"), "hello").unwrap();
    let mut manifest = fx.manifest();
    manifest.links.insert("notes.txt".into(), "notes.txt".into());
    fx.shelves.open("docs").unwrap().manifest_store().save(&manifest).unwrap();

    let link = fx.home.join("notes.txt");
    std::os::unix::fs::symlink(fx.home.join("gone"), &link).unwrap();

    let report = restore(&fx.shelves, "docs").unwrap();

    assert_eq!(report.skipped[0].reason, SkipReason::LinkExists);
    assert_eq!(fs::read_link(&link).unwrap(), fx.home.join("gone"));
}

#[test]
fn restore_skips_files_missing_from_shelf() {
    let fx = Fixture::new();
    fs::write(fx.shelf_dir().join("present.txt"), "here").unwrap();
    let mut manifest = fx.manifest();
    manifest.links.insert("gone.txt".into(), "gone.txt".into());
    manifest.links.insert("present.txt".into(), "present.txt".into());
    fx.shelves.open("docs").unwrap().manifest_store().save(&manifest).unwrap();

    let report = restore(&fx.shelves, "docs").unwrap();

    assert_eq!(report.created.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].file_name, "gone.txt");
    assert_eq!(report.skipped[0].reason, SkipReason::MissingShelfFile);
    assert!(fs::symlink_metadata(fx.home.join("gone.txt")).is_err());
}

#[test]
fn restore_aborts_on_other_symlink_errors_and_keeps_earlier_links() {
    let fx = Fixture::new();
    for name in ["a.txt", "b.txt", "c.txt"] {
        fs::write(fx.shelf_dir().join(name), name).unwrap();
    }
    let mut manifest = fx.manifest();
    for name in ["a.txt", "b.txt", "c.txt"] {
        manifest.links.insert(name.into(), name.into());
    }
    fx.shelves.open("docs").unwrap().manifest_store().save(&manifest).unwrap();

    let ops = SymlinkBudget {
        allowed: Cell::new(1),
    };
    let err = restore_with(&ops, &fx.shelves, "docs").unwrap_err();

    assert!(matches!(err, ShelfError::Symlink { .. }));
    assert!(fs::symlink_metadata(fx.home.join("a.txt")).is_ok());
    assert!(fs::symlink_metadata(fx.home.join("b.txt")).is_err());
    assert!(fs::symlink_metadata(fx.home.join("c.txt")).is_err());
}

#[test]
fn restore_rejects_manifest_names_with_separators() {
    let fx = Fixture::new();
    let mut manifest = fx.manifest();
    manifest.links.insert("../escape".into(), "escape".into());
    fx.shelves.open("docs").unwrap().manifest_store().save(&manifest).unwrap();

    let err = restore(&fx.shelves, "docs").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn restore_without_manifest_is_not_found() {
    let fx = Fixture::new();
    fs::remove_file(fx.shelf_dir().join("shelf.json")).unwrap();

    let err = restore(&fx.shelves, "docs").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
