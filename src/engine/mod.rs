//! # Track/Restore Engine
//!
//! Moves files into shelves and links them back, and recreates those links
//! from a shelf manifest.
//!
//! ## State of a tracked file
//!
//! ```text
//! before track:   ~/notes.txt            (regular file)
//! after track:    ~/notes.txt  ->  ~/.shelves/docs/notes.txt
//!                 shelf.json: { "links": { "notes.txt": "notes.txt" } }
//! ```
//!
//! [`track`] undoes the move when the symlink cannot be created, so a failed
//! call leaves the file where it was. [`restore`] never overwrites anything
//! already present at a link location and never touches the manifest.
//!
//! All mutations go through [`LinkOps`], which lets tests inject failures.

mod track;
mod restore;

use std::fs;
use std::io;
use std::path::Path;

pub use restore::{restore, restore_with, RestoreReport, RestoredLink, SkipReason, Skipped};
pub use track::{track, track_with, TrackOutcome};

/// Filesystem operations the engine mutates state with
pub trait LinkOps {
    /// Moves `from` to `to`
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Creates a symlink at `link` pointing to `target`
    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()>;
}

/// [`LinkOps`] backed by the real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFs;

impl LinkOps for SystemFs {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    #[cfg(unix)]
    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        std::os::unix::fs::symlink(target, link)
    }

    #[cfg(windows)]
    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        if target.is_dir() {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        }
    }
}
