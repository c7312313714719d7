//! shelf - a symlink manager for files kept in shelves
//!
//! A shelf is a directory under `~/.shelves` that collects files moved out of
//! their original locations. Each moved file is replaced by a symlink pointing
//! into the shelf, and the shelf's `shelf.json` manifest remembers where every
//! link belongs so the links can be restored on another machine. Shelves can be
//! versioned with git or snapshotted as `.tar.gz` archives.

pub mod error;
pub mod domain;
pub mod storage;
pub mod engine;
pub mod snapshot;
pub mod cli;

pub use domain::{Manifest, NormalizedPath};
pub use engine::{restore, track, RestoreReport, TrackOutcome};
pub use error::{ErrorKind, ShelfError};
pub use storage::{Shelf, ShelfPaths, Shelves};
