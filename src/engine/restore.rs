//! Recreating links from a shelf manifest

use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;

use serde::Serialize;

use crate::domain::is_plain_name;
use crate::error::{Result, ShelfError};
use crate::storage::Shelves;

use super::{LinkOps, SystemFs};

/// Why a manifest entry was not linked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The file is no longer in the shelf
    MissingShelfFile,
    /// Something already exists at the link location
    LinkExists,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingShelfFile => write!(f, "file is missing from the shelf"),
            SkipReason::LinkExists => write!(f, "link location already exists"),
        }
    }
}

/// A link created by [`restore`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestoredLink {
    pub file_name: String,
    pub link: PathBuf,
    pub target: PathBuf,
}

/// A manifest entry [`restore`] left alone
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    pub file_name: String,
    pub link: PathBuf,
    pub reason: SkipReason,
}

/// Outcome of a [`restore`] run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    pub shelf: String,
    pub created: Vec<RestoredLink>,
    pub skipped: Vec<Skipped>,
}

/// Creates the symlinks recorded in a shelf's manifest
pub fn restore(shelves: &Shelves, shelf_name: &str) -> Result<RestoreReport> {
    restore_with(&SystemFs, shelves, shelf_name)
}

/// [`restore`] with explicit filesystem operations.
///
/// Entries are independent. Missing shelf files and occupied link locations
/// (stale symlinks included) are skipped; any other failure aborts the run and
/// keeps the links created so far.
pub fn restore_with<F: LinkOps + ?Sized>(
    fs_ops: &F,
    shelves: &Shelves,
    shelf_name: &str,
) -> Result<RestoreReport> {
    let shelf = shelves.open(shelf_name)?;
    let manifest = shelf.manifest()?;

    let mut report = RestoreReport {
        shelf: shelf.name().to_string(),
        ..Default::default()
    };

    for (file_name, stored) in manifest.entries() {
        if !is_plain_name(file_name) {
            return Err(ShelfError::InvalidInput(format!(
                "Manifest of shelf \"{}\" has an invalid file name \"{}\"",
                shelf.name(),
                file_name
            )));
        }

        let target = shelf.file_path(file_name);
        let link = stored.resolve(shelves.home());

        match fs::symlink_metadata(&target) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                report.skipped.push(Skipped {
                    file_name: file_name.to_string(),
                    link,
                    reason: SkipReason::MissingShelfFile,
                });
                continue;
            }
            Err(e) => {
                return Err(ShelfError::io(
                    format!("Failed to inspect {}", target.display()),
                    e,
                ))
            }
        }

        if let Some(parent) = link.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ShelfError::io(format!("Failed to create directory {}", parent.display()), e)
            })?;
        }

        match fs_ops.symlink(&target, &link) {
            Ok(()) => report.created.push(RestoredLink {
                file_name: file_name.to_string(),
                link,
                target,
            }),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                report.skipped.push(Skipped {
                    file_name: file_name.to_string(),
                    link,
                    reason: SkipReason::LinkExists,
                });
            }
            Err(e) => {
                return Err(ShelfError::Symlink {
                    link,
                    target,
                    source: e,
                })
            }
        }
    }

    Ok(report)
}
