//! Moving a file into a shelf

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::domain::{clean_path, is_plain_name, is_reserved_name, NormalizedPath};
use crate::error::{Result, ShelfError};
use crate::storage::Shelves;

use super::{LinkOps, SystemFs};

/// Result of a successful [`track`]
#[derive(Debug, Clone)]
pub struct TrackOutcome {
    /// Shelf the file was moved into
    pub shelf: String,
    /// Name of the file inside the shelf
    pub file_name: String,
    /// New location of the file
    pub shelved: PathBuf,
    /// Symlink left at the original location
    pub link: PathBuf,
    /// Link path as recorded in the manifest
    pub stored: NormalizedPath,
}

/// Moves `source` into the shelf and leaves a symlink in its place
pub fn track(
    shelves: &Shelves,
    shelf_name: &str,
    source: &Path,
    target_name: Option<&str>,
) -> Result<TrackOutcome> {
    track_with(&SystemFs, shelves, shelf_name, source, target_name)
}

/// [`track`] with explicit filesystem operations
pub fn track_with<F: LinkOps + ?Sized>(
    fs_ops: &F,
    shelves: &Shelves,
    shelf_name: &str,
    source: &Path,
    target_name: Option<&str>,
) -> Result<TrackOutcome> {
    if source.as_os_str().is_empty() {
        return Err(ShelfError::Validation(
            "File path to track can't be blank".to_string(),
        ));
    }

    let shelf = shelves.open(shelf_name)?;
    let store = shelf.manifest_store();
    let mut manifest = store.load()?;

    let source = std::path::absolute(source)
        .map(|p| clean_path(&p))
        .map_err(|e| ShelfError::io(format!("Failed to resolve {}", source.display()), e))?;

    check_source(&source, shelves.root())?;

    let file_name = resolve_target_name(&source, target_name)?;
    let shelved = shelf.file_path(&file_name);

    match fs::symlink_metadata(&shelved) {
        Ok(_) => {
            return Err(ShelfError::AlreadyExists(format!(
                "File named \"{}\" already exists in shelf \"{}\". \
                 Give the name to use for this file in the shelf",
                file_name,
                shelf.name()
            )));
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(ShelfError::io(
                format!("Failed to inspect {}", shelved.display()),
                e,
            ))
        }
    }

    // The manifest temp file shares the shelf directory with tracked files
    if is_reserved_name(&file_name) {
        return Err(ShelfError::Validation(format!(
            "\"{}\" is reserved for the shelf manifest. Give another name to use in the shelf",
            file_name
        )));
    }

    fs_ops
        .rename(&source, &shelved)
        .map_err(|e| ShelfError::Move {
            from: source.clone(),
            to: shelved.clone(),
            source: e,
        })?;

    if let Err(symlink_error) = fs_ops.symlink(&shelved, &source) {
        return Err(match fs_ops.rename(&shelved, &source) {
            Ok(()) => ShelfError::Symlink {
                link: source,
                target: shelved,
                source: symlink_error,
            },
            Err(restore_error) => ShelfError::CompensationFailed {
                original: source,
                shelved,
                symlink_error,
                restore_error,
            },
        });
    }

    // The file is already moved and linked; a failure from here on leaves the
    // manifest behind the filesystem.
    let stored = manifest.add_link(&file_name, &source, shelves.home())?;
    store.save(&manifest)?;

    Ok(TrackOutcome {
        shelf: shelf.name().to_string(),
        file_name,
        shelved,
        link: source,
        stored,
    })
}

/// Checks that `source` exists, is not a symlink and can be recorded
fn check_source(source: &Path, shelves_root: &Path) -> Result<()> {
    let metadata = match fs::symlink_metadata(source) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ShelfError::NotFound(format!(
                "{} doesn't exist",
                source.display()
            )));
        }
        Err(e) => {
            return Err(ShelfError::io(
                format!("Failed to inspect {}", source.display()),
                e,
            ))
        }
    };

    if metadata.file_type().is_symlink() {
        return Err(ShelfError::InvalidInput(format!(
            "{} shouldn't be a symlink",
            source.display()
        )));
    }

    if source.starts_with(shelves_root) || shelves_root.starts_with(source) {
        return Err(ShelfError::InvalidInput(format!(
            "{} overlaps the shelves directory {}",
            source.display(),
            shelves_root.display()
        )));
    }

    if source.to_str().is_none() {
        return Err(ShelfError::InvalidInput(format!(
            "{} is not valid UTF-8",
            source.display()
        )));
    }

    Ok(())
}

/// Picks the name the file gets inside the shelf
fn resolve_target_name(source: &Path, target_name: Option<&str>) -> Result<String> {
    match target_name {
        Some(name) if name.trim().is_empty() => Err(ShelfError::Validation(
            "Target file name can't be blank".to_string(),
        )),
        Some(name) if !is_plain_name(name) => Err(ShelfError::Validation(format!(
            "Target file name \"{}\" must be a plain file name",
            name
        ))),
        Some(name) => Ok(name.to_string()),
        None => source
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                ShelfError::InvalidInput(format!(
                    "Can't derive a file name from {}",
                    source.display()
                ))
            }),
    }
}
