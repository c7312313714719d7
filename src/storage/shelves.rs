//! Shelf management
//!
//! Handles shelf creation and lookup under the shelves root.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::domain::{is_plain_name, Manifest};
use crate::error::{Result, ShelfError};

use super::{ManifestStore, ShelfPaths};

/// Entry point for accessing shelves under a root directory
#[derive(Debug, Clone)]
pub struct Shelves {
    paths: ShelfPaths,
}

/// A single existing shelf
#[derive(Debug, Clone)]
pub struct Shelf {
    name: String,
    dir: PathBuf,
}

/// Rejects blank names and names that are not a single path component
pub fn validate_shelf_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ShelfError::Validation("Shelf name has to be given".to_string()));
    }

    if !is_plain_name(name) {
        return Err(ShelfError::Validation(format!(
            "Invalid shelf name \"{}\": must be a single directory name",
            name
        )));
    }

    Ok(())
}

impl Shelves {
    pub fn new(paths: ShelfPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &ShelfPaths {
        &self.paths
    }

    /// Returns the shelves root directory
    pub fn root(&self) -> &Path {
        self.paths.root()
    }

    /// Returns the home directory link paths are normalized against
    pub fn home(&self) -> &Path {
        self.paths.home()
    }

    /// Creates a new shelf directory with an empty manifest
    pub fn create(&self, name: &str) -> Result<Shelf> {
        validate_shelf_name(name)?;
        self.paths.ensure_root()?;

        let dir = self.paths.shelf_dir(name);
        match fs::create_dir(&dir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(ShelfError::AlreadyExists(format!(
                    "Shelf named \"{}\" already exists",
                    name
                )));
            }
            Err(e) => {
                return Err(ShelfError::io(
                    format!("Failed to create shelf directory {}", dir.display()),
                    e,
                ))
            }
        }

        if let Err(e) = ManifestStore::for_shelf(&dir).create(name) {
            // No shelf directory without a manifest
            let _ = fs::remove_dir_all(&dir);
            return Err(e);
        }

        Ok(Shelf {
            name: name.to_string(),
            dir,
        })
    }

    /// Opens an existing shelf by name
    pub fn open(&self, name: &str) -> Result<Shelf> {
        validate_shelf_name(name)?;

        let dir = self.paths.shelf_dir(name);
        if !dir.is_dir() {
            return Err(ShelfError::NotFound(format!(
                "Shelf named \"{}\" doesn't exist",
                name
            )));
        }

        Ok(Shelf {
            name: name.to_string(),
            dir,
        })
    }

    /// Lists the names of all shelves (directories holding a manifest), sorted
    pub fn list(&self) -> Result<Vec<String>> {
        let root = self.paths.root();
        let entries = match fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(ShelfError::io(
                    format!("Failed to read shelves directory {}", root.display()),
                    e,
                ))
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                ShelfError::io(format!("Failed to read shelves directory {}", root.display()), e)
            })?;

            let path = entry.path();
            if !path.is_dir() || !ManifestStore::for_shelf(&path).exists() {
                continue;
            }

            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }

        names.sort();
        Ok(names)
    }
}

impl Shelf {
    /// Returns the shelf name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the shelf directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path a tracked file with the given name occupies
    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Returns the manifest store for this shelf
    pub fn manifest_store(&self) -> ManifestStore {
        ManifestStore::for_shelf(&self.dir)
    }

    /// Loads this shelf's manifest
    pub fn manifest(&self) -> Result<Manifest> {
        self.manifest_store().load()
    }
}
