//! JSON storage for shelf manifests
//!
//! Each shelf keeps its manifest in `<shelf>/shelf.json`, pretty-printed with
//! 4-space indentation. Writes go through a temp file and a rename, with an
//! exclusive lock held on the temp file while it is written.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::Serialize;

use crate::domain::{Manifest, MANIFEST_FILE, MANIFEST_TEMP_FILE};
use crate::error::{Result, ShelfError};

/// Store for a single shelf's manifest
#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    /// Creates a store for the manifest file at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the store for a shelf directory
    pub fn for_shelf(shelf_dir: &Path) -> Self {
        Self::new(shelf_dir.join(MANIFEST_FILE))
    }

    /// Returns the path to the manifest file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the temp file a save writes before renaming it over the manifest
    pub fn temp_path(&self) -> PathBuf {
        if self.path.file_name().is_some_and(|name| name == MANIFEST_FILE) {
            self.path.with_file_name(MANIFEST_TEMP_FILE)
        } else {
            self.path.with_extension("json.tmp")
        }
    }

    /// Returns true if the manifest file exists
    pub fn exists(&self) -> bool {
        self.path.symlink_metadata().is_ok()
    }

    /// Writes a fresh, empty manifest. Never overwrites an existing one.
    pub fn create(&self, shelf_name: &str) -> Result<Manifest> {
        if self.exists() {
            return Err(ShelfError::AlreadyExists(format!(
                "Manifest already exists: {}",
                self.path.display()
            )));
        }

        let manifest = Manifest::new(shelf_name);
        self.save(&manifest)?;
        Ok(manifest)
    }

    /// Reads and parses the manifest
    pub fn load(&self) -> Result<Manifest> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ShelfError::NotFound(format!(
                    "Shelf manifest not found: {}",
                    self.path.display()
                )));
            }
            Err(e) => {
                return Err(ShelfError::io(
                    format!("Failed to open manifest {}", self.path.display()),
                    e,
                ))
            }
        };

        FileExt::lock_shared(&file)
            .map_err(|e| ShelfError::io("Failed to acquire read lock on manifest", e))?;

        let mut content = String::new();
        file.read_to_string(&mut content).map_err(|e| {
            ShelfError::io(format!("Failed to read manifest {}", self.path.display()), e)
        })?;

        // Lock is released when file is dropped
        serde_json::from_str(&content).map_err(|source| ShelfError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Serializes the manifest over the existing file
    pub fn save(&self, manifest: &Manifest) -> Result<()> {
        let temp_path = self.temp_path();

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|e| {
                    ShelfError::io(
                        format!("Failed to create temp file {}", temp_path.display()),
                        e,
                    )
                })?;

            FileExt::lock_exclusive(&file)
                .map_err(|e| ShelfError::io("Failed to acquire write lock on manifest", e))?;

            let mut writer = BufWriter::new(&file);
            writer
                .write_all(&to_pretty_json(manifest)?)
                .and_then(|_| writer.flush())
                .map_err(|e| {
                    ShelfError::io(format!("Failed to write manifest {}", temp_path.display()), e)
                })?;
        }

        fs::rename(&temp_path, &self.path).map_err(|e| {
            ShelfError::io(
                format!(
                    "Failed to rename {} to {}",
                    temp_path.display(),
                    self.path.display()
                ),
                e,
            )
        })
    }
}

/// Renders a manifest as 4-space indented JSON with a trailing newline
fn to_pretty_json(manifest: &Manifest) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);

    manifest
        .serialize(&mut serializer)
        .map_err(|e| ShelfError::io("Failed to serialize manifest", e.into()))?;

    buf.push(b'\n');
    Ok(buf)
}
