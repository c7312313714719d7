//! Shelf manifest model
//!
//! A manifest records, for every file kept in a shelf, where the symlink
//! pointing at it belongs. Link paths inside the home directory are stored
//! relative to home so a cloned shelf restores correctly for the same user
//! layout on another machine.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{self, ShelfError};

/// File name of the manifest inside every shelf directory
pub const MANIFEST_FILE: &str = "shelf.json";

/// Temp file the manifest is written to before it is renamed into place
pub const MANIFEST_TEMP_FILE: &str = "shelf.json.tmp";

/// Returns true for file names the shelf itself owns
pub fn is_reserved_name(name: &str) -> bool {
    name == MANIFEST_FILE || name == MANIFEST_TEMP_FILE
}

/// The per-shelf record of tracked files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Shelf identifier
    pub name: String,

    /// Tracked file name -> stored link path
    #[serde(default)]
    pub links: BTreeMap<String, String>,
}

/// A link path as it is stored in a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedPath {
    /// Relative to the user's home directory
    Relative(PathBuf),
    /// Outside the home directory
    Absolute(PathBuf),
}

impl NormalizedPath {
    /// Classifies a value read back from a manifest
    pub fn from_stored(stored: &str) -> Self {
        let path = PathBuf::from(stored);
        if path.is_absolute() {
            NormalizedPath::Absolute(path)
        } else {
            NormalizedPath::Relative(path)
        }
    }

    pub fn as_path(&self) -> &Path {
        match self {
            NormalizedPath::Relative(p) | NormalizedPath::Absolute(p) => p,
        }
    }

    pub fn is_relative(&self) -> bool {
        matches!(self, NormalizedPath::Relative(_))
    }

    /// Returns the absolute location of the link for the given home directory
    pub fn resolve(&self, home: &Path) -> PathBuf {
        match self {
            NormalizedPath::Relative(p) => clean_path(&home.join(p)),
            NormalizedPath::Absolute(p) => p.clone(),
        }
    }
}

/// Lexically cleans a path: repeated separators and `.` are dropped and `..`
/// consumes the preceding component. `..` directly under the root stays at the
/// root. An empty result becomes `.`.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }

    out.iter().collect()
}

/// Computes the stored form of an absolute link path.
///
/// Paths under `home` (compared component-wise, so `/home/user2` is not under
/// `/home/user`) become [`NormalizedPath::Relative`]; anything else is kept
/// as a cleaned [`NormalizedPath::Absolute`].
pub fn normalize_link_path(path: &Path, home: &Path) -> NormalizedPath {
    let cleaned = clean_path(path);
    let home = clean_path(home);

    if home.is_absolute() {
        if let Ok(rest) = cleaned.strip_prefix(&home) {
            return NormalizedPath::Relative(clean_path(rest));
        }
    }

    NormalizedPath::Absolute(cleaned)
}

/// Returns true if `name` is a single, ordinary path component
pub fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(component)), None) => component == name,
        _ => false,
    }
}

impl Manifest {
    /// Creates an empty manifest for a shelf
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            links: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Records that `file_name` in the shelf belongs at `link_path`.
    ///
    /// An existing entry for the same file name is replaced.
    pub fn add_link(
        &mut self,
        file_name: &str,
        link_path: &Path,
        home: &Path,
    ) -> error::Result<NormalizedPath> {
        if !is_plain_name(file_name) {
            return Err(ShelfError::InvalidInput(format!(
                "Tracked file name must be a plain file name, got \"{}\"",
                file_name
            )));
        }

        if !link_path.is_absolute() {
            return Err(ShelfError::InvalidInput(format!(
                "Link path must be absolute, got {}",
                link_path.display()
            )));
        }

        let normalized = normalize_link_path(link_path, home);
        let stored = normalized.as_path().to_str().ok_or_else(|| {
            ShelfError::InvalidInput(format!(
                "Link path is not valid UTF-8: {}",
                link_path.display()
            ))
        })?;

        self.links.insert(file_name.to_string(), stored.to_string());
        Ok(normalized)
    }

    /// Returns the stored link for a tracked file
    pub fn link(&self, file_name: &str) -> Option<NormalizedPath> {
        self.links
            .get(file_name)
            .map(|stored| NormalizedPath::from_stored(stored))
    }

    /// Iterates over tracked entries in file name order
    pub fn entries(&self) -> impl Iterator<Item = (&str, NormalizedPath)> + '_ {
        self.links
            .iter()
            .map(|(name, stored)| (name.as_str(), NormalizedPath::from_stored(stored)))
    }
}
