//! Shelves root resolution
//!
//! Shelves live under `$XDG_CONFIG_HOME/.shelves` on Linux when that variable
//! is set, and under `$HOME/.shelves` otherwise.

use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::domain::clean_path;
use crate::error::{Result, ShelfError};

/// Directory name of the shelves root
pub const SHELVES_DIR: &str = ".shelves";

/// Resolved locations used by every shelf operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelfPaths {
    root: PathBuf,
    home: PathBuf,
}

impl ShelfPaths {
    /// Creates paths from an explicit root and home directory
    pub fn new(root: impl Into<PathBuf>, home: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            home: home.into(),
        }
    }

    /// Resolves paths from the environment, honouring an explicit root override
    pub fn from_env(root_override: Option<&Path>) -> Result<Self> {
        let home = home_dir()?;

        let root = match root_override {
            Some(root) => {
                let absolute = std::path::absolute(root).map_err(|e| {
                    ShelfError::io(format!("Failed to resolve {}", root.display()), e)
                })?;
                clean_path(&absolute)
            }
            None => shelves_root_from(env::var_os("XDG_CONFIG_HOME").as_deref(), &home),
        };

        Ok(Self::new(root, home))
    }

    /// Returns the shelves root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the user's home directory
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Returns the directory a shelf with the given name would occupy
    pub fn shelf_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Creates the shelves root if it does not exist yet
    pub fn ensure_root(&self) -> Result<&Path> {
        fs::create_dir_all(&self.root).map_err(|e| {
            ShelfError::io(
                format!("Failed to create shelves directory {}", self.root.display()),
                e,
            )
        })?;
        Ok(&self.root)
    }
}

/// Returns the current user's home directory
pub fn home_dir() -> Result<PathBuf> {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .ok_or_else(|| ShelfError::NotFound("Could not determine home directory".to_string()))
}

/// Computes the shelves root from the XDG config dir (if any) and home.
///
/// `XDG_CONFIG_HOME` only applies on Linux; empty and relative values are
/// ignored.
pub fn shelves_root_from(xdg_config_home: Option<&OsStr>, home: &Path) -> PathBuf {
    let base = match xdg_config_home {
        Some(xdg) if cfg!(target_os = "linux") && Path::new(xdg).is_absolute() => {
            PathBuf::from(xdg)
        }
        _ => home.to_path_buf(),
    };

    base.join(SHELVES_DIR)
}
