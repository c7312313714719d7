//! # Storage Layer
//!
//! Persistence layer for shelves.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Tracked files | as-is | `<root>/<shelf>/<file>` |
//! | Manifest | JSON, 4-space indent | `<root>/<shelf>/shelf.json` |
//! | Config | TOML | `<root>/config.toml` |
//!
//! ## Layout
//!
//! ```text
//! ~/.shelves/
//! ├── config.toml           # Optional configuration
//! └── dots/                 # A shelf (usually a git repository)
//!     ├── .git/
//!     ├── shelf.json        # Manifest
//!     └── vimrc             # Tracked file, ~/.vimrc links here
//! ```
//!
//! ## Key Types
//!
//! - [`ShelfPaths`] - Resolves the shelves root and home directory
//! - [`Shelves`] - Creates, opens and lists shelves
//! - [`ManifestStore`] - Read/write a shelf manifest
//! - [`Config`] - User configuration

mod paths;
mod manifest_store;
mod shelves;
mod config;

pub use paths::{home_dir, shelves_root_from, ShelfPaths, SHELVES_DIR};
pub use manifest_store::ManifestStore;
pub use shelves::{validate_shelf_name, Shelf, Shelves};
pub use config::{ArchiveConfig, Config, ConfigError, GitConfig, CONFIG_FILE};
