//! Domain models for shelf
//!
//! Contains the manifest model and path normalization without any I/O concerns.

mod manifest;

pub use manifest::{
    clean_path, is_plain_name, is_reserved_name, normalize_link_path, Manifest, NormalizedPath,
    MANIFEST_FILE, MANIFEST_TEMP_FILE,
};
