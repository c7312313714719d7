//! tar.gz snapshots of a shelf
//!
//! The walk is best effort: entries that cannot be read are reported in the
//! summary and left out of the archive.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use walkdir::WalkDir;

use crate::domain::clean_path;
use crate::error::{Result, ShelfError};

/// An entry left out of an archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of [`create_archive`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveSummary {
    /// The written archive
    pub path: PathBuf,
    /// Number of entries in the archive
    pub entries: usize,
    pub skipped: Vec<SkippedEntry>,
}

/// File name for an archive of `shelf` taken at `now`
pub fn archive_file_name<Tz: TimeZone>(shelf: &str, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}-{}.tar.gz", shelf, now.format("%Y%m%d-%H%M%S"))
}

/// Writes a gzip-compressed tar of `shelf_dir` to `output`.
///
/// Entry names start with the shelf directory name. Symlinks are stored as
/// symlinks. `output` must not exist yet.
pub fn create_archive(shelf_dir: &Path, output: &Path) -> Result<ArchiveSummary> {
    let output = std::path::absolute(output)
        .map(|p| clean_path(&p))
        .map_err(|e| ShelfError::io(format!("Failed to resolve {}", output.display()), e))?;

    let file = match OpenOptions::new().write(true).create_new(true).open(&output) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(ShelfError::AlreadyExists(format!(
                "Archive already exists: {}",
                output.display()
            )));
        }
        Err(e) => {
            return Err(ShelfError::io(
                format!("Error while creating output file {}", output.display()),
                e,
            ))
        }
    };

    match write_archive(shelf_dir, &output, file) {
        Ok((entries, skipped)) => Ok(ArchiveSummary {
            path: output,
            entries,
            skipped,
        }),
        Err(e) => {
            let _ = fs::remove_file(&output);
            Err(e)
        }
    }
}

fn write_archive(
    shelf_dir: &Path,
    output: &Path,
    file: File,
) -> Result<(usize, Vec<SkippedEntry>)> {
    let write_err = |e: io::Error| {
        ShelfError::io(format!("Error while writing data to {}", output.display()), e)
    };

    let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(false);

    let base = shelf_dir.parent().unwrap_or(shelf_dir);
    let mut entries = 0;
    let mut skipped = Vec::new();

    for entry in WalkDir::new(shelf_dir).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                skipped.push(SkippedEntry {
                    path: e.path().map(Path::to_path_buf).unwrap_or_default(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let path = entry.path();
        if path == output {
            continue;
        }

        let name = path.strip_prefix(base).unwrap_or(path);
        let appended = if entry.file_type().is_dir() {
            builder.append_dir(name, path)
        } else {
            builder.append_path_with_name(path, name)
        };

        match appended {
            Ok(()) => entries += 1,
            Err(e) => skipped.push(SkippedEntry {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }),
        }
    }

    let encoder = builder.into_inner().map_err(write_err)?;
    let mut writer = encoder.finish().map_err(write_err)?;
    writer.flush().map_err(write_err)?;

    Ok((entries, skipped))
}
