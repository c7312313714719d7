//! Snapshot collaborators
//!
//! - [`Git`] versions a shelf directory (init, clone, commit, push)
//! - [`create_archive`] writes a `.tar.gz` copy of a shelf directory
//!
//! Both report failures as [`ShelfError`](crate::ShelfError) values and are
//! otherwise black boxes to the engine.

mod git;
mod archive;

pub use archive::{archive_file_name, create_archive, ArchiveSummary, SkippedEntry};
pub use git::{repo_name_from_url, snapshot_message, Git, GitSnapshot};
