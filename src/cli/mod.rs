//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `create <shelf>` | Create a shelf (and a git repository in it) |
//! | `track <shelf> <path> [name]` | Move a file into a shelf, leaving a symlink |
//! | `restore <shelf>` | Recreate the symlinks recorded in a shelf |
//! | `clone <url> [name]` | Clone a shelf from git |
//! | `where <shelf>` | Print a shelf's directory |
//! | `list [shelf]` | List shelves or the files in one |
//! | `snapshot git <shelf>` | Commit and push a shelf |
//! | `snapshot archive <shelf>` | Write a `.tar.gz` of a shelf |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! Warnings (skipped links, unreadable archive entries) always go to stderr.
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output:
//! ```bash
//! shelf --verbose restore dots
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod shelf_cmd;
mod snapshot_cmd;

pub use app::{run, Cli, Commands, Context};
pub use output::{Output, OutputFormat};
pub use snapshot_cmd::SnapshotCommands;
