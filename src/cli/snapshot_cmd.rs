//! Snapshot CLI commands

use std::fs;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use chrono::Local;
use clap::Subcommand;

use super::app::Context;
use super::output::Output;
use crate::snapshot::{archive_file_name, create_archive, snapshot_message, Git};

#[derive(Subcommand)]
pub enum SnapshotCommands {
    /// Commit the shelf with git and push it
    Git {
        /// Shelf name
        shelf: String,

        /// Commit without pushing
        #[arg(long)]
        no_push: bool,
    },

    /// Write a .tar.gz archive of the shelf
    Archive {
        /// Shelf name
        shelf: String,

        /// Directory to write the archive to (defaults to the current directory)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

pub fn run(cmd: SnapshotCommands, ctx: &Context, output: &Output) -> Result<()> {
    match cmd {
        SnapshotCommands::Git { shelf, no_push } => git_snapshot(ctx, output, &shelf, no_push),
        SnapshotCommands::Archive { shelf, output: dir } => {
            archive_snapshot(ctx, output, &shelf, dir)
        }
    }
}

fn git_snapshot(ctx: &Context, output: &Output, shelf: &str, no_push: bool) -> Result<()> {
    let shelf = ctx.shelves.open(shelf)?;
    let message = snapshot_message(&Local::now());

    let push = if no_push || !ctx.config.git.push {
        None
    } else {
        Some(ctx.config.git.remote.as_deref())
    };
    output.verbose_ctx(
        "snapshot",
        &format!("Committing {} (push: {:?})", shelf.dir().display(), push),
    );

    let result = Git::new().snapshot(shelf.dir(), &message, push)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "shelf": shelf.name(),
            "committed": result.committed,
            "pushed": result.pushed,
            "message": message,
        }));
    } else {
        let committed = if result.committed {
            "Committed"
        } else {
            "Nothing to commit in"
        };
        let pushed = if result.pushed { " and pushed" } else { "" };
        output.success(&format!("{} shelf {}{}", committed, shelf.name(), pushed));
    }

    Ok(())
}

fn archive_snapshot(
    ctx: &Context,
    output: &Output,
    shelf: &str,
    dir: Option<PathBuf>,
) -> Result<()> {
    let shelf = ctx.shelves.open(shelf)?;

    let dir = match dir.or_else(|| ctx.config.archive.output_dir.clone()) {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let path = dir.join(archive_file_name(shelf.name(), &Local::now()));
    output.verbose_ctx(
        "snapshot",
        &format!("Archiving {} to {}", shelf.dir().display(), path.display()),
    );

    let summary = create_archive(shelf.dir(), &path)?;

    for skipped in &summary.skipped {
        output.warn(&format!("Skipping {}: {}", skipped.path.display(), skipped.reason));
    }

    if output.is_json() {
        output.data(&summary);
    } else {
        output.success(&format!(
            "Created archive {} ({} entries)",
            summary.path.display(),
            summary.entries
        ));
    }

    Ok(())
}
