//! Shelf commands (create, track, clone, restore, where, list)

use std::path::Path;

use anyhow::{Context as _, Result};

use super::app::Context;
use super::output::Output;
use crate::engine::{self, RestoreReport};
use crate::snapshot::Git;
use crate::storage::ManifestStore;

pub fn create(ctx: &Context, output: &Output, name: &str, no_git: bool) -> Result<()> {
    let shelf = ctx.shelves.create(name)?;
    output.verbose_ctx("create", &format!("Created {}", shelf.dir().display()));

    let init_git = ctx.config.git.init_on_create && !no_git;
    if init_git {
        Git::new()
            .init(shelf.dir())
            .with_context(|| format!("Shelf \"{}\" was created but git init failed", name))?;
        output.verbose_ctx("create", "Initialized git repository");
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "name": shelf.name(),
            "path": shelf.dir().display().to_string(),
            "git": init_git,
        }));
    } else {
        output.success(&format!("Created a shelf named: {}", shelf.name()));
    }

    Ok(())
}

pub fn track(
    ctx: &Context,
    output: &Output,
    shelf: &str,
    path: &Path,
    name: Option<&str>,
) -> Result<()> {
    let outcome = engine::track(&ctx.shelves, shelf, path, name)?;
    output.verbose_ctx(
        "track",
        &format!("Recorded {} as {:?}", outcome.file_name, outcome.stored),
    );

    if output.is_json() {
        output.data(&serde_json::json!({
            "shelf": outcome.shelf,
            "file": outcome.file_name,
            "shelved": outcome.shelved.display().to_string(),
            "link": outcome.link.display().to_string(),
            "stored": outcome.stored.as_path().display().to_string(),
        }));
    } else {
        output.success(&format!(
            "Moved {} to {}",
            outcome.link.display(),
            outcome.shelved.display()
        ));
    }

    Ok(())
}

pub fn clone(
    ctx: &Context,
    output: &Output,
    url: &str,
    name: Option<&str>,
    restore_links: bool,
) -> Result<()> {
    let root = ctx.shelves.paths().ensure_root()?;
    output.verbose_ctx("clone", &format!("Cloning from {} into {}", url, root.display()));

    let dir = Git::new().clone_into(url, root, name)?;
    let shelf_name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .context("Cloned directory has no name")?;

    if !ManifestStore::for_shelf(&dir).exists() {
        output.warn(&format!(
            "{} has no shelf.json; it is not a shelf yet",
            dir.display()
        ));
    }

    let report = if restore_links {
        Some(engine::restore(&ctx.shelves, &shelf_name)?)
    } else {
        None
    };

    if let Some(report) = &report {
        print_skips(output, report);
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "name": shelf_name,
            "path": dir.display().to_string(),
            "restore": report,
        }));
    } else {
        output.success(&format!("Cloned shelf {} into {}", shelf_name, dir.display()));
        if let Some(report) = &report {
            print_restore_text(output, report);
        }
    }

    Ok(())
}

pub fn restore(ctx: &Context, output: &Output, shelf: &str) -> Result<()> {
    let report = engine::restore(&ctx.shelves, shelf)?;
    print_skips(output, &report);

    if output.is_json() {
        output.data(&report);
    } else {
        print_restore_text(output, &report);
    }

    Ok(())
}

pub fn where_is(ctx: &Context, output: &Output, shelf: &str) -> Result<()> {
    let shelf = ctx.shelves.open(shelf)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "name": shelf.name(),
            "path": shelf.dir().display().to_string(),
        }));
    } else {
        println!("{}", shelf.dir().display());
    }

    Ok(())
}

pub fn list_shelves(ctx: &Context, output: &Output) -> Result<()> {
    let names = ctx.shelves.list()?;
    output.verbose_ctx(
        "list",
        &format!("Found {} shelves in {}", names.len(), ctx.shelves.root().display()),
    );

    if output.is_json() {
        let items: Vec<_> = names
            .iter()
            .map(|name| {
                serde_json::json!({
                    "name": name,
                    "path": ctx.shelves.paths().shelf_dir(name).display().to_string(),
                })
            })
            .collect();
        output.data(&items);
    } else if names.is_empty() {
        println!("No shelves");
    } else {
        for name in names {
            println!("{}", name);
        }
    }

    Ok(())
}

pub fn list_files(ctx: &Context, output: &Output, shelf: &str) -> Result<()> {
    let shelf = ctx.shelves.open(shelf)?;
    let manifest = shelf.manifest()?;
    let home = ctx.shelves.home();

    if output.is_json() {
        let items: Vec<_> = manifest
            .entries()
            .map(|(file, stored)| {
                serde_json::json!({
                    "file": file,
                    "link": stored.resolve(home).display().to_string(),
                    "stored": stored.as_path().display().to_string(),
                    "present": shelf.file_path(file).symlink_metadata().is_ok(),
                })
            })
            .collect();
        output.data(&items);
    } else if manifest.is_empty() {
        println!("No files tracked in shelf {}", shelf.name());
    } else {
        println!("{:<24} LINK", "FILE");
        println!("{}", "-".repeat(60));
        for (file, stored) in manifest.entries() {
            let missing = if shelf.file_path(file).symlink_metadata().is_ok() {
                ""
            } else {
                "  (missing)"
            };
            println!("{:<24} {}{}", file, stored.resolve(home).display(), missing);
        }
    }

    Ok(())
}

fn print_skips(output: &Output, report: &RestoreReport) {
    for skip in &report.skipped {
        output.warn(&format!(
            "Skipping {} ({}): {}",
            skip.file_name,
            skip.link.display(),
            skip.reason
        ));
    }
}

fn print_restore_text(output: &Output, report: &RestoreReport) {
    for link in &report.created {
        output.verbose_ctx(
            "restore",
            &format!("Linked {} -> {}", link.link.display(), link.target.display()),
        );
    }

    output.success(&format!(
        "Restored {} link(s) from shelf {} ({} skipped)",
        report.created.len(),
        report.shelf,
        report.skipped.len()
    ));
}
