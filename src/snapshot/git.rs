//! git collaborator
//!
//! Every invocation runs with an explicit working directory; the process's
//! own current directory is never changed.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use chrono::{DateTime, TimeZone};

use crate::domain::is_plain_name;
use crate::error::{Result, ShelfError};

/// Result of a git snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GitSnapshot {
    /// A commit was created (false when there was nothing to commit)
    pub committed: bool,
    /// The branch was pushed
    pub pushed: bool,
}

/// Runs the `git` executable
#[derive(Debug, Clone)]
pub struct Git {
    program: PathBuf,
}

impl Default for Git {
    fn default() -> Self {
        Self::new()
    }
}

impl Git {
    pub fn new() -> Self {
        Self::with_program("git")
    }

    /// Uses a specific git executable
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, dir: &Path, args: &[&str]) -> Result<Output> {
        let command = args.first().copied().unwrap_or_default().to_string();

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(dir)
            .output()
            .map_err(|e| ShelfError::ExternalTool {
                tool: "git",
                command: command.clone(),
                message: format!("failed to run {}: {}", self.program.display(), e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let message = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };

            return Err(ShelfError::ExternalTool {
                tool: "git",
                command,
                message,
            });
        }

        Ok(output)
    }

    /// Initializes a repository in `dir`
    pub fn init(&self, dir: &Path) -> Result<()> {
        self.run(dir, &["init", "--quiet"])?;
        Ok(())
    }

    /// Clones `url` into `parent/<name>` and returns the new directory.
    ///
    /// The name defaults to the repository name in the url.
    pub fn clone_into(&self, url: &str, parent: &Path, name: Option<&str>) -> Result<PathBuf> {
        if url.trim().is_empty() {
            return Err(ShelfError::Validation(
                "Git repo url for the shelf has to be provided".to_string(),
            ));
        }

        let name = match name {
            Some(name) => name.to_string(),
            None => repo_name_from_url(url).ok_or_else(|| {
                ShelfError::Validation(format!("Can't derive a shelf name from {}", url))
            })?,
        };

        if !is_plain_name(&name) {
            return Err(ShelfError::Validation(format!(
                "Invalid shelf name \"{}\": must be a single directory name",
                name
            )));
        }

        let dest = parent.join(&name);
        if dest.symlink_metadata().is_ok() {
            return Err(ShelfError::AlreadyExists(format!(
                "Shelf named \"{}\" already exists",
                name
            )));
        }

        self.run(parent, &["clone", "--quiet", url, name.as_str()])?;
        Ok(dest)
    }

    /// Stages everything in `dir`, commits it and optionally pushes.
    ///
    /// `push` is `None` to skip pushing, `Some(None)` to push to the
    /// configured upstream, or `Some(Some(remote))` for a named remote.
    pub fn snapshot(
        &self,
        dir: &Path,
        message: &str,
        push: Option<Option<&str>>,
    ) -> Result<GitSnapshot> {
        self.run(dir, &["add", "--all"])?;

        let status = self.run(dir, &["status", "--porcelain"])?;
        let committed = if String::from_utf8_lossy(&status.stdout).trim().is_empty() {
            false
        } else {
            self.run(dir, &["commit", "--quiet", "-m", message])?;
            true
        };

        let pushed = match push {
            None => false,
            Some(remote) => {
                let mut args = vec!["push", "--quiet"];
                args.extend(remote);
                self.run(dir, &args)?;
                true
            }
        };

        Ok(GitSnapshot { committed, pushed })
    }
}

/// Derives the directory name git would clone `url` into
pub fn repo_name_from_url(url: &str) -> Option<String> {
    let trimmed = url.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    let name = trimmed.rsplit(['/', ':']).next()?;

    if name.is_empty() || !is_plain_name(name) {
        return None;
    }

    Some(name.to_string())
}

/// Commit message for an automatic snapshot
pub fn snapshot_message<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "snapshot: Automatic commit for snapshot taken at {}",
        now.format("%a %b %e %H:%M:%S %Y")
    )
}
