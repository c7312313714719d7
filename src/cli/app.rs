//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{shelf_cmd, snapshot_cmd};
use crate::storage::{Config, ShelfPaths, Shelves};

#[derive(Parser)]
#[command(name = "shelf")]
#[command(author, version, about = "A good symlinks manager")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Shelves directory (defaults to ~/.shelves)
    #[arg(long, global = true, env = "SHELF_ROOT")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new shelf
    #[command(visible_alias = "c")]
    Create {
        /// Shelf name
        shelf: String,

        /// Don't initialize a git repository in the shelf
        #[arg(long)]
        no_git: bool,
    },

    /// Move a file into a shelf and leave a symlink in its place
    #[command(visible_alias = "t")]
    Track {
        /// Shelf name
        shelf: String,

        /// File to track
        path: PathBuf,

        /// Name to store the file under in the shelf (defaults to its file name)
        name: Option<String>,
    },

    /// Clone a shelf from a git repository
    Clone {
        /// Git repository url
        url: String,

        /// Shelf name (defaults to the repository name)
        name: Option<String>,

        /// Restore the shelf's links after cloning
        #[arg(long)]
        restore: bool,
    },

    /// Recreate the symlinks recorded in a shelf
    Restore {
        /// Shelf name
        shelf: String,
    },

    /// Print the directory of a shelf
    Where {
        /// Shelf name
        shelf: String,
    },

    /// List shelves, or the files tracked in one shelf
    #[command(visible_alias = "ls")]
    List {
        /// Shelf name
        shelf: Option<String>,
    },

    /// Take a snapshot of a shelf
    #[command(subcommand)]
    Snapshot(snapshot_cmd::SnapshotCommands),
}

/// Resolved state shared by all commands
pub struct Context {
    pub shelves: Shelves,
    pub config: Config,
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(cli.format, cli.verbose);

    output.verbose("shelf starting");

    let paths = ShelfPaths::from_env(cli.root.as_deref())?;
    output.verbose(&format!(
        "Shelves root: {}, home: {}",
        paths.root().display(),
        paths.home().display()
    ));

    let config = Config::load(paths.root())?;
    let ctx = Context {
        shelves: Shelves::new(paths),
        config,
    };

    match cli.command {
        Commands::Create { shelf, no_git } => shelf_cmd::create(&ctx, &output, &shelf, no_git)?,

        Commands::Track { shelf, path, name } => {
            output.verbose_ctx(
                "track",
                &format!("Tracking {} in shelf {}, name: {:?}", path.display(), shelf, name),
            );
            shelf_cmd::track(&ctx, &output, &shelf, &path, name.as_deref())?
        }

        Commands::Clone { url, name, restore } => {
            shelf_cmd::clone(&ctx, &output, &url, name.as_deref(), restore)?
        }

        Commands::Restore { shelf } => shelf_cmd::restore(&ctx, &output, &shelf)?,

        Commands::Where { shelf } => shelf_cmd::where_is(&ctx, &output, &shelf)?,

        Commands::List { shelf } => match shelf {
            Some(shelf) => shelf_cmd::list_files(&ctx, &output, &shelf)?,
            None => shelf_cmd::list_shelves(&ctx, &output)?,
        },

        Commands::Snapshot(cmd) => snapshot_cmd::run(cmd, &ctx, &output)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}
