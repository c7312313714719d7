//! Error type shared by the storage layer, the engine and the snapshot
//! collaborators.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Broad classification of a [`ShelfError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    AlreadyExists,
    InvalidInput,
    Io,
    Parse,
    ExternalTool,
    /// On-disk state no longer matches what the operation started from
    Inconsistent,
}

#[derive(Debug, Error)]
pub enum ShelfError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to move {} to {}", from.display(), to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create symlink at {} -> {}", link.display(), target.display())]
    Symlink {
        link: PathBuf,
        target: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "Failed to create symlink at {} ({symlink_error}) and failed to move the file \
         back from {} ({restore_error}). The file is now only in the shelf",
        original.display(),
        shelved.display()
    )]
    CompensationFailed {
        original: PathBuf,
        shelved: PathBuf,
        symlink_error: io::Error,
        restore_error: io::Error,
    },

    #[error("Failed to parse manifest {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{tool} {command} failed: {message}")]
    ExternalTool {
        tool: &'static str,
        command: String,
        message: String,
    },
}

impl ShelfError {
    /// Wraps an I/O error with a human readable context
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        ShelfError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ShelfError::Validation(_) => ErrorKind::Validation,
            ShelfError::NotFound(_) => ErrorKind::NotFound,
            ShelfError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            ShelfError::InvalidInput(_) => ErrorKind::InvalidInput,
            ShelfError::Io { .. } | ShelfError::Move { .. } | ShelfError::Symlink { .. } => {
                ErrorKind::Io
            }
            ShelfError::CompensationFailed { .. } => ErrorKind::Inconsistent,
            ShelfError::Parse { .. } => ErrorKind::Parse,
            ShelfError::ExternalTool { .. } => ErrorKind::ExternalTool,
        }
    }
}

pub type Result<T> = std::result::Result<T, ShelfError>;
