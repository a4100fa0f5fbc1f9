//! Error types for index fixing.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FixError>;

#[derive(Debug, Error)]
pub enum FixError {
    #[error("failed to open input file {}: {source}", .path.display())]
    OpenInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create temp file {}: {source}", .path.display())]
    CreateTemp {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to replace {} with {}: {source}", .to.display(), .from.display())]
    Replace {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },
}

impl FixError {
    /// Underlying I/O error, if this failure came from the filesystem.
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            Self::OpenInput { source, .. }
            | Self::CreateTemp { source, .. }
            | Self::Read { source, .. }
            | Self::Write { source, .. }
            | Self::Replace { source, .. } => Some(source),
            Self::Config { .. } => None,
        }
    }
}
