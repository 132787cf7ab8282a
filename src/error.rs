//! Error types for the label merger

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the label merger
#[derive(Error, Debug)]
pub enum Error {
    /// The labels directory is missing (or is not a directory)
    #[error("Labels directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// A selected input could not be parsed as a PDF
    #[error("Failed to read PDF {}: {source}", .path.display())]
    CorruptInputFile {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    /// The merged document could not be written
    #[error("Failed to write {}: {source}", .path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The labels directory could not be listed
    #[error("Failed to list {}: {source}", .path.display())]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid glob pattern
    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// Invalid selection policy
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
}
