//! Error types for the mediapack binary.
//!
//! The library's packaging errors live in [`crate::packager::error`]; this
//! module wraps them together with CLI, IO, and serialization failures for
//! the binary surface.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for binary operations
pub type Result<T> = std::result::Result<T, MediapackError>;

/// Main error type for the mediapack binary
#[derive(Error, Debug)]
pub enum MediapackError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Packaging errors
    #[error("packaging error: {0}")]
    Packager(#[from] crate::packager::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// A manifest that cannot be used
    #[error("manifest {path}: {reason}")]
    Manifest {
        /// Manifest path
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },
}
