//! Error types for packaging operations.
//!
//! All fallible packaging APIs return [`Result`]. Filesystem failures are
//! annotated with the attempted action and path via [`ErrorExt::fs_context`].

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for packaging operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for packaging operations
#[derive(Error, Debug)]
pub enum Error {
    /// Generic errors with a formatted message
    #[error("{0}")]
    GenericError(String),

    /// IO errors without path context
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// IO errors annotated with the attempted action and path
    #[error("{action} ({path}): {source}")]
    Fs {
        /// What the packager was doing when the error occurred
        action: String,
        /// Path the operation was applied to
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Archive container errors from the backend
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Explicit media units and a sizing template were both declared
    #[error("explicit media units and a media template are both declared; remove one of them")]
    MediaAuthoringConflict,

    /// An environment size override did not parse as an integer MB value
    #[error("environment override {var} is not a valid size in megabytes: {value:?}")]
    InvalidSizeOverride {
        /// Environment variable name
        var: String,
        /// The rejected value
        value: String,
    },

    /// A cached archive path could not be probed
    #[error("cannot probe cached archive {path}: {source}")]
    CachePath {
        /// Candidate cache path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Earlier phases recorded errors in the diagnostic sink
    #[error("{count} error(s) reported during packaging; see the log for details")]
    ErrorsReported {
        /// Number of accumulated errors
        count: usize,
    },
}

/// Returns early with a [`Error::GenericError`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::packager::Error::GenericError(format!($($arg)*)).into())
    };
}

/// Extension trait for attaching a plain message to `Option` and `Result` values.
pub trait Context<T> {
    /// Converts to [`Result`], using `msg` as the error message.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Converts to [`Result`], computing the error message lazily.
    fn with_context(self, f: impl FnOnce() -> String) -> Result<T>;
}

impl<T> Context<T> for Option<T> {
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(msg.into()))
    }

    fn with_context(self, f: impl FnOnce() -> String) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(f()))
    }
}

impl<T, E: std::fmt::Display> Context<T> for std::result::Result<T, E> {
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::GenericError(format!("{}: {}", msg.into(), e)))
    }

    fn with_context(self, f: impl FnOnce() -> String) -> Result<T> {
        self.map_err(|e| Error::GenericError(format!("{}: {}", f(), e)))
    }
}

/// Extension trait for attaching action/path context to IO results.
pub trait ErrorExt<T> {
    /// Wraps an IO error with the attempted action and the path it targeted.
    fn fs_context(self, action: &str, path: &Path) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, action: &str, path: &Path) -> Result<T> {
        self.map_err(|source| Error::Fs {
            action: action.to_string(),
            path: path.to_path_buf(),
            source,
        })
    }
}
