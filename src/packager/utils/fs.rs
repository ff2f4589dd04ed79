//! File system utilities for archive delivery.
//!
//! Safe file operations with automatic parent-directory creation, used when
//! applying transfer instructions.

use crate::packager::error::{Error, ErrorExt, Result};
use std::io;
use std::path::Path;
use tokio::fs;

/// Copies a regular file, creating any parent directories of the destination
/// path as necessary.
///
/// Fails if the source path is a directory or doesn't exist.
pub async fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if !from.is_file() {
        return Err(Error::GenericError(format!(
            "{} does not exist or is not a file",
            from.display()
        )));
    }
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir)
            .await
            .fs_context("creating destination directory", dest_dir)?;
    }
    fs::copy(from, to).await.fs_context("copying file", to)?;
    Ok(())
}

/// Moves a regular file, creating any parent directories of the destination
/// path as necessary.
///
/// Renames when source and destination share a filesystem; falls back to
/// copy-then-remove across filesystems.
pub async fn move_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir)
            .await
            .fs_context("creating destination directory", dest_dir)?;
    }
    match fs::rename(from, to).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(from, to).await.fs_context("copying file", to)?;
            fs::remove_file(from)
                .await
                .fs_context("removing moved file", from)?;
            Ok(())
        }
        Err(e) => Err(Error::Fs {
            action: "moving file".to_string(),
            path: to.to_path_buf(),
            source: e,
        }),
    }
}

/// Creates the given directory path if it does not exist yet.
pub async fn ensure_dir(path: &Path) -> Result<()> {
    match fs::create_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e.into()),
    }
}
