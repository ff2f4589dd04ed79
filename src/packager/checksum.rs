//! Archive checksum calculation.
//!
//! Every produced archive gets a SHA-256 checksum in the build report so
//! downstream tooling can verify transfers.

use super::error::{ErrorExt, Result};
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Calculates the SHA-256 checksum of one archive file.
///
/// Reads in 8KB chunks to keep memory flat for large archives.
///
/// # Returns
///
/// Hex-encoded SHA-256 hash (64 characters).
pub async fn archive_sha256(path: &Path) -> Result<String> {
    let mut file = tokio::fs::File::open(path)
        .await
        .fs_context("opening archive for hashing", path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file
            .read(&mut buffer)
            .await
            .fs_context("reading archive for hashing", path)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}
