//! Archive cache resolver.
//!
//! Decides, per media unit, whether a previously built archive can be reused
//! from the cache directory or must be (re)built. Validity is all-or-nothing:
//! entry count, per-position entry name, source size, and source timestamp
//! must all match, otherwise the whole unit is rebuilt.

use super::archive::{MediaArchiver, in_archive_name};
use super::error::{Context, Error, Result};
use super::payload::PayloadFile;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// How a unit's archive is produced and delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheDecision {
    /// No cache configured: build in the scratch directory, move into place
    BuildAndMove,
    /// Cache miss or stale entry: build into the cache, copy into place
    BuildAndCopy,
    /// Cache hit: copy the cached archive into place without rebuilding
    Copy,
}

/// Resolution for one media unit's archive.
#[derive(Debug, Clone)]
pub struct ResolvedArchive {
    /// How the archive is produced and delivered.
    pub decision: CacheDecision,

    /// Where the archive is built, or already exists for
    /// [`CacheDecision::Copy`].
    pub build_path: PathBuf,

    /// Where the finished archive belongs.
    pub final_path: PathBuf,
}

/// Resolves one unit against the archive cache.
///
/// With no cache directory configured every unit is built fresh at
/// `suggested_build_path`. Otherwise the candidate cached archive is probed:
/// missing means build-into-cache, present means enumerate-and-compare. A
/// probe failure other than not-found (an illegal path, say) is an error for
/// this resolution, never a silent miss.
///
/// On a hit the caller must still touch the reused archive's modification
/// time so later runs do not mistake it for stale.
pub fn resolve(
    files: &[PayloadFile],
    rename_suffix: Option<&str>,
    suggested_build_path: &Path,
    final_path: &Path,
    cache_dir: Option<&Path>,
    archiver: &dyn MediaArchiver,
) -> Result<ResolvedArchive> {
    let Some(cache_dir) = cache_dir else {
        return Ok(ResolvedArchive {
            decision: CacheDecision::BuildAndMove,
            build_path: suggested_build_path.to_path_buf(),
            final_path: final_path.to_path_buf(),
        });
    };

    let file_name = final_path
        .file_name()
        .with_context(|| format!("archive path {} has no file name", final_path.display()))?;
    let candidate = cache_dir.join(file_name);

    match std::fs::metadata(&candidate) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("no cached archive at {}", candidate.display());
            return Ok(ResolvedArchive {
                decision: CacheDecision::BuildAndCopy,
                build_path: candidate,
                final_path: final_path.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(Error::CachePath {
                path: candidate,
                source,
            });
        }
        Ok(_) => {}
    }

    let decision = if cached_matches(files, rename_suffix, &candidate, archiver) {
        log::info!("reusing cached archive {}", candidate.display());
        CacheDecision::Copy
    } else {
        CacheDecision::BuildAndCopy
    };

    Ok(ResolvedArchive {
        decision,
        build_path: candidate,
        final_path: final_path.to_path_buf(),
    })
}

/// Compares a cached archive's directory against the unit's current files.
///
/// Checks run cheapest-first per position: entry name, then source size,
/// then source timestamp at container granularity. Any single mismatch
/// invalidates the whole archive.
fn cached_matches(
    files: &[PayloadFile],
    rename_suffix: Option<&str>,
    candidate: &Path,
    archiver: &dyn MediaArchiver,
) -> bool {
    let entries = match archiver.enumerate(candidate) {
        Ok(entries) => entries,
        Err(e) => {
            // An unreadable cached archive is rebuilt in place.
            log::warn!(
                "cached archive {} cannot be enumerated ({e}); rebuilding",
                candidate.display()
            );
            return false;
        }
    };

    if entries.len() != files.len() {
        log::debug!(
            "cached archive {} holds {} entries, expected {}",
            candidate.display(),
            entries.len(),
            files.len()
        );
        return false;
    }

    for (file, entry) in files.iter().zip(&entries) {
        let expected_name = in_archive_name(&file.id, rename_suffix);
        if entry.name != expected_name {
            log::debug!(
                "cached archive {}: entry '{}' where '{}' was expected",
                candidate.display(),
                entry.name,
                expected_name
            );
            return false;
        }
        if entry.size != file.size {
            log::debug!(
                "cached archive {}: '{}' is {} bytes, expected {}",
                candidate.display(),
                entry.name,
                entry.size,
                file.size
            );
            return false;
        }
        let source_modified = match std::fs::metadata(&file.source).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            // An unreadable source invalidates the cache; the build itself
            // surfaces the real error with full context.
            Err(_) => return false,
        };
        if dos_seconds(entry.modified) != dos_seconds(source_modified) {
            log::debug!(
                "cached archive {}: '{}' timestamp differs",
                candidate.display(),
                entry.name
            );
            return false;
        }
    }

    true
}

/// Unix seconds floored to DOS two-second granularity.
///
/// Container entry times cannot carry finer resolution, so both sides of the
/// comparison are rounded the same way.
fn dos_seconds(time: SystemTime) -> i64 {
    let secs = match time.duration_since(UNIX_EPOCH) {
        Ok(since) => since.as_secs() as i64,
        Err(before) => -(before.duration().as_secs() as i64),
    };
    secs & !1
}
