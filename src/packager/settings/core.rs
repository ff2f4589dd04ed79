//! Core PackagerSettings struct and implementations.

use super::{DEFAULT_MAX_MEDIA_MB, MediaTemplate, PackageSettings};
use std::path::{Path, PathBuf};

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Main settings for packaging operations.
///
/// Central configuration for the packager, constructed via
/// [`SettingsBuilder`](super::SettingsBuilder). Size-threshold environment
/// overrides are parsed once at build time and carried here as plain fields,
/// so the partitioning algorithm itself never touches the process
/// environment.
#[derive(Clone, Debug)]
pub struct PackagerSettings {
    /// Package metadata and compression defaults.
    pub(super) package: PackageSettings,

    /// Directory finished external archives are delivered to.
    pub(super) out_dir: PathBuf,

    /// Scratch directory for in-progress builds and embedded streams.
    pub(super) work_dir: PathBuf,

    /// Directory holding previously built archives for reuse.
    ///
    /// None disables cache lookups entirely.
    pub(super) cache_dir: Option<PathBuf>,

    /// Worker-pool width for concurrent archive builds.
    pub(super) threads: usize,

    /// Environment override for the per-unit size cap, in megabytes.
    pub(super) max_media_mb: Option<u64>,

    /// Environment override for the large-file split size, in megabytes.
    pub(super) large_file_split_mb: Option<u64>,
}

impl PackagerSettings {
    /// Returns the package metadata.
    pub fn package(&self) -> &PackageSettings {
        &self.package
    }

    /// Returns the delivery directory for external archives.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Returns the scratch directory for in-progress builds.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Returns the archive cache directory, if caching is enabled.
    pub fn cache_dir(&self) -> Option<&Path> {
        self.cache_dir.as_deref()
    }

    /// Returns the worker-pool width.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Effective per-unit size cap in bytes.
    ///
    /// Precedence: environment override, then the authored template value,
    /// then [`DEFAULT_MAX_MEDIA_MB`].
    pub fn max_media_bytes(&self, template: Option<&MediaTemplate>) -> u64 {
        self.max_media_mb
            .or_else(|| template.and_then(|t| t.max_media_mb))
            .unwrap_or(DEFAULT_MAX_MEDIA_MB)
            .saturating_mul(BYTES_PER_MB)
    }

    /// Effective large-file split size in bytes; zero means unconstrained.
    ///
    /// Same precedence as [`Self::max_media_bytes`], with a default of zero.
    pub fn large_file_split_bytes(&self, template: Option<&MediaTemplate>) -> u64 {
        self.large_file_split_mb
            .or_else(|| template.and_then(|t| t.large_file_split_mb))
            .unwrap_or(0)
            .saturating_mul(BYTES_PER_MB)
    }
}
