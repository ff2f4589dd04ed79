//! Builder for constructing PackagerSettings.

use super::{PackageSettings, PackagerSettings};
use crate::packager::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Environment override for the per-unit size cap, integer megabytes.
pub const ENV_MAX_MEDIA_MB: &str = "MEDIAPACK_MAX_MEDIA_MB";

/// Environment override for the large-file split size, integer megabytes.
pub const ENV_LARGE_FILE_SPLIT_MB: &str = "MEDIAPACK_LARGE_FILE_SPLIT_MB";

/// Builder for constructing [`PackagerSettings`].
///
/// Provides a fluent API with validation. Environment threshold overrides are
/// only consulted when [`SettingsBuilder::overrides_from_env`] is called, so
/// library consumers and tests stay deterministic without touching the
/// process environment.
///
/// # Examples
///
/// ```no_run
/// use mediapack::packager::{PackageSettings, SettingsBuilder};
///
/// # fn example() -> mediapack::packager::Result<()> {
/// let settings = SettingsBuilder::new()
///     .out_dir("target/media")
///     .package_settings(PackageSettings {
///         product_name: "MyApp".into(),
///         version: "1.0.0".into(),
///         ..Default::default()
///     })
///     .threads(4)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
    package: Option<PackageSettings>,
    out_dir: Option<PathBuf>,
    work_dir: Option<PathBuf>,
    cache_dir: Option<PathBuf>,
    threads: Option<usize>,
    max_media_mb: Option<u64>,
    large_file_split_mb: Option<u64>,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets package metadata.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn package_settings(mut self, package: PackageSettings) -> Self {
        self.package = Some(package);
        self
    }

    /// Sets the delivery directory for finished external archives.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn out_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.out_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the scratch directory for in-progress builds.
    ///
    /// Default: `<out_dir>/.mediapack`
    pub fn work_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.work_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the archive cache directory.
    ///
    /// Default: None (caching disabled, every archive is rebuilt)
    pub fn cache_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.cache_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the worker-pool width for concurrent archive builds.
    ///
    /// Default: the number of logical CPUs
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Sets the per-unit size cap override, in megabytes.
    ///
    /// Takes precedence over the authored template value.
    pub fn max_media_mb(mut self, mb: u64) -> Self {
        self.max_media_mb = Some(mb);
        self
    }

    /// Sets the large-file split size override, in megabytes.
    pub fn large_file_split_mb(mut self, mb: u64) -> Self {
        self.large_file_split_mb = Some(mb);
        self
    }

    /// Reads the size-threshold overrides from the process environment.
    ///
    /// A value that is not a plain non-negative integer is a fatal
    /// configuration error.
    pub fn overrides_from_env(mut self) -> Result<Self> {
        if let Some(mb) = parse_env_size(ENV_MAX_MEDIA_MB)? {
            self.max_media_mb = Some(mb);
        }
        if let Some(mb) = parse_env_size(ENV_LARGE_FILE_SPLIT_MB)? {
            self.large_file_split_mb = Some(mb);
        }
        Ok(self)
    }

    /// Validates the configuration and builds [`PackagerSettings`].
    pub fn build(self) -> Result<PackagerSettings> {
        let package = self
            .package
            .ok_or_else(|| Error::GenericError("package settings are required".into()))?;
        let out_dir = self
            .out_dir
            .ok_or_else(|| Error::GenericError("an output directory is required".into()))?;
        let work_dir = self
            .work_dir
            .unwrap_or_else(|| out_dir.join(".mediapack"));
        let threads = match self.threads {
            Some(0) => 1,
            Some(n) => n,
            None => num_cpus::get(),
        };

        Ok(PackagerSettings {
            package,
            out_dir,
            work_dir,
            cache_dir: self.cache_dir,
            threads,
            max_media_mb: self.max_media_mb,
            large_file_split_mb: self.large_file_split_mb,
        })
    }
}

/// Parses one integer-MB environment override.
///
/// Absent variables are fine; anything present must parse as `u64` or the
/// whole configuration is rejected.
fn parse_env_size(var: &str) -> Result<Option<u64>> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| Error::InvalidSizeOverride {
                var: var.to_string(),
                value,
            }),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(raw)) => Err(Error::InvalidSizeOverride {
            var: var.to_string(),
            value: raw.to_string_lossy().into_owned(),
        }),
    }
}
