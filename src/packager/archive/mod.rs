//! Archive backend abstraction.
//!
//! The cache comparison and the worker pool only ever see this narrow
//! interface, keeping both independent of the concrete container byte
//! format. The shipped backend is [`ZipArchiver`].

mod zip;

pub use self::zip::ZipArchiver;

use super::error::Result;
use super::payload::CompressionLevel;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// One file going into an archive.
#[derive(Debug, Clone)]
pub struct ArchiveInput {
    /// In-archive entry name.
    pub name: String,

    /// Where the file's bytes are read from.
    pub source: PathBuf,

    /// Uncompressed size in bytes.
    pub size: u64,
}

/// Everything a backend needs to construct one archive.
#[derive(Debug, Clone)]
pub struct ArchiveRequest {
    /// Path the archive is written to.
    pub destination: PathBuf,

    /// Ordered entries; in-archive order follows this list exactly.
    pub inputs: Vec<ArchiveInput>,

    /// Compression level for every entry.
    pub compression: CompressionLevel,

    /// Volume size in bytes at which the backend may split mid-build.
    ///
    /// None leaves the archive unconstrained as a single volume.
    pub split_threshold: Option<u64>,
}

/// One entry read back from an existing archive's directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// In-archive entry name.
    pub name: String,

    /// Uncompressed size in bytes.
    pub size: u64,

    /// Entry modification time at container-format granularity.
    pub modified: SystemTime,
}

/// Notification that a backend split an archive into an additional volume.
#[derive(Debug, Clone)]
pub struct SplitEvent {
    /// The archive that hit its volume boundary.
    pub archive: PathBuf,

    /// The newly opened volume.
    pub new_volume: PathBuf,

    /// In-archive name of the entry that forced the boundary.
    pub trigger_file: String,
}

/// Receiver for [`SplitEvent`]s, invoked synchronously on whichever worker
/// triggers a split.
///
/// Implementations mutate orchestrator-wide sequencing state and must
/// serialize internally with their own lock, never the work queue's.
pub trait SplitHandler: Send + Sync {
    /// Called once per additional volume, before the build continues.
    fn on_split(&self, event: SplitEvent);
}

/// Narrow interface over the concrete archive container.
pub trait MediaArchiver: Send + Sync {
    /// Writes one archive with the requested entries, order preserved.
    ///
    /// A backend that enforces volume limits reports each additional volume
    /// through `split` before continuing.
    fn build(&self, request: &ArchiveRequest, split: Option<&dyn SplitHandler>) -> Result<()>;

    /// Enumerates an existing archive's directory in stored order.
    fn enumerate(&self, path: &Path) -> Result<Vec<ArchiveEntry>>;
}

/// In-archive entry name for a payload id with an optional rename suffix.
///
/// Merge modules carry a suffix so identifiers stay unique after the module
/// is merged into a consuming package.
pub fn in_archive_name(id: &str, suffix: Option<&str>) -> String {
    match suffix {
        Some(suffix) => format!("{id}.{suffix}"),
        None => id.to_string(),
    }
}
