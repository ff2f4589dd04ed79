//! Payload and media-unit data model.
//!
//! A payload file is one installable file tracked by the package build. A
//! media unit is a logical group of payload files that becomes one compressed
//! archive (or, for uncompressed files, one layout folder).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Highest disk id a media unit may carry.
///
/// Once the partitioner reaches this id, the final unit absorbs every
/// remaining file regardless of size.
pub const MAX_DISK_ID: u32 = 999;

/// Leading marker on an archive name that selects embedded-stream storage
/// instead of an external archive file.
pub const EMBEDDED_MARKER: char = '#';

/// Per-file compression tri-state.
///
/// `Unspecified` defers to the package-level default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// Always stored inside a media unit's archive
    Compressed,
    /// Always laid out as a loose file
    Uncompressed,
    /// Follow the package default
    #[default]
    Unspecified,
}

/// Compression level applied to a whole media unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// Store entries without compression
    None,
    /// Cheapest compression, fastest builds
    Fast,
    /// Backend default ratio/speed trade-off
    #[default]
    Balanced,
    /// Best ratio, slowest builds
    Max,
}

/// What kind of package is being assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackageKind {
    /// Regular installable package
    #[default]
    Normal,
    /// Administrative layout: files stay uncompressed unless explicitly
    /// flagged compressed
    AdminLayout,
    /// Merge module: every file lands in one implicit embedded unit
    MergeModule,
    /// Patch package
    Patch,
}

/// One installable file tracked by the package build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadFile {
    /// Stable identifier; doubles as the in-archive entry name
    pub id: String,

    /// Where the file's bytes live on disk
    pub source: PathBuf,

    /// Uncompressed size in bytes
    pub size: u64,

    /// Component reference used to cluster co-installed files
    pub component: String,

    /// Per-file compression tri-state
    #[serde(default)]
    pub compression: Compression,

    /// Declared target media unit, for explicitly authored layouts
    #[serde(default)]
    pub disk_id: Option<u32>,

    /// Optional content hash carried through to the build report
    #[serde(default)]
    pub hash: Option<String>,
}

/// A logical grouping of payload files that becomes one archive.
#[derive(Debug, Clone)]
pub struct MediaUnit {
    /// Disk id, 1..=[`MAX_DISK_ID`]
    pub disk_id: u32,

    /// Archive name as authored; a leading [`EMBEDDED_MARKER`] selects
    /// embedded-stream storage
    pub archive_name: String,

    /// Compression level for the whole unit
    pub compression: CompressionLevel,

    /// Sequence number of the unit's last file, computed across the whole
    /// package without gaps
    pub last_sequence: u32,

    /// Directory the finished archive is delivered to; resolved by the
    /// orchestrator
    pub layout_dir: Option<PathBuf>,
}

impl MediaUnit {
    /// Creates a unit with no files assigned yet.
    pub fn new(disk_id: u32, archive_name: impl Into<String>, compression: CompressionLevel) -> Self {
        Self {
            disk_id,
            archive_name: archive_name.into(),
            compression,
            last_sequence: 0,
            layout_dir: None,
        }
    }

    /// True when the archive is stored as an embedded stream rather than an
    /// external file.
    pub fn is_embedded(&self) -> bool {
        self.archive_name.starts_with(EMBEDDED_MARKER)
    }

    /// Archive file name with the embedded-storage marker stripped.
    pub fn file_name(&self) -> &str {
        self.archive_name
            .strip_prefix(EMBEDDED_MARKER)
            .unwrap_or(&self.archive_name)
    }
}
