//! Media authoring: explicit units and the automatic sizing template.

use crate::packager::payload::CompressionLevel;
use serde::{Deserialize, Serialize};

/// Default cap on a unit's accumulated uncompressed size, in megabytes.
pub const DEFAULT_MAX_MEDIA_MB: u64 = 200;

/// Default archive name template; `{0}` is replaced with the disk id.
pub const DEFAULT_NAME_TEMPLATE: &str = "media{0}.pak";

/// How media units are declared for a package.
///
/// Either zero-or-more explicit units, or at most one sizing template.
/// Declaring more than one explicit unit together with a template is a fatal
/// authoring conflict.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaAuthoring {
    /// Explicitly authored media units.
    #[serde(default)]
    pub units: Vec<ExplicitUnit>,

    /// Automatic-mode sizing template.
    #[serde(default)]
    pub template: Option<MediaTemplate>,
}

impl MediaAuthoring {
    /// Authoring for a fully automatic layout with template defaults.
    pub fn automatic() -> Self {
        Self::default()
    }
}

/// One explicitly authored media unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplicitUnit {
    /// Disk id files refer to.
    pub disk_id: u32,

    /// Archive name; a leading `#` selects embedded-stream storage.
    pub archive_name: String,

    /// Per-unit compression level override.
    ///
    /// Default: the package-level compression setting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression: Option<CompressionLevel>,
}

/// Sizing template for automatically partitioned media.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaTemplate {
    /// Archive name template with a `{0}` disk-id slot.
    ///
    /// Default: [`DEFAULT_NAME_TEMPLATE`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_template: Option<String>,

    /// Maximum accumulated uncompressed size per unit, in megabytes.
    ///
    /// Default: [`DEFAULT_MAX_MEDIA_MB`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_media_mb: Option<u64>,

    /// Archive size at which a single oversized file forces a volume split,
    /// in megabytes. Zero leaves archives unconstrained as single volumes.
    ///
    /// Default: 0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large_file_split_mb: Option<u64>,
}

impl MediaTemplate {
    /// Archive name for a given disk id, with the `{0}` slot substituted.
    pub fn archive_name(&self, disk_id: u32) -> String {
        self.name_template
            .as_deref()
            .unwrap_or(DEFAULT_NAME_TEMPLATE)
            .replace("{0}", &disk_id.to_string())
    }
}
