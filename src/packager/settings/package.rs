//! Package metadata and compression defaults.

use crate::packager::payload::{CompressionLevel, PackageKind};
use serde::{Deserialize, Serialize};

/// Package-level metadata and defaults.
///
/// Typically deserialized from the `[package]` section of a pack manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSettings {
    /// Product name displayed in logs and reports.
    pub product_name: String,

    /// Version string of the package being assembled.
    pub version: String,

    /// Kind of package: normal, admin-layout, merge-module, or patch.
    #[serde(default)]
    pub kind: PackageKind,

    /// Whether files with an unspecified compression tri-state are archived.
    ///
    /// Default: true
    #[serde(default = "default_compressed")]
    pub compressed: bool,

    /// Compression level applied to units that do not author their own.
    #[serde(default)]
    pub compression: CompressionLevel,

    /// Suffix appended to every in-archive entry name.
    ///
    /// Merge modules use this to keep identifiers from colliding when the
    /// module is merged into a consuming package.
    ///
    /// Default: None
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_suffix: Option<String>,
}

impl Default for PackageSettings {
    fn default() -> Self {
        Self {
            product_name: String::new(),
            version: String::new(),
            kind: PackageKind::default(),
            compressed: true,
            compression: CompressionLevel::default(),
            module_suffix: None,
        }
    }
}

fn default_compressed() -> bool {
    true
}
