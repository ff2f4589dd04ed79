//! Pack manifest loading and payload resolution.
//!
//! A pack manifest is one TOML document declaring the package settings, the
//! media authoring (explicit `[[media]]` units or one `[template]`), and the
//! payload file list as `[[file]]` entries. File sizes may be declared
//! inline; entries without a size are measured from disk when the manifest
//! is resolved.

use crate::bail;
use crate::error::{CliError, Result};
use crate::packager::{
    Compression, ExplicitUnit, MediaAuthoring, MediaTemplate, PackageSettings, PayloadFile,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Complete pack manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Package metadata (`[package]` section)
    pub package: PackageSettings,

    /// Explicitly authored media units (`[[media]]` sections)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<ExplicitUnit>,

    /// Automatic-mode sizing template (`[template]` section)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<MediaTemplate>,

    /// Payload files (`[[file]]` sections)
    #[serde(default, rename = "file")]
    pub files: Vec<FileEntry>,
}

/// One payload file as authored in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    /// Stable identifier; doubles as the in-archive entry name
    pub id: String,

    /// Source path, absolute or relative to the manifest's directory
    pub source: PathBuf,

    /// Uncompressed size in bytes; measured from disk when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Component reference used to cluster co-installed files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,

    /// Per-file compression tri-state
    #[serde(default)]
    pub compression: Compression,

    /// Declared target media unit for explicitly authored layouts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_id: Option<u32>,

    /// Optional content hash carried through to the build report
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

/// Reads and parses a manifest (single read + parse).
pub async fn load(path: &Path) -> Result<Manifest> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CliError::Manifest {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    let manifest: Manifest = toml::from_str(&text)?;
    Ok(manifest)
}

impl Manifest {
    /// Media authoring declared by this manifest.
    pub fn authoring(&self) -> MediaAuthoring {
        MediaAuthoring {
            units: self.media.clone(),
            template: self.template.clone(),
        }
    }

    /// Resolves the file entries into payload descriptors.
    ///
    /// Relative sources are anchored at `base_dir` (the manifest's
    /// directory); sizes not declared inline are measured from disk.
    pub async fn payload_files(&self, base_dir: &Path) -> Result<Vec<PayloadFile>> {
        let mut seen = HashSet::new();
        let mut files = Vec::with_capacity(self.files.len());
        for entry in &self.files {
            if !seen.insert(entry.id.as_str()) {
                bail!("payload file id '{}' is declared more than once", entry.id);
            }
            let source = if entry.source.is_absolute() {
                entry.source.clone()
            } else {
                base_dir.join(&entry.source)
            };
            let size = match entry.size {
                Some(size) => size,
                None => tokio::fs::metadata(&source)
                    .await
                    .map_err(|e| CliError::Manifest {
                        path: source.clone(),
                        reason: format!("cannot measure payload file: {e}"),
                    })?
                    .len(),
            };
            files.push(PayloadFile {
                id: entry.id.clone(),
                source,
                size,
                component: entry.component.clone().unwrap_or_default(),
                compression: entry.compression,
                disk_id: entry.disk_id,
                hash: entry.hash.clone(),
            });
        }
        Ok(files)
    }
}
