//! Scan command: bootstrap a manifest from a payload directory.

use crate::cli::ScanArgs;
use crate::error::{CliError, Result};
use crate::manifest::{FileEntry, Manifest};
use crate::packager::{Compression, PackageSettings};
use std::path::Path;

/// Walks a directory and writes a starter manifest listing every regular
/// file as a payload entry, grouped into components by parent directory.
pub async fn run(args: &ScanArgs) -> Result<i32> {
    let mut entries = Vec::new();
    for entry in walkdir::WalkDir::new(&args.dir)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.map_err(anyhow::Error::new)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let metadata = entry.metadata().map_err(anyhow::Error::new)?;
        let relative = entry
            .path()
            .strip_prefix(&args.dir)
            .unwrap_or(entry.path());

        entries.push(FileEntry {
            id: identifier_for(relative),
            source: entry.path().to_path_buf(),
            size: Some(metadata.len()),
            component: component_for(relative),
            compression: Compression::Unspecified,
            disk_id: None,
            hash: None,
        });
    }

    if entries.is_empty() {
        return Err(CliError::InvalidArguments {
            reason: format!("no payload files found under {}", args.dir.display()),
        }
        .into());
    }

    let manifest = Manifest {
        package: PackageSettings {
            product_name: product_name_for(&args.dir),
            version: "0.1.0".to_string(),
            ..Default::default()
        },
        media: Vec::new(),
        template: None,
        files: entries,
    };

    let toml = toml::to_string_pretty(&manifest)?;
    tokio::fs::write(&args.output, toml).await?;
    println!(
        "Wrote {} with {} file(s)",
        args.output.display(),
        manifest.files.len()
    );
    Ok(0)
}

/// Turns a relative payload path into a stable identifier.
fn identifier_for(path: &Path) -> String {
    let mut id: String = path
        .to_string_lossy()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if id.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        id.insert(0, '_');
    }
    id
}

/// Component reference for a payload path: its parent directory.
fn component_for(path: &Path) -> Option<String> {
    path.parent()
        .and_then(|p| p.file_name())
        .map(|name| name.to_string_lossy().into_owned())
}

fn product_name_for(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "package".to_string())
}
