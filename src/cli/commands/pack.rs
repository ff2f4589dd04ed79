//! Pack command: build media archives from a manifest.

use crate::cli::PackArgs;
use crate::error::Result;
use crate::manifest;
use crate::packager::{
    Diagnostics, EmbeddedStream, FileTransfer, PackageOutput, Packager, SettingsBuilder,
    utils::fs,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Runs one packaging pass from a manifest and applies the resulting
/// transfer instructions.
pub async fn run(args: &PackArgs) -> Result<i32> {
    let manifest = manifest::load(&args.manifest).await?;
    let base_dir = args
        .manifest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let files = manifest.payload_files(base_dir).await?;

    let mut builder = SettingsBuilder::new()
        .package_settings(manifest.package.clone())
        .out_dir(&args.out_dir)
        .overrides_from_env()?;
    if let Some(work_dir) = &args.work_dir {
        builder = builder.work_dir(work_dir);
    }
    if let Some(threads) = args.threads {
        builder = builder.threads(threads);
    }
    if !args.no_cache
        && let Some(cache_dir) = args.cache_dir.clone().or_else(default_cache_dir)
    {
        builder = builder.cache_dir(cache_dir);
    }
    let settings = builder.build()?;

    let packager = Packager::new(settings);
    let output = packager.package(&files, &manifest.authoring()).await?;

    for transfer in &output.transfers {
        if transfer.move_source {
            fs::move_file(&transfer.source, &transfer.destination).await?;
        } else {
            fs::copy_file(&transfer.source, &transfer.destination).await?;
        }
    }
    for stream in &output.embedded {
        log::info!(
            "embedded stream '{}' staged at {}",
            stream.name,
            stream.path.display()
        );
    }

    if let Some(report_path) = &args.report {
        write_report(report_path, &output, packager.diagnostics()).await?;
    }

    let warnings = packager.diagnostics().warning_count();
    println!(
        "Packed {} archive(s), {} embedded stream(s), {} file(s) uncompressed{}",
        output.transfers.len(),
        output.embedded.len(),
        output.uncompressed.len(),
        if warnings > 0 {
            format!(" ({warnings} warning(s))")
        } else {
            String::new()
        }
    );
    Ok(0)
}

/// Cache directory used when none is given on the command line.
fn default_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("mediapack"))
}

/// Machine-readable build report.
#[derive(Serialize)]
struct Report<'a> {
    transfers: &'a [FileTransfer],
    embedded: &'a [EmbeddedStream],
    last_sequences: &'a BTreeMap<u32, u32>,
    checksums: &'a BTreeMap<String, String>,
    uncompressed_files: usize,
    warnings: usize,
    errors: usize,
}

async fn write_report(
    path: &Path,
    output: &PackageOutput,
    diagnostics: &Diagnostics,
) -> Result<()> {
    let report = Report {
        transfers: &output.transfers,
        embedded: &output.embedded,
        last_sequences: &output.last_sequences,
        checksums: &output.checksums,
        uncompressed_files: output.uncompressed.len(),
        warnings: diagnostics.warning_count(),
        errors: diagnostics.error_count(),
    };
    let json = serde_json::to_string_pretty(&report)?;
    tokio::fs::write(path, json).await?;
    log::info!("wrote build report to {}", path.display());
    Ok(())
}
