//! Packaging orchestration and coordination.
//!
//! This module provides the [`Packager`] orchestrator that sequences the
//! packing phases: partition payload files into media units, resolve each
//! unit against the archive cache, build what must be built on the worker
//! pool, and emit transfer/embed instructions for the results.

use super::archive::{MediaArchiver, SplitEvent, SplitHandler, ZipArchiver};
use super::cache::{self, CacheDecision, ResolvedArchive};
use super::checksum::archive_sha256;
use super::diagnostics::Diagnostics;
use super::error::{ErrorExt, Result};
use super::partition::{MediaLayout, partition};
use super::payload::{MediaUnit, PackageKind, PayloadFile};
use super::pool::{ArchiveBuilder, BuildWorkItem};
use super::settings::{MediaAuthoring, PackagerSettings};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

/// Instruction to deliver a finished archive to its final location.
#[derive(Debug, Clone, Serialize)]
pub struct FileTransfer {
    /// Where the archive currently is.
    pub source: PathBuf,

    /// Where it belongs.
    pub destination: PathBuf,

    /// True when the source is scratch output and can be moved; false when
    /// it must be copied (cache entries stay in the cache).
    pub move_source: bool,
}

/// Registration of an archive stored as an embedded stream.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddedStream {
    /// Stream name, marker stripped.
    pub name: String,

    /// Where the stream's bytes were staged.
    pub path: PathBuf,
}

/// Everything one packaging pass produces.
#[derive(Debug, Default, Serialize)]
pub struct PackageOutput {
    /// Delivery instructions for externally stored units.
    pub transfers: Vec<FileTransfer>,

    /// Registrations for units stored as embedded streams.
    pub embedded: Vec<EmbeddedStream>,

    /// Disk id to last-sequence mapping for downstream file sequencing.
    pub last_sequences: BTreeMap<u32, u32>,

    /// SHA-256 checksums of produced archives, keyed by archive file name.
    pub checksums: BTreeMap<String, String>,

    /// Files laid out uncompressed, for downstream layout handling.
    pub uncompressed: Vec<PayloadFile>,
}

/// Records volume-split notifications from backend workers.
///
/// Backends invoke [`SplitHandler::on_split`] synchronously on whichever
/// worker hits a volume boundary; the ledger serializes those calls with its
/// own lock, never the build queue's.
#[derive(Debug, Default)]
struct SplitLedger {
    events: Mutex<Vec<SplitEvent>>,
}

impl SplitLedger {
    fn take(&self) -> Vec<SplitEvent> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SplitEvent>> {
        match self.events.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl SplitHandler for SplitLedger {
    fn on_split(&self, event: SplitEvent) {
        log::info!(
            "archive {} split at '{}' into volume {}",
            event.archive.display(),
            event.trigger_file,
            event.new_volume.display()
        );
        self.lock().push(event);
    }
}

/// Main packaging orchestrator.
///
/// Sequences partitioning, cache resolution, concurrent archive building,
/// and result bookkeeping for one package.
///
/// # Examples
///
/// ```no_run
/// use mediapack::packager::{MediaAuthoring, Packager, PackageSettings, SettingsBuilder};
///
/// # async fn example(files: Vec<mediapack::packager::PayloadFile>)
/// #     -> mediapack::packager::Result<()> {
/// let settings = SettingsBuilder::new()
///     .out_dir("target/media")
///     .package_settings(PackageSettings {
///         product_name: "MyApp".into(),
///         version: "1.0.0".into(),
///         ..Default::default()
///     })
///     .build()?;
///
/// let packager = Packager::new(settings);
/// let output = packager.package(&files, &MediaAuthoring::automatic()).await?;
/// println!("{} archive(s) to deliver", output.transfers.len());
/// # Ok(())
/// # }
/// ```
pub struct Packager {
    settings: PackagerSettings,
    archiver: Arc<dyn MediaArchiver>,
    diagnostics: Diagnostics,
}

impl Packager {
    /// Creates a packager with the shipped ZIP backend.
    pub fn new(settings: PackagerSettings) -> Self {
        Self::with_archiver(settings, Arc::new(ZipArchiver::new()))
    }

    /// Creates a packager over a custom archive backend.
    pub fn with_archiver(settings: PackagerSettings, archiver: Arc<dyn MediaArchiver>) -> Self {
        Self {
            settings,
            archiver,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Returns the diagnostic sink shared with all phases.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Returns the packager settings.
    pub fn settings(&self) -> &PackagerSettings {
        &self.settings
    }

    /// Runs one packaging pass.
    ///
    /// The accumulated-error state of the diagnostic sink is checked after
    /// partitioning and again after the concurrent build phase; a recorded
    /// error short-circuits the remaining phases with
    /// [`Error::ErrorsReported`](super::Error::ErrorsReported).
    pub async fn package(
        &self,
        files: &[PayloadFile],
        authoring: &MediaAuthoring,
    ) -> Result<PackageOutput> {
        let package = self.settings.package();
        log::info!(
            "packaging {} {} ({} payload file(s))",
            package.product_name,
            package.version,
            files.len()
        );

        let mut layout = partition(files, authoring, &self.settings, &self.diagnostics)?;
        self.diagnostics.check()?;

        self.prepare_directories().await?;
        self.resolve_layout_dirs(&mut layout);

        let suffix = match package.kind {
            PackageKind::MergeModule => package.module_suffix.clone(),
            _ => None,
        };
        let large_file_threshold = self
            .settings
            .large_file_split_bytes(authoring.template.as_ref());

        let builder = ArchiveBuilder::new(
            self.settings.threads(),
            Arc::clone(&self.archiver),
            self.diagnostics.clone(),
        );

        let mut resolved_units: Vec<(MediaUnit, ResolvedArchive)> = Vec::new();
        for unit in layout.units().to_vec() {
            let unit_files = layout.unit_files(unit.disk_id);
            if unit_files.is_empty() {
                self.diagnostics.warn(format!(
                    "media unit {} ('{}') contains no files; no archive is produced",
                    unit.disk_id,
                    unit.file_name()
                ));
                continue;
            }

            let resolved = self.resolve_unit(&unit, unit_files, suffix.as_deref())?;
            match resolved.decision {
                CacheDecision::Copy => {
                    touch(&resolved.build_path)
                        .fs_context("touching reused archive", &resolved.build_path)?;
                }
                CacheDecision::BuildAndMove | CacheDecision::BuildAndCopy => {
                    builder.enqueue(BuildWorkItem {
                        files: unit_files.to_vec(),
                        destination: resolved.build_path.clone(),
                        compression: unit.compression,
                        rename_suffix: suffix.clone(),
                        large_file_threshold,
                    });
                }
            }
            resolved_units.push((unit, resolved));
        }

        let ledger = Arc::new(SplitLedger::default());
        builder
            .run_all(Some(Arc::clone(&ledger) as Arc<dyn SplitHandler>))
            .await;
        self.diagnostics.check()?;

        let mut output = PackageOutput {
            last_sequences: layout.last_sequences(),
            uncompressed: layout.uncompressed().to_vec(),
            ..Default::default()
        };

        for (unit, resolved) in &resolved_units {
            let checksum = archive_sha256(&resolved.build_path).await?;
            output
                .checksums
                .insert(unit.file_name().to_string(), checksum);

            if unit.is_embedded() {
                output.embedded.push(EmbeddedStream {
                    name: unit.file_name().to_string(),
                    path: resolved.build_path.clone(),
                });
            } else {
                output.transfers.push(FileTransfer {
                    source: resolved.build_path.clone(),
                    destination: resolved.final_path.clone(),
                    move_source: resolved.decision == CacheDecision::BuildAndMove,
                });
            }
        }

        // The shipped backend builds single volumes, so the ledger is empty
        // unless a container backend with volume limits is plugged in. Each
        // recorded volume becomes a follow-up delivery next to its archive.
        for event in ledger.take() {
            let destination = resolved_units
                .iter()
                .find(|(_, r)| r.build_path == event.archive)
                .map(|(_, r)| r.final_path.clone());
            if let (Some(final_path), Some(volume_name)) =
                (destination, event.new_volume.file_name())
            {
                let destination = final_path
                    .parent()
                    .unwrap_or(self.settings.out_dir())
                    .join(volume_name);
                output.transfers.push(FileTransfer {
                    source: event.new_volume.clone(),
                    destination,
                    move_source: true,
                });
            }
        }

        log::info!(
            "packaging complete: {} transfer(s), {} embedded stream(s), {} warning(s)",
            output.transfers.len(),
            output.embedded.len(),
            self.diagnostics.warning_count()
        );
        Ok(output)
    }

    /// Creates the scratch, output, and cache directories.
    async fn prepare_directories(&self) -> Result<()> {
        for dir in [self.settings.work_dir(), self.settings.out_dir()] {
            tokio::fs::create_dir_all(dir)
                .await
                .fs_context("creating packaging directory", dir)?;
        }
        if let Some(cache_dir) = self.settings.cache_dir() {
            tokio::fs::create_dir_all(cache_dir)
                .await
                .fs_context("creating archive cache directory", cache_dir)?;
        }
        Ok(())
    }

    /// Resolves where each unit's archive is delivered: embedded streams are
    /// staged under the scratch directory, external archives go to the
    /// output directory.
    fn resolve_layout_dirs(&self, layout: &mut MediaLayout) {
        let stream_dir = self.settings.work_dir().join("streams");
        let out_dir = self.settings.out_dir().to_path_buf();
        for unit in layout.units_mut() {
            unit.layout_dir = Some(if unit.is_embedded() {
                stream_dir.clone()
            } else {
                out_dir.clone()
            });
        }
    }

    /// Cache resolution for one unit.
    fn resolve_unit(
        &self,
        unit: &MediaUnit,
        unit_files: &[PayloadFile],
        suffix: Option<&str>,
    ) -> Result<ResolvedArchive> {
        let final_dir = unit
            .layout_dir
            .clone()
            .unwrap_or_else(|| self.settings.out_dir().to_path_buf());
        let final_path = final_dir.join(unit.file_name());
        let suggested = self.settings.work_dir().join(unit.file_name());
        cache::resolve(
            unit_files,
            suffix,
            &suggested,
            &final_path,
            self.settings.cache_dir(),
            self.archiver.as_ref(),
        )
    }
}

/// Refreshes an archive's modification time so later runs do not mistake a
/// reused cache entry for stale.
fn touch(path: &Path) -> std::io::Result<()> {
    let file = std::fs::OpenOptions::new().append(true).open(path)?;
    file.set_modified(SystemTime::now())
}
