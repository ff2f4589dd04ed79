//! Payload partitioner.
//!
//! Assigns every payload file to exactly one media unit or to the
//! uncompressed set, following explicit authoring when units are declared and
//! an automatic size-bounded packing otherwise.

use super::diagnostics::Diagnostics;
use super::error::{Error, Result};
use super::payload::{
    Compression, MAX_DISK_ID, MediaUnit, PackageKind, PayloadFile,
};
use super::settings::{ExplicitUnit, MediaAuthoring, MediaTemplate, PackagerSettings};
use std::collections::{BTreeMap, HashMap};

/// Archive name of the single implicit unit a merge module packs into.
pub const MODULE_ARCHIVE_NAME: &str = "#module.pak";

/// Result of partitioning: declared units, their file assignments, and the
/// files laid out uncompressed.
#[derive(Debug, Default)]
pub struct MediaLayout {
    units: Vec<MediaUnit>,
    files: HashMap<u32, Vec<PayloadFile>>,
    uncompressed: Vec<PayloadFile>,
}

impl MediaLayout {
    /// Units in declaration/creation order.
    pub fn units(&self) -> &[MediaUnit] {
        &self.units
    }

    /// Mutable access for the orchestrator to resolve layout directories.
    pub(crate) fn units_mut(&mut self) -> &mut [MediaUnit] {
        &mut self.units
    }

    /// Files assigned to a unit, in assignment order.
    pub fn unit_files(&self, disk_id: u32) -> &[PayloadFile] {
        self.files.get(&disk_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Files laid out uncompressed.
    pub fn uncompressed(&self) -> &[PayloadFile] {
        &self.uncompressed
    }

    /// Total number of files the layout accounts for.
    pub fn file_count(&self) -> usize {
        self.files.values().map(Vec::len).sum::<usize>() + self.uncompressed.len()
    }

    /// Unit-to-last-sequence mapping for downstream file sequencing.
    pub fn last_sequences(&self) -> BTreeMap<u32, u32> {
        self.units
            .iter()
            .map(|u| (u.disk_id, u.last_sequence))
            .collect()
    }

    fn add_unit(&mut self, unit: MediaUnit) {
        self.files.entry(unit.disk_id).or_default();
        self.units.push(unit);
    }

    fn push_file(&mut self, disk_id: u32, file: PayloadFile) {
        self.files.entry(disk_id).or_default().push(file);
    }
}

/// Partitions payload files across media units.
///
/// Files are stable-sorted by component reference first, clustering
/// co-installed files; in-archive order follows that sort exactly.
///
/// Fatal conditions are the explicit-units-plus-template authoring conflict
/// (more than one unit declared alongside a template); everything else is
/// reported to `diagnostics` and partitioning continues best-effort so
/// sibling problems surface in the same pass.
pub fn partition(
    files: &[PayloadFile],
    authoring: &MediaAuthoring,
    settings: &PackagerSettings,
    diagnostics: &Diagnostics,
) -> Result<MediaLayout> {
    if authoring.template.is_some() && authoring.units.len() > 1 {
        return Err(Error::MediaAuthoringConflict);
    }

    let mut ordered = files.to_vec();
    ordered.sort_by(|a, b| a.component.cmp(&b.component));

    let mut layout = MediaLayout::default();
    match settings.package().kind {
        PackageKind::MergeModule => partition_module(ordered, settings, &mut layout),
        _ if !authoring.units.is_empty() => {
            partition_explicit(ordered, &authoring.units, settings, diagnostics, &mut layout);
        }
        _ => partition_automatic(
            ordered,
            authoring.template.as_ref(),
            settings,
            &mut layout,
        ),
    }

    assign_sequences(&mut layout);
    log::info!(
        "partitioned {} file(s) into {} media unit(s), {} uncompressed",
        files.len(),
        layout.units.len(),
        layout.uncompressed.len()
    );
    Ok(layout)
}

/// Whether a file belongs in a unit's archive, per the package kind and the
/// per-file/package compression flags.
fn is_archived(file: &PayloadFile, settings: &PackagerSettings) -> bool {
    match settings.package().kind {
        // Admin layouts stay loose unless a file insists on compression.
        PackageKind::AdminLayout => file.compression == Compression::Compressed,
        _ => match file.compression {
            Compression::Compressed => true,
            Compression::Uncompressed => false,
            Compression::Unspecified => settings.package().compressed,
        },
    }
}

/// Merge modules pack everything into one implicit embedded unit.
fn partition_module(
    ordered: Vec<PayloadFile>,
    settings: &PackagerSettings,
    layout: &mut MediaLayout,
) {
    layout.add_unit(MediaUnit::new(
        1,
        MODULE_ARCHIVE_NAME,
        settings.package().compression,
    ));
    for file in ordered {
        layout.push_file(1, file);
    }
}

/// Explicit mode: files route to their declared disk ids.
fn partition_explicit(
    ordered: Vec<PayloadFile>,
    units: &[ExplicitUnit],
    settings: &PackagerSettings,
    diagnostics: &Diagnostics,
    layout: &mut MediaLayout,
) {
    let mut names: HashMap<String, u32> = HashMap::new();

    for authored in units {
        if layout.files.contains_key(&authored.disk_id) {
            diagnostics.error(format!(
                "media unit {} is declared more than once; the first declaration wins",
                authored.disk_id
            ));
            continue;
        }
        let key = authored.archive_name.to_lowercase();
        match names.get(&key) {
            Some(first) => diagnostics.error(format!(
                "archive name '{}' on media unit {} is already used by unit {}; \
                 the first declaration wins",
                authored.archive_name, authored.disk_id, first
            )),
            None => {
                names.insert(key, authored.disk_id);
            }
        }
        layout.add_unit(MediaUnit::new(
            authored.disk_id,
            authored.archive_name.clone(),
            authored.compression.unwrap_or(settings.package().compression),
        ));
    }

    for file in ordered {
        if !is_archived(&file, settings) {
            layout.uncompressed.push(file);
            continue;
        }
        match file.disk_id {
            Some(id) if layout.files.contains_key(&id) => layout.push_file(id, file),
            Some(id) => diagnostics.error(format!(
                "payload file '{}' references media unit {}, which is not declared; \
                 the file is skipped",
                file.id, id
            )),
            None => diagnostics.error(format!(
                "payload file '{}' declares no media unit in an explicitly authored \
                 layout; the file is skipped",
                file.id
            )),
        }
    }
}

/// Automatic mode: size-bounded packing in component order.
///
/// A running accumulator tracks the current unit's uncompressed size. A file
/// that pushes the accumulator past the threshold closes the unit and opens
/// the next one, until the disk-id cap; after that the final unit absorbs
/// every remaining file unconditionally.
fn partition_automatic(
    ordered: Vec<PayloadFile>,
    template: Option<&MediaTemplate>,
    settings: &PackagerSettings,
    layout: &mut MediaLayout,
) {
    let threshold = settings.max_media_bytes(template);
    let naming = template.cloned().unwrap_or_default();
    let compression = settings.package().compression;

    let mut current: Option<u32> = None;
    let mut accumulated: u64 = 0;

    for file in ordered {
        if !is_archived(&file, settings) {
            layout.uncompressed.push(file);
            continue;
        }

        let disk_id = match current {
            None => {
                layout.add_unit(MediaUnit::new(1, naming.archive_name(1), compression));
                accumulated = file.size;
                current = Some(1);
                1
            }
            Some(disk_id) => {
                accumulated = accumulated.saturating_add(file.size);
                if accumulated > threshold && disk_id < MAX_DISK_ID {
                    let next = disk_id + 1;
                    layout.add_unit(MediaUnit::new(next, naming.archive_name(next), compression));
                    accumulated = file.size;
                    current = Some(next);
                    next
                } else {
                    disk_id
                }
            }
        };
        layout.push_file(disk_id, file);
    }

    // Uncompressed files still need a unit to sequence against.
    if layout.units.is_empty() && !layout.uncompressed.is_empty() {
        layout.add_unit(MediaUnit::new(1, naming.archive_name(1), compression));
    }
}

/// Assigns package-wide sequence numbers, without gaps, in assignment order.
///
/// Each unit's `last_sequence` is the sequence of its final file;
/// uncompressed files are sequenced after every archived file and are covered
/// by the final unit's last sequence.
fn assign_sequences(layout: &mut MediaLayout) {
    let mut next: u32 = 0;
    for unit in &mut layout.units {
        let count = layout
            .files
            .get(&unit.disk_id)
            .map(Vec::len)
            .unwrap_or(0) as u32;
        next += count;
        unit.last_sequence = next;
    }
    if let Some(last) = layout.units.last_mut() {
        last.last_sequence += layout.uncompressed.len() as u32;
    }
}
