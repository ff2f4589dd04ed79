//! ZIP container backend.
//!
//! Entry timestamps are stored in DOS format, which carries two-second
//! granularity and no zone; both writing and enumeration here use UTC civil
//! time, so cache comparisons stay consistent across runs and machines.

use super::{ArchiveEntry, ArchiveRequest, MediaArchiver, SplitHandler};
use crate::packager::error::{ErrorExt, Result};
use crate::packager::payload::CompressionLevel;
use chrono::{Datelike, TimeZone, Timelike, Utc};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::SystemTime;
use zip::read::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::{CompressionMethod, DateTime};

/// Entries at or beyond this size need ZIP64 extensions.
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// [`MediaArchiver`] implementation over the `zip` crate.
///
/// Always produces a single volume; the split handler is never invoked.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipArchiver;

impl ZipArchiver {
    /// Creates the backend.
    pub fn new() -> Self {
        Self
    }
}

impl MediaArchiver for ZipArchiver {
    fn build(&self, request: &ArchiveRequest, _split: Option<&dyn SplitHandler>) -> Result<()> {
        if let Some(parent) = request.destination.parent() {
            std::fs::create_dir_all(parent).fs_context("creating archive directory", parent)?;
        }

        let file = File::create(&request.destination)
            .fs_context("creating archive", &request.destination)?;
        let mut writer = ZipWriter::new(BufWriter::new(file));
        let (method, level) = zip_compression(request.compression);

        for input in &request.inputs {
            let metadata = std::fs::metadata(&input.source)
                .fs_context("reading payload metadata", &input.source)?;
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

            let options = SimpleFileOptions::default()
                .compression_method(method)
                .compression_level(level)
                .last_modified_time(dos_datetime(modified))
                .large_file(input.size >= ZIP64_THRESHOLD);

            writer.start_file(input.name.as_str(), options)?;
            let mut source =
                File::open(&input.source).fs_context("opening payload file", &input.source)?;
            std::io::copy(&mut source, &mut writer)
                .fs_context("archiving payload file", &input.source)?;
        }

        writer.finish()?;
        log::debug!(
            "wrote {} with {} entries",
            request.destination.display(),
            request.inputs.len()
        );
        Ok(())
    }

    fn enumerate(&self, path: &Path) -> Result<Vec<ArchiveEntry>> {
        let file = File::open(path).fs_context("opening archive", path)?;
        let mut archive = ZipArchive::new(BufReader::new(file))?;

        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let entry = archive.by_index(index)?;
            entries.push(ArchiveEntry {
                name: entry.name().to_string(),
                size: entry.size(),
                modified: entry
                    .last_modified()
                    .map(system_time)
                    .unwrap_or(SystemTime::UNIX_EPOCH),
            });
        }
        Ok(entries)
    }
}

/// Maps a unit compression level to a ZIP method and deflate level.
fn zip_compression(level: CompressionLevel) -> (CompressionMethod, Option<i64>) {
    match level {
        CompressionLevel::None => (CompressionMethod::Stored, None),
        CompressionLevel::Fast => (CompressionMethod::Deflated, Some(1)),
        CompressionLevel::Balanced => (CompressionMethod::Deflated, None),
        CompressionLevel::Max => (CompressionMethod::Deflated, Some(9)),
    }
}

/// Converts a modification time to a DOS timestamp in UTC civil time.
///
/// Years are clamped to the representable 1980..=2107 range; the stored
/// seconds lose their low bit when written.
fn dos_datetime(modified: SystemTime) -> DateTime {
    let utc: chrono::DateTime<Utc> = modified.into();
    let year = utc.year().clamp(1980, 2107) as u16;
    DateTime::from_date_and_time(
        year,
        utc.month() as u8,
        utc.day() as u8,
        utc.hour() as u8,
        utc.minute() as u8,
        utc.second().min(59) as u8,
    )
    .unwrap_or_default()
}

/// Reconstructs a [`SystemTime`] from a stored DOS timestamp, as UTC.
fn system_time(dos: DateTime) -> SystemTime {
    Utc.with_ymd_and_hms(
        dos.year() as i32,
        dos.month() as u32,
        dos.day() as u32,
        dos.hour() as u32,
        dos.minute() as u32,
        dos.second() as u32,
    )
    .single()
    .map(SystemTime::from)
    .unwrap_or(SystemTime::UNIX_EPOCH)
}
