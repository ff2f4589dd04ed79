//! Cache resolver behavior: reuse decisions and all-or-nothing validity.

mod common;

use common::{shift_mtime, write_payload};
use mediapack::packager::archive::{
    ArchiveInput, ArchiveRequest, MediaArchiver, ZipArchiver, in_archive_name,
};
use mediapack::packager::{CacheDecision, CompressionLevel, PayloadFile, resolve};
use std::path::Path;
use tempfile::TempDir;

/// Builds an archive for the given payloads, the way the pool would.
fn build_archive(files: &[PayloadFile], destination: &Path, suffix: Option<&str>) {
    let request = ArchiveRequest {
        destination: destination.to_path_buf(),
        inputs: files
            .iter()
            .map(|f| ArchiveInput {
                name: in_archive_name(&f.id, suffix),
                source: f.source.clone(),
                size: f.size,
            })
            .collect(),
        compression: CompressionLevel::Balanced,
        split_threshold: None,
    };
    ZipArchiver::new()
        .build(&request, None)
        .expect("building fixture archive");
}

fn fixture(tmp: &TempDir) -> (Vec<PayloadFile>, std::path::PathBuf, std::path::PathBuf) {
    let payload_dir = tmp.path().join("payload");
    std::fs::create_dir_all(&payload_dir).unwrap();
    let files = vec![
        write_payload(&payload_dir, "x.bin", b"payload x contents"),
        write_payload(&payload_dir, "y.bin", b"payload y contents, longer"),
    ];
    let cache_dir = tmp.path().join("cache");
    std::fs::create_dir_all(&cache_dir).unwrap();
    let out_dir = tmp.path().join("out");
    (files, cache_dir, out_dir)
}

#[test]
fn no_cache_dir_always_builds_and_moves() {
    let tmp = TempDir::new().unwrap();
    let (files, _, out_dir) = fixture(&tmp);
    let suggested = tmp.path().join("work/data.pak");

    let resolved = resolve(
        &files,
        None,
        &suggested,
        &out_dir.join("data.pak"),
        None,
        &ZipArchiver::new(),
    )
    .unwrap();

    assert_eq!(resolved.decision, CacheDecision::BuildAndMove);
    assert_eq!(resolved.build_path, suggested);
}

#[test]
fn missing_cached_archive_builds_into_the_cache() {
    let tmp = TempDir::new().unwrap();
    let (files, cache_dir, out_dir) = fixture(&tmp);

    let resolved = resolve(
        &files,
        None,
        &tmp.path().join("work/data.pak"),
        &out_dir.join("data.pak"),
        Some(cache_dir.as_path()),
        &ZipArchiver::new(),
    )
    .unwrap();

    assert_eq!(resolved.decision, CacheDecision::BuildAndCopy);
    assert_eq!(resolved.build_path, cache_dir.join("data.pak"));
}

#[test]
fn matching_cached_archive_is_reused() {
    let tmp = TempDir::new().unwrap();
    let (files, cache_dir, out_dir) = fixture(&tmp);
    build_archive(&files, &cache_dir.join("data.pak"), None);

    let resolved = resolve(
        &files,
        None,
        &tmp.path().join("work/data.pak"),
        &out_dir.join("data.pak"),
        Some(cache_dir.as_path()),
        &ZipArchiver::new(),
    )
    .unwrap();

    assert_eq!(resolved.decision, CacheDecision::Copy);
    assert_eq!(resolved.build_path, cache_dir.join("data.pak"));
}

#[test]
fn shifted_source_timestamp_invalidates_the_whole_unit() {
    let tmp = TempDir::new().unwrap();
    let (files, cache_dir, out_dir) = fixture(&tmp);
    build_archive(&files, &cache_dir.join("data.pak"), None);

    // Well past the container's two-second timestamp granularity.
    shift_mtime(&files[1].source, 4);

    let resolved = resolve(
        &files,
        None,
        &tmp.path().join("work/data.pak"),
        &out_dir.join("data.pak"),
        Some(cache_dir.as_path()),
        &ZipArchiver::new(),
    )
    .unwrap();

    assert_eq!(resolved.decision, CacheDecision::BuildAndCopy);
}

#[test]
fn changed_size_invalidates() {
    let tmp = TempDir::new().unwrap();
    let (mut files, cache_dir, out_dir) = fixture(&tmp);
    build_archive(&files, &cache_dir.join("data.pak"), None);

    files[0].size += 1;

    let resolved = resolve(
        &files,
        None,
        &tmp.path().join("work/data.pak"),
        &out_dir.join("data.pak"),
        Some(cache_dir.as_path()),
        &ZipArchiver::new(),
    )
    .unwrap();

    assert_eq!(resolved.decision, CacheDecision::BuildAndCopy);
}

#[test]
fn reordered_files_invalidate() {
    let tmp = TempDir::new().unwrap();
    let (mut files, cache_dir, out_dir) = fixture(&tmp);
    build_archive(&files, &cache_dir.join("data.pak"), None);

    files.reverse();

    let resolved = resolve(
        &files,
        None,
        &tmp.path().join("work/data.pak"),
        &out_dir.join("data.pak"),
        Some(cache_dir.as_path()),
        &ZipArchiver::new(),
    )
    .unwrap();

    assert_eq!(resolved.decision, CacheDecision::BuildAndCopy);
}

#[test]
fn different_entry_count_invalidates() {
    let tmp = TempDir::new().unwrap();
    let (files, cache_dir, out_dir) = fixture(&tmp);
    build_archive(&files, &cache_dir.join("data.pak"), None);

    let fewer = &files[..1];
    let resolved = resolve(
        fewer,
        None,
        &tmp.path().join("work/data.pak"),
        &out_dir.join("data.pak"),
        Some(cache_dir.as_path()),
        &ZipArchiver::new(),
    )
    .unwrap();

    assert_eq!(resolved.decision, CacheDecision::BuildAndCopy);
}

#[test]
fn rename_suffix_participates_in_the_comparison() {
    let tmp = TempDir::new().unwrap();
    let (files, cache_dir, out_dir) = fixture(&tmp);
    build_archive(&files, &cache_dir.join("data.pak"), Some("m01"));

    let with_suffix = resolve(
        &files,
        Some("m01"),
        &tmp.path().join("work/data.pak"),
        &out_dir.join("data.pak"),
        Some(cache_dir.as_path()),
        &ZipArchiver::new(),
    )
    .unwrap();
    assert_eq!(with_suffix.decision, CacheDecision::Copy);

    let without = resolve(
        &files,
        None,
        &tmp.path().join("work/data.pak"),
        &out_dir.join("data.pak"),
        Some(cache_dir.as_path()),
        &ZipArchiver::new(),
    )
    .unwrap();
    assert_eq!(without.decision, CacheDecision::BuildAndCopy);
}

#[test]
fn unreadable_cached_archive_is_rebuilt() {
    let tmp = TempDir::new().unwrap();
    let (files, cache_dir, out_dir) = fixture(&tmp);
    std::fs::write(cache_dir.join("data.pak"), b"not an archive").unwrap();

    let resolved = resolve(
        &files,
        None,
        &tmp.path().join("work/data.pak"),
        &out_dir.join("data.pak"),
        Some(cache_dir.as_path()),
        &ZipArchiver::new(),
    )
    .unwrap();

    assert_eq!(resolved.decision, CacheDecision::BuildAndCopy);
}
