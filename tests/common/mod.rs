//! Shared fixtures for integration tests.
#![allow(dead_code)] // Each test binary uses a different subset of helpers

use mediapack::packager::{
    Compression, PackageSettings, PackagerSettings, PayloadFile, SettingsBuilder,
};
use std::path::{Path, PathBuf};

pub const MB: u64 = 1024 * 1024;

/// Payload descriptor with a synthetic source path, for partitioning tests
/// that never touch the disk.
pub fn payload(id: &str, component: &str, size: u64) -> PayloadFile {
    PayloadFile {
        id: id.to_string(),
        source: PathBuf::from(format!("/payload/{id}")),
        size,
        component: component.to_string(),
        compression: Compression::Unspecified,
        disk_id: None,
        hash: None,
    }
}

/// Writes a real payload file and returns its descriptor.
pub fn write_payload(dir: &Path, name: &str, contents: &[u8]) -> PayloadFile {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("writing payload fixture");
    PayloadFile {
        id: name.replace('.', "_"),
        source: path,
        size: contents.len() as u64,
        component: "core".to_string(),
        compression: Compression::Unspecified,
        disk_id: None,
        hash: None,
    }
}

/// Default test settings rooted at `out_dir`.
pub fn settings(out_dir: &Path) -> PackagerSettings {
    settings_for(out_dir, test_package())
}

/// Test settings with custom package metadata.
pub fn settings_for(out_dir: &Path, package: PackageSettings) -> PackagerSettings {
    SettingsBuilder::new()
        .out_dir(out_dir)
        .package_settings(package)
        .threads(4)
        .build()
        .expect("building test settings")
}

/// Package metadata used across tests.
pub fn test_package() -> PackageSettings {
    PackageSettings {
        product_name: "testpkg".to_string(),
        version: "1.0.0".to_string(),
        ..Default::default()
    }
}

/// Shifts a file's modification time by the given number of seconds.
pub fn shift_mtime(path: &Path, seconds: u64) {
    let file = std::fs::OpenOptions::new()
        .write(true)
        .open(path)
        .expect("opening fixture for mtime shift");
    let modified = file
        .metadata()
        .and_then(|m| m.modified())
        .expect("reading fixture mtime");
    file.set_modified(modified + std::time::Duration::from_secs(seconds))
        .expect("shifting fixture mtime");
}
