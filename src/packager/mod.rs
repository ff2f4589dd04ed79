//! Media packing: partitioning, cache reuse, and concurrent archive builds.
//!
//! # Overview
//!
//! The packager:
//! 1. Partitions payload files into media units, by explicit authoring or an
//!    automatic size-bounded packing
//! 2. Resolves each unit against the archive cache
//! 3. Builds the archives that need (re)building on a bounded worker pool
//! 4. Emits transfer instructions and embedded-stream registrations
//!
//! # Example
//!
//! ```no_run
//! use mediapack::packager::{MediaAuthoring, Packager, PackageSettings, SettingsBuilder};
//!
//! # async fn example(files: Vec<mediapack::packager::PayloadFile>)
//! #     -> mediapack::packager::Result<()> {
//! let settings = SettingsBuilder::new()
//!     .out_dir("target/media")
//!     .cache_dir("target/media-cache")
//!     .package_settings(PackageSettings {
//!         product_name: "MyApp".into(),
//!         version: "1.0.0".into(),
//!         ..Default::default()
//!     })
//!     .overrides_from_env()?
//!     .build()?;
//!
//! let packager = Packager::new(settings);
//! let output = packager.package(&files, &MediaAuthoring::automatic()).await?;
//!
//! for transfer in &output.transfers {
//!     println!("{} -> {}", transfer.source.display(), transfer.destination.display());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`partition`] - payload-to-unit assignment
//! - [`resolve`] - archive cache resolution
//! - [`ArchiveBuilder`] - bounded concurrent build pool
//! - [`Packager`] - orchestration of the above
//! - [`archive`] - the container backend abstraction and ZIP implementation

pub mod archive;
mod cache;
mod checksum;
mod diagnostics;
pub mod error;
mod orchestrator;
mod partition;
mod payload;
mod pool;
mod settings;
pub mod utils;

pub use cache::{CacheDecision, ResolvedArchive, resolve};
pub use checksum::archive_sha256;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{Context, Error, ErrorExt, Result};
pub use orchestrator::{EmbeddedStream, FileTransfer, PackageOutput, Packager};
pub use partition::{MODULE_ARCHIVE_NAME, MediaLayout, partition};
pub use payload::{
    Compression, CompressionLevel, EMBEDDED_MARKER, MAX_DISK_ID, MediaUnit, PackageKind,
    PayloadFile,
};
pub use pool::{ArchiveBuilder, BuildWorkItem};
pub use settings::{
    DEFAULT_MAX_MEDIA_MB, DEFAULT_NAME_TEMPLATE, ENV_LARGE_FILE_SPLIT_MB, ENV_MAX_MEDIA_MB,
    ExplicitUnit, MediaAuthoring, MediaTemplate, PackageSettings, PackagerSettings,
    SettingsBuilder,
};
