//! Configuration structures for packaging operations.
//!
//! This module provides the configuration types for media packing: package
//! metadata, media authoring (explicit units or a sizing template), and the
//! builder used to assemble a validated [`PackagerSettings`].

mod builder;
mod core;
mod media;
mod package;

pub use builder::{ENV_LARGE_FILE_SPLIT_MB, ENV_MAX_MEDIA_MB, SettingsBuilder};
pub use core::PackagerSettings;
pub use media::{
    DEFAULT_MAX_MEDIA_MB, DEFAULT_NAME_TEMPLATE, ExplicitUnit, MediaAuthoring, MediaTemplate,
};
pub use package::PackageSettings;
