//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap, with proper
//! validation and error handling.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Installer media packer
#[derive(Parser, Debug)]
#[command(
    name = "mediapack",
    version,
    about = "Installer media packer",
    long_about = "Partitions payload files into compressed archive units and builds them \
concurrently, reusing cached archives across builds where nothing changed.

Usage:
  mediapack scan ./payload --output mediapack.toml
  mediapack pack --manifest mediapack.toml --out-dir ./media
  mediapack pack --manifest mediapack.toml --cache-dir ~/.cache/mediapack --report report.json

Exit code 0 = every required archive exists at its delivered path."
)]
pub struct Args {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Partition payload files into media archives and build them
    Pack(PackArgs),

    /// Scan a directory and write a starter manifest for its files
    Scan(ScanArgs),
}

/// Arguments for the `pack` subcommand
#[derive(clap::Args, Debug)]
pub struct PackArgs {
    /// Pack manifest (TOML)
    #[arg(short, long, value_name = "PATH")]
    pub manifest: PathBuf,

    /// Delivery directory for finished archives
    #[arg(short, long, value_name = "DIR", default_value = "media")]
    pub out_dir: PathBuf,

    /// Scratch directory for in-progress builds
    ///
    /// Default: `<out-dir>/.mediapack`
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Archive cache directory
    ///
    /// Default: `mediapack` under the user cache directory
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Disable archive cache reuse; every archive is rebuilt
    #[arg(long)]
    pub no_cache: bool,

    /// Worker-pool width for concurrent archive builds
    ///
    /// Default: the number of logical CPUs
    #[arg(short, long, value_name = "N")]
    pub threads: Option<usize>,

    /// Write a machine-readable build report (JSON) to this path
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,
}

/// Arguments for the `scan` subcommand
#[derive(clap::Args, Debug)]
pub struct ScanArgs {
    /// Directory holding payload files
    pub dir: PathBuf,

    /// Where to write the generated manifest
    #[arg(short, long, value_name = "PATH", default_value = "mediapack.toml")]
    pub output: PathBuf,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
