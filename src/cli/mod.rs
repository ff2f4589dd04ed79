//! Command line interface for the media packer.
//!
//! This module provides the CLI for packing operations, with argument
//! parsing, command dispatch, and user feedback.

mod args;
pub mod commands;

pub use args::{Args, Command, PackArgs, ScanArgs};

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    match &args.command {
        Command::Pack(pack_args) => commands::pack::run(pack_args).await,
        Command::Scan(scan_args) => commands::scan::run(scan_args).await,
    }
}
