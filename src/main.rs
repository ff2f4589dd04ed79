//! Mediapack - installer media packer.
//!
//! This binary partitions payload files into compressed archive units,
//! builds the archives concurrently, and reuses cached archives across
//! builds where nothing changed.

use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match mediapack::cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    process::exit(exit_code);
}
