//! Hash command - prints SHA-256 digests for pinning new binaries.

use anyhow::Result;
use std::path::PathBuf;

use crate::checksum::sha256_file;

/// Print `<digest>  <path>` for each file, `sha256sum` style.
pub fn cmd_hash(files: &[PathBuf]) -> Result<()> {
    for file in files {
        println!("{}  {}", sha256_file(file)?, file.display());
    }
    Ok(())
}
