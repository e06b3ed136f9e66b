//! Clean command - removes provisioned sidecars.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::artifact;
use crate::common::remove_existing;
use crate::platform::PlatformTarget;

/// Remove every binary and alias `target` provisions. Returns removed paths.
pub fn clean_sidecars(target: PlatformTarget, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let paths = artifact::aliases(target, output_dir)
        .into_iter()
        .map(|a| a.path)
        .chain(artifact::required(target, output_dir).into_iter().map(|a| a.path));

    let mut removed = Vec::new();
    for path in paths {
        if path.symlink_metadata().is_ok() {
            remove_existing(&path)?;
            removed.push(path);
        }
    }
    Ok(removed)
}

/// Execute the clean command.
pub fn cmd_clean(target: PlatformTarget, output_dir: &Path) -> Result<()> {
    let removed = clean_sidecars(target, output_dir)?;
    if removed.is_empty() {
        println!("No sidecars to clean in {}.", output_dir.display());
    } else {
        for path in &removed {
            println!("Removed {}", path.display());
        }
        println!("Cleaned {} file(s).", removed.len());
    }
    Ok(())
}
