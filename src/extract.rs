//! Archive extraction and locating binaries inside extracted trees.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::download::Locator;
use crate::process::{self, Cmd};

/// Archive container formats the sources ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarXz,
    TarGz,
}

impl ArchiveFormat {
    /// File extension used when saving a download of this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::TarXz => "tar.xz",
            ArchiveFormat::TarGz => "tar.gz",
        }
    }

    /// Guess the format from a URL or file name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        if name.ends_with(".zip") || name.ends_with("/zip") {
            Some(ArchiveFormat::Zip)
        } else if name.ends_with(".tar.xz") || name.ends_with(".txz") {
            Some(ArchiveFormat::TarXz)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(ArchiveFormat::TarGz)
        } else {
            None
        }
    }

    /// `tar` flags for tar variants.
    fn tar_flag(&self) -> &'static str {
        match self {
            ArchiveFormat::TarXz => "-xJf",
            ArchiveFormat::TarGz => "-xzf",
            // bsdtar (macOS, Windows 10+) reads zip with plain -xf
            ArchiveFormat::Zip => "-xf",
        }
    }
}

/// Unpacks an archive into a directory.
pub trait Extractor {
    fn extract(&self, archive: &Path, format: ArchiveFormat, dest: &Path) -> Result<()>;
}

/// [`Extractor`] that shells out to unzip/tar on the host.
pub struct HostExtractor {
    locate: Locator,
}

impl Default for HostExtractor {
    fn default() -> Self {
        Self::with_locator(process::which)
    }
}

impl HostExtractor {
    /// Use `locate` instead of a PATH lookup to find zip extractors.
    pub fn with_locator(locate: impl Fn(&str) -> Option<PathBuf> + 'static) -> Self {
        Self {
            locate: Box::new(locate),
        }
    }

    fn tar(archive: &Path, format: ArchiveFormat, dest: &Path) -> Cmd {
        Cmd::new("tar")
            .arg(format.tar_flag())
            .arg_path(archive)
            .arg("-C")
            .arg_path(dest)
    }

    /// Commands able to unpack a zip, in preference order.
    fn zip_commands(archive: &Path, dest: &Path) -> Vec<Cmd> {
        let unzip = Cmd::new("unzip")
            .args(["-q", "-o"])
            .arg_path(archive)
            .arg("-d")
            .arg_path(dest);
        let tar = Self::tar(archive, ArchiveFormat::Zip, dest);

        if cfg!(windows) {
            let expand = Cmd::new("powershell").args([
                "-NoProfile".to_string(),
                "-Command".to_string(),
                format!(
                    "Expand-Archive -Force -LiteralPath '{}' -DestinationPath '{}'",
                    archive.display(),
                    dest.display()
                ),
            ]);
            vec![tar, expand, unzip]
        } else {
            vec![unzip, tar]
        }
    }
}

impl Extractor for HostExtractor {
    fn extract(&self, archive: &Path, format: ArchiveFormat, dest: &Path) -> Result<()> {
        fs::create_dir_all(dest)
            .with_context(|| format!("Failed to create directory {}", dest.display()))?;

        tracing::debug!("Extracting {} into {}", archive.display(), dest.display());

        match format {
            ArchiveFormat::TarXz | ArchiveFormat::TarGz => {
                Self::tar(archive, format, dest)
                    .error_msg(format!("tar extraction failed for {}", archive.display()))
                    .run()?;
                Ok(())
            }
            ArchiveFormat::Zip => {
                let mut failures = Vec::new();
                for cmd in Self::zip_commands(archive, dest) {
                    if (self.locate)(cmd.program()).is_none() {
                        continue;
                    }
                    match cmd.run() {
                        Ok(_) => return Ok(()),
                        Err(e) => failures.push(format!("{:#}", e)),
                    }
                }
                if failures.is_empty() {
                    bail!(
                        "No zip extractor found for {} (install unzip or bsdtar)",
                        archive.display()
                    );
                }
                bail!(
                    "Could not extract {}:\n  {}",
                    archive.display(),
                    failures.join("\n  ")
                )
            }
        }
    }
}

/// Find the first directory directly under `root` whose name starts with
/// `prefix` (e.g. `ffmpeg-7.1-essentials_build`).
pub fn find_prefixed_dir(root: &Path, prefix: &str) -> Result<PathBuf> {
    let mut matches: Vec<PathBuf> = fs::read_dir(root)
        .with_context(|| format!("Failed to read {}", root.display()))?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .filter(|e| e.file_name().to_string_lossy().starts_with(prefix))
        .map(|e| e.path())
        .collect();

    if matches.is_empty() {
        bail!(
            "Unexpected archive layout: no '{}*' directory in {}",
            prefix,
            root.display()
        );
    }
    matches.sort();
    Ok(matches.swap_remove(0))
}

/// Locate a file named `file_name` anywhere under `root`, shallowest first.
pub fn find_file(root: &Path, file_name: &str) -> Result<PathBuf> {
    let found = walkdir::WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.file_name().to_string_lossy() == file_name)
        .min_by_key(|e| e.depth());

    match found {
        Some(entry) => Ok(entry.into_path()),
        None => bail!(
            "Archive did not contain expected binary '{}' (searched {})",
            file_name,
            root.display()
        ),
    }
}
