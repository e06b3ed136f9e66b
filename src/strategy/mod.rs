//! Platform dispatch over the per-OS acquisition strategies.
//!
//! Each strategy checks what already exists in the output directory and
//! runs download → extract → verify → place for whatever is missing:
//! - `macos` - arm64 (pinned, verified) and x86_64 (best effort) pairs
//! - `windows` - one zip, canonical `.exe` names plus four alias copies
//! - `linux` - one arch-specific static tarball, triple-suffixed names

mod linux;
mod macos;
mod windows;

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub use linux::LinuxStrategy;
pub use macos::MacOsStrategy;
pub use windows::WindowsStrategy;

use crate::common::WorkDir;
use crate::config::Config;
use crate::download::{Downloader, RemoteSource};
use crate::extract::Extractor;
use crate::platform::{Os, PlatformTarget};

/// External capabilities a strategy needs. Swapped for fakes in tests.
#[derive(Clone, Copy)]
pub struct Host<'a> {
    pub downloader: &'a dyn Downloader,
    pub extractor: &'a dyn Extractor,
}

impl<'a> Host<'a> {
    pub fn new(downloader: &'a dyn Downloader, extractor: &'a dyn Extractor) -> Self {
        Self {
            downloader,
            extractor,
        }
    }
}

/// What a run did.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Report {
    /// Binaries copied into canonical destinations this run.
    pub installed: Vec<PathBuf>,
    /// Aliases created or refreshed.
    pub aliases: Vec<PathBuf>,
    /// Required binaries that were already present.
    pub present: Vec<PathBuf>,
    /// Non-fatal problems (degraded paths).
    pub warnings: Vec<String>,
}

impl Report {
    fn warn(&mut self, message: String) {
        tracing::warn!("{}", message);
        self.warnings.push(message);
    }
}

/// Single contract every platform strategy implements.
pub trait Acquire {
    fn acquire(&self, output_dir: &Path, config: &Config, host: &Host<'_>) -> Result<Report>;
}

/// One strategy per supported OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    MacOs(MacOsStrategy),
    Windows(WindowsStrategy),
    Linux(LinuxStrategy),
}

impl Strategy {
    pub fn for_target(target: PlatformTarget) -> Self {
        match target.os {
            Os::MacOs => Strategy::MacOs(MacOsStrategy),
            Os::Windows => Strategy::Windows(WindowsStrategy),
            Os::Linux => Strategy::Linux(LinuxStrategy { arch: target.arch }),
        }
    }
}

impl Acquire for Strategy {
    fn acquire(&self, output_dir: &Path, config: &Config, host: &Host<'_>) -> Result<Report> {
        match self {
            Strategy::MacOs(s) => s.acquire(output_dir, config, host),
            Strategy::Windows(s) => s.acquire(output_dir, config, host),
            Strategy::Linux(s) => s.acquire(output_dir, config, host),
        }
    }
}

/// Provision sidecars for `target` (`None` = unsupported host).
///
/// An unsupported platform is a warning, not an error: preparing sidecars
/// is optional for releases that aren't automated on that host.
pub fn run(target: Option<PlatformTarget>, config: &Config, host: &Host<'_>) -> Result<Report> {
    let Some(target) = target else {
        let mut report = Report::default();
        report.warn(format!(
            "Unsupported platform ({}/{}): place ffmpeg and ffprobe in {} manually",
            std::env::consts::OS,
            std::env::consts::ARCH,
            config.output_dir.display()
        ));
        return Ok(report);
    };

    tracing::info!("Preparing sidecars for {} in {}", target, config.output_dir.display());
    Strategy::for_target(target).acquire(&config.output_dir, config, host)
}

/// Download `source` to `work/<name>.<ext>`.
fn download_archive(
    host: &Host<'_>,
    work: &WorkDir,
    name: &str,
    source: &RemoteSource,
) -> Result<PathBuf> {
    let archive = work.join(format!("{}.{}", name, source.format.extension()));
    host.downloader
        .download(&source.url, &archive)
        .with_context(|| format!("Failed to download {} from {}", name, source.url))?;
    Ok(archive)
}

/// Extract `archive` to `work/<name>/` and return that directory.
fn extract_archive(
    host: &Host<'_>,
    work: &WorkDir,
    name: &str,
    source: &RemoteSource,
    archive: &Path,
) -> Result<PathBuf> {
    let dest = work.join(name);
    host.extractor
        .extract(archive, source.format, &dest)
        .with_context(|| format!("Failed to extract {}", archive.display()))?;
    Ok(dest)
}

/// [`download_archive`] then [`extract_archive`].
fn fetch_and_extract(
    host: &Host<'_>,
    work: &WorkDir,
    name: &str,
    source: &RemoteSource,
) -> Result<PathBuf> {
    let archive = download_archive(host, work, name, source)?;
    extract_archive(host, work, name, source, &archive)
}
