//! Linux: static builds for the host architecture.
//!
//! Binaries are installed under triple-suffixed names only. Nothing on this
//! path is checksum-verified.

use anyhow::{bail, Result};
use std::path::Path;

use super::{fetch_and_extract, Acquire, Host, Report};
use crate::artifact::{self, Role};
use crate::common::{ensure_dir, install_binary, WorkDir};
use crate::config::Config;
use crate::extract::find_prefixed_dir;
use crate::platform::Arch;

/// Prefix of the versioned directory (`ffmpeg-7.0.2-arm64-static/`).
const ARCHIVE_DIR_PREFIX: &str = "ffmpeg-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinuxStrategy {
    pub arch: Arch,
}

impl Acquire for LinuxStrategy {
    fn acquire(&self, output_dir: &Path, config: &Config, host: &Host<'_>) -> Result<Report> {
        ensure_dir(output_dir)?;
        let mut report = Report::default();

        let binaries: Vec<_> = Role::ALL
            .iter()
            .map(|r| artifact::linux(output_dir, *r, self.arch))
            .collect();

        if binaries.iter().all(|b| b.exists()) {
            tracing::info!("Linux {} sidecars already present", self.arch);
            report.present = binaries.into_iter().map(|b| b.path).collect();
            return Ok(report);
        }

        let source = config.linux.archive(self.arch);
        tracing::info!("Installing Linux {} ffmpeg/ffprobe", self.arch);

        let work = WorkDir::create(&config.temp_root, "sidecars-linux")?;
        let name = format!("ffmpeg-linux-{}", self.arch);
        let extracted = fetch_and_extract(host, &work, &name, &source)?;
        let dir = find_prefixed_dir(&extracted, ARCHIVE_DIR_PREFIX)?;

        let mut staged = Vec::new();
        for binary in &binaries {
            let src = dir.join(binary.role.name());
            if !src.is_file() {
                bail!(
                    "Archive from {} is missing {} (expected at {})",
                    source.url,
                    binary.role.name(),
                    src.display()
                );
            }
            staged.push((src, binary.path.clone()));
        }

        for (src, dest) in staged {
            install_binary(&src, &dest)?;
            tracing::info!("Installed {}", dest.display());
            report.installed.push(dest);
        }
        Ok(report)
    }
}
