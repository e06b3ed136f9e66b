//! Windows: one zip archive yields both executables.
//!
//! The archive URL points at the latest release, so there is no default
//! digest. It comes from `FFMPEG_WIN_ZIP_SHA256` or from the `.sha256` file
//! published next to the archive; without either nothing is installed.

use anyhow::{bail, Context, Result};
use std::path::Path;

use super::{download_archive, extract_archive, Acquire, Host, Report};
use crate::artifact::{self, Role};
use crate::checksum::{self, ChecksumPolicy};
use crate::common::{ensure_dir, install_binary, place_alias_copy, WorkDir};
use crate::config::Config;
use crate::download::RemoteSource;
use crate::extract::find_prefixed_dir;

/// Prefix of the versioned directory inside the archive
/// (`ffmpeg-7.1-essentials_build/`).
const ARCHIVE_DIR_PREFIX: &str = "ffmpeg-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowsStrategy;

impl Acquire for WindowsStrategy {
    fn acquire(&self, output_dir: &Path, config: &Config, host: &Host<'_>) -> Result<Report> {
        ensure_dir(output_dir)?;
        let mut report = Report::default();

        let binaries: Vec<_> = Role::ALL
            .iter()
            .map(|r| artifact::windows(output_dir, *r))
            .collect();

        if binaries.iter().all(|b| b.exists()) {
            tracing::info!("ffmpeg.exe and ffprobe.exe already present");
            report.present = binaries.into_iter().map(|b| b.path).collect();
            write_aliases(output_dir, false, &mut report)?;
            return Ok(report);
        }

        let source = &config.windows.archive;
        let expected = resolve_digest(source, host)?;

        let work = WorkDir::create(&config.temp_root, "sidecars-windows")?;
        let archive = download_archive(host, &work, "ffmpeg-windows", source)?;
        checksum::verify(
            &archive,
            Some(&expected),
            "Windows ffmpeg archive",
            ChecksumPolicy::Required,
        )?;

        let extracted = extract_archive(host, &work, "ffmpeg-windows", source, &archive)?;
        let bin_dir = find_prefixed_dir(&extracted, ARCHIVE_DIR_PREFIX)?.join("bin");

        let mut staged = Vec::new();
        for role in Role::ALL {
            let exe = bin_dir.join(role.exe_name());
            if !exe.is_file() {
                bail!(
                    "Archive from {} is missing {} (expected at {})",
                    source.url,
                    role.exe_name(),
                    exe.display()
                );
            }
            staged.push((role, exe));
        }

        for (role, exe) in staged {
            let dest = artifact::windows(output_dir, role).path;
            install_binary(&exe, &dest)?;
            tracing::info!("Installed {}", dest.display());
            report.installed.push(dest);
        }

        write_aliases(output_dir, true, &mut report)?;
        Ok(report)
    }
}

/// Digest for the archive: explicit override, else the published sibling.
fn resolve_digest(source: &RemoteSource, host: &Host<'_>) -> Result<String> {
    if let Some(sha) = &source.sha256 {
        return Ok(sha.clone());
    }

    let sibling = source.sibling_sha256_url();
    tracing::info!("FFMPEG_WIN_ZIP_SHA256 not set, fetching {}", sibling);
    match host.downloader.fetch_text(&sibling) {
        Ok(text) => match checksum::parse_sha256_file(&text) {
            Some(sha) => Ok(sha),
            None => bail!(
                "No SHA-256 found in {}; set FFMPEG_WIN_ZIP_SHA256 to install Windows sidecars",
                sibling
            ),
        },
        Err(e) => Err(e).with_context(|| {
            format!(
                "Could not fetch {}; set FFMPEG_WIN_ZIP_SHA256 to install Windows sidecars",
                sibling
            )
        }),
    }
}

/// Copy each `.exe` to its two triple-suffixed alias names.
fn write_aliases(output_dir: &Path, overwrite: bool, report: &mut Report) -> Result<()> {
    for role in Role::ALL {
        for alias in artifact::windows_aliases(output_dir, role) {
            if place_alias_copy(&alias.target, &alias.path, overwrite)? {
                tracing::debug!("Wrote alias {}", alias.path.display());
                report.aliases.push(alias.path);
            }
        }
    }
    Ok(())
}
