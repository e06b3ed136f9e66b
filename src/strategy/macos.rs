//! macOS: provision Apple Silicon and Intel binaries independently.
//!
//! | arm64   | x86_64  | action                                          |
//! |---------|---------|-------------------------------------------------|
//! | present | present | refresh aarch64 symlinks, no network            |
//! | present | absent  | symlinks, then best-effort x86_64 install       |
//! | absent  | any     | pinned arm64 install (fatal on bad checksum),   |
//! |         |         | symlinks, then best-effort x86_64 if absent     |
//!
//! The arm64 pair is the default target for every user and is pinned by
//! digest, so a bad download stops the release. The x86_64 pair comes from
//! an unpinned third-party source and its failure only produces a warning.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use super::{fetch_and_extract, Acquire, Host, Report};
use crate::artifact::{self, Role};
use crate::checksum::{self, ChecksumPolicy};
use crate::common::{ensure_dir, install_binary, replace_symlink, WorkDir};
use crate::config::Config;
use crate::download::RemoteSource;
use crate::extract::find_file;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacOsStrategy;

impl Acquire for MacOsStrategy {
    fn acquire(&self, output_dir: &Path, config: &Config, host: &Host<'_>) -> Result<Report> {
        ensure_dir(output_dir)?;
        let mut report = Report::default();

        let arm64: Vec<_> = Role::ALL
            .iter()
            .map(|r| artifact::macos_arm64(output_dir, *r))
            .collect();
        let x86_64: Vec<_> = Role::ALL
            .iter()
            .map(|r| artifact::macos_x86_64(output_dir, *r))
            .collect();
        let arm64_present = arm64.iter().all(|a| a.exists());
        let x86_64_present = x86_64.iter().all(|a| a.exists());

        for a in arm64.iter().chain(&x86_64).filter(|a| a.exists()) {
            report.present.push(a.path.clone());
        }

        if arm64_present {
            tracing::info!("arm64 ffmpeg/ffprobe already present");
        } else {
            install_arm64(output_dir, config, host, &mut report)?;
        }
        link_arm64_aliases(output_dir, &mut report)?;

        if x86_64_present {
            tracing::info!("x86_64 ffmpeg/ffprobe already present");
        } else if let Err(e) = install_x86_64(output_dir, config, host, &mut report) {
            report.warn(format!(
                "Intel (x86_64) sidecars unavailable, continuing Apple Silicon only: {:#}",
                e
            ));
        }

        Ok(report)
    }
}

/// Environment variable supplying the pinned digest for `role`.
fn digest_var(role: Role) -> &'static str {
    match role {
        Role::Ffmpeg => "FFMPEG_MAC_BIN_SHA256",
        Role::Ffprobe => "FFPROBE_MAC_BIN_SHA256",
    }
}

fn arm64_source(config: &Config, role: Role) -> &RemoteSource {
    match role {
        Role::Ffmpeg => &config.macos.ffmpeg,
        Role::Ffprobe => &config.macos.ffprobe,
    }
}

fn x86_64_source(config: &Config, role: Role) -> &RemoteSource {
    match role {
        Role::Ffmpeg => &config.macos.ffmpeg_x86_64,
        Role::Ffprobe => &config.macos.ffprobe_x86_64,
    }
}

/// Download, extract and verify one binary per role into `work`.
///
/// Every binary is verified before any is returned, so a failure leaves the
/// output directory untouched.
fn stage_pair(
    work: &WorkDir,
    host: &Host<'_>,
    arch_label: &str,
    source_for: impl Fn(Role) -> (RemoteSource, String),
    policy: ChecksumPolicy,
) -> Result<Vec<(Role, PathBuf)>> {
    let mut staged = Vec::new();
    for role in Role::ALL {
        let (source, label) = source_for(role);
        let name = format!("{}-{}", role.name(), arch_label);
        let extracted = fetch_and_extract(host, work, &name, &source)?;
        let binary = find_file(&extracted, role.name())
            .with_context(|| format!("Unexpected contents in {}", source.url))?;
        checksum::verify(&binary, source.sha256.as_deref(), &label, policy)?;
        staged.push((role, binary));
    }
    Ok(staged)
}

/// Primary path: pinned arm64 binaries, checksum required.
fn install_arm64(
    output_dir: &Path,
    config: &Config,
    host: &Host<'_>,
    report: &mut Report,
) -> Result<()> {
    tracing::info!("Installing pinned arm64 ffmpeg/ffprobe");
    for role in Role::ALL {
        if arm64_source(config, role).sha256.is_none() {
            bail!(
                "No SHA-256 pinned for macOS arm64 {}; set {} to install Apple Silicon sidecars",
                role.name(),
                digest_var(role)
            );
        }
    }
    let work = WorkDir::create(&config.temp_root, "sidecars-macos-arm64")?;

    let staged = stage_pair(
        &work,
        host,
        "arm64",
        |role| {
            let label = format!("macOS arm64 {} ({})", role.name(), digest_var(role));
            (arm64_source(config, role).clone(), label)
        },
        ChecksumPolicy::Required,
    )?;

    for (role, binary) in staged {
        let dest = artifact::macos_arm64(output_dir, role).path;
        install_binary(&binary, &dest)?;
        tracing::info!("Installed {}", dest.display());
        report.installed.push(dest);
    }
    Ok(())
}

/// Secondary path: latest Intel binaries, checksum optional.
fn install_x86_64(
    output_dir: &Path,
    config: &Config,
    host: &Host<'_>,
    report: &mut Report,
) -> Result<()> {
    tracing::info!("Installing x86_64 ffmpeg/ffprobe");
    let work = WorkDir::create(&config.temp_root, "sidecars-macos-x86_64")?;

    let staged = stage_pair(
        &work,
        host,
        "x86_64",
        |role| {
            let label = format!("macOS x86_64 {}", role.name());
            (x86_64_source(config, role).clone(), label)
        },
        ChecksumPolicy::Optional,
    )?;

    for (role, binary) in staged {
        let dest = artifact::macos_x86_64(output_dir, role).path;
        install_binary(&binary, &dest)?;
        tracing::info!("Installed {}", dest.display());
        report.installed.push(dest);
    }
    Ok(())
}

/// (Re)create `ffmpeg-aarch64-apple-darwin -> ffmpeg` and the ffprobe pair.
fn link_arm64_aliases(output_dir: &Path, report: &mut Report) -> Result<()> {
    for role in Role::ALL {
        let alias = artifact::macos_arm64_alias(output_dir, role);
        replace_symlink(&alias.target, &alias.path)?;
        tracing::debug!("Linked {} -> {}", alias.path.display(), alias.target.display());
        report.aliases.push(alias.path);
    }
    Ok(())
}
