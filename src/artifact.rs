//! Required sidecar binaries and the filenames they land under.
//!
//! Each OS has its own naming convention for the packaging step:
//! - macOS: canonical `ffmpeg`/`ffprobe` (arm64), `-x86_64-apple-darwin`
//!   suffixed Intel builds, and `-aarch64-apple-darwin` symlinks.
//! - Windows: `ffmpeg.exe`/`ffprobe.exe` plus four copies under triple names.
//! - Linux: only triple-suffixed names.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::platform::{Arch, Os, PlatformTarget};

/// Which sidecar a file is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Ffmpeg,
    Ffprobe,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Ffmpeg, Role::Ffprobe];

    pub fn name(&self) -> &'static str {
        match self {
            Role::Ffmpeg => "ffmpeg",
            Role::Ffprobe => "ffprobe",
        }
    }

    /// Filename of the executable inside a Windows archive.
    pub fn exe_name(&self) -> String {
        format!("{}.exe", self.name())
    }
}

/// A binary that must exist in the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BinaryArtifact {
    pub role: Role,
    /// Architecture the binary is built for.
    pub arch: Arch,
    pub path: PathBuf,
}

impl BinaryArtifact {
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// How an alias is materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AliasKind {
    Symlink,
    Copy,
}

/// Extra filename pointing at a canonical binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasPath {
    pub path: PathBuf,
    /// Canonical binary the alias exposes.
    pub target: PathBuf,
    pub kind: AliasKind,
}

/// Canonical arm64 macOS binary (`ffmpeg`).
pub fn macos_arm64(output_dir: &Path, role: Role) -> BinaryArtifact {
    BinaryArtifact {
        role,
        arch: Arch::Arm64,
        path: output_dir.join(role.name()),
    }
}

/// Intel macOS binary (`ffmpeg-x86_64-apple-darwin`).
pub fn macos_x86_64(output_dir: &Path, role: Role) -> BinaryArtifact {
    let triple = PlatformTarget::new(Os::MacOs, Arch::X86_64).triple();
    BinaryArtifact {
        role,
        arch: Arch::X86_64,
        path: output_dir.join(format!("{}-{}", role.name(), triple)),
    }
}

/// Canonical Windows binary (`ffmpeg.exe`).
pub fn windows(output_dir: &Path, role: Role) -> BinaryArtifact {
    BinaryArtifact {
        role,
        arch: Arch::X86_64,
        path: output_dir.join(role.exe_name()),
    }
}

/// Linux binary (`ffmpeg-aarch64-unknown-linux-gnu`).
pub fn linux(output_dir: &Path, role: Role, arch: Arch) -> BinaryArtifact {
    let triple = PlatformTarget::new(Os::Linux, arch).triple();
    BinaryArtifact {
        role,
        arch,
        path: output_dir.join(format!("{}-{}", role.name(), triple)),
    }
}

/// Every binary a target needs in the output directory.
///
/// macOS always lists both architectures regardless of `target.arch`.
pub fn required(target: PlatformTarget, output_dir: &Path) -> Vec<BinaryArtifact> {
    match target.os {
        Os::MacOs => Role::ALL
            .iter()
            .map(|r| macos_arm64(output_dir, *r))
            .chain(Role::ALL.iter().map(|r| macos_x86_64(output_dir, *r)))
            .collect(),
        Os::Windows => Role::ALL.iter().map(|r| windows(output_dir, *r)).collect(),
        Os::Linux => Role::ALL
            .iter()
            .map(|r| linux(output_dir, *r, target.arch))
            .collect(),
    }
}

/// `ffmpeg-aarch64-apple-darwin` symlink pointing at `ffmpeg`.
pub fn macos_arm64_alias(output_dir: &Path, role: Role) -> AliasPath {
    let triple = PlatformTarget::new(Os::MacOs, Arch::Arm64).triple();
    AliasPath {
        path: output_dir.join(format!("{}-{}", role.name(), triple)),
        target: macos_arm64(output_dir, role).path,
        kind: AliasKind::Symlink,
    }
}

/// The two Windows alias copies for one role:
/// `ffmpeg-x86_64-pc-windows-msvc.exe` and `ffmpeg.exe-x86_64-pc-windows-msvc.exe`.
pub fn windows_aliases(output_dir: &Path, role: Role) -> [AliasPath; 2] {
    let triple = PlatformTarget::new(Os::Windows, Arch::X86_64).triple();
    let target = windows(output_dir, role).path;
    [
        AliasPath {
            path: output_dir.join(format!("{}-{}.exe", role.name(), triple)),
            target: target.clone(),
            kind: AliasKind::Copy,
        },
        AliasPath {
            path: output_dir.join(format!("{}-{}.exe", role.exe_name(), triple)),
            target,
            kind: AliasKind::Copy,
        },
    ]
}

/// Every alias a target's naming convention expects.
pub fn aliases(target: PlatformTarget, output_dir: &Path) -> Vec<AliasPath> {
    match target.os {
        Os::MacOs => Role::ALL
            .iter()
            .map(|r| macos_arm64_alias(output_dir, *r))
            .collect(),
        Os::Windows => Role::ALL
            .iter()
            .flat_map(|r| windows_aliases(output_dir, *r))
            .collect(),
        Os::Linux => Vec::new(),
    }
}
