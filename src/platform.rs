//! Host platform detection and target triples.

use anyhow::{bail, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Operating system family a strategy provisions for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    MacOs,
    Windows,
    Linux,
}

/// Processor architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Arch {
    Arm64,
    X86_64,
}

impl Arch {
    /// Architecture component of a Rust target triple.
    pub fn triple_prefix(&self) -> &'static str {
        match self {
            Arch::Arm64 => "aarch64",
            Arch::X86_64 => "x86_64",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Os::MacOs => "macos",
            Os::Windows => "windows",
            Os::Linux => "linux",
        })
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Arch::Arm64 => "arm64",
            Arch::X86_64 => "x86_64",
        })
    }
}

/// An (OS, architecture) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlatformTarget {
    pub os: Os,
    pub arch: Arch,
}

impl PlatformTarget {
    pub fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Map `std::env::consts` style names to a target.
    ///
    /// Returns `None` for anything the provisioning strategies don't cover.
    pub fn from_consts(os: &str, arch: &str) -> Option<Self> {
        let os = match os {
            "macos" => Os::MacOs,
            "windows" => Os::Windows,
            "linux" => Os::Linux,
            _ => return None,
        };
        let arch = match arch {
            "aarch64" | "arm64" => Arch::Arm64,
            "x86_64" | "amd64" => Arch::X86_64,
            _ => return None,
        };
        Some(Self { os, arch })
    }

    /// Full Rust target triple, e.g. `aarch64-apple-darwin`.
    pub fn triple(&self) -> String {
        let rest = match self.os {
            Os::MacOs => "apple-darwin",
            Os::Windows => "pc-windows-msvc",
            Os::Linux => "unknown-linux-gnu",
        };
        format!("{}-{}", self.arch.triple_prefix(), rest)
    }
}

impl fmt::Display for PlatformTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

impl FromStr for PlatformTarget {
    type Err = anyhow::Error;

    /// Parse a target triple such as `x86_64-pc-windows-msvc`.
    fn from_str(s: &str) -> Result<Self> {
        let (arch, rest) = match s.split_once('-') {
            Some(parts) => parts,
            None => bail!("Not a target triple: '{}'", s),
        };
        let os = if rest.contains("darwin") || rest.contains("macos") {
            "macos"
        } else if rest.contains("windows") {
            "windows"
        } else if rest.contains("linux") {
            "linux"
        } else {
            bail!("Unsupported target OS in '{}'", s);
        };
        match Self::from_consts(os, arch) {
            Some(target) => Ok(target),
            None => bail!("Unsupported target architecture in '{}'", s),
        }
    }
}

/// Detect the platform this process runs on.
pub fn detect() -> Option<PlatformTarget> {
    PlatformTarget::from_consts(std::env::consts::OS, std::env::consts::ARCH)
}
