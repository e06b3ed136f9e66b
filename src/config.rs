//! Configuration for a provisioning run.
//!
//! Reads the project's `.env` file and the process environment once and
//! turns them into an immutable [`Config`]. Environment variables take
//! precedence over `.env`. Empty values count as unset.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::download::RemoteSource;
use crate::extract::ArchiveFormat;
use crate::platform::Arch;

/// Output directory relative to the project root.
pub const DEFAULT_OUTPUT_DIR: &str = "src-tauri/binaries";

/// Pinned Apple Silicon builds.
pub const DEFAULT_FFMPEG_MAC_URL: &str = "https://www.osxexperts.net/ffmpeg71arm.zip";
pub const DEFAULT_FFPROBE_MAC_URL: &str = "https://www.osxexperts.net/ffprobe71arm.zip";
/// Bundled digest for the extracted `ffmpeg` binary from [`DEFAULT_FFMPEG_MAC_URL`].
///
/// `None`: no verified digest ships with the tool, so `FFMPEG_MAC_BIN_SHA256` must
/// be supplied (`sidecars hash <binary>`) before an arm64 install can run.
pub const DEFAULT_FFMPEG_MAC_BIN_SHA256: Option<&str> = None;
/// Bundled digest for the extracted `ffprobe` binary from [`DEFAULT_FFPROBE_MAC_URL`].
///
/// `None`, like [`DEFAULT_FFMPEG_MAC_BIN_SHA256`]; supply `FFPROBE_MAC_BIN_SHA256`.
pub const DEFAULT_FFPROBE_MAC_BIN_SHA256: Option<&str> = None;

/// Intel macOS builds (latest release, unpinned).
pub const DEFAULT_FFMPEG_MAC_X64_URL: &str = "https://evermeet.cx/ffmpeg/getrelease/zip";
pub const DEFAULT_FFPROBE_MAC_X64_URL: &str = "https://evermeet.cx/ffmpeg/getrelease/ffprobe/zip";

/// Windows essentials build; a `.sha256` file is published next to it.
pub const DEFAULT_FFMPEG_WIN_URL: &str =
    "https://www.gyan.dev/ffmpeg/builds/ffmpeg-release-essentials.zip";

/// Linux static builds; `{arch}` is `arm64` or `amd64`.
pub const DEFAULT_FFMPEG_LINUX_URL_TEMPLATE: &str =
    "https://johnvansickle.com/ffmpeg/releases/ffmpeg-release-{arch}-static.tar.xz";

fn resolve_path(project_dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        project_dir.join(path)
    }
}

/// Sources for the macOS strategy.
#[derive(Debug, Clone)]
pub struct MacOsSources {
    pub ffmpeg: RemoteSource,
    pub ffprobe: RemoteSource,
    pub ffmpeg_x86_64: RemoteSource,
    pub ffprobe_x86_64: RemoteSource,
}

/// Sources for the Windows strategy.
#[derive(Debug, Clone)]
pub struct WindowsSources {
    /// Archive holding both executables. `sha256` is the operator override.
    pub archive: RemoteSource,
}

/// Sources for the Linux strategy.
#[derive(Debug, Clone)]
pub struct LinuxSources {
    /// `FFMPEG_LINUX_URL`, used for every architecture when set.
    pub url_override: Option<String>,
}

impl LinuxSources {
    /// Static build archive for `arch`.
    pub fn archive(&self, arch: Arch) -> RemoteSource {
        let url = match &self.url_override {
            Some(url) => url.clone(),
            None => DEFAULT_FFMPEG_LINUX_URL_TEMPLATE.replace("{arch}", linux_arch_suffix(arch)),
        };
        let format = ArchiveFormat::from_name(&url).unwrap_or(ArchiveFormat::TarXz);
        RemoteSource::new(url, format)
    }
}

/// Architecture suffix used in the Linux static build file names.
pub fn linux_arch_suffix(arch: Arch) -> &'static str {
    match arch {
        Arch::Arm64 => "arm64",
        Arch::X86_64 => "amd64",
    }
}

/// Immutable configuration passed to every strategy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root that relative paths resolve against.
    pub project_dir: PathBuf,
    /// Shared output directory for all sidecars.
    pub output_dir: PathBuf,
    /// Parent for per-run work directories.
    pub temp_root: PathBuf,
    pub macos: MacOsSources,
    pub windows: WindowsSources,
    pub linux: LinuxSources,
}

impl Config {
    /// Load from `<project_dir>/.env` and the process environment.
    pub fn load(project_dir: &Path) -> Self {
        let env_path = project_dir.join(".env");
        if env_path.exists() {
            // dotenvy never overrides variables already set in the environment.
            if let Err(e) = dotenvy::from_path(&env_path) {
                tracing::warn!("Ignoring unreadable {}: {}", env_path.display(), e);
            }
        }

        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars, project_dir)
    }

    /// Build a configuration from an explicit variable map.
    pub fn from_vars(vars: &HashMap<String, String>, project_dir: &Path) -> Self {
        let get = |key: &str| -> Option<String> {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let source = |url_key: &str, default_url: &str, sha_key: Option<&str>| {
            let url = get(url_key).unwrap_or_else(|| default_url.to_string());
            let format = ArchiveFormat::from_name(&url).unwrap_or(ArchiveFormat::Zip);
            RemoteSource::new(url, format).with_sha256(sha_key.and_then(get))
        };
        let resolve = |value: String| resolve_path(project_dir, PathBuf::from(value));

        let output_dir = get("SIDECAR_OUTPUT_DIR")
            .map(resolve)
            .unwrap_or_else(|| project_dir.join(DEFAULT_OUTPUT_DIR));
        let temp_root = get("SIDECAR_TEMP_DIR")
            .map(resolve)
            .unwrap_or_else(std::env::temp_dir);

        let mut ffmpeg = source("FFMPEG_MAC_URL", DEFAULT_FFMPEG_MAC_URL, None);
        ffmpeg.sha256 = get("FFMPEG_MAC_BIN_SHA256")
            .or_else(|| DEFAULT_FFMPEG_MAC_BIN_SHA256.map(String::from));
        let mut ffprobe = source("FFPROBE_MAC_URL", DEFAULT_FFPROBE_MAC_URL, None);
        ffprobe.sha256 = get("FFPROBE_MAC_BIN_SHA256")
            .or_else(|| DEFAULT_FFPROBE_MAC_BIN_SHA256.map(String::from));

        let macos = MacOsSources {
            ffmpeg,
            ffprobe,
            ffmpeg_x86_64: source(
                "FFMPEG_MAC_X64_URL",
                DEFAULT_FFMPEG_MAC_X64_URL,
                Some("FFMPEG_MAC_X64_SHA256"),
            ),
            ffprobe_x86_64: source(
                "FFPROBE_MAC_X64_URL",
                DEFAULT_FFPROBE_MAC_X64_URL,
                Some("FFPROBE_MAC_X64_SHA256"),
            ),
        };

        let windows = WindowsSources {
            archive: source(
                "FFMPEG_WIN_URL",
                DEFAULT_FFMPEG_WIN_URL,
                Some("FFMPEG_WIN_ZIP_SHA256"),
            ),
        };

        let linux = LinuxSources {
            url_override: get("FFMPEG_LINUX_URL"),
        };

        Self {
            project_dir: project_dir.to_path_buf(),
            output_dir,
            temp_root,
            macos,
            windows,
            linux,
        }
    }

    /// Replace the output directory (from `--output`). Relative paths
    /// resolve against the project directory, like `SIDECAR_OUTPUT_DIR`.
    pub fn with_output_dir(mut self, output_dir: PathBuf) -> Self {
        self.output_dir = resolve_path(&self.project_dir, output_dir);
        self
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        let digest = |s: &Option<String>| s.clone().unwrap_or_else(|| "(unpinned)".to_string());

        println!("Configuration:");
        println!("  Project dir:    {}", self.project_dir.display());
        println!("  Output dir:     {}", self.output_dir.display());
        println!("  Temp root:      {}", self.temp_root.display());
        println!("  macOS arm64:");
        println!("    ffmpeg:       {}", self.macos.ffmpeg.url);
        println!("      sha256:     {}", digest(&self.macos.ffmpeg.sha256));
        println!("    ffprobe:      {}", self.macos.ffprobe.url);
        println!("      sha256:     {}", digest(&self.macos.ffprobe.sha256));
        println!("  macOS x86_64:");
        println!("    ffmpeg:       {}", self.macos.ffmpeg_x86_64.url);
        println!("    ffprobe:      {}", self.macos.ffprobe_x86_64.url);
        println!("  Windows:");
        println!("    archive:      {}", self.windows.archive.url);
        println!(
            "      sha256:     {}",
            self.windows
                .archive
                .sha256
                .clone()
                .unwrap_or_else(|| format!("(from {})", self.windows.archive.sibling_sha256_url()))
        );
        println!("  Linux:");
        println!("    arm64:        {}", self.linux.archive(Arch::Arm64).url);
        println!("    x86_64:       {}", self.linux.archive(Arch::X86_64).url);
    }
}
