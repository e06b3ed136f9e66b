//! Fetching remote archives.
//!
//! Downloads go through `curl`, falling back to `wget` when curl is missing
//! or fails. No retries: a failed fetch is reported and the operator re-runs.

use anyhow::{anyhow, bail, Result};
use std::path::{Path, PathBuf};

use crate::extract::ArchiveFormat;
use crate::process::{self, Cmd};

/// One downloadable archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSource {
    pub url: String,
    /// Expected SHA-256 (hex), if known.
    pub sha256: Option<String>,
    pub format: ArchiveFormat,
}

impl RemoteSource {
    pub fn new(url: impl Into<String>, format: ArchiveFormat) -> Self {
        Self {
            url: url.into(),
            sha256: None,
            format,
        }
    }

    pub fn with_sha256(mut self, sha256: Option<String>) -> Self {
        self.sha256 = sha256;
        self
    }

    /// URL of the checksum file published next to the archive.
    pub fn sibling_sha256_url(&self) -> String {
        format!("{}.sha256", self.url)
    }
}

/// Network access used by the acquisition strategies.
pub trait Downloader {
    /// Save the body at `url` to `dest`.
    fn download(&self, url: &str, dest: &Path) -> Result<()>;

    /// Fetch a small text resource (e.g. a `.sha256` file).
    fn fetch_text(&self, url: &str) -> Result<String>;
}

/// Command-line download tools, in fallback order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadTool {
    Curl,
    Wget,
}

impl DownloadTool {
    pub const FALLBACK_ORDER: [DownloadTool; 2] = [DownloadTool::Curl, DownloadTool::Wget];

    pub fn program(&self) -> &'static str {
        match self {
            DownloadTool::Curl => "curl",
            DownloadTool::Wget => "wget",
        }
    }

    /// Arguments that write `url` to `dest`.
    pub fn file_args(&self, url: &str, dest: &Path) -> Vec<String> {
        let dest = dest.to_string_lossy().into_owned();
        match self {
            DownloadTool::Curl => vec![
                "-fL".into(),
                "--silent".into(),
                "--show-error".into(),
                "-o".into(),
                dest,
                url.into(),
            ],
            DownloadTool::Wget => vec!["-q".into(), "-O".into(), dest, url.into()],
        }
    }

    /// Arguments that print `url` to stdout.
    pub fn text_args(&self, url: &str) -> Vec<String> {
        match self {
            DownloadTool::Curl => vec!["-fsSL".into(), url.into()],
            DownloadTool::Wget => vec!["-q".into(), "-O".into(), "-".into(), url.into()],
        }
    }
}

/// Resolves a program name to an executable path.
pub type Locator = Box<dyn Fn(&str) -> Option<PathBuf>>;

/// [`Downloader`] backed by curl/wget on the host.
pub struct HostDownloader {
    locate: Locator,
}

impl Default for HostDownloader {
    fn default() -> Self {
        Self::with_locator(process::which)
    }
}

impl HostDownloader {
    /// Use `locate` instead of a PATH lookup to find each tool.
    pub fn with_locator(locate: impl Fn(&str) -> Option<PathBuf> + 'static) -> Self {
        Self {
            locate: Box::new(locate),
        }
    }

    /// Try each available tool in order; return the first success.
    fn with_fallback<T>(
        &self,
        url: &str,
        mut attempt: impl FnMut(DownloadTool, &Path) -> Result<T>,
    ) -> Result<T> {
        let mut failures = Vec::new();

        for tool in DownloadTool::FALLBACK_ORDER {
            let Some(program) = (self.locate)(tool.program()) else {
                failures.push(format!("{}: not installed", tool.program()));
                continue;
            };
            match attempt(tool, &program) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    tracing::warn!("{} failed for {}: {:#}", tool.program(), url, e);
                    failures.push(format!("{}: {:#}", tool.program(), e));
                }
            }
        }

        Err(anyhow!(
            "Download failed for {}\n  {}",
            url,
            failures.join("\n  ")
        ))
    }
}

impl Downloader for HostDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        tracing::info!("Downloading {}", url);
        self.with_fallback(url, |tool, program| {
            // A failed curl can leave a truncated file behind.
            let _ = std::fs::remove_file(dest);
            Cmd::new(program.to_string_lossy())
                .args(tool.file_args(url, dest))
                .error_msg(format!("{} could not download {}", tool.program(), url))
                .run()?;
            if !dest.is_file() {
                bail!("{} reported success but wrote no file", tool.program());
            }
            Ok(())
        })
    }

    fn fetch_text(&self, url: &str) -> Result<String> {
        self.with_fallback(url, |tool, program| {
            let result = Cmd::new(program.to_string_lossy())
                .args(tool.text_args(url))
                .error_msg(format!("{} could not fetch {}", tool.program(), url))
                .run()?;
            Ok(result.stdout)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sibling_sha256_url() {
        let source = RemoteSource::new(
            "https://www.gyan.dev/ffmpeg/builds/ffmpeg-release-essentials.zip",
            ArchiveFormat::Zip,
        );
        assert_eq!(
            source.sibling_sha256_url(),
            "https://www.gyan.dev/ffmpeg/builds/ffmpeg-release-essentials.zip.sha256"
        );
        assert_eq!(source.sha256, None);
    }

    #[test]
    fn test_curl_comes_first() {
        assert_eq!(DownloadTool::FALLBACK_ORDER[0], DownloadTool::Curl);
        assert_eq!(DownloadTool::FALLBACK_ORDER[1], DownloadTool::Wget);
    }

    #[test]
    fn test_file_args_write_to_dest() {
        let dest = Path::new("/tmp/work/ffmpeg.zip");
        let curl = DownloadTool::Curl.file_args("https://example.com/a.zip", dest);
        assert!(curl.contains(&"-fL".to_string()));
        assert_eq!(curl.last().unwrap(), "https://example.com/a.zip");
        let pos = curl.iter().position(|a| a == "-o").unwrap();
        assert_eq!(curl[pos + 1], "/tmp/work/ffmpeg.zip");

        let wget = DownloadTool::Wget.file_args("https://example.com/a.zip", dest);
        assert_eq!(wget, ["-q", "-O", "/tmp/work/ffmpeg.zip", "https://example.com/a.zip"]);
    }

    #[test]
    fn test_text_args_print_to_stdout() {
        assert_eq!(
            DownloadTool::Wget.text_args("https://example.com/a.sha256"),
            ["-q", "-O", "-", "https://example.com/a.sha256"]
        );
        assert_eq!(
            DownloadTool::Curl.text_args("https://example.com/a.sha256"),
            ["-fsSL", "https://example.com/a.sha256"]
        );
    }

    #[cfg(unix)]
    mod host {
        use crate::download::{Downloader, HostDownloader};
        use std::fs;
        use std::path::Path;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        /// Write an executable shell script named `name` into `dir`.
        fn shim(dir: &Path, name: &str, body: &str) {
            let path = dir.join(name);
            fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }

        /// Downloader that only sees tools present in `dir`.
        fn downloader_in(dir: &Path) -> HostDownloader {
            let dir = dir.to_path_buf();
            HostDownloader::with_locator(move |name| {
                let path = dir.join(name);
                path.is_file().then_some(path)
            })
        }

        // wget args are `-q -O <dest> <url>`; `-` means stdout.
        const WGET_OK: &str =
            "if [ \"$3\" = \"-\" ]; then printf 'payload\\n'; else printf 'payload\\n' > \"$3\"; fi";

        #[test]
        fn test_curl_failure_falls_back_to_wget() {
            let tools = TempDir::new().unwrap();
            shim(tools.path(), "curl", "echo 'could not resolve host' >&2; exit 7");
            shim(tools.path(), "wget", WGET_OK);
            let dest = tools.path().join("ffmpeg.zip");

            downloader_in(tools.path())
                .download("https://example.com/ffmpeg.zip", &dest)
                .unwrap();

            assert_eq!(fs::read_to_string(&dest).unwrap(), "payload\n");
        }

        #[test]
        fn test_fetch_text_falls_back_to_wget() {
            let tools = TempDir::new().unwrap();
            shim(tools.path(), "curl", "exit 22");
            shim(tools.path(), "wget", WGET_OK);

            let text = downloader_in(tools.path())
                .fetch_text("https://example.com/ffmpeg.zip.sha256")
                .unwrap();

            assert_eq!(text, "payload\n");
        }

        #[test]
        fn test_no_download_tool_installed() {
            let tools = TempDir::new().unwrap();
            let dest = tools.path().join("ffmpeg.zip");

            let err = downloader_in(tools.path())
                .download("https://example.com/ffmpeg.zip", &dest)
                .unwrap_err()
                .to_string();

            assert!(err.contains("curl: not installed"), "{}", err);
            assert!(err.contains("wget: not installed"), "{}", err);
            assert!(!dest.exists());
        }

        #[test]
        fn test_all_tools_failing_reports_each() {
            let tools = TempDir::new().unwrap();
            shim(tools.path(), "curl", "echo 'curl: (22) 404' >&2; exit 22");
            shim(tools.path(), "wget", "exit 8");
            let dest = tools.path().join("ffmpeg.zip");

            let err = downloader_in(tools.path())
                .download("https://example.com/ffmpeg.zip", &dest)
                .unwrap_err()
                .to_string();

            assert!(err.contains("Download failed for https://example.com/ffmpeg.zip"));
            assert!(err.contains("curl could not download"), "{}", err);
            assert!(err.contains("wget could not download"), "{}", err);
        }
    }
}
