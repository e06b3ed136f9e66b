//! Shared test utilities for sidecars tests.
#![allow(dead_code)]

use anyhow::{anyhow, Context, Result};
use sha2::{Digest, Sha256};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use sidecars::config::Config;
use sidecars::download::Downloader;
use sidecars::extract::{ArchiveFormat, Extractor};
use sidecars::strategy::Host;

/// Test environment with temporary project, output and temp directories.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    /// Project root simulation
    pub project_dir: PathBuf,
    /// Where sidecars are installed
    pub output_dir: PathBuf,
    /// Parent of every work directory a run creates
    pub temp_root: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let project_dir = temp_dir.path().to_path_buf();
        let output_dir = project_dir.join("binaries");
        let temp_root = project_dir.join("tmp");

        fs::create_dir_all(&temp_root).expect("Failed to create temp root");

        Self {
            _temp_dir: temp_dir,
            project_dir,
            output_dir,
            temp_root,
        }
    }

    /// Configuration pointing at this environment, plus `extra` variables.
    pub fn config(&self, extra: &[(&str, &str)]) -> Config {
        let mut vars: HashMap<String, String> = HashMap::new();
        vars.insert(
            "SIDECAR_OUTPUT_DIR".into(),
            self.output_dir.to_string_lossy().into_owned(),
        );
        vars.insert(
            "SIDECAR_TEMP_DIR".into(),
            self.temp_root.to_string_lossy().into_owned(),
        );
        for (k, v) in extra {
            vars.insert(k.to_string(), v.to_string());
        }
        Config::from_vars(&vars, &self.project_dir)
    }

    pub fn out(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }

    /// Put a file into the output directory.
    pub fn place(&self, name: &str, content: &str) -> PathBuf {
        let path = self.out(name);
        fs::create_dir_all(&self.output_dir).expect("Failed to create output dir");
        fs::write(&path, content).expect("Failed to write output file");
        path
    }

    /// Names left under the temp root (work directories that were not cleaned).
    pub fn leftover_work_dirs(&self) -> Vec<String> {
        fs::read_dir(&self.temp_root)
            .expect("Failed to read temp root")
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }
}

/// Serialize a fake archive: one `path\tcontent` line per file.
///
/// [`FakeExtractor`] expands it back into a directory tree.
pub fn fake_archive(files: &[(&str, &str)]) -> Vec<u8> {
    files
        .iter()
        .map(|(path, content)| format!("{}\t{}\n", path, content))
        .collect::<String>()
        .into_bytes()
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Serves canned bodies by URL and records every request.
#[derive(Default)]
pub struct FakeDownloader {
    files: HashMap<String, Vec<u8>>,
    texts: HashMap<String, String>,
    pub downloads: RefCell<Vec<String>>,
    pub fetches: RefCell<Vec<String>>,
}

impl FakeDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(mut self, url: &str, body: Vec<u8>) -> Self {
        self.files.insert(url.to_string(), body);
        self
    }

    pub fn serve_text(mut self, url: &str, text: &str) -> Self {
        self.texts.insert(url.to_string(), text.to_string());
        self
    }

    pub fn download_count(&self) -> usize {
        self.downloads.borrow().len()
    }

    pub fn request_count(&self) -> usize {
        self.downloads.borrow().len() + self.fetches.borrow().len()
    }
}

impl Downloader for FakeDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        self.downloads.borrow_mut().push(url.to_string());
        let body = self
            .files
            .get(url)
            .ok_or_else(|| anyhow!("404 Not Found: {}", url))?;
        fs::write(dest, body).with_context(|| format!("Failed to write {}", dest.display()))
    }

    fn fetch_text(&self, url: &str) -> Result<String> {
        self.fetches.borrow_mut().push(url.to_string());
        self.texts
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("404 Not Found: {}", url))
    }
}

/// Expands archives produced by [`fake_archive`].
#[derive(Default)]
pub struct FakeExtractor {
    pub extracted: RefCell<Vec<(PathBuf, ArchiveFormat)>>,
}

impl FakeExtractor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Extractor for FakeExtractor {
    fn extract(&self, archive: &Path, format: ArchiveFormat, dest: &Path) -> Result<()> {
        self.extracted
            .borrow_mut()
            .push((archive.to_path_buf(), format));
        let manifest = fs::read_to_string(archive)?;
        for line in manifest.lines() {
            let (rel, content) = line
                .split_once('\t')
                .ok_or_else(|| anyhow!("Corrupt archive {}", archive.display()))?;
            let path = dest.join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, content)?;
        }
        fs::create_dir_all(dest)?;
        Ok(())
    }
}

/// A [`Host`] over the given fakes.
pub fn host<'a>(downloader: &'a FakeDownloader, extractor: &'a FakeExtractor) -> Host<'a> {
    Host::new(downloader, extractor)
}

/// Assert that a symlink exists and points to the expected target.
pub fn assert_symlink(path: &Path, expected_target: &str) {
    assert!(
        path.is_symlink(),
        "Expected symlink at {}, but it's not a symlink",
        path.display()
    );

    let target = fs::read_link(path).expect("Failed to read symlink");
    assert_eq!(
        target.to_string_lossy(),
        expected_target,
        "Symlink {} points to {:?}, expected {}",
        path.display(),
        target,
        expected_target
    );
}

/// Assert that a file exists and has exactly `expected` as content.
pub fn assert_file_content(path: &Path, expected: &str) {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read file {}: {}", path.display(), e));
    assert_eq!(content, expected, "Unexpected content in {}", path.display());
}

/// Assert that a file exists and is executable.
pub fn assert_executable(path: &Path) {
    assert!(
        sidecars::common::is_executable(path),
        "Expected executable file: {}",
        path.display()
    );
}

/// Assert that nothing exists at `path`.
pub fn assert_absent(path: &Path) {
    assert!(
        path.symlink_metadata().is_err(),
        "Expected nothing at {}",
        path.display()
    );
}
