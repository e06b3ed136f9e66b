//! SHA-256 verification of downloaded and extracted files.

use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

/// What to do when no expected digest is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumPolicy {
    /// Abort: the file's provenance must be confirmed.
    Required,
    /// Log the skip and accept the file.
    Optional,
}

/// Lowercase hex SHA-256 of a file's full contents.
pub fn sha256_file(path: &Path) -> Result<String> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {} for checksum", path.display()))?;

    let mut reader = std::io::BufReader::with_capacity(1024 * 1024, file);
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 1024 * 1024];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Verify `path` against `expected`.
///
/// `label` names the artifact in messages; for a missing digest it should
/// mention where the digest comes from (usually the override variable).
pub fn verify(
    path: &Path,
    expected: Option<&str>,
    label: &str,
    policy: ChecksumPolicy,
) -> Result<()> {
    let expected = match expected.map(str::trim).filter(|e| !e.is_empty()) {
        Some(e) => e,
        None => match policy {
            ChecksumPolicy::Optional => {
                tracing::warn!("No SHA-256 for {}, skipping verification", label);
                return Ok(());
            }
            ChecksumPolicy::Required => bail!(
                "No SHA-256 available for {}; refusing to install unverified binaries",
                label
            ),
        },
    };

    let actual = sha256_file(path)?;
    if !actual.eq_ignore_ascii_case(expected) {
        bail!(
            "Checksum mismatch for {} ({})\n  Expected: {}\n  Actual:   {}",
            label,
            path.display(),
            expected,
            actual
        );
    }

    tracing::info!("Checksum OK for {}", label);
    Ok(())
}

/// Pull the digest out of a published `.sha256` file.
///
/// Accepts the bare-digest form and the `sha256sum` form (`<hex>  <name>`).
pub fn parse_sha256_file(content: &str) -> Option<String> {
    let token = content.split_whitespace().next()?;
    if token.len() == 64 && token.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(token.to_ascii_lowercase())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HELLO_WORLD: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    fn hello_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"hello world").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_sha256_file() {
        let file = hello_file();
        assert_eq!(sha256_file(file.path()).unwrap(), HELLO_WORLD);
    }

    #[test]
    fn test_sha256_empty_file() {
        let file = NamedTempFile::new().unwrap();
        assert_eq!(
            sha256_file(file.path()).unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_verify_match_is_case_insensitive() {
        let file = hello_file();
        let upper = HELLO_WORLD.to_uppercase();
        verify(file.path(), Some(&upper), "ffmpeg", ChecksumPolicy::Required).unwrap();
        verify(file.path(), Some(HELLO_WORLD), "ffmpeg", ChecksumPolicy::Optional).unwrap();
    }

    #[test]
    fn test_verify_mismatch_reports_both_digests() {
        let file = hello_file();
        let wrong = "0".repeat(64);
        let err = verify(file.path(), Some(&wrong), "ffprobe", ChecksumPolicy::Optional)
            .unwrap_err()
            .to_string();
        assert!(err.contains("Checksum mismatch for ffprobe"));
        assert!(err.contains(&wrong));
        assert!(err.contains(HELLO_WORLD));
    }

    #[test]
    fn test_missing_digest_required_fails() {
        let file = hello_file();
        let err = verify(file.path(), None, "ffmpeg (FFMPEG_MAC_BIN_SHA256)", ChecksumPolicy::Required)
            .unwrap_err()
            .to_string();
        assert!(err.contains("FFMPEG_MAC_BIN_SHA256"));
        assert!(err.contains("unverified"));
    }

    #[test]
    fn test_missing_digest_optional_skips() {
        let file = hello_file();
        verify(file.path(), None, "ffmpeg", ChecksumPolicy::Optional).unwrap();
        verify(file.path(), Some("  "), "ffmpeg", ChecksumPolicy::Optional).unwrap();
    }

    #[test]
    fn test_verify_missing_file() {
        let err = verify(
            Path::new("/nonexistent/ffmpeg"),
            Some(HELLO_WORLD),
            "ffmpeg",
            ChecksumPolicy::Required,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Failed to open"));
    }

    #[test]
    fn test_parse_sha256_file() {
        assert_eq!(parse_sha256_file(HELLO_WORLD).as_deref(), Some(HELLO_WORLD));
        assert_eq!(
            parse_sha256_file(&format!("{}  ffmpeg-release-essentials.zip\n", HELLO_WORLD.to_uppercase()))
                .as_deref(),
            Some(HELLO_WORLD)
        );
        assert_eq!(parse_sha256_file(""), None);
        assert_eq!(parse_sha256_file("<html>Not Found</html>"), None);
        assert_eq!(parse_sha256_file("abc123"), None);
    }
}
