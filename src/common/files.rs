//! Placing binaries and aliases in the output directory.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Create a directory and all parents.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory {}", path.display()))
}

/// Set mode 0755. No-op where Unix permissions don't exist.
pub fn make_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)
            .with_context(|| format!("Failed to get metadata for {}", path.display()))?
            .permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms)
            .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

/// True if `path` has any execute bit set (always true off Unix).
pub fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::metadata(path)
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

/// Copy a verified binary to its canonical destination, overwriting, and
/// mark it executable.
pub fn install_binary(src: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        ensure_dir(parent)?;
    }
    // Replace rather than write through an existing symlink.
    remove_existing(dest)?;
    fs::copy(src, dest)
        .with_context(|| format!("Failed to copy {} to {}", src.display(), dest.display()))?;
    make_executable(dest)
}

/// Point `link` at `target` (relative name), replacing whatever is there.
///
/// Falls back to a copy where symlinks are unavailable.
pub fn replace_symlink(target: &Path, link: &Path) -> Result<()> {
    remove_existing(link)?;

    #[cfg(unix)]
    {
        let relative = target.file_name().map(Path::new).unwrap_or(target);
        std::os::unix::fs::symlink(relative, link).with_context(|| {
            format!(
                "Failed to symlink {} -> {}",
                link.display(),
                relative.display()
            )
        })?;
    }
    #[cfg(not(unix))]
    {
        fs::copy(target, link).with_context(|| {
            format!("Failed to copy {} to {}", target.display(), link.display())
        })?;
    }
    Ok(())
}

/// Copy `src` to `alias`.
///
/// Returns false when `overwrite` is off and the alias already exists.
pub fn place_alias_copy(src: &Path, alias: &Path, overwrite: bool) -> Result<bool> {
    if alias.exists() && !overwrite {
        return Ok(false);
    }
    remove_existing(alias)?;
    fs::copy(src, alias)
        .with_context(|| format!("Failed to copy {} to {}", src.display(), alias.display()))?;
    make_executable(alias)?;
    Ok(true)
}

/// Remove a file or symlink (dangling included). Missing is fine.
pub fn remove_existing(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => {
            anyhow::bail!("Refusing to replace directory {}", path.display())
        }
        Ok(_) => fs::remove_file(path)
            .with_context(|| format!("Failed to remove {}", path.display())),
        Err(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_install_binary_overwrites_and_marks_executable() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("staged");
        let dest = temp.path().join("out/ffmpeg");
        fs::write(&src, "new").unwrap();
        fs::create_dir_all(temp.path().join("out")).unwrap();
        fs::write(&dest, "old").unwrap();

        install_binary(&src, &dest).unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "new");
        assert!(is_executable(&dest));
    }

    #[cfg(unix)]
    #[test]
    fn test_replace_symlink_is_relative_and_idempotent() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("ffmpeg");
        let link = temp.path().join("ffmpeg-aarch64-apple-darwin");
        fs::write(&target, "bin").unwrap();

        replace_symlink(&target, &link).unwrap();
        replace_symlink(&target, &link).unwrap();

        assert_eq!(fs::read_link(&link).unwrap(), Path::new("ffmpeg"));
        assert_eq!(fs::read_to_string(&link).unwrap(), "bin");
    }

    #[cfg(unix)]
    #[test]
    fn test_replace_dangling_symlink() {
        let temp = TempDir::new().unwrap();
        let link = temp.path().join("ffprobe-aarch64-apple-darwin");
        std::os::unix::fs::symlink("missing", &link).unwrap();
        let target = temp.path().join("ffprobe");
        fs::write(&target, "probe").unwrap();

        replace_symlink(&target, &link).unwrap();
        assert_eq!(fs::read_to_string(&link).unwrap(), "probe");
    }

    #[test]
    fn test_place_alias_copy_respects_overwrite() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("ffmpeg.exe");
        let alias = temp.path().join("ffmpeg-x86_64-pc-windows-msvc.exe");
        fs::write(&src, "v2").unwrap();
        fs::write(&alias, "v1").unwrap();

        assert!(!place_alias_copy(&src, &alias, false).unwrap());
        assert_eq!(fs::read_to_string(&alias).unwrap(), "v1");

        assert!(place_alias_copy(&src, &alias, true).unwrap());
        assert_eq!(fs::read_to_string(&alias).unwrap(), "v2");
    }

    #[test]
    fn test_remove_existing_refuses_directories() {
        let temp = TempDir::new().unwrap();
        assert!(remove_existing(temp.path()).is_err());
        remove_existing(&temp.path().join("missing")).unwrap();
    }
}
