//! File-system resource helpers.
use anyhow::{Context as _, Result};
use sha2::{Digest as _, Sha256};
use std::io::Write as _;
use std::path::Path;

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Whether anything (including a broken symlink) exists at `path`.
#[must_use]
pub fn path_present(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Remove whatever lives at `path`: a file, a symlink, or a whole directory
/// tree. Symlinks are removed without touching their target.
///
/// Returns `true` if something was removed.
///
/// # Errors
///
/// Returns an error if the path exists but cannot be removed.
pub fn remove_any(path: &Path) -> Result<bool> {
    let Ok(meta) = path.symlink_metadata() else {
        return Ok(false);
    };
    if meta.is_dir() {
        std::fs::remove_dir_all(path)
            .with_context(|| format!("remove directory: {}", path.display()))?;
    } else {
        std::fs::remove_file(path).with_context(|| format!("remove: {}", path.display()))?;
    }
    Ok(true)
}

/// SHA-256 of a byte slice as lowercase hex.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// SHA-256 of the file at `path`, or `None` if it cannot be read.
#[must_use]
pub fn file_sha256(path: &Path) -> Option<String> {
    std::fs::read(path).ok().map(|bytes| sha256_hex(&bytes))
}

/// Write `contents` to `path` by staging a sibling temporary file and
/// renaming it over the destination, so readers never see a partial file.
///
/// # Errors
///
/// Returns an error if the parent cannot be created, the temporary file
/// cannot be written, or the rename fails.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    ensure_parent_dir(path)?;
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let mut staged = tempfile::Builder::new()
        .prefix(".dotsetup-")
        .suffix(".tmp")
        .tempfile_in(parent)
        .with_context(|| format!("stage temp file in {}", parent.display()))?;
    staged
        .write_all(contents)
        .with_context(|| format!("write staged copy of {}", path.display()))?;
    staged
        .persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("rename staged file onto {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // ensure_parent_dir
    // -----------------------------------------------------------------------

    #[test]
    fn ensure_parent_dir_creates_missing_parents() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("file.txt");
        ensure_parent_dir(&nested).unwrap();
        assert!(dir.path().join("a").join("b").exists());
    }

    // -----------------------------------------------------------------------
    // remove_any
    // -----------------------------------------------------------------------

    #[test]
    fn remove_any_removes_directory_tree() {
        let dir = tempfile::tempdir().unwrap();
        let tree = dir.path().join("tree");
        std::fs::create_dir_all(tree.join("nested")).unwrap();
        std::fs::write(tree.join("nested/file"), "x").unwrap();
        assert!(remove_any(&tree).unwrap());
        assert!(!path_present(&tree));
    }

    #[test]
    fn remove_any_noop_when_path_absent() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!remove_any(&dir.path().join("nonexistent")).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn remove_any_keeps_symlink_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("real");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep"), "x").unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();
        assert!(remove_any(&link).unwrap());
        assert!(!path_present(&link));
        assert!(target.join("keep").exists(), "link target must survive");
    }

    #[cfg(unix)]
    #[test]
    fn remove_any_removes_broken_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink("/nonexistent/target", &link).unwrap();
        assert!(remove_any(&link).unwrap());
        assert!(link.symlink_metadata().is_err());
    }

    // -----------------------------------------------------------------------
    // hashing and atomic writes
    // -----------------------------------------------------------------------

    #[test]
    fn sha256_of_known_input() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn write_atomic_replaces_contents_and_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/palette.json");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("out"))
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn file_sha256_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(file_sha256(&dir.path().join("absent")), None);
    }
}
