//! Destination path resolution.

use crate::error::{FsOp, Result, TransferError};
use crate::vault::ensure_vault_relative;
use std::path::{Path, PathBuf};

/// Join a vault-relative path onto a destination root without touching the filesystem.
pub fn resolve_destination_path(destination_root: &Path, relative_path: &Path) -> Result<PathBuf> {
    ensure_vault_relative(relative_path)?;
    Ok(destination_root.join(relative_path))
}

/// Resolve the absolute destination for `relative_path` and create its parent directories.
pub fn resolve_destination(destination_root: &Path, relative_path: &Path) -> Result<PathBuf> {
    let target = resolve_destination_path(destination_root, relative_path)?;

    if let Some(parent) = target.parent() {
        if !parent.is_dir() {
            tracing::debug!(dir = %parent.display(), "creating destination directory");
            std::fs::create_dir_all(parent)
                .map_err(|e| TransferError::fs(FsOp::CreateDir, parent, e))?;
        }
    }

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let target = resolve_destination(dir.path(), Path::new("a/b/c/note.md")).unwrap();

        assert_eq!(target, dir.path().join("a").join("b").join("c").join("note.md"));
        assert!(dir.path().join("a/b/c").is_dir());
        assert!(!target.exists());
    }

    #[test]
    fn test_existing_directories_are_fine() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("notes")).unwrap();

        resolve_destination(dir.path(), Path::new("notes/a.md")).unwrap();
        resolve_destination(dir.path(), Path::new("notes/a.md")).unwrap();
    }

    #[test]
    fn test_root_level_file() {
        let dir = TempDir::new().unwrap();
        let target = resolve_destination(dir.path(), Path::new("a.md")).unwrap();
        assert_eq!(target, dir.path().join("a.md"));
    }

    #[test]
    fn test_rejects_escaping_paths() {
        let dir = TempDir::new().unwrap();
        let result = resolve_destination(dir.path(), Path::new("../outside.md"));
        assert!(matches!(result, Err(TransferError::InvalidPath(_))));
        assert!(!dir.path().parent().unwrap().join("outside.md").exists());
    }

    #[test]
    fn test_directory_creation_blocked_by_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("notes"), b"not a directory").unwrap();

        let result = resolve_destination(dir.path(), Path::new("notes/a.md"));
        assert!(matches!(
            result,
            Err(TransferError::Filesystem { op: FsOp::CreateDir, .. })
        ));
    }
}
