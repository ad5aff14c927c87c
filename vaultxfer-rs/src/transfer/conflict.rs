//! Conflict resolution for destination paths that already exist.

use crate::config::ConflictPolicy;
use std::path::{Path, PathBuf};

/// Decide where to write when `candidate` already exists.
///
/// Returns `None` when the transfer should be skipped.
pub fn resolve_conflict(candidate: &Path, file_name: &str, policy: ConflictPolicy) -> Option<PathBuf> {
    resolve_conflict_with(candidate, file_name, policy, |p| p.exists())
}

/// [`resolve_conflict`] with a caller-supplied existence check.
pub fn resolve_conflict_with<F>(
    candidate: &Path,
    file_name: &str,
    policy: ConflictPolicy,
    exists: F,
) -> Option<PathBuf>
where
    F: Fn(&Path) -> bool,
{
    match policy {
        ConflictPolicy::Overwrite => Some(candidate.to_path_buf()),
        ConflictPolicy::Skip => None,
        ConflictPolicy::Rename => {
            let dir = candidate.parent().unwrap_or_else(|| Path::new(""));
            let (stem, ext) = split_file_name(file_name);

            (1u64..)
                .map(|n| dir.join(format!("{} ({}){}", stem, n, ext)))
                .find(|path| !exists(path))
        }
    }
}

/// Split `name.ext` into `("name", ".ext")`. Dotfiles have no extension.
fn split_file_name(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(0) | None => (file_name, ""),
        Some(i) => file_name.split_at(i),
    }
}
