//! Source vault access.

use crate::error::{FsOp, Result, TransferError};
use glob::{Pattern, glob};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// A vault that files are transferred out of.
#[derive(Debug, Clone)]
pub struct Vault {
    /// Root path of the vault.
    pub root: PathBuf,
}

impl Vault {
    /// Open a vault rooted at an existing directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.is_dir() {
            return Err(TransferError::VaultNotFound(root));
        }

        Ok(Self { root })
    }

    /// Display name of the vault (its directory name).
    pub fn name(&self) -> String {
        display_name(&self.root)
    }

    /// Get the full path to a file.
    pub fn file_path(&self, relative_path: &Path) -> PathBuf {
        self.root.join(relative_path)
    }

    /// Turn user input into a vault-relative path.
    ///
    /// Absolute paths inside the vault are made relative. Paths that leave the
    /// vault are rejected.
    pub fn relative_path(&self, input: &Path) -> Result<PathBuf> {
        let relative = if input.is_absolute() {
            input
                .strip_prefix(&self.root)
                .map_err(|_| TransferError::InvalidPath(input.to_path_buf()))?
                .to_path_buf()
        } else {
            input.to_path_buf()
        };
        ensure_vault_relative(&relative)?;
        Ok(relative)
    }

    /// Check if a file exists.
    pub fn file_exists(&self, relative_path: &Path) -> bool {
        self.file_path(relative_path).is_file()
    }

    /// Read a file's bytes.
    pub fn read_binary(&self, relative_path: &Path) -> Result<Vec<u8>> {
        if !self.file_exists(relative_path) {
            return Err(TransferError::FileNotFound(relative_path.to_path_buf()));
        }
        let full_path = self.file_path(relative_path);
        std::fs::read(&full_path).map_err(|e| TransferError::fs(FsOp::Read, full_path, e))
    }

    /// Delete a file. Deleting a file that is already gone is not an error.
    pub fn delete_file(&self, relative_path: &Path) -> Result<()> {
        let full_path = self.file_path(relative_path);
        match std::fs::remove_file(&full_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TransferError::fs(FsOp::Delete, full_path, e)),
        }
    }

    /// List every non-hidden file in the vault, sorted.
    pub fn list_files(&self) -> Result<Vec<PathBuf>> {
        // Folder names may contain glob metacharacters
        let root = Pattern::escape(&self.root.to_string_lossy());
        let pattern = Path::new(&root).join("**/*");

        let mut files = Vec::new();

        for entry in glob(&pattern.to_string_lossy())? {
            match entry {
                Ok(path) => {
                    if !path.is_file() {
                        continue;
                    }
                    if let Ok(relative) = path.strip_prefix(&self.root) {
                        // Skip .obsidian, .trash and other hidden entries
                        if !relative
                            .components()
                            .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
                        {
                            files.push(relative.to_path_buf());
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "glob error while listing vault");
                }
            }
        }

        files.sort();
        Ok(files)
    }

    /// Resolve an attachment reference to a vault-relative path.
    ///
    /// Tries the reference as an exact path first, then looks for a unique file
    /// with the same name anywhere in the vault.
    pub fn resolve_attachment(&self, reference: &str) -> Result<PathBuf> {
        let reference = reference.trim();
        let exact = PathBuf::from(reference);
        if ensure_vault_relative(&exact).is_ok() && self.file_exists(&exact) {
            return Ok(exact);
        }

        let wanted = match exact.file_name() {
            Some(name) => nfc(&name.to_string_lossy()),
            None => return Err(TransferError::FileNotFound(exact)),
        };

        let matches: Vec<PathBuf> = self
            .list_files()?
            .into_iter()
            .filter(|path| {
                path.file_name()
                    .map(|name| nfc(&name.to_string_lossy()) == wanted)
                    .unwrap_or(false)
            })
            .collect();

        match matches.len() {
            0 => Err(TransferError::FileNotFound(exact)),
            1 => Ok(matches.into_iter().next().unwrap_or(exact)),
            count => Err(TransferError::AmbiguousAttachment {
                query: reference.to_string(),
                count,
                matches,
            }),
        }
    }

    /// Get file info for a path.
    pub fn file_info(&self, relative_path: &Path) -> Result<FileInfo> {
        FileInfo::from_path(&self.root, relative_path)
    }
}

/// Reject absolute paths and `..` components.
pub fn ensure_vault_relative(path: &Path) -> Result<()> {
    let escapes = path.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes || path.as_os_str().is_empty() {
        return Err(TransferError::InvalidPath(path.to_path_buf()));
    }
    Ok(())
}

/// Directory base name used when listing vaults.
pub fn display_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.to_string_lossy().into_owned())
}

fn nfc(s: &str) -> String {
    s.nfc().collect()
}

/// Summary of a file in the vault.
#[derive(Debug, Clone, Serialize)]
pub struct FileInfo {
    pub path: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessed: Option<String>,
    pub size_bytes: u64,
}

impl FileInfo {
    pub fn from_path(vault_root: &Path, relative_path: &Path) -> Result<Self> {
        let full_path = vault_root.join(relative_path);
        let metadata = std::fs::metadata(&full_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TransferError::FileNotFound(relative_path.to_path_buf())
            } else {
                TransferError::fs(FsOp::Stat, &full_path, e)
            }
        })?;

        let modified = metadata
            .modified()
            .ok()
            .map(|t| chrono::DateTime::<chrono::Utc>::from(t).to_rfc3339());

        let accessed = metadata
            .accessed()
            .ok()
            .map(|t| chrono::DateTime::<chrono::Utc>::from(t).to_rfc3339());

        let name = relative_path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();

        Ok(Self {
            path: relative_path.to_string_lossy().to_string(),
            name,
            modified,
            accessed,
            size_bytes: metadata.len(),
        })
    }
}
