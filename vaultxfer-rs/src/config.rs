//! Persisted settings and the destination vault registry.

use crate::error::{FsOp, Result, TransferError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Strategy for a destination path that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Write next to the existing file as `name (n).ext`.
    #[default]
    Rename,
    /// Replace the existing file.
    Overwrite,
    /// Leave the existing file alone and abort the transfer.
    Skip,
}

impl FromStr for ConflictPolicy {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "rename" => Ok(ConflictPolicy::Rename),
            "overwrite" => Ok(ConflictPolicy::Overwrite),
            "skip" => Ok(ConflictPolicy::Skip),
            other => Err(TransferError::ConfigError(format!(
                "unknown conflict policy '{}' (expected rename, overwrite or skip)",
                other
            ))),
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConflictPolicy::Rename => "rename",
            ConflictPolicy::Overwrite => "overwrite",
            ConflictPolicy::Skip => "skip",
        })
    }
}

/// Ordered set of destination vault roots.
///
/// Insertion order is display order. Duplicates are rejected by [`VaultRegistry::add`]
/// and collapsed when a hand-edited settings file is loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<PathBuf>", into = "Vec<PathBuf>")]
pub struct VaultRegistry {
    roots: Vec<PathBuf>,
}

impl From<Vec<PathBuf>> for VaultRegistry {
    fn from(paths: Vec<PathBuf>) -> Self {
        let mut roots: Vec<PathBuf> = Vec::with_capacity(paths.len());
        for path in paths {
            if !roots.contains(&path) {
                roots.push(path);
            }
        }
        Self { roots }
    }
}

impl From<VaultRegistry> for Vec<PathBuf> {
    fn from(registry: VaultRegistry) -> Self {
        registry.roots
    }
}

impl VaultRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a destination root. Fails if it is already present.
    pub fn add(&mut self, root: impl Into<PathBuf>) -> Result<()> {
        let root = root.into();
        if self.contains(&root) {
            return Err(TransferError::DuplicateDestination(root));
        }
        self.roots.push(root);
        Ok(())
    }

    /// Remove a registered root, returning it.
    pub fn remove(&mut self, root: &Path) -> Option<PathBuf> {
        let index = self.roots.iter().position(|r| r == root)?;
        Some(self.roots.remove(index))
    }

    /// Remove by 1-based display index.
    pub fn remove_index(&mut self, index: usize) -> Option<PathBuf> {
        if index == 0 || index > self.roots.len() {
            return None;
        }
        Some(self.roots.remove(index - 1))
    }

    pub fn contains(&self, root: &Path) -> bool {
        self.roots.iter().any(|r| r == root)
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.roots.iter()
    }

    pub fn as_slice(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Look up by 1-based display index.
    pub fn get(&self, index: usize) -> Option<&PathBuf> {
        index.checked_sub(1).and_then(|i| self.roots.get(i))
    }
}

/// User settings, persisted as TOML.
///
/// Fields missing from the file fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Registered destination vaults.
    pub target_vault_paths: VaultRegistry,
    /// Transfer embedded attachments along with a note.
    pub include_attachments: bool,
    /// Copy access and modification times onto transferred files.
    pub preserve_metadata: bool,
    /// What to do when the destination note already exists.
    pub handle_conflicts: ConflictPolicy,
    /// Remove the source after a successful transfer.
    pub delete_after_transfer: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_vault_paths: VaultRegistry::new(),
            include_attachments: true,
            preserve_metadata: true,
            handle_conflicts: ConflictPolicy::Rename,
            delete_after_transfer: false,
        }
    }
}

/// Settings keys accepted by [`Settings::set`].
pub const SETTING_KEYS: &[&str] = &[
    "include_attachments",
    "preserve_metadata",
    "handle_conflicts",
    "delete_after_transfer",
];

impl Settings {
    /// Default location of the settings file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("vaultxfer")
            .join("config.toml")
    }

    /// Load settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).map_err(|e| TransferError::fs(FsOp::Read, path, e))?;
        Self::parse(&content)
    }

    /// Parse settings from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Write settings to `path`, creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| TransferError::fs(FsOp::CreateDir, parent, e))?;
            }
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| TransferError::fs(FsOp::Write, path, e))?;
        tracing::debug!(path = %path.display(), "settings saved");
        Ok(())
    }

    /// Set a scalar setting from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "include_attachments" => self.include_attachments = parse_bool(key, value)?,
            "preserve_metadata" => self.preserve_metadata = parse_bool(key, value)?,
            "delete_after_transfer" => self.delete_after_transfer = parse_bool(key, value)?,
            "handle_conflicts" => self.handle_conflicts = value.parse()?,
            _ => {
                return Err(TransferError::ConfigError(format!(
                    "unknown setting '{}' (expected one of: {})",
                    key,
                    SETTING_KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(TransferError::ConfigError(format!(
            "{} expects true or false, got '{}'",
            key, value
        ))),
    }
}
