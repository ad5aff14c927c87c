//! Info command: source vault, a file, and where it could go.

use crate::cli::output::Output;
use crate::config::Settings;
use crate::error::{ExitCode, Result};
use crate::parser::{extract_attachment_refs, AttachmentRef};
use crate::transfer::selector::{DestinationEntry, DestinationSelector};
use crate::types::FileKind;
use crate::vault::{FileInfo, Vault};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
pub struct InfoOutput {
    pub vault: VaultSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<FileDetails>,
    pub destinations: Vec<DestinationEntry>,
}

#[derive(Debug, Serialize)]
pub struct VaultSummary {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct FileDetails {
    #[serde(flatten)]
    pub info: FileInfo,
    pub kind: FileKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AttachmentRef>,
}

/// Execute the info command.
pub fn info(
    vault: &Vault,
    settings: &Settings,
    path: Option<&Path>,
    output: &Output,
) -> Result<ExitCode> {
    let file = match path {
        Some(path) => Some(file_details(vault, path)?),
        None => None,
    };

    let result = InfoOutput {
        vault: VaultSummary {
            name: vault.name(),
            path: vault.root.clone(),
        },
        file,
        destinations: DestinationSelector::new(&settings.target_vault_paths).list_destinations(),
    };

    if result.destinations.is_empty() {
        output.warn("no destination vaults configured");
    }
    output.print(&result)?;
    Ok(ExitCode::Success)
}

fn file_details(vault: &Vault, path: &Path) -> Result<FileDetails> {
    let relative = vault.relative_path(path)?;
    let info = vault.file_info(&relative)?;
    let kind = FileKind::from_path(&relative);

    let attachments = if kind == FileKind::Note {
        let content = vault.read_binary(&relative)?;
        extract_attachment_refs(&String::from_utf8_lossy(&content))
    } else {
        Vec::new()
    };

    Ok(FileDetails {
        info,
        kind,
        attachments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_details_lists_attachments() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("notes")).unwrap();
        std::fs::write(
            dir.path().join("notes/a.md"),
            "![[pic.png]] ![x](https://example.com/y.png)",
        )
        .unwrap();
        let vault = Vault::new(dir.path()).unwrap();

        let details = file_details(&vault, Path::new("notes/a.md")).unwrap();
        assert_eq!(details.kind, FileKind::Note);
        assert_eq!(details.attachments.len(), 1);
        assert_eq!(details.attachments[0].target, "pic.png");
    }
}
