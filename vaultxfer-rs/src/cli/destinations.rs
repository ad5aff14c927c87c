//! Destination vault registry commands.

use crate::cli::args::DestinationCommands;
use crate::cli::output::{MessageResponse, Output};
use crate::config::Settings;
use crate::error::{ExitCode, Result, TransferError};
use crate::transfer::selector::{DestinationEntry, DestinationSelector};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub destinations: Vec<DestinationEntry>,
    pub total: usize,
}

/// Execute a destinations subcommand. Mutations are saved to `settings_path`.
pub fn run(
    settings: &mut Settings,
    settings_path: &Path,
    command: &DestinationCommands,
    output: &Output,
) -> Result<ExitCode> {
    match command {
        DestinationCommands::List => {
            let destinations = DestinationSelector::new(&settings.target_vault_paths).list_destinations();
            let total = destinations.len();
            output.print(&ListResponse { destinations, total })?;
        }
        DestinationCommands::Add(args) => {
            let root = add(settings, &args.path)?;
            settings.save(settings_path)?;
            output.print(&MessageResponse::new("Destination added").with_path(root.to_string_lossy()))?;
        }
        DestinationCommands::Remove(args) => {
            let root = remove(settings, &args.target)?;
            settings.save(settings_path)?;
            output.print(
                &MessageResponse::new("Destination removed").with_path(root.to_string_lossy()),
            )?;
        }
    }
    Ok(ExitCode::Success)
}

/// Register an existing directory, stored as an absolute path.
pub fn add(settings: &mut Settings, path: &Path) -> Result<PathBuf> {
    if !path.is_dir() {
        return Err(TransferError::VaultNotFound(path.to_path_buf()));
    }
    let root = std::fs::canonicalize(path)?;
    settings.target_vault_paths.add(root.clone())?;
    tracing::info!(root = %root.display(), "destination registered");
    Ok(root)
}

/// Unregister by 1-based index or path.
pub fn remove(settings: &mut Settings, target: &str) -> Result<PathBuf> {
    let registry = &mut settings.target_vault_paths;

    let removed = match target.trim().parse::<usize>() {
        Ok(index) => registry.remove_index(index),
        Err(_) => {
            let path = Path::new(target);
            registry.remove(path).or_else(|| {
                std::fs::canonicalize(path)
                    .ok()
                    .and_then(|canonical| registry.remove(&canonical))
            })
        }
    };

    removed.ok_or_else(|| TransferError::UnknownDestination(target.to_string()))
}
