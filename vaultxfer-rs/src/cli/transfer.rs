//! Transfer, copy and move commands.

use crate::cli::args::TransferArgs;
use crate::cli::output::Output;
use crate::cli::prompt::choose_destination;
use crate::config::Settings;
use crate::error::{ErrorKind, ExitCode, Result};
use crate::transfer::{DestinationSelector, Orchestrator, Selection};
use crate::types::{TransferOptions, TransferOutcome, TransferWarning};
use crate::vault::Vault;
use serde::Serialize;
use std::path::PathBuf;

/// How the source is treated after a successful transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Follow `delete_after_transfer`.
    Configured,
    /// Always keep the source.
    Copy,
    /// Always delete the source.
    Move,
}

impl Mode {
    fn delete_original(self, settings: &Settings) -> bool {
        match self {
            Mode::Configured => settings.delete_after_transfer,
            Mode::Copy => false,
            Mode::Move => true,
        }
    }
}

/// Output for the transfer commands.
#[derive(Debug, Serialize)]
pub struct TransferResponse {
    pub source_vault: PathBuf,
    pub destination: PathBuf,
    pub moved: bool,
    pub outcomes: Vec<TransferOutcome>,
}

/// Execute a transfer command.
///
/// The destination is settled before `open_source` touches the filesystem.
pub fn run(
    settings: &Settings,
    args: &TransferArgs,
    mode: Mode,
    output: &Output,
    open_source: impl FnOnce() -> Result<Vault>,
) -> Result<ExitCode> {
    let delete_original = mode.delete_original(settings);
    let action = if delete_original { "move" } else { "copy" };

    let selector = DestinationSelector::new(&settings.target_vault_paths);
    let destination = match selector.select(args.to.as_deref())? {
        Selection::Chosen(root) => root,
        Selection::Choose(_) => choose_destination(&selector, action)?,
    };
    let vault = open_source()?;

    let policy = args
        .conflict
        .map(Into::into)
        .unwrap_or(settings.handle_conflicts);

    let mut options = TransferOptions::from(settings);
    if args.no_attachments {
        options.include_attachments = false;
    }
    if args.no_metadata {
        options.preserve_metadata = false;
    }

    let orchestrator = Orchestrator::new(&vault, options);
    let outcomes: Vec<TransferOutcome> = args
        .paths
        .iter()
        .map(|path| orchestrator.transfer_path(path, &destination, delete_original, policy))
        .collect();

    report_to_user(&outcomes, action, output);
    let code = exit_code_for(&outcomes);

    let response = TransferResponse {
        source_vault: vault.root.clone(),
        destination,
        moved: delete_original,
        outcomes,
    };
    output.print(&response)?;

    Ok(code)
}

/// A line for stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Notice {
    Info(String),
    Warn(String),
}

fn report_to_user(outcomes: &[TransferOutcome], action: &str, output: &Output) {
    for notice in notices(outcomes, action) {
        match notice {
            Notice::Info(message) => output.info(&message),
            Notice::Warn(message) => output.warn(&message),
        }
    }
}

fn notices(outcomes: &[TransferOutcome], action: &str) -> Vec<Notice> {
    let mut notices = Vec::new();
    for outcome in outcomes {
        match outcome {
            TransferOutcome::Success(report) => {
                let name = report
                    .final_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                if report.original_kept() {
                    notices.push(Notice::Warn(format!(
                        "{} was transferred as {}, but the original was not deleted",
                        report.source_path.display(),
                        name
                    )));
                } else {
                    let verb = if report.deleted_original { "Moved" } else { "Copied" };
                    notices.push(Notice::Info(format!(
                        "{} {} -> {}",
                        verb,
                        report.source_path.display(),
                        name
                    )));
                }
                for warning in &report.warnings {
                    if let TransferWarning::MetadataNotPreserved { .. } = warning {
                        notices.push(Notice::Warn(warning.message()));
                    }
                }
                for failed in &report.attachments.failed {
                    notices.push(Notice::Warn(format!(
                        "attachment '{}' not transferred: {}",
                        failed.reference, failed.message
                    )));
                }
                for attachment in &report.attachments.transferred {
                    for warning in &attachment.warnings {
                        notices.push(Notice::Warn(format!(
                            "attachment '{}': {}",
                            attachment.reference,
                            warning.message()
                        )));
                    }
                }
            }
            TransferOutcome::Skipped { reason, .. } => {
                notices.push(Notice::Info(format!("Skipped ({}): {}", action, reason)));
            }
            TransferOutcome::Failed { source_path, message, .. } => {
                notices.push(Notice::Warn(format!(
                    "failed to {} {}: {}",
                    action,
                    source_path.display(),
                    message
                )));
            }
        }
    }
    notices
}

/// First failure decides the exit code; otherwise warnings, otherwise success.
fn exit_code_for(outcomes: &[TransferOutcome]) -> ExitCode {
    let first_failure = outcomes.iter().find_map(|o| match o {
        TransferOutcome::Failed { kind, .. } => Some(*kind),
        _ => None,
    });

    match first_failure {
        Some(ErrorKind::NotFound) => ExitCode::FileNotFound,
        Some(ErrorKind::Cancelled) => ExitCode::Cancelled,
        Some(_) => ExitCode::GeneralError,
        None => {
            let warned = outcomes
                .iter()
                .filter_map(TransferOutcome::report)
                .any(|r| r.has_warnings());
            if warned {
                ExitCode::CompletedWithWarnings
            } else {
                ExitCode::Success
            }
        }
    }
}
