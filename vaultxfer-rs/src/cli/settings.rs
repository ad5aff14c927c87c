//! Settings commands.

use crate::cli::args::SettingsCommands;
use crate::cli::output::{MessageResponse, Output};
use crate::config::Settings;
use crate::error::{ExitCode, Result};
use std::path::Path;

/// Execute a settings subcommand. `set` saves immediately.
pub fn run(
    settings: &mut Settings,
    settings_path: &Path,
    command: &SettingsCommands,
    output: &Output,
) -> Result<ExitCode> {
    match command {
        SettingsCommands::Show => output.print(&*settings)?,
        SettingsCommands::Set(args) => {
            settings.set(&args.key, &args.value)?;
            settings.save(settings_path)?;
            output.print(
                &MessageResponse::new(format!("{} = {}", args.key, args.value))
                    .with_path(settings_path.to_string_lossy()),
            )?;
        }
        SettingsCommands::Path => {
            output.print(
                &MessageResponse::new("Settings file").with_path(settings_path.to_string_lossy()),
            )?;
        }
    }
    Ok(ExitCode::Success)
}
