//! CLI argument definitions using clap.

use crate::config::ConflictPolicy;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "vaultxfer")]
#[command(author, version, about = "Copy or move notes and their attachments between vaults", long_about = None)]
pub struct Cli {
    /// Source vault (defaults to the current directory)
    #[arg(long, global = true)]
    pub vault: Option<PathBuf>,

    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output as JSON (default)
    #[arg(long, global = true, conflicts_with_all = ["yaml", "toml"])]
    pub json: bool,

    /// Output as YAML
    #[arg(long, global = true, conflicts_with_all = ["json", "toml"])]
    pub yaml: bool,

    /// Output as TOML
    #[arg(long, global = true, conflicts_with_all = ["json", "yaml"])]
    pub toml: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (can be repeated)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn output_format(&self) -> OutputFormat {
        if self.yaml {
            OutputFormat::Yaml
        } else if self.toml {
            OutputFormat::Toml
        } else {
            OutputFormat::Json
        }
    }

    /// Log filter directive for the chosen verbosity.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Toml,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transfer files, deleting originals if delete_after_transfer is set
    Transfer(TransferArgs),

    /// Copy files to another vault (originals kept)
    Copy(TransferArgs),

    /// Move files to another vault (originals deleted)
    Move(TransferArgs),

    /// Manage destination vaults
    #[command(subcommand)]
    Destinations(DestinationCommands),

    /// Show or change settings
    #[command(subcommand)]
    Settings(SettingsCommands),

    /// Show the source vault, a file and the registered destinations
    Info(InfoArgs),
}

// === Transfer ===

#[derive(Parser, Debug)]
pub struct TransferArgs {
    /// Files to transfer (relative to the source vault)
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Destination: registered path, 1-based index, vault name, or a directory
    #[arg(long)]
    pub to: Option<String>,

    /// Conflict policy for this run
    #[arg(long, value_enum)]
    pub conflict: Option<ConflictArg>,

    /// Don't transfer embedded attachments
    #[arg(long)]
    pub no_attachments: bool,

    /// Don't copy timestamps
    #[arg(long)]
    pub no_metadata: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConflictArg {
    Rename,
    Overwrite,
    Skip,
}

impl From<ConflictArg> for ConflictPolicy {
    fn from(arg: ConflictArg) -> Self {
        match arg {
            ConflictArg::Rename => ConflictPolicy::Rename,
            ConflictArg::Overwrite => ConflictPolicy::Overwrite,
            ConflictArg::Skip => ConflictPolicy::Skip,
        }
    }
}

// === Destinations ===

#[derive(Subcommand, Debug)]
pub enum DestinationCommands {
    /// List registered destination vaults
    List,

    /// Register a destination vault
    Add(AddDestinationArgs),

    /// Unregister a destination vault
    Remove(RemoveDestinationArgs),
}

#[derive(Parser, Debug)]
pub struct AddDestinationArgs {
    /// Vault directory
    pub path: PathBuf,
}

#[derive(Parser, Debug)]
pub struct RemoveDestinationArgs {
    /// Registered path or 1-based index
    pub target: String,
}

// === Settings ===

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Print current settings
    Show,

    /// Change a setting
    Set(SetSettingArgs),

    /// Print the settings file location
    Path,
}

#[derive(Parser, Debug)]
pub struct SetSettingArgs {
    /// Setting name
    pub key: String,

    /// New value
    pub value: String,
}

// === Info ===

#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// File to describe (relative to the source vault)
    pub path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_move() {
        let cli = Cli::try_parse_from([
            "vaultxfer", "move", "notes/a.md", "--to", "2", "--conflict", "skip",
        ])
        .unwrap();
        match cli.command {
            Commands::Move(args) => {
                assert_eq!(args.paths, vec![PathBuf::from("notes/a.md")]);
                assert_eq!(args.to.as_deref(), Some("2"));
                assert_eq!(args.conflict, Some(ConflictArg::Skip));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_transfer_requires_path() {
        assert!(Cli::try_parse_from(["vaultxfer", "copy"]).is_err());
    }

    #[test]
    fn test_log_level() {
        let cli = Cli::try_parse_from(["vaultxfer", "-vv", "settings", "show"]).unwrap();
        assert_eq!(cli.log_level(), "debug");
        let cli = Cli::try_parse_from(["vaultxfer", "-q", "settings", "show"]).unwrap();
        assert_eq!(cli.log_level(), "error");
    }
}
