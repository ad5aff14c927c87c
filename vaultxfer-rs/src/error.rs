//! Error types and exit codes for vaultxfer.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const FILE_NOT_FOUND: i32 = 2;
    pub const NO_DESTINATION: i32 = 3;
    pub const DESTINATION_REQUIRED: i32 = 4;
    pub const CANCELLED: i32 = 5;
    pub const COMPLETED_WITH_WARNINGS: i32 = 6;
}

/// The filesystem operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOp {
    Read,
    Write,
    CreateDir,
    Stat,
    SetTimes,
    Delete,
}

impl fmt::Display for FsOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FsOp::Read => "read",
            FsOp::Write => "write",
            FsOp::CreateDir => "create directory",
            FsOp::Stat => "stat",
            FsOp::SetTimes => "set timestamps on",
            FsOp::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// Main error type for transfer operations.
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("No destination vaults configured. Add one with `vaultxfer destinations add <dir>`")]
    NoDestinations,

    #[error("Unknown destination: {0}")]
    UnknownDestination(String),

    #[error("Destination already registered: {0}")]
    DuplicateDestination(PathBuf),

    #[error("Several destinations are configured, choose one with --to: {}", format_choices(.0))]
    DestinationRequired(Vec<PathBuf>),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Ambiguous attachment '{query}': {count} files match")]
    AmbiguousAttachment {
        query: String,
        count: usize,
        matches: Vec<PathBuf>,
    },

    #[error("Vault not found at: {0}")]
    VaultNotFound(PathBuf),

    #[error("Invalid vault-relative path: {0}")]
    InvalidPath(PathBuf),

    #[error("Destination and source are the same: {0}")]
    DestinationIsSource(PathBuf),

    #[error("Failed to {op} {}: {source}", .path.display())]
    Filesystem {
        op: FsOp,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Transfer cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),
}

fn format_choices(choices: &[PathBuf]) -> String {
    choices
        .iter()
        .enumerate()
        .map(|(i, p)| format!("[{}] {}", i + 1, p.display()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Coarse classification of an error, reported in failed outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    Filesystem,
    NotFound,
    InvalidPath,
    Cancelled,
}

impl TransferError {
    /// Wrap an I/O error with the operation and path it happened on.
    pub fn fs(op: FsOp, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TransferError::Filesystem {
            op,
            path: path.into(),
            source,
        }
    }

    /// Returns the error classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransferError::NoDestinations
            | TransferError::UnknownDestination(_)
            | TransferError::DuplicateDestination(_)
            | TransferError::DestinationRequired(_)
            | TransferError::ConfigError(_)
            | TransferError::TomlParse(_)
            | TransferError::TomlSerialize(_) => ErrorKind::Configuration,
            TransferError::FileNotFound(_)
            | TransferError::AmbiguousAttachment { .. }
            | TransferError::VaultNotFound(_) => ErrorKind::NotFound,
            TransferError::InvalidPath(_)
            | TransferError::DestinationIsSource(_)
            | TransferError::GlobPattern(_) => ErrorKind::InvalidPath,
            TransferError::Cancelled => ErrorKind::Cancelled,
            TransferError::Filesystem { .. }
            | TransferError::Io(_)
            | TransferError::Yaml(_)
            | TransferError::JsonError(_) => ErrorKind::Filesystem,
        }
    }

    /// Returns the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            TransferError::FileNotFound(_) | TransferError::VaultNotFound(_) => {
                exit_code::FILE_NOT_FOUND
            }
            TransferError::NoDestinations | TransferError::UnknownDestination(_) => {
                exit_code::NO_DESTINATION
            }
            TransferError::DestinationRequired(_) => exit_code::DESTINATION_REQUIRED,
            TransferError::Cancelled => exit_code::CANCELLED,
            _ => exit_code::GENERAL_ERROR,
        }
    }
}

/// Result type alias for transfer operations.
pub type Result<T> = std::result::Result<T, TransferError>;

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    GeneralError,
    FileNotFound,
    NoDestination,
    DestinationRequired,
    Cancelled,
    CompletedWithWarnings,
}

impl ExitCode {
    /// Convert to exit code integer.
    pub fn code(self) -> i32 {
        match self {
            ExitCode::Success => exit_code::SUCCESS,
            ExitCode::GeneralError => exit_code::GENERAL_ERROR,
            ExitCode::FileNotFound => exit_code::FILE_NOT_FOUND,
            ExitCode::NoDestination => exit_code::NO_DESTINATION,
            ExitCode::DestinationRequired => exit_code::DESTINATION_REQUIRED,
            ExitCode::Cancelled => exit_code::CANCELLED,
            ExitCode::CompletedWithWarnings => exit_code::COMPLETED_WITH_WARNINGS,
        }
    }
}
