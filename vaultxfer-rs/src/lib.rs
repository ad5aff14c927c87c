//! vaultxfer - copy or move notes between Obsidian-style vaults.
//!
//! # Overview
//!
//! A note is transferred together with the attachments it embeds:
//! - Destination paths mirror the note's vault-relative path
//! - Existing destinations are renamed around (`note (1).md`), overwritten or skipped
//! - Access and modification times are carried over
//! - Move semantics delete the originals once their copies are written
//!
//! Every call returns a [`TransferOutcome`]; attachment failures are collected
//! on the report instead of aborting the note.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use vaultxfer::{ConflictPolicy, Orchestrator, TransferOptions, Vault};
//!
//! let vault = Vault::new("/path/to/source").unwrap();
//! let orchestrator = Orchestrator::new(&vault, TransferOptions::default());
//!
//! let outcome = orchestrator.transfer_path(
//!     Path::new("notes/a.md"),
//!     Path::new("/path/to/destination"),
//!     false,
//!     ConflictPolicy::Rename,
//! );
//! println!("{:?}", outcome);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod parser;
pub mod transfer;
pub mod types;
pub mod vault;

// Re-export main types at crate root
pub use config::{ConflictPolicy, Settings, VaultRegistry};
pub use error::{Result, TransferError};
pub use transfer::{DestinationSelector, Orchestrator, Selection};
pub use types::*;
pub use vault::Vault;
