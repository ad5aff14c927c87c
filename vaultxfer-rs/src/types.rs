//! Shared types for vaultxfer.

use crate::config::{ConflictPolicy, Settings};
use crate::error::{ErrorKind, TransferError};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What kind of file a transfer is moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// A markdown note. Subject to conflict resolution; its embeds are followed.
    Note,
    /// Any other file. Always overwrites at the destination.
    Attachment,
}

impl FileKind {
    /// Classify a path by extension: `.md` is a note, everything else an attachment.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("md") => FileKind::Note,
            _ => FileKind::Attachment,
        }
    }
}

/// One file transfer.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    /// Source path relative to the source vault root.
    pub source_path: PathBuf,
    /// Bytes read from the source.
    pub content: Vec<u8>,
    /// Absolute root of the destination vault.
    pub destination_root: PathBuf,
    /// Move semantics: delete the source once the copy is written.
    pub delete_original: bool,
    pub conflict_policy: ConflictPolicy,
    pub kind: FileKind,
}

impl TransferRequest {
    /// Build a request, classifying the file by its extension.
    pub fn new(
        source_path: impl Into<PathBuf>,
        content: Vec<u8>,
        destination_root: impl Into<PathBuf>,
    ) -> Self {
        let source_path = source_path.into();
        let kind = FileKind::from_path(&source_path);
        Self {
            source_path,
            content,
            destination_root: destination_root.into(),
            delete_original: false,
            conflict_policy: ConflictPolicy::default(),
            kind,
        }
    }

    pub fn delete_original(mut self, delete: bool) -> Self {
        self.delete_original = delete;
        self
    }

    pub fn conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    pub fn kind(mut self, kind: FileKind) -> Self {
        self.kind = kind;
        self
    }

    /// File name component of the source path.
    pub fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Engine switches taken from [`Settings`] at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOptions {
    pub include_attachments: bool,
    pub preserve_metadata: bool,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            include_attachments: true,
            preserve_metadata: true,
        }
    }
}

impl From<&Settings> for TransferOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            include_attachments: settings.include_attachments,
            preserve_metadata: settings.preserve_metadata,
        }
    }
}

/// A non-fatal problem encountered during an otherwise successful transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransferWarning {
    /// Timestamps could not be copied onto the destination.
    MetadataNotPreserved { message: String },
    /// The copy was written but the source could not be removed.
    OriginalNotDeleted { path: PathBuf, message: String },
}

impl TransferWarning {
    pub fn message(&self) -> String {
        match self {
            TransferWarning::MetadataNotPreserved { message } => {
                format!("timestamps not preserved: {}", message)
            }
            TransferWarning::OriginalNotDeleted { path, message } => format!(
                "transferred, but the original {} was not removed: {}",
                path.display(),
                message
            ),
        }
    }
}

/// An attachment that was written to the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferredAttachment {
    /// The reference as written in the note.
    pub reference: String,
    /// Resolved path in the source vault.
    pub source_path: PathBuf,
    /// Absolute path written at the destination.
    pub destination_path: PathBuf,
    /// Whether the source attachment was removed (move semantics).
    pub deleted_original: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<TransferWarning>,
}

/// An attachment that could not be transferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedAttachment {
    pub reference: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl FailedAttachment {
    pub fn from_error(reference: impl Into<String>, error: &TransferError) -> Self {
        Self {
            reference: reference.into(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Per-attachment results of one note transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttachmentSummary {
    pub transferred: Vec<TransferredAttachment>,
    pub failed: Vec<FailedAttachment>,
}

impl AttachmentSummary {
    pub fn is_empty(&self) -> bool {
        self.transferred.is_empty() && self.failed.is_empty()
    }

    /// True if any attachment failed or carries a warning.
    pub fn has_problems(&self) -> bool {
        !self.failed.is_empty() || self.transferred.iter().any(|a| !a.warnings.is_empty())
    }
}

/// Details of a successful transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferReport {
    pub source_path: PathBuf,
    /// Absolute path the content was written to.
    pub final_path: PathBuf,
    /// True when the conflict resolver picked a `name (n).ext` path.
    pub renamed: bool,
    /// True when the source file was removed.
    pub deleted_original: bool,
    #[serde(skip_serializing_if = "AttachmentSummary::is_empty")]
    pub attachments: AttachmentSummary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<TransferWarning>,
}

impl TransferReport {
    /// True if anything short of a clean transfer happened.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty() || self.attachments.has_problems()
    }

    /// True if the caller asked for a move but the source still exists.
    pub fn original_kept(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, TransferWarning::OriginalNotDeleted { .. }))
    }
}

/// Result of one orchestrator call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransferOutcome {
    Success(TransferReport),
    Skipped { source_path: PathBuf, reason: String },
    Failed {
        source_path: PathBuf,
        kind: ErrorKind,
        message: String,
    },
}

impl TransferOutcome {
    pub fn failed(source_path: impl Into<PathBuf>, error: &TransferError) -> Self {
        TransferOutcome::Failed {
            source_path: source_path.into(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TransferOutcome::Success(_))
    }

    pub fn report(&self) -> Option<&TransferReport> {
        match self {
            TransferOutcome::Success(report) => Some(report),
            _ => None,
        }
    }
}
