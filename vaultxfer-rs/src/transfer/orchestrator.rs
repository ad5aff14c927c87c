//! Runs one file transfer from the source vault to a destination vault.
//!
//! Order of work for a note: resolve destination, resolve conflicts, write,
//! copy timestamps, transfer embedded attachments, delete the source. Only
//! failures up to and including the write abort the call. Everything after
//! that is reported as a warning or an attachment failure on the report.
//!
//! Writes are plain overwrites. Two transfers racing on the same destination
//! can both see it as free and both write; nothing here locks.

use crate::config::ConflictPolicy;
use crate::error::{FsOp, Result, TransferError};
use crate::parser::extract_attachment_refs;
use crate::transfer::conflict::resolve_conflict;
use crate::transfer::path::resolve_destination;
use crate::types::{
    AttachmentSummary, FailedAttachment, FileKind, TransferOptions, TransferOutcome,
    TransferReport, TransferRequest, TransferWarning, TransferredAttachment,
};
use crate::vault::Vault;
use filetime::FileTime;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Transfers files out of one source vault.
#[derive(Debug, Clone)]
pub struct Orchestrator<'a> {
    source: &'a Vault,
    options: TransferOptions,
}

impl<'a> Orchestrator<'a> {
    pub fn new(source: &'a Vault, options: TransferOptions) -> Self {
        Self { source, options }
    }

    pub fn options(&self) -> TransferOptions {
        self.options
    }

    /// Read `relative_path` from the source vault into a request.
    pub fn request(
        &self,
        relative_path: &Path,
        destination_root: &Path,
    ) -> Result<TransferRequest> {
        let relative = self.source.relative_path(relative_path)?;
        let content = self.source.read_binary(&relative)?;
        Ok(TransferRequest::new(relative, content, destination_root))
    }

    /// Read and transfer a file in one step.
    pub fn transfer_path(
        &self,
        relative_path: &Path,
        destination_root: &Path,
        delete_original: bool,
        conflict_policy: ConflictPolicy,
    ) -> TransferOutcome {
        match self.request(relative_path, destination_root) {
            Ok(request) => self.transfer(
                &request
                    .delete_original(delete_original)
                    .conflict_policy(conflict_policy),
            ),
            Err(e) => {
                tracing::warn!(path = %relative_path.display(), error = %e, "could not read source");
                TransferOutcome::failed(relative_path, &e)
            }
        }
    }

    /// Transfer one file. Always returns exactly one outcome.
    pub fn transfer(&self, request: &TransferRequest) -> TransferOutcome {
        match self.try_transfer(request) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(
                    path = %request.source_path.display(),
                    error = %e,
                    "transfer failed"
                );
                TransferOutcome::failed(&request.source_path, &e)
            }
        }
    }

    fn try_transfer(&self, request: &TransferRequest) -> Result<TransferOutcome> {
        if same_file(&request.destination_root, &self.source.root) {
            return Err(TransferError::DestinationIsSource(request.destination_root.clone()));
        }
        let candidate = resolve_destination(&request.destination_root, &request.source_path)?;

        let (final_path, renamed) = match self.choose_destination(request, candidate) {
            Some(chosen) => chosen,
            None => {
                let reason = format!(
                    "{} already exists in {}",
                    request.source_path.display(),
                    request.destination_root.display()
                );
                tracing::info!(path = %request.source_path.display(), "skipped: destination exists");
                return Ok(TransferOutcome::Skipped {
                    source_path: request.source_path.clone(),
                    reason,
                });
            }
        };

        self.ensure_distinct(&request.source_path, &final_path)?;
        let mut warnings = self.write(request, &final_path)?;

        let attachments = if self.options.include_attachments && request.kind == FileKind::Note {
            self.transfer_attachments(request)
        } else {
            AttachmentSummary::default()
        };

        let deleted_original = self.remove_original(request, &mut warnings);

        tracing::info!(
            from = %request.source_path.display(),
            to = %final_path.display(),
            renamed,
            deleted_original,
            attachments = attachments.transferred.len(),
            failed_attachments = attachments.failed.len(),
            "transferred"
        );

        Ok(TransferOutcome::Success(TransferReport {
            source_path: request.source_path.clone(),
            final_path,
            renamed,
            deleted_original,
            attachments,
            warnings,
        }))
    }

    /// Apply the conflict policy. Attachments always overwrite.
    fn choose_destination(
        &self,
        request: &TransferRequest,
        candidate: PathBuf,
    ) -> Option<(PathBuf, bool)> {
        if request.kind == FileKind::Attachment || !candidate.exists() {
            return Some((candidate, false));
        }

        let resolved = resolve_conflict(&candidate, &request.file_name(), request.conflict_policy)?;
        let renamed = resolved != candidate;
        if renamed {
            tracing::debug!(
                existing = %candidate.display(),
                chosen = %resolved.display(),
                "destination exists, renaming"
            );
        }
        Some((resolved, renamed))
    }

    /// Refuse a destination that is the source file under another name.
    fn ensure_distinct(&self, relative_source: &Path, destination: &Path) -> Result<()> {
        if same_file(&self.source.file_path(relative_source), destination) {
            return Err(TransferError::DestinationIsSource(destination.to_path_buf()));
        }
        Ok(())
    }

    /// Write content and, if enabled, timestamps. Returns timestamp warnings.
    fn write(&self, request: &TransferRequest, destination: &Path) -> Result<Vec<TransferWarning>> {
        std::fs::write(destination, &request.content)
            .map_err(|e| TransferError::fs(FsOp::Write, destination, e))?;

        let mut warnings = Vec::new();
        if self.options.preserve_metadata {
            if let Err(e) = self.copy_timestamps(&request.source_path, destination) {
                tracing::warn!(
                    path = %destination.display(),
                    error = %e,
                    "could not preserve timestamps"
                );
                warnings.push(TransferWarning::MetadataNotPreserved {
                    message: e.to_string(),
                });
            }
        }
        Ok(warnings)
    }

    fn copy_timestamps(&self, relative_source: &Path, destination: &Path) -> Result<()> {
        let source = self.source.file_path(relative_source);
        let metadata =
            std::fs::metadata(&source).map_err(|e| TransferError::fs(FsOp::Stat, &source, e))?;
        let atime = FileTime::from_last_access_time(&metadata);
        let mtime = FileTime::from_last_modification_time(&metadata);
        filetime::set_file_times(destination, atime, mtime)
            .map_err(|e| TransferError::fs(FsOp::SetTimes, destination, e))
    }

    /// Delete the source if requested. Failure becomes a warning.
    fn remove_original(&self, request: &TransferRequest, warnings: &mut Vec<TransferWarning>) -> bool {
        if !request.delete_original {
            return false;
        }
        match self.source.delete_file(&request.source_path) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    path = %request.source_path.display(),
                    error = %e,
                    "copy written but original not removed"
                );
                warnings.push(TransferWarning::OriginalNotDeleted {
                    path: request.source_path.clone(),
                    message: e.to_string(),
                });
                false
            }
        }
    }

    /// Transfer every distinct attachment embedded in a note.
    fn transfer_attachments(&self, note: &TransferRequest) -> AttachmentSummary {
        let text = String::from_utf8_lossy(&note.content);
        let mut summary = AttachmentSummary::default();
        let mut seen_refs: HashSet<String> = HashSet::new();
        let mut seen_paths: HashSet<PathBuf> = HashSet::new();
        seen_paths.insert(note.source_path.clone());

        for reference in extract_attachment_refs(&text) {
            if !seen_refs.insert(reference.target.clone()) {
                continue;
            }

            let source_path = match self.source.resolve_attachment(&reference.target) {
                Ok(path) => path,
                Err(TransferError::FileNotFound(_))
                    if Path::new(&reference.target).extension().is_none() =>
                {
                    // `![[Other Note]]` embeds a note, not a file
                    tracing::debug!(reference = %reference.target, "embed is not a file, ignoring");
                    continue;
                }
                Err(e) => {
                    tracing::warn!(reference = %reference.target, error = %e, "attachment not transferred");
                    summary
                        .failed
                        .push(FailedAttachment::from_error(&reference.target, &e));
                    continue;
                }
            };
            if !seen_paths.insert(source_path.clone()) {
                continue;
            }

            match self.transfer_attachment(&reference.target, source_path, note) {
                Ok(done) => summary.transferred.push(done),
                Err(e) => {
                    tracing::warn!(reference = %reference.target, error = %e, "attachment not transferred");
                    summary
                        .failed
                        .push(FailedAttachment::from_error(&reference.target, &e));
                }
            }
        }

        summary
    }

    fn transfer_attachment(
        &self,
        reference: &str,
        source_path: PathBuf,
        note: &TransferRequest,
    ) -> Result<TransferredAttachment> {
        let content = self.source.read_binary(&source_path)?;
        let request = TransferRequest::new(source_path, content, &note.destination_root)
            .kind(FileKind::Attachment)
            .conflict_policy(ConflictPolicy::Overwrite)
            .delete_original(note.delete_original);

        let destination = resolve_destination(&request.destination_root, &request.source_path)?;
        self.ensure_distinct(&request.source_path, &destination)?;
        let mut warnings = self.write(&request, &destination)?;
        let deleted_original = self.remove_original(&request, &mut warnings);

        tracing::debug!(
            from = %request.source_path.display(),
            to = %destination.display(),
            "attachment transferred"
        );

        Ok(TransferredAttachment {
            reference: reference.to_string(),
            source_path: request.source_path,
            destination_path: destination,
            deleted_original,
            warnings,
        })
    }
}

/// Both paths exist and name the same file.
fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    struct Setup {
        _source_dir: TempDir,
        dest_dir: TempDir,
        vault: Vault,
    }

    fn setup() -> Setup {
        let source_dir = TempDir::new().unwrap();
        let dest_dir = TempDir::new().unwrap();
        let vault = Vault::new(source_dir.path()).unwrap();
        Setup {
            _source_dir: source_dir,
            dest_dir,
            vault,
        }
    }

    fn write(root: &Path, path: &str, content: &[u8]) {
        let full = root.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    fn copy_options() -> TransferOptions {
        TransferOptions {
            include_attachments: true,
            preserve_metadata: false,
        }
    }

    #[test]
    fn test_overwrite_onto_empty_destination() {
        let s = setup();
        let bytes = b"# Title\n\nBody \xe2\x9c\x93".to_vec();
        write(&s.vault.root, "notes/a.md", &bytes);

        let orchestrator = Orchestrator::new(&s.vault, copy_options());
        let outcome = orchestrator.transfer_path(
            Path::new("notes/a.md"),
            s.dest_dir.path(),
            false,
            ConflictPolicy::Overwrite,
        );

        let report = outcome.report().expect("success");
        assert_eq!(report.final_path, s.dest_dir.path().join("notes/a.md"));
        assert!(!report.renamed);
        assert_eq!(fs::read(&report.final_path).unwrap(), bytes);
    }

    #[test]
    fn test_attachment_request_ignores_conflict_policy() {
        let s = setup();
        write(s.dest_dir.path(), "assets/pic.png", b"old");

        let orchestrator = Orchestrator::new(&s.vault, copy_options());
        let request = TransferRequest::new("assets/pic.png", b"new".to_vec(), s.dest_dir.path())
            .conflict_policy(ConflictPolicy::Skip);
        assert_eq!(request.kind, FileKind::Attachment);

        let outcome = orchestrator.transfer(&request);
        assert!(outcome.is_success());
        assert_eq!(fs::read(s.dest_dir.path().join("assets/pic.png")).unwrap(), b"new");
    }

    #[test]
    fn test_skip_leaves_destination_untouched() {
        let s = setup();
        write(&s.vault.root, "notes/a.md", b"new");
        write(s.dest_dir.path(), "notes/a.md", b"old");

        let orchestrator = Orchestrator::new(&s.vault, copy_options());
        let outcome = orchestrator.transfer_path(
            Path::new("notes/a.md"),
            s.dest_dir.path(),
            true,
            ConflictPolicy::Skip,
        );

        assert!(matches!(outcome, TransferOutcome::Skipped { .. }));
        assert_eq!(fs::read(s.dest_dir.path().join("notes/a.md")).unwrap(), b"old");
        // Skipped moves keep the source
        assert!(s.vault.file_exists(Path::new("notes/a.md")));
    }

    #[test]
    fn test_missing_source_fails() {
        let s = setup();
        let orchestrator = Orchestrator::new(&s.vault, copy_options());
        let outcome = orchestrator.transfer_path(
            Path::new("missing.md"),
            s.dest_dir.path(),
            false,
            ConflictPolicy::Rename,
        );

        match outcome {
            TransferOutcome::Failed { kind, message, .. } => {
                assert_eq!(kind, crate::error::ErrorKind::NotFound);
                assert!(message.contains("missing.md"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_attachment_does_not_abort_note() {
        let s = setup();
        write(&s.vault.root, "a.md", b"![[gone.png]] ![[here.png]]");
        write(&s.vault.root, "here.png", b"png");

        let orchestrator = Orchestrator::new(&s.vault, copy_options());
        let outcome = orchestrator.transfer_path(
            Path::new("a.md"),
            s.dest_dir.path(),
            false,
            ConflictPolicy::Rename,
        );

        let report = outcome.report().expect("success");
        assert_eq!(report.attachments.transferred.len(), 1);
        assert_eq!(report.attachments.failed.len(), 1);
        assert_eq!(report.attachments.failed[0].reference, "gone.png");
        assert!(report.has_warnings());
        assert!(s.dest_dir.path().join("a.md").exists());
        assert!(s.dest_dir.path().join("here.png").exists());
    }

    #[test]
    fn test_repeated_reference_transferred_once() {
        let s = setup();
        write(&s.vault.root, "a.md", b"![[pic.png]]\n![alt](pic.png)\n![[pic.png|200]]");
        write(&s.vault.root, "pic.png", b"png");

        let orchestrator = Orchestrator::new(&s.vault, copy_options());
        let outcome = orchestrator.transfer_path(
            Path::new("a.md"),
            s.dest_dir.path(),
            true,
            ConflictPolicy::Rename,
        );

        let report = outcome.report().expect("success");
        assert_eq!(report.attachments.transferred.len(), 1);
        assert!(report.attachments.failed.is_empty());
        assert!(report.attachments.transferred[0].deleted_original);
        assert!(!s.vault.file_exists(Path::new("pic.png")));
    }

    #[test]
    fn test_attachments_disabled() {
        let s = setup();
        write(&s.vault.root, "a.md", b"![[pic.png]]");
        write(&s.vault.root, "pic.png", b"png");

        let options = TransferOptions {
            include_attachments: false,
            preserve_metadata: false,
        };
        let orchestrator = Orchestrator::new(&s.vault, options);
        let outcome = orchestrator.transfer_path(
            Path::new("a.md"),
            s.dest_dir.path(),
            false,
            ConflictPolicy::Rename,
        );

        let report = outcome.report().expect("success");
        assert!(report.attachments.is_empty());
        assert!(!s.dest_dir.path().join("pic.png").exists());
    }

    #[test]
    fn test_self_embed_not_treated_as_attachment() {
        let s = setup();
        write(&s.vault.root, "a.md", b"![[a.md]]");
        write(s.dest_dir.path(), "a.md", b"existing");

        let orchestrator = Orchestrator::new(&s.vault, copy_options());
        let outcome = orchestrator.transfer_path(
            Path::new("a.md"),
            s.dest_dir.path(),
            false,
            ConflictPolicy::Rename,
        );

        let report = outcome.report().expect("success");
        assert!(report.renamed);
        assert!(report.attachments.is_empty());
        assert_eq!(fs::read(s.dest_dir.path().join("a.md")).unwrap(), b"existing");
    }

    #[test]
    fn test_timestamps_preserved() {
        let s = setup();
        write(&s.vault.root, "a.md", b"x");
        let mtime = FileTime::from_unix_time(1_600_000_000, 0);
        let atime = FileTime::from_unix_time(1_650_000_000, 0);
        filetime::set_file_times(s.vault.root.join("a.md"), atime, mtime).unwrap();

        let options = TransferOptions {
            include_attachments: false,
            preserve_metadata: true,
        };
        let orchestrator = Orchestrator::new(&s.vault, options);
        let outcome = orchestrator.transfer_path(
            Path::new("a.md"),
            s.dest_dir.path(),
            false,
            ConflictPolicy::Rename,
        );

        let report = outcome.report().expect("success");
        assert!(report.warnings.is_empty());
        let meta = fs::metadata(&report.final_path).unwrap();
        assert_eq!(FileTime::from_last_modification_time(&meta), mtime);
    }

    #[test]
    fn test_metadata_failure_is_a_warning() {
        let s = setup();
        let orchestrator = Orchestrator::new(
            &s.vault,
            TransferOptions {
                include_attachments: false,
                preserve_metadata: true,
            },
        );
        // Content supplied directly; nothing on disk to stat.
        let request = TransferRequest::new("virtual.md", b"x".to_vec(), s.dest_dir.path());
        let outcome = orchestrator.transfer(&request);

        let report = outcome.report().expect("success");
        assert!(matches!(
            report.warnings.as_slice(),
            [TransferWarning::MetadataNotPreserved { .. }]
        ));
        assert_eq!(fs::read(&report.final_path).unwrap(), b"x");
    }

    /// Replace a source file with a non-empty directory so it cannot be removed.
    fn make_undeletable(root: &Path, path: &str) {
        let full = root.join(path);
        fs::remove_file(&full).unwrap();
        fs::create_dir_all(full.join("inner")).unwrap();
        fs::write(full.join("inner/keep.txt"), b"k").unwrap();
    }

    #[test]
    fn test_move_into_source_vault_fails_before_writing() {
        let s = setup();
        write(&s.vault.root, "notes/a.md", b"![[assets/pic.png]]");
        write(&s.vault.root, "assets/pic.png", b"png");

        let orchestrator = Orchestrator::new(&s.vault, copy_options());
        for policy in [ConflictPolicy::Overwrite, ConflictPolicy::Rename] {
            let outcome =
                orchestrator.transfer_path(Path::new("notes/a.md"), &s.vault.root, true, policy);

            match outcome {
                TransferOutcome::Failed { kind, .. } => {
                    assert_eq!(kind, crate::error::ErrorKind::InvalidPath)
                }
                other => panic!("expected failure, got {:?}", other),
            }
        }

        assert_eq!(fs::read(s.vault.root.join("notes/a.md")).unwrap(), b"![[assets/pic.png]]");
        assert_eq!(fs::read(s.vault.root.join("assets/pic.png")).unwrap(), b"png");
        assert!(!s.vault.root.join("notes/a (1).md").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_destination_linked_to_source_is_rejected() {
        let s = setup();
        write(&s.vault.root, "a.md", b"x");
        let link = s.dest_dir.path().join("link");
        std::os::unix::fs::symlink(&s.vault.root, &link).unwrap();

        let orchestrator = Orchestrator::new(&s.vault, copy_options());
        let outcome =
            orchestrator.transfer_path(Path::new("a.md"), &link, true, ConflictPolicy::Overwrite);

        assert!(!outcome.is_success());
        assert_eq!(fs::read(s.vault.root.join("a.md")).unwrap(), b"x");
    }

    #[test]
    fn test_failed_delete_is_a_warning() {
        let s = setup();
        write(&s.vault.root, "notes/a.md", b"body");

        let orchestrator = Orchestrator::new(&s.vault, copy_options());
        let request = orchestrator
            .request(Path::new("notes/a.md"), s.dest_dir.path())
            .unwrap()
            .delete_original(true);
        make_undeletable(&s.vault.root, "notes/a.md");

        let outcome = orchestrator.transfer(&request);

        let report = outcome.report().expect("success");
        assert!(report.original_kept());
        assert!(!report.deleted_original);
        assert!(matches!(
            report.warnings.as_slice(),
            [TransferWarning::OriginalNotDeleted { .. }]
        ));
        assert!(s.vault.root.join("notes/a.md").exists());
        assert_eq!(fs::read(s.dest_dir.path().join("notes/a.md")).unwrap(), b"body");
    }

    #[test]
    fn test_failed_attachment_delete_is_a_warning() {
        let s = setup();
        write(&s.vault.root, "assets/pic.png", b"png");

        let orchestrator = Orchestrator::new(&s.vault, copy_options());
        let request = orchestrator
            .request(Path::new("assets/pic.png"), s.dest_dir.path())
            .unwrap()
            .delete_original(true);
        assert_eq!(request.kind, FileKind::Attachment);
        make_undeletable(&s.vault.root, "assets/pic.png");

        let outcome = orchestrator.transfer(&request);

        let report = outcome.report().expect("success");
        assert!(report.original_kept());
        assert!(report.has_warnings());
        assert!(s.vault.root.join("assets/pic.png").exists());
        assert_eq!(fs::read(s.dest_dir.path().join("assets/pic.png")).unwrap(), b"png");
    }

    #[test]
    fn test_note_embeds_are_not_failed_attachments() {
        let s = setup();
        write(
            &s.vault.root,
            "a.md",
            b"![[Other Note]]\n![[Other Note#Section]]\n![[missing.png]]",
        );

        let orchestrator = Orchestrator::new(&s.vault, copy_options());
        let outcome = orchestrator.transfer_path(
            Path::new("a.md"),
            s.dest_dir.path(),
            false,
            ConflictPolicy::Rename,
        );

        let report = outcome.report().expect("success");
        assert!(report.attachments.transferred.is_empty());
        assert_eq!(report.attachments.failed.len(), 1);
        assert_eq!(report.attachments.failed[0].reference, "missing.png");
    }
}
