//! Parsers for note content.

pub mod attachment;

pub use attachment::{
    extract_attachment_paths, extract_attachment_refs, is_remote, parse_embeds, AttachmentRef,
    EmbedSyntax,
};
