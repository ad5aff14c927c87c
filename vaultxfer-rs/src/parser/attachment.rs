//! Attachment reference extraction.
//!
//! Recognises the two embed forms Obsidian writes for local files:
//! `![[target]]` and `![alt](target)`.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

// (!\[\[([^\]]+)\]\])        - Wikilink embed, target in group 1
// (!\[.*?\]\(([^)]+)\))      - Markdown image, target in group 2
static EMBED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[\[([^\]]+)\]\]|!\[.*?\]\(([^)]+)\)").unwrap()
});

/// Which syntax an embed was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedSyntax {
    /// `![[target]]`
    Wikilink,
    /// `![alt](target)`
    Markdown,
}

/// An embed found in note text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentRef {
    /// Path part of the target, with size/alias/heading/title syntax removed.
    pub target: String,
    /// The target exactly as written between the delimiters.
    pub raw: String,
    pub syntax: EmbedSyntax,
    /// Line number where the embed appears (1-indexed).
    pub line: usize,
}

impl AttachmentRef {
    /// True for `http…` targets, which are never transferred.
    pub fn is_remote(&self) -> bool {
        is_remote(&self.target)
    }
}

/// Parse every embed in `content`, remote ones included, in document order.
pub fn parse_embeds(content: &str) -> Vec<AttachmentRef> {
    let mut refs = Vec::new();

    for cap in EMBED.captures_iter(content) {
        let (raw, syntax) = match (cap.get(1), cap.get(2)) {
            (Some(m), _) => (m, EmbedSyntax::Wikilink),
            (None, Some(m)) => (m, EmbedSyntax::Markdown),
            (None, None) => continue,
        };

        let target = match syntax {
            EmbedSyntax::Wikilink => clean_wikilink_target(raw.as_str()),
            EmbedSyntax::Markdown => clean_markdown_target(raw.as_str()),
        };
        if target.is_empty() {
            continue;
        }

        let line = content[..raw.start()].matches('\n').count() + 1;

        refs.push(AttachmentRef {
            target,
            raw: raw.as_str().to_string(),
            syntax,
            line,
        });
    }

    refs
}

/// Local attachment references in `content`, in document order.
///
/// Repeated references are kept.
pub fn extract_attachment_refs(content: &str) -> Vec<AttachmentRef> {
    parse_embeds(content)
        .into_iter()
        .filter(|r| !r.is_remote())
        .collect()
}

/// Vault-relative paths of local attachments referenced from `content`.
pub fn extract_attachment_paths(content: &str) -> Vec<String> {
    extract_attachment_refs(content)
        .into_iter()
        .map(|r| r.target)
        .collect()
}

/// Check whether a target points at a remote resource.
pub fn is_remote(target: &str) -> bool {
    target
        .get(..4)
        .map(|prefix| prefix.eq_ignore_ascii_case("http"))
        .unwrap_or(false)
}

/// `file.png|400`, `Note#Heading`, `Note#^block|alias` -> the file part.
fn clean_wikilink_target(raw: &str) -> String {
    let without_alias = raw.split('|').next().unwrap_or("");
    let without_anchor = without_alias.split('#').next().unwrap_or("");
    without_anchor.trim().to_string()
}

/// `<my file.png>`, `pic.png "Title"`, `pic.png =200x`, `my%20pic.png` -> the file part.
fn clean_markdown_target(raw: &str) -> String {
    let trimmed = raw.trim();

    let path = if let Some(rest) = trimmed.strip_prefix('<') {
        match rest.find('>') {
            Some(end) => &rest[..end],
            None => rest,
        }
    } else {
        trimmed.split_whitespace().next().unwrap_or("")
    };

    if is_remote(path) {
        return path.to_string();
    }

    match urlencoding::decode(path) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => path.to_string(),
    }
}
