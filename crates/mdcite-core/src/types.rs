//! Core data types for links, anchors, headings and the extraction contract.
//!
//! Everything that crosses the JSON boundary lives here, serialized in
//! camelCase to match the machine-readable contracts. The shapes mirror the
//! pipeline: the parser emits [`Link`]s, [`Heading`]s and [`Anchor`]s; the
//! validator enriches links in place with a [`Validation`] verdict; the
//! extractor aggregates [`ContentBlock`]s into an [`ExtractedContent`]
//! payload.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Syntax family a link was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// `[text](target)` and `[cite: target]` forms.
    Markdown,
    /// `[[target]]`, `[[target|display]]` and caret block references.
    Wiki,
}

/// Whether a link stays inside its own document or crosses to another file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkScope {
    /// Same-document anchor reference (`#anchor`, trailing `^id`).
    Internal,
    /// Reference to another file, optionally with an anchor.
    CrossDocument,
}

/// What part of the target document a link points at.
///
/// A link without an anchor (`anchorType: null` on the wire) references the
/// whole file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorKind {
    /// A heading anchor (`#Section One`).
    Header,
    /// A block anchor (`#^FR1`).
    Block,
}

/// Origin of a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSource {
    /// Absolute path of the document the link was found in.
    pub absolute_path: PathBuf,
}

/// Target path of a link in raw and resolved forms.
///
/// All fields are `null` for internal links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetPath {
    /// The path exactly as written in the source document.
    pub raw: Option<String>,
    /// Raw path resolved against the source file's directory.
    pub absolute: Option<PathBuf>,
    /// Path from the source file's directory to `absolute`.
    pub relative: Option<PathBuf>,
}

/// Where a link points: a path (for cross-document links) plus an optional
/// anchor fragment, kept exactly as written (block anchors retain their `^`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkTarget {
    /// Target path forms; all `None` when the link is internal.
    pub path: TargetPath,
    /// Anchor fragment as written, `None` for whole-file references.
    pub anchor: Option<String>,
}

/// An inline `%%token%%` or `<!-- token -->` annotation found immediately
/// after a link, overriding its default extraction eligibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionMarker {
    /// The full marker text including delimiters.
    pub full_match: String,
    /// The trimmed token between the delimiters.
    pub inner_text: String,
}

/// Terminal verdict for one link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    /// Target file and anchor both resolve.
    Valid,
    /// Resolvable, but only through a short-name rescue.
    Warning,
    /// Target file or anchor does not resolve.
    Error,
}

/// A recommended rewrite for a link that only resolved through the short-name
/// cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathConversion {
    /// Discriminator, always `"path-conversion"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// The path as originally written.
    pub original: String,
    /// The path that actually resolves, relative to the source directory.
    pub recommended: String,
}

impl PathConversion {
    /// Build a conversion record from the written and recommended paths.
    #[must_use]
    pub fn new(original: impl Into<String>, recommended: impl Into<String>) -> Self {
        Self {
            kind: "path-conversion".to_string(),
            original: original.into(),
            recommended: recommended.into(),
        }
    }
}

/// Validation verdict attached to a link by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    /// Terminal status for the link.
    pub status: ValidationStatus,
    /// Human-readable failure description when status is `error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Best-effort nearby candidate when a lookup failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Present when the file resolved through a short-name rescue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_conversion: Option<PathConversion>,
}

/// A reference discovered in a source document.
///
/// Invariants: internal links carry no target path; whole-file links carry no
/// anchor; `line` is 1-based and `column` is the 0-based offset of
/// `full_match` within its line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    /// Syntax family the link was written in.
    pub link_type: LinkKind,
    /// Internal or cross-document.
    pub scope: LinkScope,
    /// Header, block, or `None` for whole-file references.
    pub anchor_type: Option<AnchorKind>,
    /// Origin document.
    pub source: LinkSource,
    /// Target path and anchor.
    pub target: LinkTarget,
    /// Display text; `None` for cite links and caret references.
    pub text: Option<String>,
    /// The exact matched substring.
    pub full_match: String,
    /// 1-based source line.
    pub line: usize,
    /// 0-based offset of `full_match` within the line.
    pub column: usize,
    /// Eligibility override marker found next to the link, if any.
    pub extraction_marker: Option<ExtractionMarker>,
    /// Verdict added by the validator; absent until validation runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<Validation>,
}

impl Link {
    /// Construct a synthetic cross-document link for the `extract header` and
    /// `extract file` command paths.
    ///
    /// The target resolves relative to `scope_dir`; `validation` starts
    /// absent so the synthetic link flows through the normal validator.
    #[must_use]
    pub fn synthetic(target: &str, anchor: Option<&str>, scope_dir: &Path) -> Self {
        let full_match = match anchor {
            Some(fragment) => format!("[{target}]({target}#{fragment})"),
            None => format!("[{target}]({target})"),
        };
        let absolute = crate::paths::normalize(&scope_dir.join(target));
        Self {
            link_type: LinkKind::Markdown,
            scope: LinkScope::CrossDocument,
            anchor_type: anchor.map(|fragment| {
                if fragment.starts_with('^') {
                    AnchorKind::Block
                } else {
                    AnchorKind::Header
                }
            }),
            source: LinkSource {
                absolute_path: scope_dir.join("(cli)"),
            },
            target: LinkTarget {
                path: TargetPath {
                    raw: Some(target.to_string()),
                    relative: Some(PathBuf::from(target)),
                    absolute: Some(absolute),
                },
                anchor: anchor.map(ToString::to_string),
            },
            text: None,
            full_match,
            line: 1,
            column: 0,
            extraction_marker: None,
            validation: None,
        }
    }

    /// `true` when the link stays inside its own document.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self.scope, LinkScope::Internal)
    }

    /// Terminal validation status, if the link has been validated.
    #[must_use]
    pub fn status(&self) -> Option<ValidationStatus> {
        self.validation.as_ref().map(|validation| validation.status)
    }
}

/// A reference target discoverable within a document.
///
/// A single header declaration yields exactly one anchor carrying both
/// identifier flavors; a block declaration yields one anchor whose id drops
/// the `^` sigil while `full_match` keeps it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Anchor {
    /// A heading target.
    #[serde(rename_all = "camelCase")]
    Header {
        /// Raw heading text, inline formatting sigils included.
        id: String,
        /// Percent-encoded form of `id`.
        url_encoded_id: String,
        /// The heading text as written.
        raw_text: String,
        /// The full heading line.
        full_match: String,
        /// 1-based source line.
        line: usize,
        /// 0-based column of the heading.
        column: usize,
    },
    /// A `^id` block target.
    #[serde(rename_all = "camelCase")]
    Block {
        /// Block identifier without the `^` sigil.
        id: String,
        /// Always `None` for block anchors.
        raw_text: Option<String>,
        /// The `^id` token including the sigil.
        full_match: String,
        /// 1-based source line.
        line: usize,
        /// 0-based column of the `^` sigil.
        column: usize,
    },
}

impl Anchor {
    /// 1-based declaration line of the anchor.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::Header { line, .. } | Self::Block { line, .. } => *line,
        }
    }

    /// Identifier candidates this anchor answers to.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        match self {
            Self::Header {
                id, url_encoded_id, ..
            } => vec![id.as_str(), url_encoded_id.as_str()].into_iter(),
            Self::Block { id, .. } => vec![id.as_str()].into_iter(),
        }
    }
}

/// A heading in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Depth 1..=6.
    pub level: u8,
    /// Heading text with inline formatting sigils preserved.
    pub text: String,
    /// The full heading line as written.
    pub raw: String,
    /// 1-based source line.
    pub line: usize,
    /// 0-based column of the heading.
    pub column: usize,
}

/// One occurrence of a link that produced (or re-produced) a content block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLinkRef {
    /// The exact link text as written in the source document.
    pub raw_source_link: String,
    /// 1-based line the link was written on.
    pub source_line: usize,
}

/// A deduplicated piece of extracted content, keyed by content id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlock {
    /// The extracted text.
    pub content: String,
    /// Unicode scalar count of `content`.
    pub content_length: usize,
    /// Every link occurrence that referenced this content.
    pub source_links: Vec<SourceLinkRef>,
}

/// The `extractedContentBlocks` object: a meta length field plus one entry
/// per content id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlocks {
    /// Sum of `content_length` over the final block set.
    #[serde(rename = "_totalContentCharacterLength")]
    pub total_content_character_length: usize,
    /// Blocks keyed by content id (first 12 hex chars of the SHA-256 of the
    /// content).
    #[serde(flatten)]
    pub blocks: BTreeMap<String, ContentBlock>,
}

/// Outcome class for one processed link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessedStatus {
    /// Content extracted (possibly deduplicated onto an existing block).
    Extracted,
    /// Not extracted: ineligible or failed validation.
    Skipped,
    /// Extraction was attempted and failed.
    Error,
}

/// Failure context for skipped and errored links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureDetails {
    /// Human-readable reason.
    pub reason: String,
}

/// Per-link outcome entry in the outgoing-links report, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedLink {
    /// Outcome class.
    pub status: ProcessedStatus,
    /// Content id the link contributed to, `None` unless extracted.
    pub content_id: Option<String>,
    /// Reason produced by the eligibility chain, when the link reached it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligibility_reason: Option<String>,
    /// The exact link text as written.
    pub source_link: String,
    /// 1-based line of the link.
    pub source_line: usize,
    /// Failure context for skipped/errored links.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_details: Option<FailureDetails>,
}

/// Report half of the extraction payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingLinksReport {
    /// Source document, omitted for synthetic (CLI-constructed) links.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file_path: Option<PathBuf>,
    /// One entry per processed link, in source order.
    pub processed_links: Vec<ProcessedLink>,
}

/// Aggregate statistics over one extraction run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionStats {
    /// Number of processed links.
    pub total_links: usize,
    /// Number of distinct content blocks.
    pub unique_content: usize,
    /// Successful extractions that landed on an already-known block.
    pub duplicate_content_detected: usize,
    /// Characters avoided by deduplication.
    pub tokens_saved: usize,
    /// `tokens_saved / (total content + tokens_saved)`, `0` when empty.
    pub compression_ratio: f64,
}

/// The Outgoing-Links Extracted Content payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedContent {
    /// Deduplicated content blocks keyed by content id.
    pub extracted_content_blocks: ContentBlocks,
    /// Per-link outcomes.
    pub outgoing_links_report: OutgoingLinksReport,
    /// Aggregate statistics.
    pub stats: ExtractionStats,
}
