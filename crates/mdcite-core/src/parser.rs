//! Markdown parsing using tree-sitter for structured content analysis.
//!
//! This module converts a raw markdown document into its structural contract:
//! ordered lists of links, headings and anchors with source positions. It is
//! the first stage of the citation pipeline; everything downstream (the
//! parsed-document facade, the validator, the extractor) consumes its output.
//!
//! ## Parsing strategy
//!
//! Parsing happens in two passes:
//!
//! 1. **Tokenization**: tree-sitter parses the document with the markdown
//!    grammar. The block tree yields ATX headings (level, text, position) and
//!    the line ranges of fenced and indented code blocks.
//! 2. **Reference scanning**: each source line *outside* code blocks and
//!    frontmatter is scanned for link syntaxes and block-anchor declarations.
//!    Inline code spans are masked beforehand so `` `[not](a-link)` `` never
//!    produces a link.
//!
//! ## Recognized link syntaxes
//!
//! - Standard markdown: `[text](target)` where `target` is `path`,
//!   `path#anchor`, or `#anchor`
//! - Wiki: `[[target]]`, `[[target|display]]`, `[[target#^block]]`
//! - Cite: `[cite: target]`
//! - Caret reference: a bare `^identifier` at end of line, which both
//!   declares a block anchor and yields an internal block link
//!
//! Targets with a URL scheme (`http://`, `https://`, `mailto:`) are not
//! citations and are not emitted.
//!
//! ## Extraction markers
//!
//! A `%%token%%` or `<!-- token -->` annotation directly after a link (only
//! whitespace in between) is attached to the link when the trimmed token is
//! one of the reserved words `force-extract`, `stop-extract-link`,
//! `stop-extract`.
//!
//! ## Anchors
//!
//! Every heading produces exactly one anchor carrying both identifier
//! flavors: the raw heading text and its percent-encoded form. Every
//! line-terminal `^id` produces one block anchor whose id drops the sigil.
//! Two identical headings produce two distinct anchors, distinguished by
//! their positions.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use regex::Regex;
use tree_sitter::{Node, Parser, TreeCursor};

use crate::flavor::url_encoded_anchor;
use crate::types::{
    Anchor, AnchorKind, ExtractionMarker, Heading, Link, LinkKind, LinkScope, LinkSource,
    LinkTarget, TargetPath,
};
use crate::{Error, Result, paths};

/// Marker tokens that carry eligibility semantics.
const RESERVED_MARKERS: [&str; 3] = ["force-extract", "stop-extract-link", "stop-extract"];

/// A tree-sitter based markdown parser.
///
/// Produces the structural contract of a document as a [`ParserOutput`]. The
/// parser is a pure function of the document content; the source path is used
/// only for position metadata on emitted links.
///
/// Parser instances can be reused for multiple documents, but are not
/// thread-safe: the internal tree-sitter parser maintains mutable state
/// across parse operations.
pub struct MarkdownParser {
    parser: Parser,
    wiki_link: Regex,
    markdown_link: Regex,
    cite_link: Regex,
    caret_ref: Regex,
    marker: Regex,
}

impl MarkdownParser {
    /// Create a new markdown parser instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree-sitter markdown language cannot be loaded
    /// or one of the reference patterns fails to compile.
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_md::LANGUAGE.into())
            .map_err(|e| Error::Parse(format!("Failed to set language: {e}")))?;

        Ok(Self {
            parser,
            wiki_link: compile(r"\[\[([^\[\]|]+)(?:\|([^\[\]]*))?\]\]")?,
            markdown_link: compile(r"\[([^\[\]]*)\]\(([^()\s]+)\)")?,
            cite_link: compile(r"\[cite:\s*([^\[\]]+?)\s*\]")?,
            caret_ref: compile(r"(?:^|[ \t])(\^[A-Za-z0-9_-]+)[ \t]*$")?,
            marker: compile(r"^[ \t]*(%%\s*(.*?)\s*%%|<!--\s*(.*?)\s*-->)")?,
        })
    }

    /// Parse markdown text into its structural contract.
    ///
    /// `path` is recorded as the source of every emitted link and is used to
    /// resolve relative target paths; it is not read from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if tree-sitter cannot produce a parse tree, which
    /// only happens on pathological input. Malformed markdown parses fine and
    /// simply yields fewer references.
    pub fn parse(&mut self, text: &str, path: &Path) -> Result<ParserOutput> {
        let tree = self
            .parser
            .parse(text, None)
            .ok_or_else(|| Error::Parse("Failed to parse markdown".into()))?;

        let frontmatter_end = frontmatter_end_row(text);
        let skip_row = |row: usize| frontmatter_end.is_some_and(|end| row <= end);

        let mut headings: Vec<Heading> = Vec::new();
        let mut code_rows: HashSet<usize> = HashSet::new();

        let mut cursor = tree.root_node().walk();
        Self::walk_tree(&mut cursor, |node| match node.kind() {
            "atx_heading" => {
                let row = node.start_position().row;
                if skip_row(row) {
                    return;
                }
                let raw = text[node.byte_range()].trim_end().to_string();
                headings.push(Heading {
                    level: Self::heading_level(node),
                    text: Self::heading_text(node, text),
                    raw,
                    line: row + 1,
                    column: node.start_position().column,
                });
            },
            "fenced_code_block" | "indented_code_block" => {
                let start = node.start_position().row;
                let end_position = node.end_position();
                // A node ending at column 0 stops before that row
                let end = if end_position.column == 0 {
                    end_position.row.saturating_sub(1)
                } else {
                    end_position.row
                };
                for row in start..=end {
                    code_rows.insert(row);
                }
            },
            _ => {},
        });

        let source_dir = path.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
        let mut links: Vec<Link> = Vec::new();
        let mut anchors: Vec<Anchor> = Vec::new();
        let mut block_lines: HashMap<String, String> = HashMap::new();

        for (row, line) in text.lines().enumerate() {
            if skip_row(row) || code_rows.contains(&row) {
                continue;
            }
            self.scan_line(
                line,
                row,
                path,
                &source_dir,
                &mut links,
                &mut anchors,
                &mut block_lines,
            );
        }

        for heading in &headings {
            anchors.push(Anchor::Header {
                id: heading.text.clone(),
                url_encoded_id: url_encoded_anchor(&heading.text),
                raw_text: heading.text.clone(),
                full_match: heading.raw.clone(),
                line: heading.line,
                column: heading.column,
            });
        }

        links.sort_by_key(|link| (link.line, link.column));
        anchors.sort_by_key(|anchor| anchor.line());

        Ok(ParserOutput {
            file_path: path.to_path_buf(),
            content: text.to_string(),
            links,
            headings,
            anchors,
            block_lines,
        })
    }

    /// Scan one non-code source line for links, markers and block anchors.
    #[allow(clippy::too_many_arguments)]
    fn scan_line(
        &self,
        line: &str,
        row: usize,
        source_path: &Path,
        source_dir: &Path,
        links: &mut Vec<Link>,
        anchors: &mut Vec<Anchor>,
        block_lines: &mut HashMap<String, String>,
    ) {
        let masked = mask_inline_code(line);
        let mut claimed: Vec<(usize, usize)> = Vec::new();

        for captures in self.wiki_link.captures_iter(&masked) {
            let whole = match captures.get(0) {
                Some(m) => m,
                None => continue,
            };
            let target = captures.get(1).map_or("", |m| m.as_str()).trim();
            let display = captures.get(2).map(|m| m.as_str().trim().to_string());
            let text = display.or_else(|| Some(target.to_string()));
            if let Some(link) = self.build_link(
                LinkKind::Wiki,
                text,
                target,
                line,
                whole.start(),
                whole.end(),
                row,
                source_path,
                source_dir,
            ) {
                claimed.push((whole.start(), whole.end()));
                links.push(link);
            }
        }

        for captures in self.markdown_link.captures_iter(&masked) {
            let whole = match captures.get(0) {
                Some(m) => m,
                None => continue,
            };
            if overlaps(&claimed, whole.start(), whole.end()) {
                continue;
            }
            let text = captures.get(1).map(|m| m.as_str().to_string());
            let target = captures.get(2).map_or("", |m| m.as_str()).trim();
            if let Some(link) = self.build_link(
                LinkKind::Markdown,
                text,
                target,
                line,
                whole.start(),
                whole.end(),
                row,
                source_path,
                source_dir,
            ) {
                claimed.push((whole.start(), whole.end()));
                links.push(link);
            }
        }

        for captures in self.cite_link.captures_iter(&masked) {
            let whole = match captures.get(0) {
                Some(m) => m,
                None => continue,
            };
            if overlaps(&claimed, whole.start(), whole.end()) {
                continue;
            }
            let target = captures.get(1).map_or("", |m| m.as_str()).trim();
            if let Some(link) = self.build_link(
                LinkKind::Markdown,
                None,
                target,
                line,
                whole.start(),
                whole.end(),
                row,
                source_path,
                source_dir,
            ) {
                claimed.push((whole.start(), whole.end()));
                links.push(link);
            }
        }

        if let Some(captures) = self.caret_ref.captures(&masked) {
            if let Some(sigil) = captures.get(1) {
                if !overlaps(&claimed, sigil.start(), sigil.end()) {
                    let full_match = sigil.as_str().to_string();
                    let id = full_match.trim_start_matches('^').to_string();

                    links.push(Link {
                        link_type: LinkKind::Wiki,
                        scope: LinkScope::Internal,
                        anchor_type: Some(AnchorKind::Block),
                        source: LinkSource {
                            absolute_path: source_path.to_path_buf(),
                        },
                        target: LinkTarget {
                            path: TargetPath::default(),
                            anchor: Some(full_match.clone()),
                        },
                        text: None,
                        full_match: full_match.clone(),
                        line: row + 1,
                        column: sigil.start(),
                        extraction_marker: None,
                        validation: None,
                    });
                    anchors.push(Anchor::Block {
                        id: id.clone(),
                        raw_text: None,
                        full_match,
                        line: row + 1,
                        column: sigil.start(),
                    });
                    block_lines.entry(id).or_insert_with(|| line.to_string());
                }
            }
        }
    }

    /// Assemble a [`Link`] from a matched reference, or `None` when the
    /// target is not a citation (external URL, empty target).
    #[allow(clippy::too_many_arguments)]
    fn build_link(
        &self,
        link_type: LinkKind,
        text: Option<String>,
        target: &str,
        line: &str,
        start: usize,
        end: usize,
        row: usize,
        source_path: &Path,
        source_dir: &Path,
    ) -> Option<Link> {
        if target.is_empty() {
            return None;
        }

        let (path_part, anchor) = match target.strip_prefix('#') {
            Some(fragment) => (None, Some(fragment.to_string())),
            None => match target.split_once('#') {
                Some((file, fragment)) => (Some(file), Some(fragment.to_string())),
                None => (Some(target), None),
            },
        };

        if let Some(file) = path_part {
            if file.is_empty() || has_url_scheme(file) {
                return None;
            }
        }

        let scope = if path_part.is_none() {
            LinkScope::Internal
        } else {
            LinkScope::CrossDocument
        };

        let target_path = path_part.map_or_else(TargetPath::default, |file| {
            let absolute = paths::normalize(&source_dir.join(file));
            let relative = paths::relative_from(&absolute, source_dir);
            TargetPath {
                raw: Some(file.to_string()),
                absolute: Some(absolute),
                relative: Some(relative),
            }
        });

        let anchor_type = anchor.as_ref().map(|fragment| {
            if fragment.starts_with('^') {
                AnchorKind::Block
            } else {
                AnchorKind::Header
            }
        });

        Some(Link {
            link_type,
            scope,
            anchor_type,
            source: LinkSource {
                absolute_path: source_path.to_path_buf(),
            },
            target: LinkTarget {
                path: target_path,
                anchor,
            },
            text,
            full_match: line[start..end].to_string(),
            line: row + 1,
            column: start,
            extraction_marker: self.marker_after(line, end),
            validation: None,
        })
    }

    /// Look for a reserved extraction marker directly after a link.
    fn marker_after(&self, line: &str, link_end: usize) -> Option<ExtractionMarker> {
        let rest = line.get(link_end..)?;
        let captures = self.marker.captures(rest)?;
        let full = captures.get(1)?.as_str().to_string();
        let inner = captures
            .get(2)
            .or_else(|| captures.get(3))
            .map(|m| m.as_str().trim().to_string())?;

        if RESERVED_MARKERS.contains(&inner.as_str()) {
            Some(ExtractionMarker {
                full_match: full,
                inner_text: inner,
            })
        } else {
            None
        }
    }

    fn walk_tree<F>(cursor: &mut TreeCursor, mut callback: F)
    where
        F: FnMut(Node),
    {
        loop {
            callback(cursor.node());

            if cursor.goto_first_child() {
                continue;
            }

            if cursor.goto_next_sibling() {
                continue;
            }

            loop {
                if !cursor.goto_parent() {
                    return;
                }
                if cursor.goto_next_sibling() {
                    break;
                }
            }
        }
    }

    fn heading_level(node: Node) -> u8 {
        for child in node.children(&mut node.walk()) {
            match child.kind() {
                "atx_h1_marker" => return 1,
                "atx_h2_marker" => return 2,
                "atx_h3_marker" => return 3,
                "atx_h4_marker" => return 4,
                "atx_h5_marker" => return 5,
                "atx_h6_marker" => return 6,
                _ => {},
            }
        }
        1
    }

    fn heading_text(node: Node, text: &str) -> String {
        for child in node.children(&mut node.walk()) {
            if child.kind().contains("heading") && child.kind().contains("content") {
                return text[child.byte_range()].trim().to_string();
            }
        }

        let full_text = &text[node.byte_range()];
        full_text.trim_start_matches('#').trim().to_string()
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::Internal(format!("invalid reference pattern: {e}")))
}

fn overlaps(claimed: &[(usize, usize)], start: usize, end: usize) -> bool {
    claimed.iter().any(|&(s, e)| start < e && end > s)
}

fn has_url_scheme(target: &str) -> bool {
    let lower = target.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("mailto:")
}

/// Mask inline code spans with spaces, preserving byte offsets.
fn mask_inline_code(line: &str) -> String {
    let bytes = line.as_bytes();
    let mut masked = bytes.to_vec();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }
        let run_start = i;
        while i < bytes.len() && bytes[i] == b'`' {
            i += 1;
        }
        let run_len = i - run_start;

        // Find a closing backtick run of the same length
        let mut j = i;
        let mut close_end = None;
        while j < bytes.len() {
            if bytes[j] == b'`' {
                let close_start = j;
                while j < bytes.len() && bytes[j] == b'`' {
                    j += 1;
                }
                if j - close_start == run_len {
                    close_end = Some(j);
                    break;
                }
            } else {
                j += 1;
            }
        }

        if let Some(end) = close_end {
            for byte in &mut masked[run_start..end] {
                *byte = b' ';
            }
            i = end;
        }
    }

    String::from_utf8(masked).unwrap_or_else(|_| line.to_string())
}

/// Detect a leading YAML frontmatter fence; returns the 0-based row of the
/// closing fence.
fn frontmatter_end_row(text: &str) -> Option<usize> {
    let mut lines = text.lines().enumerate();
    let (_, first) = lines.next()?;
    if first.trim_end() != "---" {
        return None;
    }
    for (row, line) in lines {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            return Some(row);
        }
    }
    None
}

/// The structural contract extracted from one markdown document.
///
/// Links, headings and anchors are in source order. `block_lines` maps each
/// block-anchor id to the full line that declared it, sigil retained, for
/// block extraction.
#[derive(Debug, Clone)]
pub struct ParserOutput {
    /// Nominal path of the parsed document.
    pub file_path: PathBuf,
    /// The document content exactly as passed in.
    pub content: String,
    /// All citations found outside code regions, in source order.
    pub links: Vec<Link>,
    /// All ATX headings, in source order.
    pub headings: Vec<Heading>,
    /// One anchor per declaration site, in source order.
    pub anchors: Vec<Anchor>,
    /// Block-anchor id to declaring line.
    pub block_lines: HashMap<String, String>,
}
