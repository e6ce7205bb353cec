//! Read-only facade over parser output.
//!
//! Consumers never see the underlying token structures; they get a
//! [`ParsedDocument`] handle supporting anchor lookup and section/block/full
//! extraction. Anchor lookups are O(1) via a precomputed index over both
//! identifier flavors.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::flavor::url_encoded_anchor;
use crate::parser::ParserOutput;
use crate::types::{Anchor, Heading, Link};

/// Immutable view over one parsed markdown document.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    path: PathBuf,
    content: String,
    links: Vec<Link>,
    headings: Vec<Heading>,
    anchors: Vec<Anchor>,
    anchor_index: HashSet<String>,
    block_lines: HashMap<String, String>,
}

impl ParsedDocument {
    /// Build the facade from parser output, indexing anchors for O(1) lookup.
    #[must_use]
    pub fn new(output: ParserOutput) -> Self {
        let mut anchor_index = HashSet::new();
        for anchor in &output.anchors {
            for id in anchor.ids() {
                anchor_index.insert(id.to_string());
            }
        }

        Self {
            path: output.file_path,
            content: output.content,
            links: output.links,
            headings: output.headings,
            anchors: output.anchors,
            anchor_index,
            block_lines: output.block_lines,
        }
    }

    /// Nominal path of the document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Citations found in the document, in source order.
    #[must_use]
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Headings in source order.
    #[must_use]
    pub fn headings(&self) -> &[Heading] {
        &self.headings
    }

    /// Anchors in source order, one per declaration site.
    #[must_use]
    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    /// Whether the document declares an anchor answering to `search`.
    ///
    /// Headers match on their raw id or its URL-encoded form; blocks match on
    /// their sigil-less id.
    #[must_use]
    pub fn has_anchor(&self, search: &str) -> bool {
        self.anchor_index.contains(search)
    }

    /// Every identifier an anchor in this document answers to; suggestion
    /// candidates for failed lookups.
    pub fn anchor_candidates(&self) -> impl Iterator<Item = &str> {
        self.anchors.iter().flat_map(Anchor::ids)
    }

    /// Find the heading a header-anchor fragment addresses: the first heading
    /// whose raw text or URL-encoded id equals `anchor`.
    #[must_use]
    pub fn heading_for_anchor(&self, anchor: &str) -> Option<&Heading> {
        self.headings
            .iter()
            .find(|heading| heading.text == anchor || url_encoded_anchor(&heading.text) == anchor)
    }

    /// Extract the section introduced by the first heading with the given
    /// text and level.
    ///
    /// The section spans from the heading line up to (exclusive) the first
    /// later heading of depth ≤ `level`; trailing blank lines are trimmed.
    /// Returns `None` when no heading matches.
    #[must_use]
    pub fn extract_section(&self, heading_text: &str, level: u8) -> Option<String> {
        let heading = self
            .headings
            .iter()
            .find(|candidate| candidate.level == level && candidate.text == heading_text)?;

        let end_line = self
            .headings
            .iter()
            .find(|candidate| candidate.line > heading.line && candidate.level <= level)
            .map(|candidate| candidate.line - 1);

        let lines: Vec<&str> = self.content.lines().collect();
        let start = heading.line - 1;
        let end = end_line.unwrap_or(lines.len());
        let section = lines.get(start..end)?.join("\n");
        Some(section.trim_end().to_string())
    }

    /// Return the raw line that declared `^block_id`, sigil retained.
    #[must_use]
    pub fn extract_block(&self, block_id: &str) -> Option<String> {
        self.block_lines.get(block_id).cloned()
    }

    /// The document content exactly as the parser stored it.
    #[must_use]
    pub fn extract_full_content(&self) -> &str {
        &self.content
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::parser::MarkdownParser;

    fn document(text: &str) -> ParsedDocument {
        let output = MarkdownParser::new()
            .expect("parser")
            .parse(text, Path::new("/docs/target.md"))
            .expect("parse failed");
        ParsedDocument::new(output)
    }

    const TARGET: &str = "\
# Title

intro text

## Section One

alpha line

### Nested

nested body

## Section Two

bravo line
FR1: System requirement. ^FR1
";

    #[test]
    fn test_has_anchor_matches_both_header_flavors() {
        let doc = document(TARGET);

        assert!(doc.has_anchor("Section One"));
        assert!(doc.has_anchor("Section%20One"));
        assert!(!doc.has_anchor("Section Three"));
    }

    #[test]
    fn test_has_anchor_matches_block_id_without_sigil() {
        let doc = document(TARGET);

        assert!(doc.has_anchor("FR1"));
        assert!(!doc.has_anchor("^FR1"));
    }

    #[test]
    fn test_extract_section_spans_nested_headings() {
        let doc = document(TARGET);

        let section = doc.extract_section("Section One", 2).expect("section");
        // Starts with the matched heading's raw line
        assert!(section.starts_with("## Section One"));
        // Includes deeper headings...
        assert!(section.contains("### Nested"));
        assert!(section.contains("nested body"));
        // ...but stops before the next heading of depth <= 2
        assert!(!section.contains("Section Two"));
    }

    #[test]
    fn test_extract_section_requires_matching_level() {
        let doc = document(TARGET);

        assert!(doc.extract_section("Section One", 3).is_none());
        assert!(doc.extract_section("Nested", 3).is_some());
    }

    #[test]
    fn test_extract_section_last_section_runs_to_eof() {
        let doc = document(TARGET);

        let section = doc.extract_section("Section Two", 2).expect("section");
        assert!(section.starts_with("## Section Two"));
        assert!(section.ends_with("^FR1"));
    }

    #[test]
    fn test_extract_section_missing_heading() {
        let doc = document(TARGET);

        assert!(doc.extract_section("Nope", 2).is_none());
    }

    #[test]
    fn test_extract_block_returns_declaring_line() {
        let doc = document(TARGET);

        assert_eq!(
            doc.extract_block("FR1").as_deref(),
            Some("FR1: System requirement. ^FR1")
        );
        assert!(doc.extract_block("FR2").is_none());
    }

    #[test]
    fn test_extract_full_content_is_verbatim() {
        let doc = document(TARGET);

        assert_eq!(doc.extract_full_content(), TARGET);
    }

    #[test]
    fn test_full_content_keeps_frontmatter() {
        let doc = document("---\ntitle: x\n---\n\n# Body\n");

        assert!(doc.extract_full_content().starts_with("---\n"));
    }

    #[test]
    fn test_heading_for_anchor_accepts_encoded_form() {
        let doc = document(TARGET);

        let heading = doc.heading_for_anchor("Section%20One").expect("heading");
        assert_eq!(heading.text, "Section One");
        assert_eq!(heading.level, 2);

        let heading = doc.heading_for_anchor("Section One").expect("heading");
        assert_eq!(heading.line, 5);
    }

    #[test]
    fn test_section_does_not_duplicate_inline_text() {
        let doc = document("## A\n\nbody once\n\n## B\n");

        let section = doc.extract_section("A", 2).expect("section");
        assert_eq!(section.matches("body once").count(), 1);
        assert_eq!(section, "## A\n\nbody once");
    }
}
