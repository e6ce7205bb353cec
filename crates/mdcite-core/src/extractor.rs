//! Content extraction - validate, filter, extract, deduplicate.
//!
//! The extractor owns both per-invocation caches and orchestrates the full
//! pipeline for one source document:
//!
//! 1. parse the source (through the parsed-file cache) and pull its links
//! 2. validate all links, reporting failures to stderr and continuing
//! 3. drop internal-scope links - they are not extractable from another file
//! 4. run the eligibility chain on each remaining link
//! 5. extract a section, a block line, or the whole file per link
//! 6. deduplicate by content hash: the first 12 hex chars of the SHA-256 of
//!    the extracted content key a shared [`ContentBlock`]
//!
//! Every processed link yields exactly one report entry in source order;
//! per-link failures never abort the run.

use std::collections::btree_map::Entry;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::doc_cache::DocumentCache;
use crate::eligibility::{CliFlags, EligibilityAnalyzer};
use crate::resolver::FileResolver;
use crate::types::{
    AnchorKind, ContentBlock, ContentBlocks, ExtractedContent, ExtractionStats, FailureDetails,
    Link, OutgoingLinksReport, ProcessedLink, ProcessedStatus, SourceLinkRef, ValidationStatus,
};
use crate::validator::{self, CitationValidator};
use crate::{Error, Result};

/// Compute the deduplication key for extracted content: the first 12 hex
/// characters of its SHA-256.
#[must_use]
pub fn content_id(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..12].to_string()
}

/// Extractor owning the resolver, the parsed-file cache and the eligibility
/// chain for the duration of one command.
pub struct ContentExtractor {
    resolver: FileResolver,
    cache: DocumentCache,
    analyzer: EligibilityAnalyzer,
    flags: CliFlags,
}

impl ContentExtractor {
    /// Create an extractor scoped to `scope` with the given CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the markdown parser cannot be initialized.
    pub fn new(scope: impl Into<PathBuf>, flags: CliFlags) -> Result<Self> {
        Ok(Self {
            resolver: FileResolver::new(scope),
            cache: DocumentCache::new()?,
            analyzer: EligibilityAnalyzer::new(),
            flags,
        })
    }

    /// Run the full pipeline over every outgoing link of `source`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the source document itself cannot be read
    /// or parsed; link-level failures are recorded in the report instead.
    pub fn extract_from_file(&mut self, source: &Path) -> Result<ExtractedContent> {
        let document = self.cache.get(source)?;
        let mut links = document.links().to_vec();

        CitationValidator::new(&mut self.resolver, &mut self.cache)
            .validate(&document, &mut links);
        validator::emit_error_report(&links);

        let source_path = document.path().to_path_buf();
        Ok(self.process(links, Some(source_path)))
    }

    /// Run the pipeline over a single synthetic (CLI-constructed) link.
    ///
    /// # Errors
    ///
    /// Returns an error if the parser cannot be initialized; per-link
    /// failures land in the report.
    pub fn extract_synthetic(&mut self, mut link: Link) -> Result<ExtractedContent> {
        CitationValidator::new(&mut self.resolver, &mut self.cache).validate_one(&mut link);
        validator::emit_error_report(std::slice::from_ref(&link));
        Ok(self.process(vec![link], None))
    }

    fn process(&mut self, links: Vec<Link>, source_file_path: Option<PathBuf>) -> ExtractedContent {
        let mut blocks = ContentBlocks::default();
        let mut processed = Vec::new();
        let mut successful = 0usize;

        for link in links {
            // Internal links never pass through the extractor
            if link.is_internal() {
                continue;
            }
            let entry = self.process_link(&link, &mut blocks, &mut successful);
            processed.push(entry);
        }

        let unique_content = blocks.blocks.len();
        let total_content_size: usize = blocks
            .blocks
            .values()
            .map(|block| block.content_length)
            .sum();
        let tokens_saved: usize = blocks
            .blocks
            .values()
            .map(|block| (block.source_links.len() - 1) * block.content_length)
            .sum();
        let denominator = total_content_size + tokens_saved;
        #[allow(clippy::cast_precision_loss)]
        let compression_ratio = if denominator == 0 {
            0.0
        } else {
            tokens_saved as f64 / denominator as f64
        };

        blocks.total_content_character_length = total_content_size;
        let total_links = processed.len();

        debug!(
            total = total_links,
            unique = unique_content,
            duplicates = successful.saturating_sub(unique_content),
            "extraction finished"
        );

        ExtractedContent {
            extracted_content_blocks: blocks,
            outgoing_links_report: OutgoingLinksReport {
                source_file_path,
                processed_links: processed,
            },
            stats: ExtractionStats {
                total_links,
                unique_content,
                duplicate_content_detected: successful.saturating_sub(unique_content),
                tokens_saved,
                compression_ratio,
            },
        }
    }

    fn process_link(
        &mut self,
        link: &Link,
        blocks: &mut ContentBlocks,
        successful: &mut usize,
    ) -> ProcessedLink {
        if link.status() == Some(ValidationStatus::Error) {
            let reason = link
                .validation
                .as_ref()
                .and_then(|validation| validation.error.clone())
                .unwrap_or_else(|| "invalid link".to_string());
            return ProcessedLink {
                status: ProcessedStatus::Skipped,
                content_id: None,
                eligibility_reason: None,
                source_link: link.full_match.clone(),
                source_line: link.line,
                failure_details: Some(FailureDetails {
                    reason: format!("Link failed validation: {reason}"),
                }),
            };
        }

        let decision = self.analyzer.decide(link, self.flags);
        if !decision.eligible {
            return ProcessedLink {
                status: ProcessedStatus::Skipped,
                content_id: None,
                eligibility_reason: Some(decision.reason.clone()),
                source_link: link.full_match.clone(),
                source_line: link.line,
                failure_details: Some(FailureDetails {
                    reason: decision.reason,
                }),
            };
        }

        match self.extract_content(link) {
            Ok(content) => {
                let id = content_id(&content);
                *successful += 1;
                let occurrence = SourceLinkRef {
                    raw_source_link: link.full_match.clone(),
                    source_line: link.line,
                };
                match blocks.blocks.entry(id.clone()) {
                    Entry::Occupied(mut entry) => entry.get_mut().source_links.push(occurrence),
                    Entry::Vacant(slot) => {
                        slot.insert(ContentBlock {
                            content_length: content.chars().count(),
                            content,
                            source_links: vec![occurrence],
                        });
                    },
                }
                ProcessedLink {
                    status: ProcessedStatus::Extracted,
                    content_id: Some(id),
                    eligibility_reason: Some(decision.reason),
                    source_link: link.full_match.clone(),
                    source_line: link.line,
                    failure_details: None,
                }
            },
            Err(error) => ProcessedLink {
                status: ProcessedStatus::Error,
                content_id: None,
                eligibility_reason: Some(decision.reason),
                source_link: link.full_match.clone(),
                source_line: link.line,
                failure_details: Some(FailureDetails {
                    reason: error.to_string(),
                }),
            },
        }
    }

    /// Fetch the target document and extract the referenced content.
    fn extract_content(&mut self, link: &Link) -> Result<String> {
        let raw = link
            .target
            .path
            .raw
            .as_deref()
            .ok_or_else(|| Error::Internal("cross-document link without target path".into()))?;
        let source_dir = link
            .source
            .absolute_path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .to_path_buf();

        let resolution = self.resolver.resolve(raw, &source_dir);
        let target_path = resolution
            .path
            .ok_or_else(|| Error::NotFound(format!("target '{raw}' did not resolve")))?;
        let document = self.cache.get(&target_path)?;

        match link.anchor_type {
            Some(AnchorKind::Header) => {
                let anchor = link.target.anchor.as_deref().unwrap_or_default();
                let heading = document.heading_for_anchor(anchor).ok_or_else(|| {
                    Error::NotFound(format!("anchor '#{anchor}' not found in '{raw}'"))
                })?;
                let (text, level) = (heading.text.clone(), heading.level);
                document.extract_section(&text, level).ok_or_else(|| {
                    Error::Internal(format!("section '{text}' vanished from '{raw}'"))
                })
            },
            Some(AnchorKind::Block) => {
                let anchor = link.target.anchor.as_deref().unwrap_or_default();
                let id = anchor.strip_prefix('^').unwrap_or(anchor);
                document
                    .extract_block(id)
                    .ok_or_else(|| Error::NotFound(format!("block '^{id}' not found in '{raw}'")))
            },
            None => Ok(document.extract_full_content().to_string()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        root: PathBuf,
    }

    impl Fixture {
        fn new(files: &[(&str, &str)]) -> Self {
            let dir = tempfile::tempdir().expect("tempdir");
            let root = dir.path().canonicalize().expect("canonicalize");
            for (name, contents) in files {
                let path = root.join(name);
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).expect("mkdir");
                }
                fs::write(&path, contents).expect("write");
            }
            Self { _dir: dir, root }
        }

        fn extract(&self, source: &str, flags: CliFlags) -> ExtractedContent {
            let mut extractor = ContentExtractor::new(self.root.clone(), flags).expect("extractor");
            extractor
                .extract_from_file(&self.root.join(source))
                .expect("extract")
        }
    }

    const TARGET: &str = "\
# Title

## Section One

alpha content line

## Section Two

bravo
";

    #[test]
    fn test_duplicate_content_deduplication() {
        // Three wiki links all pointing at the same section
        let fx = Fixture::new(&[
            (
                "src.md",
                "[[target.md#Section One]]\n[[target.md#Section One|again]]\n[[target.md#Section One|and again]]\n",
            ),
            ("target.md", TARGET),
        ]);

        let out = fx.extract("src.md", CliFlags::default());

        assert_eq!(out.stats.total_links, 3);
        assert_eq!(out.stats.unique_content, 1);
        assert_eq!(out.stats.duplicate_content_detected, 2);

        // All three entries share one content id
        let ids: Vec<&str> = out
            .outgoing_links_report
            .processed_links
            .iter()
            .map(|entry| entry.content_id.as_deref().unwrap())
            .collect();
        assert_eq!(ids.len(), 3);
        assert!(ids.windows(2).all(|pair| pair[0] == pair[1]));

        // The single block records all three occurrences
        let block = out.extracted_content_blocks.blocks.values().next().unwrap();
        assert_eq!(block.source_links.len(), 3);
        assert!(block.content.starts_with("## Section One"));

        // tokensSaved is two extra occurrences of the block
        assert_eq!(out.stats.tokens_saved, 2 * block.content_length);
        assert_eq!(
            out.extracted_content_blocks.total_content_character_length,
            block.content_length
        );
    }

    #[test]
    fn test_block_anchor_extraction() {
        let fx = Fixture::new(&[
            ("src.md", "[[target.md#^FR1|FR1]]\n"),
            ("target.md", "# Reqs\n\nFR1: System requirement. ^FR1\n"),
        ]);

        let out = fx.extract("src.md", CliFlags::default());

        let block = out.extracted_content_blocks.blocks.values().next().unwrap();
        assert_eq!(block.content, "FR1: System requirement. ^FR1");
    }

    #[test]
    fn test_force_marker_extracts_whole_file_without_flag() {
        let fx = Fixture::new(&[
            ("src.md", "[whole](file.md) %%force-extract%%\n"),
            ("file.md", "entire file\n"),
        ]);

        let out = fx.extract("src.md", CliFlags { full_files: false });

        let entry = &out.outgoing_links_report.processed_links[0];
        assert_eq!(entry.status, ProcessedStatus::Extracted);
        assert!(entry
            .eligibility_reason
            .as_deref()
            .unwrap()
            .contains("force-extract"));
        assert_eq!(out.stats.unique_content, 1);
    }

    #[test]
    fn test_stop_marker_beats_section_default() {
        let fx = Fixture::new(&[
            ("src.md", "[sec](file.md#Intro) %%stop-extract-link%%\n"),
            ("file.md", "# Intro\n\nbody\n"),
        ]);

        let out = fx.extract("src.md", CliFlags { full_files: true });

        let entry = &out.outgoing_links_report.processed_links[0];
        assert_eq!(entry.status, ProcessedStatus::Skipped);
        assert!(entry.content_id.is_none());
        assert_eq!(out.stats.unique_content, 0);
    }

    #[test]
    fn test_whole_file_links_skipped_without_flag() {
        let fx = Fixture::new(&[("src.md", "[[file.md]]\n"), ("file.md", "body\n")]);

        let out = fx.extract("src.md", CliFlags { full_files: false });

        let entry = &out.outgoing_links_report.processed_links[0];
        assert_eq!(entry.status, ProcessedStatus::Skipped);
        assert!(entry
            .failure_details
            .as_ref()
            .unwrap()
            .reason
            .contains("--full-files"));

        // With the flag, the whole file is extracted verbatim
        let out = fx.extract("src.md", CliFlags { full_files: true });
        let block = out.extracted_content_blocks.blocks.values().next().unwrap();
        assert_eq!(block.content, "body\n");
    }

    #[test]
    fn test_only_invalid_links_yields_empty_stats() {
        let fx = Fixture::new(&[("src.md", "[a](missing.md#X)\n[b](also-gone.md)\n")]);

        let out = fx.extract("src.md", CliFlags { full_files: true });

        assert_eq!(out.stats.total_links, 2);
        assert_eq!(out.stats.unique_content, 0);
        assert_eq!(out.stats.duplicate_content_detected, 0);
        // The ratio guard: 0, not NaN
        assert_eq!(out.stats.compression_ratio, 0.0);

        for entry in &out.outgoing_links_report.processed_links {
            assert_eq!(entry.status, ProcessedStatus::Skipped);
            assert!(entry
                .failure_details
                .as_ref()
                .unwrap()
                .reason
                .starts_with("Link failed validation:"));
            assert!(entry.eligibility_reason.is_none());
        }
    }

    #[test]
    fn test_internal_links_never_reach_the_report() {
        let fx = Fixture::new(&[(
            "src.md",
            "# Top\n\n[local](#Top)\n\nFR2: note. ^FR2\n\n[[target.md#Section One]]\n",
        ), ("target.md", TARGET)]);

        let out = fx.extract("src.md", CliFlags::default());

        assert_eq!(out.stats.total_links, 1);
        assert_eq!(
            out.outgoing_links_report.processed_links[0].source_link,
            "[[target.md#Section One]]"
        );
    }

    #[test]
    fn test_processed_links_keep_source_order() {
        let fx = Fixture::new(&[
            (
                "src.md",
                "[one](t.md#Section%20One)\n\n[[t.md#Section Two]]\n\n[[t.md]]\n",
            ),
            ("t.md", TARGET),
        ]);

        let out = fx.extract("src.md", CliFlags::default());

        let lines: Vec<usize> = out
            .outgoing_links_report
            .processed_links
            .iter()
            .map(|entry| entry.source_line)
            .collect();
        let mut sorted = lines.clone();
        sorted.sort_unstable();
        assert_eq!(lines, sorted);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let fx = Fixture::new(&[
            ("src.md", "[[target.md#Section One]]\n"),
            ("target.md", TARGET),
        ]);

        let first = fx.extract("src.md", CliFlags::default());
        let second = fx.extract("src.md", CliFlags::default());

        let id_of = |out: &ExtractedContent| {
            out.outgoing_links_report.processed_links[0]
                .content_id
                .clone()
        };
        assert_eq!(id_of(&first), id_of(&second));
    }

    #[test]
    fn test_synthetic_header_extraction() {
        let fx = Fixture::new(&[("target.md", TARGET)]);
        let mut extractor =
            ContentExtractor::new(fx.root.clone(), CliFlags::default()).unwrap();

        let link = Link::synthetic("target.md", Some("Section One"), &fx.root);
        let out = extractor.extract_synthetic(link).unwrap();

        assert_eq!(out.stats.unique_content, 1);
        assert!(out.outgoing_links_report.source_file_path.is_none());
        let block = out.extracted_content_blocks.blocks.values().next().unwrap();
        assert!(block.content.starts_with("## Section One"));
        assert!(!block.content.contains("Section Two"));
    }

    #[test]
    fn test_synthetic_full_file_extraction() {
        let fx = Fixture::new(&[("target.md", TARGET)]);
        let mut extractor =
            ContentExtractor::new(fx.root.clone(), CliFlags { full_files: true }).unwrap();

        let link = Link::synthetic("target.md", None, &fx.root);
        let out = extractor.extract_synthetic(link).unwrap();

        let block = out.extracted_content_blocks.blocks.values().next().unwrap();
        assert_eq!(block.content, TARGET);
    }

    #[test]
    fn test_content_id_is_stable_prefix() {
        let id = content_id("hello");
        assert_eq!(id.len(), 12);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(id, content_id("hello"));
        assert_ne!(id, content_id("hello "));
    }

    #[test]
    fn test_compression_ratio_bounds() {
        let fx = Fixture::new(&[
            (
                "src.md",
                "[[t.md#Section One]]\n[[t.md#Section One|x]]\n[[t.md#Section Two]]\n",
            ),
            ("t.md", TARGET),
        ]);

        let out = fx.extract("src.md", CliFlags::default());

        assert!(out.stats.compression_ratio > 0.0);
        assert!(out.stats.compression_ratio < 1.0);
    }
}
