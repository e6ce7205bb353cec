//! # mdcite-core
//!
//! Core functionality for mdcite - validation and aggregation of
//! cross-document references ("citations") in a corpus of markdown
//! documents.
//!
//! Given a source document, the pipeline verifies that every outgoing link
//! resolves to an existing file and anchor within a scoped directory tree,
//! and on demand extracts the referenced content into a deduplicated,
//! machine-readable payload.
//!
//! ## Architecture
//!
//! The crate is organized around three tightly coupled subsystems:
//!
//! - **Parsing**: tree-sitter based markdown parsing that turns a document
//!   into its structural contract - links, headings and anchors with source
//!   positions ([`parser`], [`document`])
//! - **Validation**: file and anchor resolution through a short-name cache,
//!   enriching each link in place with a terminal verdict ([`resolver`],
//!   [`doc_cache`], [`validator`])
//! - **Extraction**: a prioritized eligibility chain followed by
//!   section/block/whole-file extraction, deduplicated by content hash
//!   ([`eligibility`], [`extractor`])
//!
//! ## Quick Start
//!
//! ```rust
//! use std::path::Path;
//! use mdcite_core::{MarkdownParser, ParsedDocument, Result};
//!
//! let mut parser = MarkdownParser::new()?;
//! let output = parser.parse(
//!     "# Notes\n\nSee [[design.md#Goals]] and [api](./api.md).\n",
//!     Path::new("/docs/notes.md"),
//! )?;
//! let document = ParsedDocument::new(output);
//!
//! assert_eq!(document.links().len(), 2);
//! assert!(document.has_anchor("Notes"));
//! # Ok::<(), mdcite_core::Error>(())
//! ```
//!
//! ## Concurrency model
//!
//! The core is single-threaded and synchronous; both caches live for one
//! command execution and are owned by the extractor. Given a fixed
//! filesystem state, every pipeline stage is deterministic.
//!
//! ## Error Handling
//!
//! System-level failures return [`Result<T, Error>`]; link-level problems
//! are verdicts recorded on the links themselves and never abort a run.

/// Configuration loading and defaults
pub mod config;
/// Per-invocation parsed-document cache
pub mod doc_cache;
/// Read-only facade over parser output
pub mod document;
/// Eligibility strategy chain for extraction decisions
pub mod eligibility;
/// Error types and result aliases
pub mod error;
/// Content extraction pipeline and deduplication
pub mod extractor;
/// Anchor identifier flavors (raw / URL-encoded)
pub mod flavor;
/// Tree-sitter based markdown parser
pub mod parser;
/// Lexical path normalization helpers
pub mod paths;
/// Target file resolution and the short-name cache
pub mod resolver;
/// Session-level extraction markers
pub mod session;
/// Fuzzy suggestions for broken references
pub mod suggest;
/// Core data types and output contracts
pub mod types;
/// Citation validation and verdict enrichment
pub mod validator;

// Re-export commonly used types
pub use config::Config;
pub use doc_cache::DocumentCache;
pub use document::ParsedDocument;
pub use eligibility::{CliFlags, Decision, EligibilityAnalyzer, ExtractionStrategy};
pub use error::{Error, Result};
pub use extractor::{ContentExtractor, content_id};
pub use parser::{MarkdownParser, ParserOutput};
pub use resolver::{FileResolver, Resolution, ResolveReason};
pub use session::SessionCache;
pub use types::*;
pub use validator::{CitationValidator, ValidationReport, ValidationSummary};
