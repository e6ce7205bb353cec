//! Citation validation - enrich links in place with terminal verdicts.
//!
//! For every link the validator resolves the target file (directly or via the
//! short-name cache) and the target anchor, then writes a
//! [`Validation`](crate::types::Validation) verdict onto the link. No wrapper
//! objects are created; the caller's links are mutated in place and nothing
//! else about them changes. Validation is idempotent: a second pass
//! overwrites the verdict with the same result.
//!
//! Verdicts never abort the pipeline. A short-name rescue downgrades a link
//! to `warning` and records the recommended path rewrite; a missing anchor
//! upgrades it to `error`, keeping the rewrite for context.

use std::path::Path;

use serde::Serialize;
use tracing::warn;

use crate::doc_cache::DocumentCache;
use crate::document::ParsedDocument;
use crate::resolver::{FileResolver, ResolveReason};
use crate::suggest;
use crate::types::{Link, LinkScope, PathConversion, Validation, ValidationStatus};

/// Counts of terminal verdicts over one validation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    /// Links examined.
    pub total: usize,
    /// Links with status `valid`.
    pub valid: usize,
    /// Links with status `warning`.
    pub warnings: usize,
    /// Links with status `error`.
    pub errors: usize,
}

impl ValidationSummary {
    fn record(&mut self, status: ValidationStatus) {
        self.total += 1;
        match status {
            ValidationStatus::Valid => self.valid += 1,
            ValidationStatus::Warning => self.warnings += 1,
            ValidationStatus::Error => self.errors += 1,
        }
    }
}

/// The validate command's output contract.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// Verdict counts.
    pub summary: ValidationSummary,
    /// The enriched links, in source order.
    pub links: Vec<Link>,
}

/// Validator borrowing the per-invocation resolver and document cache.
pub struct CitationValidator<'a> {
    resolver: &'a mut FileResolver,
    cache: &'a mut DocumentCache,
}

impl<'a> CitationValidator<'a> {
    /// Create a validator over the shared resolver and cache.
    pub fn new(resolver: &'a mut FileResolver, cache: &'a mut DocumentCache) -> Self {
        Self { resolver, cache }
    }

    /// Validate every link of a source document, enriching in place.
    pub fn validate(&mut self, source: &ParsedDocument, links: &mut [Link]) -> ValidationSummary {
        let mut summary = ValidationSummary::default();
        for link in links.iter_mut() {
            self.validate_link(Some(source), link);
            if let Some(status) = link.status() {
                summary.record(status);
            }
        }
        summary
    }

    /// Validate a single synthetic (CLI-constructed) link.
    pub fn validate_one(&mut self, link: &mut Link) {
        self.validate_link(None, link);
    }

    fn validate_link(&mut self, source: Option<&ParsedDocument>, link: &mut Link) {
        let validation = match link.scope {
            LinkScope::Internal => Self::validate_internal(source, link),
            LinkScope::CrossDocument => self.validate_cross_document(link),
        };
        link.validation = Some(validation);
    }

    fn validate_internal(source: Option<&ParsedDocument>, link: &Link) -> Validation {
        let Some(document) = source else {
            return error_validation("Internal link has no source document", None, None);
        };

        let anchor = link.target.anchor.clone().unwrap_or_default();
        let lookup = anchor.strip_prefix('^').unwrap_or(anchor.as_str());

        if document.has_anchor(&anchor) || document.has_anchor(lookup) {
            return valid_validation(None);
        }

        let suggestion = suggest::best_match(lookup, document.anchor_candidates());
        error_validation(format!("Anchor not found: '#{anchor}'"), suggestion, None)
    }

    fn validate_cross_document(&mut self, link: &Link) -> Validation {
        let raw = link.target.path.raw.clone().unwrap_or_default();
        let source_dir = link
            .source
            .absolute_path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .to_path_buf();

        let resolution = self.resolver.resolve(&raw, &source_dir);

        let Some(target_path) = resolution.path else {
            return match resolution.reason {
                ResolveReason::Duplicate => {
                    let listed: Vec<String> = resolution
                        .candidates
                        .iter()
                        .map(|candidate| candidate.display().to_string())
                        .collect();
                    error_validation(
                        format!("Duplicate short name '{raw}': {}", listed.join(", ")),
                        None,
                        None,
                    )
                },
                _ => {
                    let suggestion = resolution
                        .candidates
                        .first()
                        .and_then(|candidate| candidate.file_name())
                        .map(|name| name.to_string_lossy().into_owned());
                    error_validation("File not found", suggestion, None)
                },
            };
        };

        let mut status = if resolution.reason == ResolveReason::Cache {
            ValidationStatus::Warning
        } else {
            ValidationStatus::Valid
        };
        let conversion = resolution.conversion;
        let mut error = None;
        let mut suggestion = None;

        if let Some(anchor) = link.target.anchor.clone() {
            let lookup = anchor.strip_prefix('^').unwrap_or(anchor.as_str());
            match self.cache.get(&target_path) {
                Err(parse_error) => {
                    status = ValidationStatus::Error;
                    error = Some(format!("Failed to parse target: {parse_error}"));
                },
                Ok(document) => {
                    if !(document.has_anchor(&anchor) || document.has_anchor(lookup)) {
                        status = ValidationStatus::Error;
                        error = Some(format!("Anchor not found: '#{anchor}' in '{raw}'"));
                        suggestion = suggest::best_match(lookup, document.anchor_candidates());
                    }
                },
            }
        }

        Validation {
            status,
            error,
            suggestion,
            path_conversion: conversion,
        }
    }
}

/// Emit a human-readable stderr line per failed link; used by the extractor,
/// which continues regardless.
pub fn emit_error_report(links: &[Link]) {
    for link in links {
        if let Some(validation) = &link.validation {
            if validation.status == ValidationStatus::Error {
                warn!(
                    line = link.line,
                    link = %link.full_match,
                    reason = validation.error.as_deref().unwrap_or("invalid"),
                    "citation failed validation"
                );
            }
        }
    }
}

fn valid_validation(conversion: Option<PathConversion>) -> Validation {
    Validation {
        status: ValidationStatus::Valid,
        error: None,
        suggestion: None,
        path_conversion: conversion,
    }
}

fn error_validation(
    message: impl Into<String>,
    suggestion: Option<String>,
    conversion: Option<PathConversion>,
) -> Validation {
    Validation {
        status: ValidationStatus::Error,
        error: Some(message.into()),
        suggestion,
        path_conversion: conversion,
    }
}
