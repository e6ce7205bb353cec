//! Extraction commands - aggregate referenced content into the
//! outgoing-links payload.
//!
//! `extract links` runs the full pipeline over a source document's outgoing
//! links. `extract header` and `extract file` construct a synthetic link and
//! push it through the same validation and extraction codepath.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use mdcite_core::{CliFlags, ContentExtractor, ExtractedContent, Link, SessionCache, paths};
use tracing::debug;

use crate::output::OutputFormat;
use crate::utils::resolve_scope;

/// Run `extract links`; exits with code 1 when nothing was extracted.
pub fn links(
    source: &Path,
    scope: Option<PathBuf>,
    format: OutputFormat,
    full_files: bool,
    session: Option<&str>,
) -> Result<()> {
    let source = source
        .canonicalize()
        .with_context(|| format!("source file not found: {}", source.display()))?;
    let scope_dir = resolve_scope(scope, &source)?;

    let session_state = match session {
        Some(id) => {
            let bytes = fs::read(&source)?;
            let hash = SessionCache::content_hash(&bytes);
            let cache = SessionCache::open(None)?;
            if cache.is_cached(id, &hash) {
                // Already extracted this content in this session: empty
                // stdout, success
                debug!(session = id, "session cache hit; skipping extraction");
                return Ok(());
            }
            Some((cache, id.to_string(), hash))
        },
        None => None,
    };

    let mut extractor = ContentExtractor::new(scope_dir, CliFlags { full_files })?;
    let payload = extractor.extract_from_file(&source)?;
    emit(&payload, format)?;

    if payload.stats.unique_content == 0 {
        // A miss without eligible links is not recorded, to permit retries
        // after authoring
        std::process::exit(1);
    }
    if let Some((cache, id, hash)) = &session_state {
        cache.record(id, hash)?;
    }
    Ok(())
}

/// Run `extract header`: one section of a target document by header name.
pub fn header(
    target: &Path,
    header: &str,
    scope: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    run_synthetic(target, Some(header), scope, format, CliFlags::default())
}

/// Run `extract file`: a whole target document.
pub fn file(target: &Path, scope: Option<PathBuf>, format: OutputFormat) -> Result<()> {
    run_synthetic(target, None, scope, format, CliFlags { full_files: true })
}

fn run_synthetic(
    target: &Path,
    anchor: Option<&str>,
    scope: Option<PathBuf>,
    format: OutputFormat,
    flags: CliFlags,
) -> Result<()> {
    let scope_dir = resolve_scope(scope, target)?;

    // Express the target relative to the scope root; synthetic links resolve
    // from there
    let cwd = std::env::current_dir()?;
    let target_abs = paths::normalize(&cwd.join(target));
    let raw = target_abs.strip_prefix(&scope_dir).map_or_else(
        |_| target_abs.to_string_lossy().into_owned(),
        |relative| relative.to_string_lossy().into_owned(),
    );

    let link = Link::synthetic(&raw, anchor, &scope_dir);
    let mut extractor = ContentExtractor::new(scope_dir, flags)?;
    let payload = extractor.extract_synthetic(link)?;
    emit(&payload, format)?;

    if payload.stats.unique_content == 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn emit(payload: &ExtractedContent, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(payload)?),
        OutputFormat::Text => print_text(payload),
    }
    Ok(())
}

fn print_text(payload: &ExtractedContent) {
    for (id, block) in &payload.extracted_content_blocks.blocks {
        println!(
            "{}",
            format!(
                "--- {id} ({} chars, {} refs)",
                block.content_length,
                block.source_links.len()
            )
            .dimmed()
        );
        println!("{}", block.content);
    }

    let stats = &payload.stats;
    eprintln!(
        "{} {} links processed, {} unique blocks, {} duplicates, {} chars saved",
        "Extracted:".bold(),
        stats.total_links,
        stats.unique_content,
        stats.duplicate_content_detected,
        stats.tokens_saved
    );
}
