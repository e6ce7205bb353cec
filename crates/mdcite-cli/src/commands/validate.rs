//! Citation validation command - verify every outgoing link resolves.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use mdcite_core::{
    CitationValidator, DocumentCache, FileResolver, ValidationReport, ValidationStatus,
};

use crate::output::OutputFormat;
use crate::utils::{parse_line_range, resolve_scope};

/// Run the validate command; exits with code 1 when any link has an error
/// verdict.
pub fn execute(
    source: &Path,
    scope: Option<PathBuf>,
    format: OutputFormat,
    lines: Option<&str>,
    fix: bool,
) -> Result<()> {
    let source = source
        .canonicalize()
        .with_context(|| format!("source file not found: {}", source.display()))?;
    let scope_dir = resolve_scope(scope, &source)?;

    let mut resolver = FileResolver::new(scope_dir);
    let mut cache = DocumentCache::new()?;
    let document = cache
        .get(&source)
        .with_context(|| format!("failed to parse {}", source.display()))?;

    let mut links = document.links().to_vec();
    if let Some(spec) = lines {
        let (start, end) = parse_line_range(spec)?;
        links.retain(|link| link.line >= start && link.line <= end);
    }

    let summary =
        CitationValidator::new(&mut resolver, &mut cache).validate(&document, &mut links);
    let report = ValidationReport { summary, links };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_text_report(&source, &report, fix),
    }

    if report.summary.errors > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn print_text_report(source: &Path, report: &ValidationReport, fix: bool) {
    println!("{}", source.display().to_string().bold());

    for link in &report.links {
        let Some(validation) = &link.validation else {
            continue;
        };
        let glyph = match validation.status {
            ValidationStatus::Valid => "✓".green(),
            ValidationStatus::Warning => "⚠".yellow(),
            ValidationStatus::Error => "✗".red(),
        };

        println!("\n{glyph} {}:{} {}", link.line, link.column, link.full_match);
        if let Some(error) = &validation.error {
            println!("  {}", error.red());
        }
        if let Some(suggestion) = &validation.suggestion {
            println!("  Did you mean '{suggestion}'?");
        }
        if let Some(conversion) = &validation.path_conversion {
            println!(
                "  Path rescued: {} → {}",
                conversion.original.yellow(),
                conversion.recommended.green()
            );
        }
    }

    let summary = &report.summary;
    println!("\n{}", "Summary:".bold());
    println!(
        "  {} total, {} valid, {} warnings, {} errors",
        summary.total,
        summary.valid.to_string().green(),
        summary.warnings.to_string().yellow(),
        summary.errors.to_string().red()
    );

    if fix {
        let rewrites: Vec<_> = report
            .links
            .iter()
            .filter_map(|link| link.validation.as_ref()?.path_conversion.as_ref())
            .collect();
        if rewrites.is_empty() {
            println!("\nNo path rewrites to apply.");
        } else {
            println!(
                "\n{}",
                "Recommended rewrites (files are never modified):".bold()
            );
            for conversion in rewrites {
                println!("  {} → {}", conversion.original, conversion.recommended);
            }
        }
    }
}
