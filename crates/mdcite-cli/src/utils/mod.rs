//! Shared CLI helpers.

pub mod logging;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

pub use logging::initialize_logging;

/// Parse a 1-based inclusive `START-END` line range.
pub fn parse_line_range(spec: &str) -> Result<(usize, usize)> {
    let (start, end) = spec
        .split_once('-')
        .with_context(|| format!("invalid line range '{spec}': expected START-END"))?;
    let start: usize = start
        .trim()
        .parse()
        .with_context(|| format!("invalid range start in '{spec}'"))?;
    let end: usize = end
        .trim()
        .parse()
        .with_context(|| format!("invalid range end in '{spec}'"))?;
    if start == 0 || end < start {
        bail!("invalid line range '{spec}': lines are 1-based and START <= END");
    }
    Ok((start, end))
}

/// Pick the effective scope directory: explicit flag or config default,
/// falling back to the given anchor file's directory.
pub fn resolve_scope(explicit: Option<PathBuf>, anchor_file: &Path) -> Result<PathBuf> {
    let scope = explicit.map_or_else(
        || {
            anchor_file
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        },
        |dir| dir,
    );
    let scope = scope
        .canonicalize()
        .with_context(|| format!("scope directory not found: {}", scope.display()))?;
    if !scope.is_dir() {
        bail!("scope is not a directory: {}", scope.display());
    }
    Ok(scope)
}
