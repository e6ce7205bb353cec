//! Output format selection.
//!
//! Two formats: human-readable text with colors and status glyphs, and JSON
//! matching the core output contracts for programmatic consumption. JSON
//! mode keeps stdout clean - informational logging drops to error level.

use clap::ValueEnum;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable report with colors.
    Text,
    /// Pretty-printed JSON contract on stdout.
    Json,
}

impl OutputFormat {
    /// Merge the explicit flag, the config default and the command default.
    #[must_use]
    pub fn resolve(explicit: Option<Self>, config: Option<&str>, fallback: Self) -> Self {
        explicit
            .or_else(|| match config {
                Some("json") => Some(Self::Json),
                Some("text") => Some(Self::Text),
                _ => None,
            })
            .unwrap_or(fallback)
    }

    /// Whether this format is machine-readable.
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}
