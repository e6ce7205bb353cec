//! Extraction eligibility - a prioritized chain of strategies.
//!
//! Strategies are a tagged variant list iterated in order; the first one that
//! returns a decision wins and lower-precedence strategies never run. Markers
//! written next to a link therefore override every default, and the terminal
//! CLI-flag strategy guarantees the chain is total. Internal links are
//! filtered out upstream and never reach the chain.

use serde::Serialize;

use crate::types::Link;

/// CLI-provided switches consulted by the chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliFlags {
    /// Whether whole-file links are extractable (`--full-files`).
    pub full_files: bool,
}

/// A decision produced by one strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    /// Whether the link should be extracted.
    pub eligible: bool,
    /// Human-readable reason, surfaced in the outgoing-links report.
    pub reason: String,
    /// Name of the deciding strategy.
    pub strategy_name: &'static str,
}

impl Decision {
    fn new(eligible: bool, reason: &str, strategy_name: &'static str) -> Self {
        Self {
            eligible,
            reason: reason.to_string(),
            strategy_name,
        }
    }
}

/// The strategies, in default precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// `stop-extract-link` / `stop-extract` markers veto extraction.
    StopMarker,
    /// `force-extract` markers force extraction.
    ForceMarker,
    /// Anchor links are extractable by default.
    SectionLink,
    /// Terminal rule: whole-file links follow the `--full-files` flag.
    CliFlag,
}

impl ExtractionStrategy {
    /// Stable strategy name for reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::StopMarker => "StopMarker",
            Self::ForceMarker => "ForceMarker",
            Self::SectionLink => "SectionLink",
            Self::CliFlag => "CliFlag",
        }
    }

    /// Apply this strategy to a link; `None` defers to the next strategy.
    #[must_use]
    pub fn decision(self, link: &Link, flags: CliFlags) -> Option<Decision> {
        match self {
            Self::StopMarker => {
                let marker = link.extraction_marker.as_ref()?;
                matches!(marker.inner_text.as_str(), "stop-extract-link" | "stop-extract")
                    .then(|| {
                        Decision::new(
                            false,
                            "stop-extract marker prevents extraction",
                            self.name(),
                        )
                    })
            },
            Self::ForceMarker => {
                let marker = link.extraction_marker.as_ref()?;
                (marker.inner_text == "force-extract")
                    .then(|| Decision::new(true, "force-extract marker", self.name()))
            },
            Self::SectionLink => link.anchor_type.is_some().then(|| {
                Decision::new(
                    true,
                    "Markdown anchor links eligible by default",
                    self.name(),
                )
            }),
            Self::CliFlag => Some(if link.anchor_type.is_some() {
                Decision::new(
                    true,
                    "Markdown anchor links eligible by default",
                    self.name(),
                )
            } else if flags.full_files {
                Decision::new(
                    true,
                    "Full-file extraction enabled by CLI flag",
                    self.name(),
                )
            } else {
                Decision::new(
                    false,
                    "Full-file link ineligible without --full-files flag",
                    self.name(),
                )
            }),
        }
    }
}

/// Analyzer holding the ordered strategy chain.
#[derive(Debug, Clone)]
pub struct EligibilityAnalyzer {
    strategies: Vec<ExtractionStrategy>,
}

impl Default for EligibilityAnalyzer {
    fn default() -> Self {
        Self {
            strategies: vec![
                ExtractionStrategy::StopMarker,
                ExtractionStrategy::ForceMarker,
                ExtractionStrategy::SectionLink,
                ExtractionStrategy::CliFlag,
            ],
        }
    }
}

impl EligibilityAnalyzer {
    /// Analyzer with the default strategy order.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the chain; the terminal strategy guarantees a decision.
    #[must_use]
    pub fn decide(&self, link: &Link, flags: CliFlags) -> Decision {
        for strategy in &self.strategies {
            if let Some(decision) = strategy.decision(link, flags) {
                return decision;
            }
        }
        // The chain ends in CliFlag, which always decides; this is the
        // fallback for a misconfigured custom chain.
        Decision::new(
            false,
            "Full-file link ineligible without --full-files flag",
            ExtractionStrategy::CliFlag.name(),
        )
    }
}
