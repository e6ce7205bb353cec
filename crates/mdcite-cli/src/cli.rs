//! # CLI Structure and Argument Parsing
//!
//! This module defines the command-line interface for `mdcite`, built with
//! `clap` derive macros for automatic help generation and argument
//! validation.
//!
//! ## Architecture
//!
//! The CLI follows a standard command-subcommand pattern:
//!
//! - **Global options**: apply to all commands (`--verbose`, `--quiet`,
//!   `--no-color`, `--config`, `--config-dir`)
//! - **Subcommands**: `validate`, `extract links|header|file`, `completions`
//!
//! ## Usage Patterns
//!
//! ```bash
//! # Validate every outgoing citation of a document
//! mdcite validate docs/overview.md --scope docs
//!
//! # Extract referenced content, deduplicated, as JSON
//! mdcite extract links docs/overview.md --scope docs --full-files
//!
//! # Pull one section or a whole file
//! mdcite extract header docs/api.md "Error Handling"
//! mdcite extract file docs/api.md
//! ```
//!
//! ## Exit codes
//!
//! `0` success / at least one content block extracted; `1` validation errors
//! or zero extractions; `2` system error (unreadable source, bad arguments).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Main CLI structure for the `mdcite` command.
#[derive(Parser, Clone, Debug)]
#[command(name = "mdcite")]
#[command(version)]
#[command(
    about = "mdcite - validate and extract cross-document markdown citations",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages (only show errors)
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Disable all ANSI colors in output (also respects `NO_COLOR` env)
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Path to configuration file (overrides autodiscovery). Also via `MDCITE_CONFIG`.
    #[arg(long, global = true, value_name = "FILE", env = "MDCITE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory containing config.toml (overrides autodiscovery). Also via `MDCITE_CONFIG_DIR`.
    #[arg(
        long = "config-dir",
        global = true,
        value_name = "DIR",
        env = "MDCITE_CONFIG_DIR"
    )]
    pub config_dir: Option<PathBuf>,
}

/// Available subcommands for the `mdcite` CLI.
#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Validate every outgoing citation of a source document
    Validate {
        /// Source markdown file
        source: PathBuf,

        /// Scope directory for short-name resolution (defaults to the
        /// source file's directory)
        #[arg(long, value_name = "DIR")]
        scope: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Restrict the report to links within a 1-based inclusive line range
        #[arg(long, value_name = "START-END")]
        lines: Option<String>,

        /// Print the path rewrites that would repair short-name-rescued
        /// links (never modifies files)
        #[arg(long)]
        fix: bool,
    },

    /// Extract referenced content into a deduplicated payload
    Extract {
        #[command(subcommand)]
        command: ExtractCommands,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to emit completions for
        shell: clap_complete::Shell,
    },
}

/// Extraction subcommands.
#[derive(Subcommand, Clone, Debug)]
pub enum ExtractCommands {
    /// Extract the content referenced by every eligible outgoing link
    Links {
        /// Source markdown file
        source: PathBuf,

        /// Scope directory for short-name resolution
        #[arg(long, value_name = "DIR")]
        scope: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Allow whole-file links to be extracted
        #[arg(long = "full-files")]
        full_files: bool,

        /// Session id: skip extraction when this source was already
        /// extracted in the session
        #[arg(long, value_name = "ID")]
        session: Option<String>,
    },

    /// Extract one section of a target document by header name
    Header {
        /// Target markdown file
        target: PathBuf,

        /// Header name (raw text or URL-encoded form)
        header: String,

        /// Scope directory for short-name resolution
        #[arg(long, value_name = "DIR")]
        scope: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Extract a whole target document
    File {
        /// Target markdown file
        target: PathBuf,

        /// Scope directory for short-name resolution
        #[arg(long, value_name = "DIR")]
        scope: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
}

impl Commands {
    /// The explicit `--format` flag of the selected command, if any.
    #[must_use]
    pub fn explicit_format(&self) -> Option<OutputFormat> {
        match self {
            Self::Validate { format, .. } => *format,
            Self::Extract { command } => match command {
                ExtractCommands::Links { format, .. }
                | ExtractCommands::Header { format, .. }
                | ExtractCommands::File { format, .. } => *format,
            },
            Self::Completions { .. } => None,
        }
    }

    /// The format this command uses when no flag and no config override it.
    #[must_use]
    pub const fn default_format(&self) -> OutputFormat {
        match self {
            // Extraction is machine-oriented; validation reads as a report
            Self::Extract { .. } => OutputFormat::Json,
            Self::Validate { .. } | Self::Completions { .. } => OutputFormat::Text,
        }
    }
}
