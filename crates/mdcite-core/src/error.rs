//! Error types and handling for mdcite-core operations.
//!
//! This module provides the error type covering all system-level failures in
//! the citation pipeline. Link-level problems (missing files, missing anchors,
//! path conversions) are *verdicts*, not errors: they are recorded on each
//! link's `validation` field and never abort a run. Only conditions that make
//! the command itself impossible — unreadable source files, malformed
//! configuration, parser initialization failures — surface through [`Error`].
//!
//! ## Error Categories
//!
//! - **I/O Errors**: file system operations, directory scans
//! - **Parse Errors**: markdown tokenization failures
//! - **Configuration Errors**: invalid settings or config files
//! - **Serialization Errors**: JSON/TOML conversion
//! - **Not Found**: a requested document is missing entirely
//! - **Internal**: unexpected conditions; the CLI maps these to exit code 2

use thiserror::Error;

/// The main error type for mdcite-core operations.
///
/// All public functions in mdcite-core return `Result<T, Error>` for
/// consistent error handling. The error type includes automatic conversion
/// from common standard library errors and provides a stable category string
/// for logging.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Covers reading source documents, scanning the scope directory, and
    /// session-cache writes. The underlying `std::io::Error` is preserved to
    /// maintain detailed error information.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing operation failed.
    ///
    /// Occurs when markdown content cannot be tokenized or the tree-sitter
    /// grammar cannot be loaded. Most malformed markdown parses fine; this is
    /// reserved for hard failures.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration is invalid or inaccessible.
    ///
    /// Occurs when `config.toml` is malformed, contains invalid values, or an
    /// explicitly requested config file does not exist.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource was not found.
    ///
    /// Used for a missing source document passed on the command line. Missing
    /// link *targets* are validation verdicts instead.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization or deserialization failed.
    ///
    /// Occurs when converting between data formats (JSON, TOML) fails due to
    /// incompatible formats or corruption.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Unexpected internal condition.
    ///
    /// Anything that indicates a bug in the pipeline rather than bad input.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl Error {
    /// Get the error category as a string identifier.
    ///
    /// Returns a static string that categorizes the error type for logging
    /// and error handling logic.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Parse(_) => "parse",
            Self::Config(_) => "config",
            Self::NotFound(_) => "not_found",
            Self::Serialization(_) => "serialization",
            Self::Internal(_) => "internal",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
///
/// Used throughout mdcite-core for consistent error handling.
pub type Result<T> = std::result::Result<T, Error>;
