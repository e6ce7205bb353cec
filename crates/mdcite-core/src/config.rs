//! Configuration loading.
//!
//! Settings come from `config.toml`, discovered in this order: an explicitly
//! requested file (`--config` / `MDCITE_CONFIG`), an explicitly requested
//! directory (`--config-dir` / `MDCITE_CONFIG_DIR`), then the platform config
//! directory. A missing file simply yields defaults; CLI flags override
//! whatever was loaded.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;
use tracing::debug;

use crate::{Error, Result};

/// Name of the configuration file inside a config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Defaults applied when flags are not given on the command line.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default scope directory for short-name resolution.
    pub scope: Option<PathBuf>,
    /// Whether whole-file links are extractable by default.
    pub full_files: bool,
    /// Default output format (`text` or `json`).
    pub format: Option<String>,
}

impl Config {
    /// Load configuration, preferring the explicit file, then the explicit
    /// directory, then the platform config directory.
    ///
    /// # Errors
    ///
    /// Returns an error when an explicitly requested file is missing or any
    /// discovered file fails to parse.
    pub fn load(explicit_file: Option<&Path>, explicit_dir: Option<&Path>) -> Result<Self> {
        if let Some(file) = explicit_file {
            if !file.is_file() {
                return Err(Error::Config(format!(
                    "config file not found: {}",
                    file.display()
                )));
            }
            return Self::from_file(file);
        }

        let candidate = explicit_dir.map_or_else(
            || {
                ProjectDirs::from("dev", "outfitter", "mdcite")
                    .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
            },
            |dir| Some(dir.join(CONFIG_FILE_NAME)),
        );

        match candidate {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let config = Config::load(None, Some(dir.path())).unwrap();

        assert!(config.scope.is_none());
        assert!(!config.full_files);
        assert!(config.format.is_none());
    }

    #[test]
    fn test_config_dir_discovery() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "scope = \"/docs\"\nfull_files = true\nformat = \"json\"\n",
        )
        .unwrap();

        let config = Config::load(None, Some(dir.path())).unwrap();

        assert_eq!(config.scope.as_deref(), Some(Path::new("/docs")));
        assert!(config.full_files);
        assert_eq!(config.format.as_deref(), Some("json"));
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();

        let error = Config::load(Some(&dir.path().join("nope.toml")), None).unwrap_err();

        assert_eq!(error.category(), "config");
    }

    #[test]
    fn test_malformed_config_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "scope = [broken\n").unwrap();

        let error = Config::load(Some(&path), None).unwrap_err();

        assert_eq!(error.category(), "serialization");
    }
}
