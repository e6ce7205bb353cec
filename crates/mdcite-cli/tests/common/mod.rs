#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A throwaway markdown corpus plus isolated config/cache dirs for one test.
pub struct Corpus {
    _dir: TempDir,
    _config: TempDir,
    _cache: TempDir,
    pub root: PathBuf,
    config_dir: PathBuf,
    cache_dir: PathBuf,
}

impl Corpus {
    /// Materialize `files` (relative path, contents) under a temp root.
    pub fn new(files: &[(&str, &str)]) -> Self {
        let dir = tempfile::tempdir().expect("corpus dir");
        let config = tempfile::tempdir().expect("config dir");
        let cache = tempfile::tempdir().expect("cache dir");
        let root = dir.path().canonicalize().expect("canonicalize corpus");
        for (name, contents) in files {
            let path = root.join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("mkdir");
            }
            fs::write(&path, contents).expect("write fixture");
        }
        Self {
            root,
            config_dir: config.path().to_path_buf(),
            cache_dir: cache.path().to_path_buf(),
            _dir: dir,
            _config: config,
            _cache: cache,
        }
    }

    /// Create a configured `mdcite` command isolated from the user
    /// environment, running inside the corpus root.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("mdcite"));
        cmd.env("MDCITE_CONFIG_DIR", &self.config_dir);
        cmd.env("MDCITE_CACHE_DIR", &self.cache_dir);
        cmd.env("NO_COLOR", "1");
        cmd.current_dir(&self.root);
        cmd
    }
}

/// Parse a command's stdout as JSON.
#[allow(dead_code)]
pub fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is not valid JSON")
}
