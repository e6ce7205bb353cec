//! Session-level extraction markers.
//!
//! A marker file under the cache directory records that a given source
//! document was already extracted in a given session. The marker name encodes
//! `(session id, content hash of the source bytes)`, so any edit to the
//! source invalidates the marker naturally. No structured payload is kept on
//! disk; presence is the whole signal.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::{Error, Result};

/// Marker-file store for one cache directory.
#[derive(Debug)]
pub struct SessionCache {
    dir: PathBuf,
}

impl SessionCache {
    /// Open (and create if needed) the session cache directory.
    ///
    /// Resolution order: explicit override, `MDCITE_CACHE_DIR`, platform
    /// cache directory.
    ///
    /// # Errors
    ///
    /// Returns an error when no cache directory can be determined or created.
    pub fn open(override_dir: Option<&Path>) -> Result<Self> {
        let dir = override_dir
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("MDCITE_CACHE_DIR").map(PathBuf::from))
            .or_else(|| {
                ProjectDirs::from("dev", "outfitter", "mdcite")
                    .map(|dirs| dirs.cache_dir().to_path_buf())
            })
            .ok_or_else(|| Error::Config("cannot determine cache directory".into()))?;
        let dir = dir.join("sessions");
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Hash source bytes into the 12-hex-char marker key.
    #[must_use]
    pub fn content_hash(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let digest = format!("{:x}", hasher.finalize());
        digest[..12].to_string()
    }

    /// Whether this (session, content) pair was already extracted.
    #[must_use]
    pub fn is_cached(&self, session_id: &str, content_hash: &str) -> bool {
        self.marker_path(session_id, content_hash).is_file()
    }

    /// Record a successful extraction for this (session, content) pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the marker file cannot be written.
    pub fn record(&self, session_id: &str, content_hash: &str) -> Result<()> {
        let path = self.marker_path(session_id, content_hash);
        fs::write(&path, b"")?;
        debug!(marker = %path.display(), "recorded session extraction");
        Ok(())
    }

    fn marker_path(&self, session_id: &str, content_hash: &str) -> PathBuf {
        self.dir
            .join(format!("{}-{content_hash}", sanitize(session_id)))
    }
}

/// Keep marker names filesystem-safe.
fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}
