//! Target file resolution inside a scope directory.
//!
//! A raw link path resolves in two stages: first directly against the source
//! file's directory, then — when that misses — through a short-name cache
//! built by scanning the scope once for `.md` files, keyed by basename. A
//! unique basename hit is a "short-name rescue" and comes with a recommended
//! path rewrite; zero hits produce fuzzy candidates, multiple hits are
//! ambiguous.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::types::PathConversion;
use crate::{paths, suggest};

/// Why a resolution ended the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveReason {
    /// The raw path resolved directly against the source directory.
    Direct,
    /// The file was rescued through the short-name cache.
    Cache,
    /// No file in scope matches.
    NotFound,
    /// Several files in scope share the basename.
    Duplicate,
}

/// Outcome of resolving one raw link path.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Whether a unique existing file was found.
    pub found: bool,
    /// How the outcome was reached.
    pub reason: ResolveReason,
    /// The resolved file, when `found`.
    pub path: Option<PathBuf>,
    /// Ambiguous or fuzzy-matched alternatives, when not `found`.
    pub candidates: Vec<PathBuf>,
    /// Recommended rewrite, present on short-name rescues.
    pub conversion: Option<PathConversion>,
}

impl Resolution {
    fn found(reason: ResolveReason, path: PathBuf, conversion: Option<PathConversion>) -> Self {
        Self {
            found: true,
            reason,
            path: Some(path),
            candidates: Vec::new(),
            conversion,
        }
    }

    fn not_found(reason: ResolveReason, candidates: Vec<PathBuf>) -> Self {
        Self {
            found: false,
            reason,
            path: None,
            candidates,
            conversion: None,
        }
    }
}

/// Resolver owning the lazily built short-name cache for one scope.
///
/// The cache indexes regular `.md` files only; directories never match a file
/// reference. It is built on the first lookup that misses direct resolution
/// and reused for the rest of the command execution.
#[derive(Debug)]
pub struct FileResolver {
    scope: PathBuf,
    cache: Option<HashMap<String, Vec<PathBuf>>>,
}

impl FileResolver {
    /// Create a resolver for the given scope directory.
    #[must_use]
    pub fn new(scope: impl Into<PathBuf>) -> Self {
        Self {
            scope: scope.into(),
            cache: None,
        }
    }

    /// The scope directory this resolver searches.
    #[must_use]
    pub fn scope(&self) -> &Path {
        &self.scope
    }

    /// Resolve `raw` against `source_dir`, falling back to the short-name
    /// cache.
    ///
    /// Extensionless targets (wiki convention) also try `raw + ".md"`.
    pub fn resolve(&mut self, raw: &str, source_dir: &Path) -> Resolution {
        let direct = paths::normalize(&source_dir.join(raw));
        if direct.is_file() {
            return Resolution::found(ResolveReason::Direct, direct, None);
        }
        if Path::new(raw).extension().is_none() {
            let with_md = paths::normalize(&source_dir.join(format!("{raw}.md")));
            if with_md.is_file() {
                return Resolution::found(ResolveReason::Direct, with_md, None);
            }
        }

        let basename = Path::new(raw)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        if basename.is_empty() {
            return Resolution::not_found(ResolveReason::NotFound, Vec::new());
        }

        let mut lookups = vec![basename.clone()];
        if Path::new(&basename).extension().is_none() {
            lookups.push(format!("{basename}.md"));
        }

        let index = self.index();
        let mut hits: Vec<PathBuf> = lookups
            .iter()
            .filter_map(|name| index.get(name))
            .flatten()
            .cloned()
            .collect();
        hits.sort();
        hits.dedup();

        match hits.len() {
            1 => {
                let path = hits.remove(0);
                let recommended = paths::relative_from(&path, source_dir);
                let conversion =
                    PathConversion::new(raw, recommended.to_string_lossy().into_owned());
                Resolution::found(ResolveReason::Cache, path, Some(conversion))
            },
            0 => {
                let names: Vec<&str> = index.keys().map(String::as_str).collect();
                let candidates = suggest::close_matches(&basename, names.iter().copied())
                    .iter()
                    .filter_map(|name| index.get(name))
                    .flatten()
                    .cloned()
                    .collect();
                Resolution::not_found(ResolveReason::NotFound, candidates)
            },
            _ => Resolution::not_found(ResolveReason::Duplicate, hits),
        }
    }

    fn index(&mut self) -> &HashMap<String, Vec<PathBuf>> {
        self.cache.get_or_insert_with(|| {
            let index = build_index(&self.scope);
            debug!(
                short_names = index.len(),
                scope = %self.scope.display(),
                "built short-name cache"
            );
            index
        })
    }
}

/// Scan the scope once, indexing regular `.md` files by basename.
fn build_index(scope: &Path) -> HashMap<String, Vec<PathBuf>> {
    let mut index: HashMap<String, Vec<PathBuf>> = HashMap::new();
    let mut pending = vec![scope.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            debug!(dir = %dir.display(), "skipping unreadable directory");
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(OsStr::to_str) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().and_then(OsStr::to_str) == Some("md") && path.is_file() {
                index.entry(name.to_string()).or_default().push(path);
            }
        }
    }

    for paths in index.values_mut() {
        paths.sort();
    }
    index
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn scope_with(files: &[&str]) -> TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        for file in files {
            let path = dir.path().join(file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("mkdir");
            }
            fs::write(&path, "# stub\n").expect("write");
        }
        dir
    }

    #[test]
    fn test_direct_resolution() {
        let scope = scope_with(&["notes.md"]);
        let mut resolver = FileResolver::new(scope.path());

        let res = resolver.resolve("notes.md", scope.path());

        assert!(res.found);
        assert_eq!(res.reason, ResolveReason::Direct);
        assert!(res.conversion.is_none());
    }

    #[test]
    fn test_direct_resolution_relative_traversal() {
        let scope = scope_with(&["a/one.md", "b/two.md"]);
        let mut resolver = FileResolver::new(scope.path());

        let res = resolver.resolve("../b/two.md", &scope.path().join("a"));

        assert!(res.found);
        assert_eq!(res.reason, ResolveReason::Direct);
        assert_eq!(res.path.unwrap(), scope.path().join("b/two.md"));
    }

    #[test]
    fn test_short_name_rescue_emits_conversion() {
        let scope = scope_with(&["subdir/warning-test-target.md", "src.md"]);
        let mut resolver = FileResolver::new(scope.path());

        let res = resolver.resolve("../wrong/warning-test-target.md", scope.path());

        assert!(res.found);
        assert_eq!(res.reason, ResolveReason::Cache);
        let conversion = res.conversion.expect("conversion");
        assert_eq!(conversion.original, "../wrong/warning-test-target.md");
        assert_eq!(conversion.recommended, "subdir/warning-test-target.md");
    }

    #[test]
    fn test_duplicate_short_name() {
        let scope = scope_with(&["a/dup.md", "b/dup.md"]);
        let mut resolver = FileResolver::new(scope.path());

        let res = resolver.resolve("dup.md", scope.path());

        assert!(!res.found);
        assert_eq!(res.reason, ResolveReason::Duplicate);
        assert_eq!(res.candidates.len(), 2);
    }

    #[test]
    fn test_not_found_with_fuzzy_candidates() {
        let scope = scope_with(&["guide.md"]);
        let mut resolver = FileResolver::new(scope.path());

        let res = resolver.resolve("guid.md", scope.path());

        assert!(!res.found);
        assert_eq!(res.reason, ResolveReason::NotFound);
        assert_eq!(res.candidates, vec![scope.path().join("guide.md")]);
    }

    #[test]
    fn test_directory_never_matches() {
        let scope = scope_with(&["docs.md/inner.md"]);
        let mut resolver = FileResolver::new(scope.path());

        // "docs.md" exists but is a directory
        let res = resolver.resolve("docs.md", scope.path());

        assert!(!res.found);
    }

    #[test]
    fn test_extensionless_wiki_target_direct() {
        let scope = scope_with(&["Design Notes.md"]);
        let mut resolver = FileResolver::new(scope.path());

        let res = resolver.resolve("Design Notes", scope.path());

        assert!(res.found);
        assert_eq!(res.reason, ResolveReason::Direct);
    }

    #[test]
    fn test_extensionless_wiki_target_rescue() {
        let scope = scope_with(&["deep/nested/Design Notes.md"]);
        let mut resolver = FileResolver::new(scope.path());

        let res = resolver.resolve("Design Notes", scope.path());

        assert!(res.found);
        assert_eq!(res.reason, ResolveReason::Cache);
        assert_eq!(
            res.conversion.unwrap().recommended,
            "deep/nested/Design Notes.md"
        );
    }

    #[test]
    fn test_non_md_files_are_not_indexed() {
        let scope = scope_with(&["image.png.md"]);
        fs::write(scope.path().join("image.png"), b"binary").unwrap();
        let mut resolver = FileResolver::new(scope.path());

        let res = resolver.resolve("elsewhere/image.png", scope.path());

        assert!(!res.found);
        assert_eq!(res.reason, ResolveReason::NotFound);
    }
}
