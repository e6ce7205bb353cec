//! Per-invocation parsed-document cache.
//!
//! Memoizes `path → ParsedDocument` so every document is parsed at most once
//! per command execution. Keys are canonicalized absolute paths (symlinks
//! resolved). Failures are cached too: a broken file is read and parsed once,
//! then keeps returning the same error for the rest of the run.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::debug;

use crate::document::ParsedDocument;
use crate::parser::MarkdownParser;
use crate::{Error, Result};

enum CacheEntry {
    Parsed(Rc<ParsedDocument>),
    Failed(String),
}

/// Cache owning the parser and all documents touched by one command.
pub struct DocumentCache {
    parser: MarkdownParser,
    entries: HashMap<PathBuf, CacheEntry>,
}

impl DocumentCache {
    /// Create an empty cache with its own parser instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the markdown parser cannot be initialized.
    pub fn new() -> Result<Self> {
        Ok(Self {
            parser: MarkdownParser::new()?,
            entries: HashMap::new(),
        })
    }

    /// Fetch the parsed document for `path`, parsing it on first access.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed; the failure
    /// is memoized so the file is not re-read within this run.
    pub fn get(&mut self, path: &Path) -> Result<Rc<ParsedDocument>> {
        let key = fs::canonicalize(path)?;

        if let Some(entry) = self.entries.get(&key) {
            return match entry {
                CacheEntry::Parsed(doc) => Ok(Rc::clone(doc)),
                CacheEntry::Failed(message) => Err(Error::Parse(message.clone())),
            };
        }

        match self.read_and_parse(&key) {
            Ok(document) => {
                debug!(path = %key.display(), links = document.links().len(), "parsed document");
                let document = Rc::new(document);
                self.entries
                    .insert(key, CacheEntry::Parsed(Rc::clone(&document)));
                Ok(document)
            },
            Err(error) => {
                self.entries
                    .insert(key, CacheEntry::Failed(error.to_string()));
                Err(error)
            },
        }
    }

    fn read_and_parse(&mut self, path: &Path) -> Result<ParsedDocument> {
        let text = fs::read_to_string(path)?;
        let output = self.parser.parse(&text, path)?;
        Ok(ParsedDocument::new(output))
    }
}
