//! Parse cache keyed by file path
//!
//! Entries are created or replaced when a file is opened or saved and are
//! never evicted during a session. Edits between saves do not invalidate an
//! entry, so completion may work from a slightly stale tree.
//!
//! Each entry is an immutable `Arc<CacheEntry>`. Replacing an entry is one
//! map insert, so a reader sees either the old tree or the new one, never a
//! mix. Parsing happens outside the map, so re-parsing one file does not
//! block lookups of another.

use crate::parsing::{Comment, ParsedSource, ScriptParser, SyntaxTree};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Parsed state of one file
#[derive(Debug)]
pub struct CacheEntry {
    pub tree: SyntaxTree,
    pub comments: Vec<Comment>,
    /// True when the content could not be parsed at all
    pub degenerate: bool,
    pub parsed_at: Instant,
}

impl CacheEntry {
    pub fn from_parsed(parsed: ParsedSource) -> Self {
        Self {
            tree: parsed.tree,
            comments: parsed.comments,
            degenerate: parsed.degenerate,
            parsed_at: Instant::now(),
        }
    }
}

pub struct ParseCache {
    entries: DashMap<PathBuf, Arc<CacheEntry>>,
    /// Reused between parses; created on first use
    parser: Mutex<Option<ScriptParser>>,
}

impl Default for ParseCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ParseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseCache")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl ParseCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            parser: Mutex::new(None),
        }
    }

    /// Re-parse `content` and replace the entry for `path`
    pub fn on_file_touched(&self, path: &Path, content: &str) -> Arc<CacheEntry> {
        let parsed = self.with_parser(|parser| parser.parse(content));
        self.replace(path, parsed)
    }

    /// Same as [`Self::on_file_touched`] for raw file bytes. Content that is
    /// not text still gets an entry, with an empty tree.
    pub fn on_file_bytes_touched(&self, path: &Path, bytes: &[u8]) -> Arc<CacheEntry> {
        let parsed = self.with_parser(|parser| parser.parse_bytes(bytes));
        self.replace(path, parsed)
    }

    fn replace(&self, path: &Path, parsed: ParsedSource) -> Arc<CacheEntry> {
        if parsed.degenerate {
            tracing::debug!("cached empty tree for unparsable {}", path.display());
        }

        let entry = Arc::new(CacheEntry::from_parsed(parsed));
        self.entries.insert(path.to_path_buf(), Arc::clone(&entry));
        entry
    }

    /// Pure lookup; never parses
    pub fn get(&self, path: &Path) -> Option<Arc<CacheEntry>> {
        self.entries.get(path).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Paths with a cached entry, in no particular order
    pub fn paths(&self) -> Vec<PathBuf> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    fn with_parser(&self, parse: impl FnOnce(&mut ScriptParser) -> ParsedSource) -> ParsedSource {
        let mut guard = self.parser.lock();
        if guard.is_none() {
            match ScriptParser::new() {
                Ok(parser) => *guard = Some(parser),
                Err(e) => {
                    tracing::error!("{e}");
                    return ParsedSource::degenerate();
                }
            }
        }

        match guard.as_mut() {
            Some(parser) => parse(parser),
            None => ParsedSource::degenerate(),
        }
    }
}
