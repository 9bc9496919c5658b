//! Host-facing engine
//!
//! [`CompletionEngine`] ties the pieces together for one editor session:
//! it listens for file open/save events, keeps the parse cache current,
//! can pre-parse the whole assets directory, and answers completion
//! requests. File reads are the only suspension points; everything else
//! runs to completion synchronously.

use crate::completion::{BuiltinTables, CompletionProvider, Notice, Notifier, Suggestion};
use crate::config::Settings;
use crate::error::{EngineError, EngineResult};
use crate::project::ProjectDetector;
use crate::storage::{CacheEntry, ParseCache};
use ignore::WalkBuilder;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileEventKind {
    Opened,
    Saved,
}

/// A document was opened or saved in the host editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    pub kind: FileEventKind,
    pub path: PathBuf,
    /// Document text when the host already has it; read from disk otherwise
    pub content: Option<String>,
}

impl FileEvent {
    pub fn opened(path: impl Into<PathBuf>, content: Option<String>) -> Self {
        Self {
            kind: FileEventKind::Opened,
            path: path.into(),
            content,
        }
    }

    pub fn saved(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: FileEventKind::Saved,
            path: path.into(),
            content: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub parsed: usize,
    pub failed: usize,
}

pub struct CompletionEngine {
    settings: Arc<Settings>,
    detector: Arc<dyn ProjectDetector>,
    notifier: Arc<dyn Notifier>,
    cache: Arc<ParseCache>,
    provider: CompletionProvider,
}

impl CompletionEngine {
    /// Create an engine with an empty cache.
    ///
    /// Fails only when a custom built-in table is configured and cannot be
    /// loaded.
    pub fn new(
        settings: Arc<Settings>,
        detector: Arc<dyn ProjectDetector>,
        notifier: Arc<dyn Notifier>,
    ) -> EngineResult<Self> {
        let builtins =
            BuiltinTables::load_or_bundled(settings.completion.builtins_path.as_deref())?;
        let cache = Arc::new(ParseCache::new());
        let provider = CompletionProvider::new(
            cache.clone(),
            Arc::new(builtins),
            settings.factory.pattern(),
            notifier.clone(),
        );

        Ok(Self {
            settings,
            detector,
            notifier,
            cache,
            provider,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn cache(&self) -> &Arc<ParseCache> {
        &self.cache
    }

    pub fn detector(&self) -> Arc<dyn ProjectDetector> {
        self.detector.clone()
    }

    /// Re-parse `path` from text the host already holds.
    ///
    /// Returns `None` without touching the cache when the file is not part
    /// of the project.
    pub fn touch_content(&self, path: &Path, content: &str) -> Option<Arc<CacheEntry>> {
        if !self.detector.is_project_file(path) {
            debug!("ignoring non-project file {}", path.display());
            return None;
        }
        Some(self.cache.on_file_touched(path, content))
    }

    /// Read `path` from disk and re-parse it.
    ///
    /// A failed read leaves any previous cache entry in place. Content that
    /// is not text is cached as an empty tree. Dropping the future before
    /// the read completes leaves the cache untouched.
    pub async fn touch_file(&self, path: &Path) -> EngineResult<Option<Arc<CacheEntry>>> {
        if !self.detector.is_project_file(path) {
            debug!("ignoring non-project file {}", path.display());
            return Ok(None);
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| EngineError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Some(self.cache.on_file_bytes_touched(path, &bytes)))
    }

    /// Apply one open/save event, reporting read failures to the notifier
    pub async fn handle_event(&self, event: FileEvent) {
        debug!("{:?} {}", event.kind, event.path.display());

        let result = match event.content {
            Some(content) => Ok(self.touch_content(&event.path, &content)),
            None => self.touch_file(&event.path).await,
        };

        if let Err(e) = result {
            warn!("{e}");
            self.notifier.notify(Notice::warning(e.to_string()));
        }
    }

    /// Consume events until every sender is dropped
    pub async fn run(&self, mut events: mpsc::Receiver<FileEvent>) {
        info!("completion engine listening for file events");
        while let Some(event) = events.recv().await {
            self.handle_event(event).await;
        }
        info!("file event channel closed, {} files cached", self.cache.len());
    }

    /// Script files under the assets directory
    pub fn script_files(&self) -> Vec<PathBuf> {
        let mut builder = WalkBuilder::new(self.detector.assets_root());
        builder
            .hidden(true)
            .git_ignore(true)
            .follow_links(false)
            .require_git(false);

        builder
            .build()
            .filter_map(Result::ok) // Skip files we can't access
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
            .map(|entry| entry.into_path())
            .filter(|path| self.detector.is_project_file(path))
            .collect()
    }

    /// Parse every script in the assets directory.
    ///
    /// At most `scan.max_concurrent` reads are in flight at once. Files that
    /// cannot be read are counted and logged, they do not stop the scan.
    pub async fn scan_assets(&self) -> EngineResult<ScanSummary> {
        if !self.detector.is_project_folder() {
            return Err(EngineError::NotProjectFolder {
                root: self.detector.root().to_path_buf(),
            });
        }

        let files = self.script_files();
        let limit = self.settings.scan.max_concurrent.max(1);
        info!("scanning {} scripts ({limit} reads at a time)", files.len());

        let mut summary = ScanSummary::default();
        let mut reads = JoinSet::new();

        for path in files {
            while reads.len() >= limit {
                if let Some(joined) = reads.join_next().await {
                    self.finish_read(joined, &mut summary);
                }
            }
            reads.spawn(async move {
                let bytes = tokio::fs::read(&path).await;
                (path, bytes)
            });
        }

        while let Some(joined) = reads.join_next().await {
            self.finish_read(joined, &mut summary);
        }

        info!(
            "scan finished: {} parsed, {} failed",
            summary.parsed, summary.failed
        );
        Ok(summary)
    }

    fn finish_read(
        &self,
        joined: Result<(PathBuf, std::io::Result<Vec<u8>>), tokio::task::JoinError>,
        summary: &mut ScanSummary,
    ) {
        match joined {
            Ok((path, Ok(bytes))) => {
                self.cache.on_file_bytes_touched(&path, &bytes);
                summary.parsed += 1;
            }
            Ok((path, Err(e))) => {
                warn!("failed to read {}: {e}", path.display());
                summary.failed += 1;
            }
            Err(e) => {
                warn!("scan task failed: {e}");
                summary.failed += 1;
            }
        }
    }

    /// Completion suggestions for the cursor in `path`
    pub fn provide(&self, path: &Path, line_prefix: &str) -> Vec<Suggestion> {
        self.provider.provide(path, line_prefix)
    }

    pub fn provider(&self) -> &CompletionProvider {
        &self.provider
    }
}
