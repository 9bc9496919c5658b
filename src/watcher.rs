//! File system watcher that feeds on-disk saves into the engine
//!
//! Editors report open and save events themselves. This watcher covers the
//! remaining case, scripts rewritten by other tools, by turning debounced
//! modify/create notifications into [`FileEvent::saved`] events.

use crate::engine::FileEvent;
use crate::error::{EngineError, EngineResult};
use crate::project::ProjectDetector;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::time::{Duration, sleep};
use tracing::{debug, info, warn};

/// How often pending changes are checked against the debounce interval
const TICK_MS: u64 = 100;

pub struct ScriptWatcher {
    detector: Arc<dyn ProjectDetector>,
    debounce_ms: u64,
    events: mpsc::Sender<FileEvent>,
    /// Channel receiver for raw notify events
    event_rx: mpsc::Receiver<notify::Result<Event>>,
    /// Registered on the assets root when watching starts
    watcher: notify::RecommendedWatcher,
}

impl ScriptWatcher {
    pub fn new(
        detector: Arc<dyn ProjectDetector>,
        debounce_ms: u64,
        events: mpsc::Sender<FileEvent>,
    ) -> EngineResult<Self> {
        let (tx, rx) = mpsc::channel(100);

        // The notify callback is sync, hence blocking_send
        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.blocking_send(res);
        })
        .map_err(|e| EngineError::WatcherInit {
            reason: e.to_string(),
        })?;

        Ok(Self {
            detector,
            debounce_ms,
            events,
            event_rx: rx,
            watcher,
        })
    }

    /// Watch the assets directory until the event receiver is dropped
    pub async fn watch(mut self) -> EngineResult<()> {
        let root = self.detector.assets_root();
        self.watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|e| EngineError::WatchPath {
                path: root.clone(),
                reason: e.to_string(),
            })?;
        info!("watching {} for script changes", root.display());

        let mut pending_changes: HashMap<PathBuf, Instant> = HashMap::new();
        let debounce_duration = Duration::from_millis(self.debounce_ms);

        loop {
            let timeout = sleep(Duration::from_millis(TICK_MS));
            tokio::pin!(timeout);

            tokio::select! {
                received = self.event_rx.recv() => {
                    match received {
                        Some(Ok(event)) => {
                            record(self.detector.as_ref(), event, &mut pending_changes)
                        }
                        Some(Err(e)) => warn!("file watch error: {e}"),
                        None => break,
                    }
                }

                _ = &mut timeout => {
                    let now = Instant::now();
                    let mut ready = Vec::new();

                    pending_changes.retain(|path, last_change| {
                        if now.duration_since(*last_change) >= debounce_duration {
                            ready.push(path.clone());
                            false
                        } else {
                            true
                        }
                    });

                    for path in ready {
                        debug!("script changed on disk: {}", path.display());
                        if self.events.send(FileEvent::saved(path)).await.is_err() {
                            info!("engine stopped listening, file watcher exiting");
                            return Ok(());
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

/// Remember modified or created project scripts from one notify event
fn record(
    detector: &dyn ProjectDetector,
    event: Event,
    pending_changes: &mut HashMap<PathBuf, Instant>,
) {
    if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
        return;
    }

    for path in event.paths {
        if detector.is_project_file(&path) {
            pending_changes.insert(path, Instant::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectConfig;
    use crate::engine::FileEventKind;
    use crate::project::CreatorProjectDetector;
    use std::fs;
    use tempfile::TempDir;

    fn detector(root: &std::path::Path) -> Arc<dyn ProjectDetector> {
        Arc::new(CreatorProjectDetector::new(root, &ProjectConfig::default()))
    }

    #[tokio::test]
    async fn test_watcher_creation() {
        let temp_dir = TempDir::new().unwrap();
        let (tx, _rx) = mpsc::channel(4);

        let watcher = ScriptWatcher::new(detector(temp_dir.path()), 500, tx);
        assert!(watcher.is_ok());
    }

    #[tokio::test]
    async fn test_missing_assets_dir_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let (tx, _rx) = mpsc::channel(4);

        let watcher = ScriptWatcher::new(detector(temp_dir.path()), 500, tx).unwrap();
        let err = watcher.watch().await.unwrap_err();
        assert_eq!(err.status_code(), "WATCH_PATH_ERROR");
    }

    #[tokio::test]
    async fn test_write_under_assets_becomes_saved_event() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().canonicalize().unwrap();
        let assets = root.join("assets");
        fs::create_dir(&assets).unwrap();
        let (tx, mut rx) = mpsc::channel(4);

        let watcher = ScriptWatcher::new(detector(&root), 50, tx).unwrap();
        let watching = tokio::spawn(watcher.watch());
        tokio::time::sleep(Duration::from_millis(200)).await;

        let script = assets.join("Player.js");
        fs::write(&script, "cc.Class({ start () {} });").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("no event within timeout")
            .expect("channel closed");
        assert_eq!(event.kind, FileEventKind::Saved);
        assert_eq!(event.path, script);
        assert!(event.content.is_none());

        watching.abort();
    }

    #[tokio::test]
    async fn test_only_project_files_are_recorded() {
        let temp_dir = TempDir::new().unwrap();
        let assets = temp_dir.path().join("assets");
        fs::create_dir(&assets).unwrap();
        let detector = detector(temp_dir.path());

        let event = Event::new(EventKind::Modify(notify::event::ModifyKind::Any))
            .add_path(assets.join("Player.js"))
            .add_path(assets.join("Player.js.meta"));
        let mut pending = HashMap::new();
        record(detector.as_ref(), event, &mut pending);
        record(
            detector.as_ref(),
            Event::new(EventKind::Remove(notify::event::RemoveKind::File))
                .add_path(assets.join("Old.js")),
            &mut pending,
        );

        assert_eq!(pending.len(), 1);
        assert!(pending.contains_key(&assets.join("Player.js")));
    }
}
