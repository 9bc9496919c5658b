//! Engine event handling and the bulk assets scan

use crate::common::TestProject;
use crate::common::sample_scripts::*;
use ccassist::completion::NoticeBroadcaster;
use ccassist::{CompletionEngine, FileEvent, ScanSummary};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;

fn first_names(engine: &CompletionEngine, path: &Path, n: usize) -> Vec<String> {
    engine
        .provide(path, "    this.")
        .into_iter()
        .take(n)
        .map(|s| s.name)
        .collect()
}

#[tokio::test]
async fn test_edits_are_picked_up_on_save_only() {
    let project = TestProject::new();
    let path = project.add_script("Score.js", EXPRESSION_FORM);
    let engine = project.engine();

    engine.handle_event(FileEvent::opened(&path, None)).await;
    assert_eq!(first_names(&engine, &path, 2), vec!["start", "score"]);

    // edited on disk but not yet saved through the editor: stale entry stays
    fs::write(&path, "cc.Class({ finish () {} });").unwrap();
    assert_eq!(first_names(&engine, &path, 2), vec!["start", "score"]);

    engine.handle_event(FileEvent::saved(&path)).await;
    assert_eq!(first_names(&engine, &path, 1), vec!["finish"]);
}

#[tokio::test]
async fn test_run_processes_events_in_order() {
    let project = TestProject::new();
    let path = project.add_script("Player.js", PLAYER);
    let engine = project.engine();

    let (tx, rx) = mpsc::channel(8);
    tx.send(FileEvent::opened(&path, Some(EXPRESSION_FORM.to_string())))
        .await
        .unwrap();
    tx.send(FileEvent::saved(&path)).await.unwrap();
    drop(tx);

    engine.run(rx).await;

    // the save re-read the file from disk, replacing the opened content
    assert_eq!(first_names(&engine, &path, 1), vec!["onLoad"]);
}

#[tokio::test]
async fn test_scan_then_complete() {
    let project = TestProject::new();
    let player = project.add_script("game/Player.js", PLAYER);
    let score = project.add_script("ui/Score.js", EXPRESSION_FORM);
    project.add_script("game/Player.js.meta", "{}");
    project.add_file("build/bundle.js", PLAYER);

    let engine = project.engine();
    let summary = engine.scan_assets().await.unwrap();

    assert_eq!(summary, ScanSummary { parsed: 2, failed: 0 });
    assert_eq!(engine.cache().len(), 2);
    assert_eq!(first_names(&engine, &player, 1), vec!["onLoad"]);
    assert_eq!(first_names(&engine, &score, 1), vec!["start"]);
}

#[tokio::test]
async fn test_scan_with_single_read_in_flight() {
    let project = TestProject::new();
    for i in 0..5 {
        project.add_script(&format!("S{i}.js"), EXPRESSION_FORM);
    }

    let mut settings = ccassist::Settings::default();
    settings.scan.max_concurrent = 1;
    let engine = project.engine_with(settings);

    let summary = engine.scan_assets().await.unwrap();
    assert_eq!(summary.parsed, 5);
}

#[tokio::test]
async fn test_binary_asset_is_cached_as_empty_tree() {
    let project = TestProject::new();
    project.add_script("Ok.js", EXPRESSION_FORM);
    let binary = project.path().join("assets/Packed.js");
    fs::write(&binary, [0xffu8, 0xfe, 0x00, 0x01, 0x80]).unwrap();

    let engine = project.engine();
    let summary = engine.scan_assets().await.unwrap();

    assert_eq!(summary, ScanSummary { parsed: 2, failed: 0 });
    let entry = engine.cache().get(&binary).expect("binary script is cached");
    assert!(entry.degenerate);
    assert!(entry.tree.is_empty());
    assert!(entry.comments.is_empty());

    // completions still work, with built-ins only
    let suggestions = engine.provide(&binary, "    this.");
    assert!(!suggestions.is_empty());
    assert!(suggestions.iter().all(|s| s.sort_key != "00" && s.sort_key != "01"));
}

#[tokio::test]
async fn test_saved_binary_file_replaces_entry_without_notice() {
    let project = TestProject::new();
    let path = project.add_script("Player.js", PLAYER);
    let broadcaster = NoticeBroadcaster::new(4);
    let mut notices = broadcaster.subscribe();
    let engine = project.engine_with_notifier(Arc::new(broadcaster));

    engine.touch_content(&path, PLAYER).unwrap();
    fs::write(&path, [0x00u8, 0xff, 0xfe]).unwrap();

    let entry = engine.touch_file(&path).await.unwrap().unwrap();
    assert!(entry.degenerate);
    assert!(engine.cache().get(&path).unwrap().tree.is_empty());
    assert!(notices.try_recv().is_err());
}
