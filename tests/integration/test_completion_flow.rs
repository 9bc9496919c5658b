//! End-to-end completion: parse a script, match its class, assemble suggestions

use crate::common::TestProject;
use crate::common::sample_scripts::*;
use ccassist::completion::{BuiltinTables, METHOD_SORT_KEY, PROPERTY_SORT_KEY};

fn bundled() -> BuiltinTables {
    BuiltinTables::bundled().expect("bundled tables must parse")
}

#[test]
fn test_declared_members_come_before_builtins() {
    let project = TestProject::new();
    let path = project.add_script("Player.js", PLAYER);
    let engine = project.engine();
    engine.touch_content(&path, PLAYER).expect("project file");

    let suggestions = engine.provide(&path, "        this.");
    let names: Vec<&str> = suggestions.iter().map(|s| s.name.as_str()).collect();

    assert_eq!(
        &names[..6],
        &["onLoad", "update", "jump", "speed", "jumpHeight", "deadSprite"]
    );

    let builtins = bundled();
    let expected: Vec<&str> = builtins
        .component
        .functions
        .iter()
        .chain(builtins.component.properties.iter())
        .map(|m| m.name.as_str())
        .collect();
    assert_eq!(&names[6..], expected.as_slice());

    for s in &suggestions[..3] {
        assert!(s.is_callable);
        assert_eq!(s.sort_key, METHOD_SORT_KEY);
    }
    for s in &suggestions[3..6] {
        assert!(!s.is_callable);
        assert_eq!(s.sort_key, PROPERTY_SORT_KEY);
    }
}

#[test]
fn test_comments_document_members() {
    let project = TestProject::new();
    let path = project.add_script("Player.js", PLAYER);
    let engine = project.engine();
    engine.touch_content(&path, PLAYER);

    let suggestions = engine.provide(&path, "this.");
    let doc = |name: &str| {
        suggestions
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.documentation.clone())
            .unwrap()
    };

    println!("\n=== Member documentation ===");
    for s in suggestions.iter().take(6) {
        println!("  {:<12} {}", s.name, s.documentation);
    }

    // comment on the line above
    assert_eq!(doc("speed"), "speed in px/s");
    assert_eq!(doc("update"), "called every frame");
    // trailing comment on the same line
    assert_eq!(doc("jumpHeight"), "how high a jump goes");
    // a blank line breaks the association
    assert_eq!(doc("onLoad"), "onLoad");
    // a block comment is associated by its first line only
    assert_eq!(doc("deadSprite"), "deadSprite");
}

#[test]
fn test_members_survive_half_typed_code() {
    let project = TestProject::new();
    let path = project.add_script("Player.js", PLAYER_BEING_EDITED);
    let engine = project.engine();
    engine.touch_content(&path, PLAYER_BEING_EDITED);

    let names: Vec<String> = engine
        .provide(&path, "        this.")
        .into_iter()
        .take(3)
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["update", "jump", "speed"]);
}

#[test]
fn test_members_survive_unclosed_class_literal() {
    let project = TestProject::new();
    let cases = [
        ("Player.js", PLAYER_UNCLOSED, vec!["onLoad", "speed"]),
        (
            "Game.js",
            EXPRESSION_FORM_UNCLOSED,
            vec!["onLoad", "start", "speed"],
        ),
    ];

    for (file, source, expected) in cases {
        let path = project.add_script(file, source);
        let engine = project.engine();
        engine.touch_content(&path, source).expect("project file");

        let suggestions = engine.provide(&path, "        this.");
        let names: Vec<&str> = suggestions
            .iter()
            .take(expected.len())
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, expected, "declared members of {file}");
        assert_eq!(suggestions[expected.len() - 1].sort_key, PROPERTY_SORT_KEY);
    }
}

#[test]
fn test_node_trigger_returns_node_table_only() {
    let project = TestProject::new();
    let path = project.add_script("Player.js", PLAYER);
    let engine = project.engine();
    engine.touch_content(&path, PLAYER);

    let suggestions = engine.provide(&path, "        this.node.");
    let builtins = bundled();
    assert_eq!(suggestions.len(), builtins.node.len());
    assert!(suggestions.iter().all(|s| s.name != "speed"));
    assert_eq!(suggestions[0].name, builtins.node.functions[0].name);
    assert!(suggestions[0].is_callable);
}

#[test]
fn test_short_prefix_fails_gate_regardless_of_content() {
    let project = TestProject::new();
    let path = project.add_script("Player.js", PLAYER);
    let engine = project.engine();
    engine.touch_content(&path, PLAYER);

    assert!(engine.provide(&path, "this").is_empty());
    assert!(engine.provide(&path, "").is_empty());
    assert!(engine.provide(&path, "  cc.").is_empty());
}

#[test]
fn test_expression_statement_declaration() {
    let project = TestProject::new();
    let path = project.add_script("Score.js", EXPRESSION_FORM);
    let engine = project.engine();
    engine.touch_content(&path, EXPRESSION_FORM);

    let names: Vec<String> = engine
        .provide(&path, " this.")
        .into_iter()
        .take(2)
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["start", "score"]);
}

#[test]
fn test_file_without_class_gets_builtins_only() {
    let project = TestProject::new();
    let path = project.add_script("util.js", NO_CLASS);
    let engine = project.engine();
    engine.touch_content(&path, NO_CLASS);

    let suggestions = engine.provide(&path, " this.");
    assert_eq!(suggestions.len(), bundled().component.len());
}
