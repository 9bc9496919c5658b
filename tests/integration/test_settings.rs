//! Settings flowing into the engine

use crate::common::TestProject;
use ccassist::Settings;
use std::path::PathBuf;

const CUSTOM_FACTORY: &str = r#"var Hud = engine.Component({
    properties: { lives: 3 },
    show () {},
});
"#;

#[test]
fn test_settings_file_configures_project_and_factory() {
    let project = TestProject::new();
    let config = project.add_file(
        ".ccassist/settings.toml",
        r#"
[project]
assets_dir = "scripts"
extensions = ["mjs"]

[factory]
namespace = "engine"
name = "Component"
"#,
    );
    let path = project.add_file("scripts/Hud.mjs", CUSTOM_FACTORY);

    let settings = Settings::load_from(&config).unwrap();
    assert_eq!(settings.project.assets_dir, PathBuf::from("scripts"));

    let engine = project.engine_with(settings);
    assert!(engine.touch_content(&path, CUSTOM_FACTORY).is_some());
    // default layout no longer applies
    let js = project.add_script("Other.js", CUSTOM_FACTORY);
    assert!(engine.touch_content(&js, CUSTOM_FACTORY).is_none());

    let names: Vec<String> = engine
        .provide(&path, " this.")
        .into_iter()
        .take(2)
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["show", "lives"]);
}

#[test]
fn test_custom_builtin_table_replaces_bundled() {
    let project = TestProject::new();
    let tables = project.add_file(
        "tables.toml",
        r#"
[[component.functions]]
name = "spawn"
signature = "spawn(prefab)"

[[node.properties]]
name = "layer"
description = "Render layer"
"#,
    );

    let mut settings = Settings::default();
    settings.completion.builtins_path = Some(tables);
    let engine = project.engine_with(settings);

    let path = project.add_script("Empty.js", "");
    engine.touch_content(&path, "");

    let this = engine.provide(&path, " this.");
    assert_eq!(this.len(), 1);
    assert_eq!(this[0].name, "spawn");
    assert_eq!(this[0].detail, "spawn(prefab)");
    assert_eq!(this[0].documentation, "");

    let node = engine.provide(&path, "this.node.");
    assert_eq!(node.len(), 1);
    assert_eq!(node[0].documentation, "Render layer");
    assert!(!node[0].is_callable);
}
