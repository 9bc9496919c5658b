#![allow(dead_code)]

use ccassist::completion::{Notifier, SilentNotifier};
use ccassist::{CompletionEngine, CreatorProjectDetector, Settings};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// A throwaway Creator project: `project.json` plus an `assets/` directory
pub struct TestProject {
    pub dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(dir.path().join("project.json"), "{}").expect("Failed to write marker");
        fs::create_dir_all(dir.path().join("assets")).expect("Failed to create assets dir");
        Self { dir }
    }

    pub fn add_file(&self, path: &str, content: &str) -> PathBuf {
        let file_path = self.dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    /// Add a script under `assets/`
    pub fn add_script(&self, name: &str, content: &str) -> PathBuf {
        self.add_file(&format!("assets/{name}"), content)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn engine(&self) -> CompletionEngine {
        self.engine_with(Settings::default())
    }

    pub fn engine_with(&self, settings: Settings) -> CompletionEngine {
        let detector = Arc::new(CreatorProjectDetector::new(self.path(), &settings.project));
        CompletionEngine::new(Arc::new(settings), detector, Arc::new(SilentNotifier))
            .expect("Failed to create engine")
    }

    pub fn engine_with_notifier(&self, notifier: Arc<dyn Notifier>) -> CompletionEngine {
        let settings = Settings::default();
        let detector = Arc::new(CreatorProjectDetector::new(self.path(), &settings.project));
        CompletionEngine::new(Arc::new(settings), detector, notifier)
            .expect("Failed to create engine")
    }
}

pub mod sample_scripts {
    pub const PLAYER: &str = r#"// Player controller
var Player = cc.Class({
    extends: cc.Component,

    properties: {
        // speed in px/s
        speed: 0,
        jumpHeight: 120, // how high a jump goes
        /**
         * Sprite shown while dead
         */
        deadSprite: {
            default: null,
            type: cc.SpriteFrame,
        },
    },

    onLoad: function () {
        this.node.on('touchstart', this.jump, this);
    },

    // called every frame
    update (dt) {
        this.node.x += this.speed * dt;
    },

    jump: function () {},
});

module.exports = Player;
"#;

    /// The user is in the middle of typing `this.` inside a method
    pub const PLAYER_BEING_EDITED: &str = r#"var Player = cc.Class({
    extends: cc.Component,
    properties: {
        speed: 0,
    },
    update: function (dt) {
        this.
    },
    jump: function () {},
});
"#;

    /// The buffer ends before the class literal is closed
    pub const PLAYER_UNCLOSED: &str = "var Player = cc.Class({\n    extends: cc.Component,\n    properties: { speed: 0 },\n    onLoad: function () {},\n";

    pub const EXPRESSION_FORM_UNCLOSED: &str =
        "cc.Class({\n    properties: { speed: 0 },\n    onLoad () {\n        this.sp\n    },\n    start () {}\n";

    pub const EXPRESSION_FORM: &str = r#"cc.Class({
    extends: cc.Component,
    properties: { score: 0 },
    start () {},
});
"#;

    pub const NO_CLASS: &str = r#"module.exports = {
    clamp: function (v, lo, hi) { return Math.min(Math.max(v, lo), hi); },
};
"#;
}
