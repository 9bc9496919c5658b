//! Project recognition
//!
//! The engine only parses files that belong to a Creator project. Whether a
//! path or folder qualifies is decided behind [`ProjectDetector`] so hosts
//! can plug in their own rules. [`CreatorProjectDetector`] is the default
//! layout heuristic: a root holding one of the marker files, an assets
//! directory under it, and scripts with a known extension inside that.

use crate::config::ProjectConfig;
use std::path::{Path, PathBuf};

/// Decides which files and folders the engine cares about.
pub trait ProjectDetector: Send + Sync {
    /// Whether the file at `path` is a component script of the project
    fn is_project_file(&self, path: &Path) -> bool;

    /// Whether the workspace as a whole looks like a project
    fn is_project_folder(&self) -> bool;

    fn root(&self) -> &Path;

    /// Directory holding the scripts, used for the bulk scan
    fn assets_root(&self) -> PathBuf;
}

#[derive(Debug, Clone)]
pub struct CreatorProjectDetector {
    root: PathBuf,
    assets_dir: PathBuf,
    extensions: Vec<String>,
    markers: Vec<String>,
}

impl CreatorProjectDetector {
    pub fn new(root: impl Into<PathBuf>, config: &ProjectConfig) -> Self {
        let root = root.into();
        Self {
            assets_dir: root.join(&config.assets_dir),
            root,
            extensions: config
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            markers: config.markers.clone(),
        }
    }

    fn has_script_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|known| *known == ext)
            })
            .unwrap_or(false)
    }
}

impl ProjectDetector for CreatorProjectDetector {
    fn is_project_file(&self, path: &Path) -> bool {
        self.has_script_extension(path) && path.starts_with(&self.assets_dir)
    }

    fn is_project_folder(&self) -> bool {
        self.assets_dir.is_dir()
            && self
                .markers
                .iter()
                .any(|marker| self.root.join(marker).exists())
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn assets_root(&self) -> PathBuf {
        self.assets_dir.clone()
    }
}
