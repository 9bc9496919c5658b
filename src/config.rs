//! Configuration module for the completion engine.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `CCA_` and use double underscores
//! to separate nested levels:
//! - `CCA_PROJECT__ASSETS_DIR=scripts` sets `project.assets_dir`
//! - `CCA_SCAN__MAX_CONCURRENT=2` sets `scan.max_concurrent`
//! - `CCA_FILE_WATCH__ENABLED=false` sets `file_watch.enabled`

use crate::declaration::FactoryPattern;
use crate::error::EngineError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory holding the settings file
pub const CONFIG_DIR: &str = ".ccassist";
pub const CONFIG_FILE: &str = "settings.toml";
pub const ENV_PREFIX: &str = "CCA_";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Global debug mode
    #[serde(default = "default_false")]
    pub debug: bool,

    /// Where the Creator project lives and which files belong to it
    #[serde(default)]
    pub project: ProjectConfig,

    /// The call that declares a component class
    #[serde(default)]
    pub factory: FactoryConfig,

    /// Completion settings
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Bulk assets scan settings
    #[serde(default)]
    pub scan: ScanConfig,

    /// File watching settings
    #[serde(default)]
    pub file_watch: FileWatchConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProjectConfig {
    /// Project root (defaults to the directory holding `.ccassist`, or the
    /// current directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    /// Scripts directory, relative to the root
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,

    /// Extensions of component scripts, without the dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Files whose presence in the root marks a Creator project
    #[serde(default = "default_markers")]
    pub markers: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FactoryConfig {
    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default = "default_factory_name")]
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct CompletionConfig {
    /// TOML file replacing the bundled built-in member tables
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builtins_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScanConfig {
    /// Parse every script under the assets directory on startup
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Upper bound on file reads in flight during a scan
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FileWatchConfig {
    /// Re-parse scripts when they change on disk
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Debounce interval in milliseconds (default: 500ms)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets")
}
fn default_extensions() -> Vec<String> {
    vec!["js".to_string()]
}
fn default_markers() -> Vec<String> {
    vec!["project.json".to_string()]
}
fn default_namespace() -> String {
    "cc".to_string()
}
fn default_factory_name() -> String {
    "Class".to_string()
}
fn default_max_concurrent() -> usize {
    num_cpus::get()
}
fn default_debounce_ms() -> u64 {
    500
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            debug: false,
            project: ProjectConfig::default(),
            factory: FactoryConfig::default(),
            completion: CompletionConfig::default(),
            scan: ScanConfig::default(),
            file_watch: FileWatchConfig::default(),
        }
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: None,
            assets_dir: default_assets_dir(),
            extensions: default_extensions(),
            markers: default_markers(),
        }
    }
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            name: default_factory_name(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_concurrent: default_max_concurrent(),
        }
    }
}

impl Default for FileWatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl FactoryConfig {
    pub fn pattern(&self) -> FactoryPattern {
        FactoryPattern::new(&self.namespace, &self.name)
    }
}

impl ProjectConfig {
    /// The configured root, falling back to `fallback`
    pub fn root_or(&self, fallback: &Path) -> PathBuf {
        self.root.clone().unwrap_or_else(|| fallback.to_path_buf())
    }
}

impl From<Box<figment::Error>> for EngineError {
    fn from(e: Box<figment::Error>) -> Self {
        EngineError::Config {
            reason: e.to_string(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        // Try to find the workspace root by looking for .ccassist directory
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(CONFIG_FILE));

        Self::figment(config_path)
            .extract()
            .map_err(Box::new)
            .map(|mut settings: Settings| {
                if settings.project.root.is_none() {
                    settings.project.root = Self::workspace_root();
                }
                settings
            })
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(path.as_ref().to_path_buf())
            .extract()
            .map_err(Box::new)
    }

    fn figment(config_path: PathBuf) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_path))
            // Double underscore separates nesting levels, single underscores
            // stay inside field names
            .merge(Env::prefixed(ENV_PREFIX).map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
    }

    /// Find the settings file by looking for a .ccassist directory,
    /// searching from the current directory up to the filesystem root
    fn find_workspace_config() -> Option<PathBuf> {
        Self::workspace_root().map(|root| root.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Get the workspace root directory (where .ccassist is located)
    pub fn workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        current
            .ancestors()
            .find(|ancestor| ancestor.join(CONFIG_DIR).is_dir())
            .map(Path::to_path_buf)
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }
}
