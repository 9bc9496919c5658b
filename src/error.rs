//! Error types for the completion engine
//!
//! This module provides structured error types using thiserror for better
//! error handling and actionable error messages.
//!
//! Parsing itself never fails: a source that cannot be parsed degrades to an
//! empty tree. A missing class declaration is `None`, not an error. The
//! enums below cover what remains: parser setup, unexpected declaration
//! shapes, and the I/O and configuration around the engine.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while setting up the tolerant parser
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to initialize {language} parser: {reason}")]
    ParserInit { language: String, reason: String },
}

/// A matched factory call whose structure breaks member extraction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("`{factory}` call at line {line} has no arguments")]
    MissingArgument { factory: String, line: u32 },

    #[error("`properties` at line {line} is not an object literal")]
    PropertiesNotObject { line: u32 },
}

/// Errors raised by the engine around the pure parse/match core
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to load built-in member table from '{path}': {reason}")]
    Builtins { path: PathBuf, reason: String },

    #[error("Failed to initialize file watcher: {reason}")]
    WatcherInit { reason: String },

    #[error("Cannot watch path '{path}': {reason}")]
    WatchPath { path: PathBuf, reason: String },

    #[error("'{root}' does not look like a Creator project folder")]
    NotProjectFolder { root: PathBuf },

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },
}

impl EngineError {
    /// Get a stable status code for this error type.
    ///
    /// Returns a string identifier that can be used in JSON responses
    /// for programmatic error handling.
    pub fn status_code(&self) -> String {
        match self {
            Self::FileRead { .. } => "FILE_READ_ERROR",
            Self::Builtins { .. } => "BUILTINS_ERROR",
            Self::WatcherInit { .. } => "WATCHER_INIT_ERROR",
            Self::WatchPath { .. } => "WATCH_PATH_ERROR",
            Self::NotProjectFolder { .. } => "NOT_PROJECT_FOLDER",
            Self::Config { .. } => "CONFIG_ERROR",
        }
        .to_string()
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::FileRead { .. } => vec![
                "Check that the file exists and you have read permissions",
                "The previous completion data for this file is kept until the next save",
            ],
            Self::Builtins { .. } => vec![
                "Check the `completion.builtins_path` setting",
                "Remove the setting to fall back to the bundled member table",
            ],
            Self::WatcherInit { .. } | Self::WatchPath { .. } => vec![
                "Check file system permissions and watcher limits",
                "Set `file_watch.enabled = false` and rely on editor save events",
            ],
            Self::NotProjectFolder { .. } => vec![
                "Run from the project root, or set `project.root`",
                "A Creator project contains a `project.json` file and an `assets` folder",
            ],
            Self::Config { .. } => vec!["Check .ccassist/settings.toml for typos"],
        }
    }
}

/// Result type alias for parser setup
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type alias for declaration matching
pub type ShapeResult<T> = Result<T, ShapeError>;

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_error_messages_name_the_line() {
        let err = ShapeError::MissingArgument {
            factory: "cc.Class".to_string(),
            line: 3,
        };
        assert_eq!(err.to_string(), "`cc.Class` call at line 3 has no arguments");

        let err = ShapeError::PropertiesNotObject { line: 7 };
        assert!(err.to_string().contains("line 7"));
    }

    #[test]
    fn test_engine_error_status_codes() {
        let err = EngineError::FileRead {
            path: PathBuf::from("assets/Player.js"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.status_code(), "FILE_READ_ERROR");
        assert!(!err.recovery_suggestions().is_empty());
        assert!(err.to_string().contains("assets/Player.js"));
    }
}
