//! Completion engine for Cocos Creator component scripts.
//!
//! Parses `cc.Class({...})` declarations with a tolerant JavaScript parser,
//! caches the result per file, and turns the declared members plus the
//! engine's built-in members into completion suggestions.

pub mod completion;
pub mod config;
pub mod declaration;
pub mod engine;
pub mod error;
pub mod parsing;
pub mod project;
pub mod storage;
pub mod types;
pub mod watcher;

// Explicit exports for better API clarity
pub use completion::{CompletionProvider, Notice, Notifier, Suggestion, Trigger};
pub use config::Settings;
pub use declaration::{ClassDeclaration, FactoryPattern, MemberDecl, MemberKind, match_declaration};
pub use engine::{CompletionEngine, FileEvent, FileEventKind, ScanSummary};
pub use error::{EngineError, EngineResult, ParseError, ParseResult, ShapeError, ShapeResult};
pub use parsing::{Comment, ParsedSource, ScriptParser, SyntaxTree, parse_source};
pub use project::{CreatorProjectDetector, ProjectDetector};
pub use storage::{CacheEntry, ParseCache};
pub use types::{Position, Span};
pub use watcher::ScriptWatcher;
