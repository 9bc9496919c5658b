pub mod comments;
pub mod parser;
pub mod syntax;

pub use comments::{clean_comment_text, documentation_for, find_documentation};
pub use parser::{ParsedSource, ScriptParser, parse_source};
pub use syntax::{
    Comment, Expression, NodeKind, Property, PropertyKey, PropertyKind, Statement, SyntaxTree,
};
