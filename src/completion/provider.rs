//! Completion assembly
//!
//! Merges the members declared by the active file's class with the built-in
//! engine tables. Declared methods come first (sort key `00`), then declared
//! properties (`01`), then the built-ins in table order.

use super::builtins::{BuiltinMember, BuiltinTable, BuiltinTables};
use super::notifications::{Notice, Notifier};
use super::trigger::Trigger;
use crate::declaration::{FactoryPattern, MemberDecl, MemberKind, match_declaration};
use crate::error::ShapeResult;
use crate::parsing::{Comment, documentation_for};
use crate::storage::ParseCache;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

pub const METHOD_SORT_KEY: &str = "00";
pub const PROPERTY_SORT_KEY: &str = "01";

/// One completion item handed to the host editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub name: String,
    pub is_callable: bool,
    pub documentation: String,
    pub detail: String,
    pub sort_key: String,
}

impl Suggestion {
    /// Suggestion for a member declared in the active file
    pub fn from_member(member: &MemberDecl, comments: &[Comment]) -> Self {
        let (is_callable, sort_key) = match member.kind {
            MemberKind::Method => (true, METHOD_SORT_KEY),
            MemberKind::Property => (false, PROPERTY_SORT_KEY),
        };

        Self {
            name: member.name.clone(),
            is_callable,
            documentation: documentation_for(comments, member.declaration_line, &member.name),
            detail: member.name.clone(),
            sort_key: sort_key.to_string(),
        }
    }

    pub fn from_builtin(member: &BuiltinMember, is_callable: bool) -> Self {
        Self {
            name: member.name.clone(),
            is_callable,
            documentation: member.description.clone().unwrap_or_default(),
            detail: member.signature.clone().unwrap_or_default(),
            sort_key: member.name.clone(),
        }
    }
}

pub struct CompletionProvider {
    cache: Arc<ParseCache>,
    builtins: Arc<BuiltinTables>,
    pattern: FactoryPattern,
    notifier: Arc<dyn Notifier>,
}

impl CompletionProvider {
    pub fn new(
        cache: Arc<ParseCache>,
        builtins: Arc<BuiltinTables>,
        pattern: FactoryPattern,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            cache,
            builtins,
            pattern,
            notifier,
        }
    }

    /// Suggestions for the cursor in `path`, given the line text before it.
    ///
    /// Returns an empty list when the text before the cursor is not a trigger.
    pub fn provide(&self, path: &Path, line_prefix: &str) -> Vec<Suggestion> {
        match Trigger::detect(line_prefix) {
            Some(trigger) => self.provide_for(path, trigger),
            None => Vec::new(),
        }
    }

    pub fn provide_for(&self, path: &Path, trigger: Trigger) -> Vec<Suggestion> {
        let mut suggestions = Vec::new();

        match trigger {
            Trigger::This => {
                match self.declared_members(path) {
                    Ok(members) => suggestions.extend(members),
                    Err(e) => {
                        warn!("skipping declared members of {}: {e}", path.display());
                        self.notifier
                            .notify(Notice::error(format!("{}: {e}", path.display())));
                    }
                }
                push_table(&mut suggestions, &self.builtins.component);
            }
            Trigger::Node => push_table(&mut suggestions, &self.builtins.node),
        }

        suggestions
    }

    /// Suggestions for the members of the class declared in `path`.
    ///
    /// Empty when the file was never cached or declares no class.
    pub fn declared_members(&self, path: &Path) -> ShapeResult<Vec<Suggestion>> {
        let Some(entry) = self.cache.get(path) else {
            debug!("no cached tree for {}", path.display());
            return Ok(Vec::new());
        };

        let Some(decl) = match_declaration(&entry.tree, &self.pattern)? else {
            debug!("no class declaration in {}", path.display());
            return Ok(Vec::new());
        };

        let suggestions = decl
            .methods
            .iter()
            .chain(decl.properties.iter())
            .map(|member| Suggestion::from_member(member, &entry.comments))
            .collect();
        Ok(suggestions)
    }

    pub fn builtins(&self) -> &BuiltinTables {
        &self.builtins
    }
}

fn push_table(suggestions: &mut Vec<Suggestion>, table: &BuiltinTable) {
    suggestions.extend(
        table
            .functions
            .iter()
            .map(|member| Suggestion::from_builtin(member, true)),
    );
    suggestions.extend(
        table
            .properties
            .iter()
            .map(|member| Suggestion::from_builtin(member, false)),
    );
}
