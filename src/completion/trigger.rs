//! Trigger-prefix gate
//!
//! Completion only runs when the text right before the cursor is one of the
//! recognized triggers. At least five characters must precede the cursor.
//! With more than five, the last six are compared, otherwise the last five.

use serde::Serialize;

/// Fewer characters than this before the cursor fails the gate
pub const MIN_CONTEXT_CHARS: usize = 5;

pub const THIS_TRIGGER: &str = "this.";
pub const THIS_TRIGGER_SPACED: &str = " this.";
pub const NODE_TRIGGER: &str = ".node.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trigger {
    /// Member access on `this`: the class's own members plus `cc.Component`
    This,
    /// Access through `.node.`: `cc.Node` members only
    Node,
}

impl Trigger {
    /// Detect the trigger from the text of the current line up to the cursor
    pub fn detect(line_prefix: &str) -> Option<Self> {
        let prefix = trigger_window(line_prefix)?;
        Self::from_prefix(prefix)
    }

    /// Classify an already extracted prefix
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            THIS_TRIGGER | THIS_TRIGGER_SPACED => Some(Trigger::This),
            NODE_TRIGGER => Some(Trigger::Node),
            _ => None,
        }
    }
}

/// The slice of `line_prefix` compared against the triggers
pub fn trigger_window(line_prefix: &str) -> Option<&str> {
    let count = line_prefix.chars().count();
    if count < MIN_CONTEXT_CHARS {
        return None;
    }

    let distance = if count > MIN_CONTEXT_CHARS { 6 } else { 5 };
    let start = line_prefix
        .char_indices()
        .nth(count - distance)
        .map(|(idx, _)| idx)?;
    Some(&line_prefix[start..])
}
