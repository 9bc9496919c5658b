use serde::{Deserialize, Serialize};

/// A point in a source file.
///
/// Lines are 1-based, columns are 0-based byte offsets within the line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

/// Source extent of a node or comment: byte offsets plus line/column positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub start_pos: Position,
    pub end_pos: Position,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Convert a tree-sitter point (0-based row) into a 1-based position
    pub fn from_point(point: tree_sitter::Point) -> Self {
        Self {
            line: point.row as u32 + 1,
            column: point.column as u32,
        }
    }
}

impl Span {
    pub fn new(start: usize, end: usize, start_pos: Position, end_pos: Position) -> Self {
        Self {
            start,
            end,
            start_pos,
            end_pos,
        }
    }

    pub fn from_node(node: &tree_sitter::Node) -> Self {
        Self {
            start: node.start_byte(),
            end: node.end_byte(),
            start_pos: Position::from_point(node.start_position()),
            end_pos: Position::from_point(node.end_position()),
        }
    }

    /// Line on which this span starts
    pub fn line(&self) -> u32 {
        self.start_pos.line
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
