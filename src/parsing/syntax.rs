//! Owned syntax model for component scripts
//!
//! The tree-sitter concrete tree is lowered into these closed variant types
//! so that the declaration matcher can use exhaustive matches instead of
//! probing node kinds by string. Only the shapes the matcher cares about are
//! modelled in detail; everything else is kept as an opaque node with its
//! span.

use crate::types::Span;
use serde::Serialize;

/// Node kinds present in the lowered tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    VariableDeclaration,
    Declarator,
    ExpressionStatement,
    Call,
    Member,
    Object,
    Property,
    Identifier,
    Literal,
    Function,
    Placeholder,
    Other,
}

/// Root of a parsed file: top-level statements in source order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyntaxTree {
    pub statements: Vec<Statement>,
    pub span: Span,
}

impl SyntaxTree {
    /// An empty tree, used for input that could not be parsed at all
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Statement {
    /// `var`, `let` or `const` declaration
    VariableDeclaration(VariableDeclaration),
    /// A bare expression followed by an optional semicolon
    Expression(ExpressionStatement),
    /// Any other statement kind (functions, imports, control flow, ...)
    Other(OpaqueNode),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::VariableDeclaration(decl) => decl.span,
            Statement::Expression(stmt) => stmt.span,
            Statement::Other(node) => node.span,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Statement::VariableDeclaration(_) => NodeKind::VariableDeclaration,
            Statement::Expression(_) => NodeKind::ExpressionStatement,
            Statement::Other(_) => NodeKind::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeclarationKeyword {
    Var,
    Let,
    Const,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableDeclaration {
    pub keyword: DeclarationKeyword,
    pub declarators: Vec<Declarator>,
    pub span: Span,
}

/// `name = init` inside a variable declaration.
///
/// `name` is `None` for destructuring patterns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Declarator {
    pub name: Option<String>,
    pub init: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpressionStatement {
    pub expression: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expression {
    Identifier(Identifier),
    Member(MemberExpression),
    Call(CallExpression),
    Object(ObjectExpression),
    Function(FunctionExpression),
    Literal(Literal),
    /// Inserted where the parser had to recover from an error
    Placeholder(Span),
    Other(OpaqueNode),
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Identifier(ident) => ident.span,
            Expression::Member(member) => member.span,
            Expression::Call(call) => call.span,
            Expression::Object(object) => object.span,
            Expression::Function(func) => func.span,
            Expression::Literal(lit) => lit.span,
            Expression::Placeholder(span) => *span,
            Expression::Other(node) => node.span,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Expression::Identifier(_) => NodeKind::Identifier,
            Expression::Member(_) => NodeKind::Member,
            Expression::Call(_) => NodeKind::Call,
            Expression::Object(_) => NodeKind::Object,
            Expression::Function(_) => NodeKind::Function,
            Expression::Literal(_) => NodeKind::Literal,
            Expression::Placeholder(_) => NodeKind::Placeholder,
            Expression::Other(_) => NodeKind::Other,
        }
    }

    /// Dotted path for identifier/member chains such as `cc.Component`
    pub fn dotted_path(&self) -> Option<String> {
        match self {
            Expression::Identifier(ident) => Some(ident.name.clone()),
            Expression::Member(MemberExpression {
                object,
                property: MemberProperty::Named(property),
                ..
            }) => object
                .dotted_path()
                .map(|base| format!("{base}.{}", property.name)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberExpression {
    pub object: Box<Expression>,
    pub property: MemberProperty,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MemberProperty {
    /// `object.name`
    Named(Identifier),
    /// `object[expr]`
    Computed(Box<Expression>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallExpression {
    pub callee: Box<Expression>,
    pub arguments: Vec<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectExpression {
    pub properties: Vec<Property>,
    pub span: Span,
}

/// Function or arrow function. Bodies are not lowered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionExpression {
    pub name: Option<String>,
    pub is_arrow: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Literal {
    pub raw: String,
    pub span: Span,
}

/// A node the lowering keeps only by kind and extent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpaqueNode {
    pub kind: String,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PropertyKind {
    /// `key: value`
    Init,
    /// `key() {}`, `get key() {}`, `set key(v) {}`
    Method,
    /// `{ key }`
    Shorthand,
    /// `{ ...expr }`
    Spread,
}

/// One member of an object literal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    pub kind: PropertyKind,
    /// `None` for spread elements
    pub key: Option<PropertyKey>,
    pub value: Option<Expression>,
    pub span: Span,
}

impl Property {
    /// Static name of the member, if it has one
    pub fn name(&self) -> Option<&str> {
        self.key.as_ref().and_then(PropertyKey::name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PropertyKey {
    Identifier(Identifier),
    String { value: String, span: Span },
    Number { raw: String, span: Span },
    Computed(Span),
}

impl PropertyKey {
    pub fn name(&self) -> Option<&str> {
        match self {
            PropertyKey::Identifier(ident) => Some(&ident.name),
            PropertyKey::String { value, .. } => Some(value),
            PropertyKey::Number { raw, .. } => Some(raw),
            PropertyKey::Computed(_) => None,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            PropertyKey::Identifier(ident) => ident.span,
            PropertyKey::String { span, .. }
            | PropertyKey::Number { span, .. }
            | PropertyKey::Computed(span) => *span,
        }
    }
}

/// A comment collected while parsing, kept apart from the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub is_block: bool,
    /// Comment text without the `//`, `/*` and `*/` delimiters
    pub text: String,
    pub start: usize,
    pub end: usize,
    /// Start of the comment
    pub location: crate::types::Position,
    pub end_location: crate::types::Position,
}

impl Comment {
    pub fn line(&self) -> u32 {
        self.location.line
    }
}
