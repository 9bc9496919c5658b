//! Tolerant parser for component scripts
//!
//! **Tree-sitter ABI Version**: ABI-15 (tree-sitter-javascript 0.25.0)
//!
//! Scripts are parsed while the user is typing, so the input is often
//! incomplete. tree-sitter recovers from errors by inserting ERROR and
//! MISSING nodes; this module lowers whatever it produced into the owned
//! model in [`super::syntax`] and never fails on malformed input. Comments
//! are handed to a callback in source order as a side channel.

use super::syntax::{
    CallExpression, Comment, DeclarationKeyword, Declarator, Expression, ExpressionStatement,
    FunctionExpression, Identifier, Literal, MemberExpression, MemberProperty, ObjectExpression,
    OpaqueNode, Property, PropertyKey, PropertyKind, Statement, SyntaxTree, VariableDeclaration,
};
use crate::error::{ParseError, ParseResult};
use crate::types::{Position, Span};
use tree_sitter::{Language, Node, Parser};

/// Nesting limit for lowering; deeper expressions become placeholders.
const MAX_DEPTH: usize = 256;

/// Result of parsing one file
#[derive(Debug, Clone, Default)]
pub struct ParsedSource {
    pub tree: SyntaxTree,
    pub comments: Vec<Comment>,
    /// Set when no tree could be produced at all (binary or unparsable input)
    pub degenerate: bool,
}

impl ParsedSource {
    pub fn degenerate() -> Self {
        Self {
            tree: SyntaxTree::empty(),
            comments: Vec::new(),
            degenerate: true,
        }
    }
}

/// Component script parser backed by the tree-sitter JavaScript grammar
pub struct ScriptParser {
    parser: Parser,
}

impl ScriptParser {
    /// Create a new script parser
    pub fn new() -> ParseResult<Self> {
        let mut parser = Parser::new();
        let language: Language = tree_sitter_javascript::LANGUAGE.into();
        parser
            .set_language(&language)
            .map_err(|e| ParseError::ParserInit {
                language: "javascript".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self { parser })
    }

    /// Parse source text into a tree plus its comments.
    ///
    /// Never fails: unparsable input yields an empty tree and no comments.
    pub fn parse(&mut self, source: &str) -> ParsedSource {
        let mut comments = Vec::new();
        let tree = self.parse_tree(source, &mut |comment| comments.push(comment));
        match tree {
            Some(tree) => ParsedSource {
                tree,
                comments,
                degenerate: false,
            },
            None => ParsedSource::degenerate(),
        }
    }

    /// Parse raw file bytes, replacing invalid UTF-8 sequences
    pub fn parse_bytes(&mut self, bytes: &[u8]) -> ParsedSource {
        let source = String::from_utf8_lossy(bytes);
        self.parse(&source)
    }

    /// Parse source text, invoking `on_comment` once per comment in source order.
    pub fn parse_with_comments<F>(&mut self, source: &str, mut on_comment: F) -> SyntaxTree
    where
        F: FnMut(Comment),
    {
        self.parse_tree(source, &mut on_comment).unwrap_or_default()
    }

    fn parse_tree(
        &mut self,
        source: &str,
        on_comment: &mut dyn FnMut(Comment),
    ) -> Option<SyntaxTree> {
        if source.contains('\0') {
            tracing::debug!("refusing to parse binary content ({} bytes)", source.len());
            return None;
        }

        let Some(tree) = self.parser.parse(source, None) else {
            tracing::debug!("tree-sitter produced no tree ({} bytes)", source.len());
            return None;
        };

        let root = tree.root_node();
        if root.has_error() {
            tracing::debug!("recovered from syntax errors while parsing");
        }

        let lowered = Lowering { source }.program(root);
        collect_comments(root, source, on_comment);
        Some(lowered)
    }
}

/// Parse with a fresh parser. Parser setup failures degrade to an empty result.
pub fn parse_source(source: &str) -> ParsedSource {
    match ScriptParser::new() {
        Ok(mut parser) => parser.parse(source),
        Err(e) => {
            tracing::error!("{e}");
            ParsedSource::degenerate()
        }
    }
}

/// Walk the whole tree in document order and report every comment node
fn collect_comments(root: Node, source: &str, on_comment: &mut dyn FnMut(Comment)) {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        let is_comment = node.kind() == "comment";
        if is_comment {
            on_comment(comment_from_node(&node, source));
        }

        if !is_comment && cursor.goto_first_child() {
            continue;
        }

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

fn comment_from_node(node: &Node, source: &str) -> Comment {
    let raw = node.utf8_text(source.as_bytes()).unwrap_or("");
    let (is_block, text) = if let Some(body) = raw.strip_prefix("/*") {
        (true, body.strip_suffix("*/").unwrap_or(body))
    } else if let Some(body) = raw.strip_prefix("//") {
        (false, body)
    } else {
        (false, raw)
    };

    Comment {
        is_block,
        text: text.to_string(),
        start: node.start_byte(),
        end: node.end_byte(),
        location: Position::from_point(node.start_position()),
        end_location: Position::from_point(node.end_position()),
    }
}

fn is_statement_kind(kind: &str) -> bool {
    matches!(
        kind,
        "variable_declaration" | "lexical_declaration" | "expression_statement"
    )
}

fn is_expression_kind(kind: &str) -> bool {
    matches!(
        kind,
        "identifier"
            | "member_expression"
            | "subscript_expression"
            | "call_expression"
            | "object"
            | "parenthesized_expression"
    )
}

fn is_object_member_kind(kind: &str) -> bool {
    matches!(
        kind,
        "pair" | "method_definition" | "shorthand_property_identifier" | "spread_element"
    )
}

fn declaration_keyword(kind: Option<&str>) -> DeclarationKeyword {
    match kind {
        Some("let") => DeclarationKeyword::Let,
        Some("const") => DeclarationKeyword::Const,
        _ => DeclarationKeyword::Var,
    }
}

/// Span from the start of `first` to the end of `last`
fn span_between(first: &Node, last: &Node) -> Span {
    Span::new(
        first.start_byte(),
        last.end_byte(),
        Position::from_point(first.start_position()),
        Position::from_point(last.end_position()),
    )
}

fn strip_quotes(raw: &str) -> &str {
    let mut chars = raw.chars();
    match (chars.next(), chars.next_back()) {
        (Some(open), Some(close)) if open == close && matches!(open, '"' | '\'' | '`') => {
            &raw[open.len_utf8()..raw.len() - close.len_utf8()]
        }
        _ => raw,
    }
}

/// Lowers tree-sitter nodes into the owned syntax model
struct Lowering<'s> {
    source: &'s str,
}

impl<'s> Lowering<'s> {
    fn text(&self, node: &Node) -> &'s str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn opaque(&self, node: &Node) -> OpaqueNode {
        OpaqueNode {
            kind: node.kind().to_string(),
            span: Span::from_node(node),
        }
    }

    fn identifier(&self, node: &Node) -> Identifier {
        Identifier {
            name: self.text(node).to_string(),
            span: Span::from_node(node),
        }
    }

    fn program(&self, root: Node) -> SyntaxTree {
        let mut statements = Vec::new();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            self.statement_into(child, 0, &mut statements);
        }

        SyntaxTree {
            statements,
            span: Span::from_node(&root),
        }
    }

    fn statement_into(&self, node: Node, depth: usize, out: &mut Vec<Statement>) {
        match node.kind() {
            "comment" => {}
            "variable_declaration" | "lexical_declaration" => {
                out.push(Statement::VariableDeclaration(
                    self.variable_declaration(node, depth),
                ));
            }
            "expression_statement" => out.push(self.expression_statement(node, depth)),
            "ERROR" => self.recover(node, depth, out),
            _ => out.push(Statement::Other(self.opaque(&node))),
        }
    }

    /// Lift statement- and expression-shaped children out of an ERROR node.
    ///
    /// A call whose argument list is still open (`cc.Class({ a: 1, b () {}`
    /// at the end of the buffer) arrives here flattened: the callee followed
    /// by the object members as siblings. Those runs are rebuilt into a call
    /// with an object literal argument, named by a preceding identifier.
    fn recover(&self, node: Node, depth: usize, out: &mut Vec<Statement>) {
        if depth > MAX_DEPTH {
            out.push(Statement::Other(self.opaque(&node)));
            return;
        }

        let mut cursor = node.walk();
        let children: Vec<Node> = node
            .named_children(&mut cursor)
            .filter(|child| child.kind() != "comment")
            .collect();

        let mut i = 0;
        while i < children.len() {
            let child = children[i];
            let kind = child.kind();

            if kind == "identifier"
                && let Some(&callee) = children.get(i + 1)
                && let Some((call, used)) = self.unclosed_call(callee, &children[i + 2..], depth)
            {
                let last = children[i + 1 + used];
                let span = span_between(&child, &last);
                out.push(Statement::VariableDeclaration(VariableDeclaration {
                    keyword: declaration_keyword(child.prev_sibling().map(|p| p.kind())),
                    declarators: vec![Declarator {
                        name: Some(self.text(&child).to_string()),
                        init: Some(call),
                        span,
                    }],
                    span,
                }));
                i += 2 + used;
                continue;
            }

            if let Some((call, used)) = self.unclosed_call(child, &children[i + 1..], depth) {
                let span = span_between(&child, &children[i + used]);
                out.push(Statement::Expression(ExpressionStatement {
                    expression: call,
                    span,
                }));
                i += 1 + used;
                continue;
            }

            if kind == "variable_declarator" {
                let mut declarator = self.declarator(child, depth + 1);
                let mut span = declarator.span;
                let mut used = 0;
                if let Some(value) = child.child_by_field_name("value")
                    && let Some((call, taken)) =
                        self.unclosed_call(value, &children[i + 1..], depth)
                {
                    span = span_between(&child, &children[i + taken]);
                    declarator.init = Some(call);
                    declarator.span = span;
                    used = taken;
                }
                out.push(Statement::VariableDeclaration(VariableDeclaration {
                    keyword: declaration_keyword(child.prev_sibling().map(|p| p.kind())),
                    declarators: vec![declarator],
                    span,
                }));
                i += 1 + used;
                continue;
            }

            if kind == "ERROR" {
                self.recover(child, depth + 1, out);
            } else if is_statement_kind(kind) {
                self.statement_into(child, depth + 1, out);
            } else if is_expression_kind(kind) {
                out.push(Statement::Expression(ExpressionStatement {
                    expression: self.expression(child, depth + 1),
                    span: Span::from_node(&child),
                }));
            }
            i += 1;
        }
    }

    /// A member-expression callee followed by either an object literal or a
    /// run of object members. Returns the rebuilt call and how many of the
    /// following siblings it consumed.
    fn unclosed_call(
        &self,
        callee: Node,
        rest: &[Node],
        depth: usize,
    ) -> Option<(Expression, usize)> {
        if callee.kind() != "member_expression" {
            return None;
        }

        let (argument, used) = match rest.first() {
            Some(first) if first.kind() == "object" => (self.expression(*first, depth + 1), 1),
            _ => {
                let used = rest
                    .iter()
                    .take_while(|sibling| is_object_member_kind(sibling.kind()))
                    .count();
                let last = rest.get(used.checked_sub(1)?)?;
                let object = ObjectExpression {
                    properties: self.members_of(rest[..used].iter().copied(), depth + 1),
                    span: span_between(&rest[0], last),
                };
                (Expression::Object(object), used)
            }
        };

        let call = CallExpression {
            callee: Box::new(self.expression(callee, depth + 1)),
            arguments: vec![argument],
            span: span_between(&callee, &rest[used - 1]),
        };
        Some((Expression::Call(call), used))
    }

    fn variable_declaration(&self, node: Node, depth: usize) -> VariableDeclaration {
        let keyword = declaration_keyword(node.child_by_field_name("kind").map(|k| self.text(&k)));

        let mut cursor = node.walk();
        let declarators = node
            .named_children(&mut cursor)
            .filter(|child| child.kind() == "variable_declarator")
            .map(|child| self.declarator(child, depth + 1))
            .collect();

        VariableDeclaration {
            keyword,
            declarators,
            span: Span::from_node(&node),
        }
    }

    fn declarator(&self, node: Node, depth: usize) -> Declarator {
        let name = node
            .child_by_field_name("name")
            .filter(|n| n.kind() == "identifier" && !n.is_missing())
            .map(|n| self.text(&n).to_string());
        let init = node
            .child_by_field_name("value")
            .map(|value| self.expression(value, depth + 1));

        Declarator {
            name,
            init,
            span: Span::from_node(&node),
        }
    }

    fn expression_statement(&self, node: Node, depth: usize) -> Statement {
        let span = Span::from_node(&node);
        let expression = self
            .first_named_child(node)
            .map(|child| self.expression(child, depth + 1))
            .unwrap_or(Expression::Placeholder(span));

        Statement::Expression(ExpressionStatement { expression, span })
    }

    fn first_named_child<'t>(&self, node: Node<'t>) -> Option<Node<'t>> {
        let mut cursor = node.walk();
        let first = node
            .named_children(&mut cursor)
            .find(|child| child.kind() != "comment");
        first
    }

    fn expression(&self, node: Node, depth: usize) -> Expression {
        let span = Span::from_node(&node);
        if depth > MAX_DEPTH || node.is_missing() {
            return Expression::Placeholder(span);
        }

        match node.kind() {
            "identifier" => Expression::Identifier(self.identifier(&node)),
            "member_expression" => {
                let object = node
                    .child_by_field_name("object")
                    .map(|object| self.expression(object, depth + 1))
                    .unwrap_or(Expression::Placeholder(span));
                let property = match node.child_by_field_name("property") {
                    Some(property)
                        if !property.is_missing()
                            && matches!(
                                property.kind(),
                                "property_identifier" | "private_property_identifier"
                            ) =>
                    {
                        MemberProperty::Named(self.identifier(&property))
                    }
                    Some(property) => {
                        MemberProperty::Computed(Box::new(self.expression(property, depth + 1)))
                    }
                    None => MemberProperty::Computed(Box::new(Expression::Placeholder(span))),
                };

                Expression::Member(MemberExpression {
                    object: Box::new(object),
                    property,
                    span,
                })
            }
            "subscript_expression" => {
                let object = node
                    .child_by_field_name("object")
                    .map(|object| self.expression(object, depth + 1))
                    .unwrap_or(Expression::Placeholder(span));
                let index = node
                    .child_by_field_name("index")
                    .map(|index| self.expression(index, depth + 1))
                    .unwrap_or(Expression::Placeholder(span));

                Expression::Member(MemberExpression {
                    object: Box::new(object),
                    property: MemberProperty::Computed(Box::new(index)),
                    span,
                })
            }
            "call_expression" => {
                let callee = node
                    .child_by_field_name("function")
                    .map(|callee| self.expression(callee, depth + 1))
                    .unwrap_or(Expression::Placeholder(span));
                let arguments = match node.child_by_field_name("arguments") {
                    Some(args) if args.kind() == "arguments" => {
                        let mut cursor = args.walk();
                        let lowered: Vec<_> = args
                            .named_children(&mut cursor)
                            .filter(|arg| arg.kind() != "comment")
                            .map(|arg| self.expression(arg, depth + 1))
                            .collect();
                        lowered
                    }
                    // Tagged template literals
                    _ => Vec::new(),
                };

                Expression::Call(CallExpression {
                    callee: Box::new(callee),
                    arguments,
                    span,
                })
            }
            "object" => Expression::Object(ObjectExpression {
                properties: self.object_members(node, depth),
                span,
            }),
            "function_expression" | "function" | "generator_function" => {
                Expression::Function(FunctionExpression {
                    name: node
                        .child_by_field_name("name")
                        .map(|name| self.text(&name).to_string()),
                    is_arrow: false,
                    span,
                })
            }
            "arrow_function" => Expression::Function(FunctionExpression {
                name: None,
                is_arrow: true,
                span,
            }),
            "string" | "number" | "true" | "false" | "null" | "undefined" | "template_string"
            | "regex" => Expression::Literal(Literal {
                raw: self.text(&node).to_string(),
                span,
            }),
            "parenthesized_expression" => self
                .first_named_child(node)
                .map(|inner| self.expression(inner, depth + 1))
                .unwrap_or(Expression::Placeholder(span)),
            "ERROR" => Expression::Placeholder(span),
            _ => Expression::Other(self.opaque(&node)),
        }
    }

    fn object_members(&self, node: Node, depth: usize) -> Vec<Property> {
        let mut cursor = node.walk();
        let members = self.members_of(node.named_children(&mut cursor), depth);
        members
    }

    fn members_of<'t>(
        &self,
        nodes: impl IntoIterator<Item = Node<'t>>,
        depth: usize,
    ) -> Vec<Property> {
        let mut members = Vec::new();
        for child in nodes {
            let span = Span::from_node(&child);
            let member = match child.kind() {
                "pair" => Property {
                    kind: PropertyKind::Init,
                    key: child
                        .child_by_field_name("key")
                        .and_then(|key| self.property_key(key)),
                    value: child
                        .child_by_field_name("value")
                        .map(|value| self.expression(value, depth + 1)),
                    span,
                },
                "method_definition" => Property {
                    kind: PropertyKind::Method,
                    key: child
                        .child_by_field_name("name")
                        .and_then(|name| self.property_key(name)),
                    value: Some(Expression::Function(FunctionExpression {
                        name: None,
                        is_arrow: false,
                        span,
                    })),
                    span,
                },
                "shorthand_property_identifier" => {
                    let ident = self.identifier(&child);
                    Property {
                        kind: PropertyKind::Shorthand,
                        key: Some(PropertyKey::Identifier(ident.clone())),
                        value: Some(Expression::Identifier(ident)),
                        span,
                    }
                }
                "spread_element" => Property {
                    kind: PropertyKind::Spread,
                    key: None,
                    value: self
                        .first_named_child(child)
                        .map(|arg| self.expression(arg, depth + 1)),
                    span,
                },
                // comments and recovery debris inside the literal
                _ => continue,
            };
            members.push(member);
        }
        members
    }

    fn property_key(&self, node: Node) -> Option<PropertyKey> {
        if node.is_missing() {
            return None;
        }

        let span = Span::from_node(&node);
        match node.kind() {
            "property_identifier" | "identifier" | "private_property_identifier" => {
                Some(PropertyKey::Identifier(self.identifier(&node)))
            }
            "string" => Some(PropertyKey::String {
                value: strip_quotes(self.text(&node)).to_string(),
                span,
            }),
            "number" => Some(PropertyKey::Number {
                raw: self.text(&node).to_string(),
                span,
            }),
            "computed_property_name" => Some(PropertyKey::Computed(span)),
            _ => None,
        }
    }
}
