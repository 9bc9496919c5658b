//! Recognizes the factory-call class declaration in a parsed script
//!
//! A Creator component script declares its class as
//!
//! ```text
//! var Player = cc.Class({
//!     extends: cc.Component,
//!     properties: { speed: 0 },
//!     onLoad: function () {},
//! });
//! ```
//!
//! or as the same call in a bare expression statement. Only the first such
//! declaration in a file is used; later ones are ignored.

use crate::error::{ShapeError, ShapeResult};
use crate::parsing::syntax::{
    CallExpression, Expression, MemberExpression, MemberProperty, ObjectExpression, Property,
    Statement, SyntaxTree,
};
use crate::types::Span;
use serde::{Deserialize, Serialize};

/// Members of the configuration object that are not methods
pub const RESERVED_KEYS: [&str; 3] = ["extends", "editor", "properties"];

/// The `<namespace>.<factory>` callee that declares a class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryPattern {
    pub namespace: String,
    pub factory: String,
}

impl Default for FactoryPattern {
    fn default() -> Self {
        Self {
            namespace: "cc".to_string(),
            factory: "Class".to_string(),
        }
    }
}

impl FactoryPattern {
    pub fn new(namespace: impl Into<String>, factory: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            factory: factory.into(),
        }
    }

    /// Whether `callee` is exactly `<namespace>.<factory>`
    pub fn matches_callee(&self, callee: &Expression) -> bool {
        match callee {
            Expression::Member(MemberExpression {
                object,
                property: MemberProperty::Named(property),
                ..
            }) => {
                matches!(object.as_ref(), Expression::Identifier(ns) if ns.name == self.namespace)
                    && property.name == self.factory
            }
            _ => false,
        }
    }

    pub fn display_name(&self) -> String {
        format!("{}.{}", self.namespace, self.factory)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MemberKind {
    Method,
    Property,
}

/// A member declared by the class
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberDecl {
    pub name: String,
    /// 1-based line of the member's key
    pub declaration_line: u32,
    pub kind: MemberKind,
    pub span: Span,
}

/// The class declaration found in a file, borrowed from its tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDeclaration<'t> {
    pub source: &'t Statement,
    /// Variable name for `var X = cc.Class(...)`
    pub name: Option<String>,
    /// Dotted path of the `extends` value, e.g. `cc.Component`
    pub extends: Option<String>,
    pub methods: Vec<MemberDecl>,
    pub properties: Vec<MemberDecl>,
}

/// Find the first factory-call declaration among the top-level statements.
///
/// Returns `Ok(None)` when the file declares no class. A matching call with
/// a structure that cannot be read (no arguments, non-object `properties`)
/// is a [`ShapeError`].
pub fn match_declaration<'t>(
    tree: &'t SyntaxTree,
    pattern: &FactoryPattern,
) -> ShapeResult<Option<ClassDeclaration<'t>>> {
    for statement in &tree.statements {
        let Some((name, call)) = factory_call(statement) else {
            continue;
        };
        if !pattern.matches_callee(&call.callee) {
            continue;
        }

        let object = match call.arguments.first() {
            Some(Expression::Object(object)) => object,
            Some(_) => continue,
            None => {
                return Err(ShapeError::MissingArgument {
                    factory: pattern.display_name(),
                    line: call.span.line(),
                });
            }
        };

        return extract_members(statement, name, object).map(Some);
    }

    Ok(None)
}

/// The call expression of `var X = call(...)` or a bare `call(...);`
fn factory_call(statement: &Statement) -> Option<(Option<String>, &CallExpression)> {
    match statement {
        Statement::VariableDeclaration(decl) => {
            let declarator = decl.declarators.first()?;
            match &declarator.init {
                Some(Expression::Call(call)) => Some((declarator.name.clone(), call)),
                _ => None,
            }
        }
        Statement::Expression(stmt) => match &stmt.expression {
            Expression::Call(call) => Some((None, call)),
            _ => None,
        },
        Statement::Other(_) => None,
    }
}

fn extract_members<'t>(
    statement: &'t Statement,
    name: Option<String>,
    object: &ObjectExpression,
) -> ShapeResult<ClassDeclaration<'t>> {
    let methods = object
        .properties
        .iter()
        .filter(|prop| prop.name().is_some_and(|n| !RESERVED_KEYS.contains(&n)))
        .filter_map(|prop| member(prop, MemberKind::Method))
        .collect();

    let properties = match find_member(object, "properties") {
        Some(prop) => match &prop.value {
            Some(Expression::Object(nested)) => nested
                .properties
                .iter()
                .filter_map(|prop| member(prop, MemberKind::Property))
                .collect(),
            _ => {
                return Err(ShapeError::PropertiesNotObject {
                    line: prop.span.line(),
                });
            }
        },
        None => Vec::new(),
    };

    let extends = find_member(object, "extends")
        .and_then(|prop| prop.value.as_ref())
        .and_then(Expression::dotted_path);

    Ok(ClassDeclaration {
        source: statement,
        name,
        extends,
        methods,
        properties,
    })
}

fn find_member<'o>(object: &'o ObjectExpression, key: &str) -> Option<&'o Property> {
    object.properties.iter().find(|prop| prop.name() == Some(key))
}

/// Members without a static name (spreads, computed keys) are skipped
fn member(prop: &Property, kind: MemberKind) -> Option<MemberDecl> {
    let key = prop.key.as_ref()?;
    let name = key.name()?;
    Some(MemberDecl {
        name: name.to_string(),
        declaration_line: key.span().line(),
        kind,
        span: prop.span,
    })
}
