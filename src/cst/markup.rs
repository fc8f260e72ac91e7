//! Structured markup of Liquid drops and tags.
//!
//! These values are shared by the concrete and the abstract tree: the tree
//! builder moves them over as they are.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::span::Position;

/// Whitespace-trim marker (`-`) next to a Liquid delimiter.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Trim {
    #[default]
    Keep,
    Strip,
}

impl Trim {
    pub fn as_str(self) -> &'static str {
        match self {
            Trim::Keep => "",
            Trim::Strip => "-",
        }
    }

    pub fn is_strip(self) -> bool {
        self == Trim::Strip
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LiquidExpression {
    String(LiquidString),
    Number(LiquidNumber),
    Literal(LiquidLiteral),
    Range(Box<LiquidRange>),
    VariableLookup(VariableLookup),
}

impl LiquidExpression {
    pub fn position(&self) -> Position {
        match self {
            LiquidExpression::String(s) => s.position,
            LiquidExpression::Number(n) => n.position,
            LiquidExpression::Literal(l) => l.position,
            LiquidExpression::Range(r) => r.position,
            LiquidExpression::VariableLookup(v) => v.position,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LiquidString {
    /// Content without the surrounding quotes.
    pub value: String,
    pub single: bool,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LiquidNumber {
    /// Digits as written, sign and fraction included.
    pub value: String,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LiteralValue {
    Null,
    Bool(bool),
    /// `blank` and `empty` both compare like an empty string.
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LiquidLiteral {
    pub keyword: String,
    pub value: LiteralValue,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LiquidRange {
    pub start: LiquidExpression,
    pub end: LiquidExpression,
    pub position: Position,
}

/// `a.b["c"][0]`. `name` is absent when the lookup starts with a bracket.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VariableLookup {
    pub name: Option<String>,
    pub lookups: Vec<LiquidExpression>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LiquidVariable {
    pub expression: LiquidExpression,
    pub filters: Vec<LiquidFilter>,
    /// Source text from the expression to the end of the last filter.
    pub raw_source: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LiquidFilter {
    pub name: String,
    pub args: Vec<LiquidArgument>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LiquidArgument {
    Positional(LiquidExpression),
    Named(NamedArgument),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NamedArgument {
    pub name: String,
    pub value: LiquidExpression,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Relation {
    And,
    Or,
}

impl Relation {
    pub fn as_str(self) -> &'static str {
        match self {
            Relation::And => "and",
            Relation::Or => "or",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Comparator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Contains,
}

impl Comparator {
    pub fn as_str(self) -> &'static str {
        match self {
            Comparator::Eq => "==",
            Comparator::Ne => "!=",
            Comparator::Gt => ">",
            Comparator::Ge => ">=",
            Comparator::Lt => "<",
            Comparator::Le => "<=",
            Comparator::Contains => "contains",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConditionalExpression {
    Logical(Box<LogicalExpression>),
    Comparison(Box<Comparison>),
    Expression(LiquidExpression),
}

impl ConditionalExpression {
    pub fn position(&self) -> Position {
        match self {
            ConditionalExpression::Logical(l) => l.position,
            ConditionalExpression::Comparison(c) => c.position,
            ConditionalExpression::Expression(e) => e.position(),
        }
    }
}

/// `left relation right`. Chains nest to the right: `a and b or c` is
/// `a and (b or c)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LogicalExpression {
    pub relation: Relation,
    pub left: ConditionalExpression,
    pub right: ConditionalExpression,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Comparison {
    pub comparator: Comparator,
    pub left: LiquidExpression,
    pub right: LiquidExpression,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AssignMarkup {
    pub name: String,
    pub value: LiquidVariable,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CycleMarkup {
    pub group_name: Option<LiquidExpression>,
    pub args: Vec<LiquidExpression>,
    pub position: Position,
}

/// Markup of `for` and `tablerow`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ForMarkup {
    pub variable_name: String,
    pub collection: LiquidExpression,
    pub reversed: bool,
    pub args: Vec<NamedArgument>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PaginateMarkup {
    pub collection: LiquidExpression,
    pub page_size: LiquidExpression,
    pub args: Vec<NamedArgument>,
    pub position: Position,
}

/// Markup of `render` and `include`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RenderMarkup {
    pub snippet: LiquidExpression,
    pub variable: Option<RenderVariableExpression>,
    pub alias: Option<String>,
    pub args: Vec<NamedArgument>,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RenderKind {
    For,
    With,
}

impl RenderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RenderKind::For => "for",
            RenderKind::With => "with",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RenderVariableExpression {
    pub kind: RenderKind,
    pub name: LiquidExpression,
    pub position: Position,
}

/// Markup of a tag whose grammar is known, keyed by tag name.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NamedMarkup {
    Assign(AssignMarkup),
    Cycle(CycleMarkup),
    Echo(LiquidVariable),
    /// `increment`, `decrement`, `capture`, `layout`, `section` and `case`.
    Expression(LiquidExpression),
    Render(RenderMarkup),
    Form(Vec<LiquidArgument>),
    For(ForMarkup),
    Paginate(PaginateMarkup),
    /// `if`, `unless` and `elsif`.
    Conditional(ConditionalExpression),
    When(Vec<LiquidExpression>),
}

/// Markup of a `{{ }}` drop or of an element name built from one.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DropMarkup {
    Variable(LiquidVariable),
    /// Markup that did not parse as a variable, trailing whitespace removed.
    Raw(String),
}

/// Name of an HTML element: a plain identifier or a Liquid drop.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ElementName {
    Tag(String),
    Drop(DropMarkup),
}

impl ElementName {
    /// Name used to pair opening and closing tags.
    pub fn compare_name(&self) -> String {
        match self {
            ElementName::Tag(name) => name.clone(),
            ElementName::Drop(DropMarkup::Raw(markup)) => format!("{{{{{}}}}}", markup.trim()),
            ElementName::Drop(DropMarkup::Variable(variable)) => {
                format!("{{{{{}}}}}", variable.raw_source)
            }
        }
    }

    pub fn as_tag(&self) -> Option<&str> {
        match self {
            ElementName::Tag(name) => Some(name),
            ElementName::Drop(_) => None,
        }
    }

    pub fn is(&self, name: &str) -> bool {
        self.as_tag() == Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_name() {
        assert_eq!(ElementName::Tag("div".to_string()).compare_name(), "div");
        assert_eq!(
            ElementName::Drop(DropMarkup::Raw(" tag ".to_string())).compare_name(),
            "{{tag}}"
        );
        assert!(ElementName::Tag("a".to_string()).is("a"));
        assert!(!ElementName::Drop(DropMarkup::Raw("a".to_string())).is("a"));
    }

    #[test]
    fn test_trim_marker() {
        assert_eq!(Trim::Strip.as_str(), "-");
        assert_eq!(Trim::default().as_str(), "");
        assert!(Trim::Strip.is_strip());
    }
}
