//! CST node definitions

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::markup::{DropMarkup, ElementName, NamedMarkup, Trim};
use super::span::Position;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConcreteNode {
    pub kind: ConcreteKind,
    pub position: Position,
}

impl ConcreteNode {
    pub fn new(kind: ConcreteKind, position: Position) -> Self {
        Self { kind, position }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConcreteKind {
    /// Run of text. Leading and trailing whitespace is not part of it.
    TextNode { value: String },
    /// `---` block at the very start of the document; the body keeps its
    /// final newline.
    YamlFrontmatter { body: String },
    HtmlDoctype { legacy_doctype_string: Option<String> },
    HtmlComment { body: String },
    /// `<script>`, `<style>` and `<svg>` with a body kept verbatim.
    HtmlRawTag {
        name: String,
        attributes: Vec<ConcreteNode>,
        body: String,
        block_start: Position,
        block_end: Position,
    },
    HtmlVoidElement {
        name: String,
        attributes: Vec<ConcreteNode>,
    },
    HtmlSelfClosingElement {
        name: ElementName,
        attributes: Vec<ConcreteNode>,
    },
    HtmlTagOpen {
        name: ElementName,
        attributes: Vec<ConcreteNode>,
    },
    HtmlTagClose { name: ElementName },
    Attribute(ConcreteAttribute),
    LiquidDrop {
        markup: DropMarkup,
        whitespace_start: Trim,
        whitespace_end: Trim,
    },
    /// Opening marker of a block tag such as `{% if %}`.
    LiquidTagOpen(ConcreteTag),
    /// Tag without a body, or a branch marker such as `{% else %}`.
    LiquidTag(ConcreteTag),
    LiquidTagClose {
        name: String,
        whitespace_start: Trim,
        whitespace_end: Trim,
    },
    /// `raw`, `comment` and the other tags whose body is not Liquid.
    LiquidRawTag(ConcreteRawTag),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AttrKind {
    Empty,
    SingleQuoted,
    DoubleQuoted,
    Unquoted,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConcreteAttribute {
    pub kind: AttrKind,
    pub name: String,
    /// Text and Liquid nodes between the quotes.
    pub value: Vec<ConcreteNode>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConcreteTag {
    pub name: String,
    pub markup: ConcreteMarkup,
    pub whitespace_start: Trim,
    pub whitespace_end: Trim,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConcreteMarkup {
    /// Unparsed markup, trimmed.
    Raw(String),
    Named(NamedMarkup),
    /// Statements of a `{% liquid %}` tag.
    Statements(Vec<ConcreteNode>),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConcreteRawTag {
    pub name: String,
    pub body: String,
    pub whitespace_start: Trim,
    pub whitespace_end: Trim,
    pub delimiter_whitespace_start: Trim,
    pub delimiter_whitespace_end: Trim,
    pub block_start: Position,
    pub block_end: Position,
}

impl ConcreteKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ConcreteKind::TextNode { .. } => "TextNode",
            ConcreteKind::YamlFrontmatter { .. } => "YAMLFrontmatter",
            ConcreteKind::HtmlDoctype { .. } => "HtmlDoctype",
            ConcreteKind::HtmlComment { .. } => "HtmlComment",
            ConcreteKind::HtmlRawTag { .. } => "HtmlRawTag",
            ConcreteKind::HtmlVoidElement { .. } => "HtmlVoidElement",
            ConcreteKind::HtmlSelfClosingElement { .. } => "HtmlSelfClosingElement",
            ConcreteKind::HtmlTagOpen { .. } => "HtmlTagOpen",
            ConcreteKind::HtmlTagClose { .. } => "HtmlTagClose",
            ConcreteKind::Attribute(_) => "Attribute",
            ConcreteKind::LiquidDrop { .. } => "LiquidDrop",
            ConcreteKind::LiquidTagOpen(_) => "LiquidTagOpen",
            ConcreteKind::LiquidTag(_) => "LiquidTag",
            ConcreteKind::LiquidTagClose { .. } => "LiquidTagClose",
            ConcreteKind::LiquidRawTag(_) => "LiquidRawTag",
        }
    }
}
