//! AST node definitions

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::cst::{AttrKind, DropMarkup, ElementName, NamedMarkup, Position, Trim};
use crate::preprocess::Annotation;

/// Index of a node in [`super::Ast::nodes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Node {
    pub kind: NodeKind,
    pub position: Position,
    /// Opening delimiter of elements, tags and branches.
    pub block_start_position: Option<Position>,
    /// Closing delimiter, set once the node is closed.
    pub block_end_position: Option<Position>,
    /// `None` for nodes that cannot have children at all.
    pub children: Option<Vec<NodeId>>,
    pub family: Family,
    pub annotation: Annotation,
}

impl Node {
    pub fn new(kind: NodeKind, position: Position) -> Self {
        Self {
            kind,
            position,
            block_start_position: None,
            block_end_position: None,
            children: None,
            family: Family::default(),
            annotation: Annotation::default(),
        }
    }

    pub(crate) fn with_block_start(mut self, position: Position) -> Self {
        self.block_start_position = Some(position);
        self
    }

    pub(crate) fn with_children(mut self) -> Self {
        self.children = Some(Vec::new());
        self
    }

    pub fn children(&self) -> &[NodeId] {
        self.children.as_deref().unwrap_or_default()
    }

    pub fn is_parent(&self) -> bool {
        self.children.is_some()
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// Name used in messages and in open/close matching.
    pub fn name(&self) -> Option<String> {
        match &self.kind {
            NodeKind::HtmlElement { name, .. } | NodeKind::HtmlSelfClosingElement { name, .. } => {
                Some(name.compare_name())
            }
            NodeKind::HtmlVoidElement { name, .. } | NodeKind::HtmlRawNode { name, .. } => {
                Some(name.clone())
            }
            NodeKind::Attribute(attribute) => Some(attribute.name.clone()),
            NodeKind::LiquidTag(tag) => Some(tag.name.clone()),
            NodeKind::LiquidBranch(branch) => branch.name.clone(),
            NodeKind::LiquidRawTag(tag) => Some(tag.name.clone()),
            _ => None,
        }
    }

    /// Plain tag name of an HTML node. Elements named by a drop have none.
    pub fn html_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::HtmlElement { name, .. } | NodeKind::HtmlSelfClosingElement { name, .. } => {
                name.as_tag()
            }
            NodeKind::HtmlVoidElement { name, .. } | NodeKind::HtmlRawNode { name, .. } => {
                Some(name)
            }
            _ => None,
        }
    }

    /// Elements of any kind. Comments and doctypes are not.
    pub fn is_html(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::HtmlElement { .. }
                | NodeKind::HtmlVoidElement { .. }
                | NodeKind::HtmlSelfClosingElement { .. }
                | NodeKind::HtmlRawNode { .. }
        )
    }

    pub fn is_html_named(&self, name: &str) -> bool {
        self.html_name() == Some(name)
    }

    pub fn is_liquid(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::LiquidDrop { .. }
                | NodeKind::LiquidTag(_)
                | NodeKind::LiquidBranch(_)
                | NodeKind::LiquidRawTag(_)
        )
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::TextNode { .. })
    }

    pub fn is_attribute(&self) -> bool {
        matches!(self.kind, NodeKind::Attribute(_))
    }

    pub fn attributes(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::HtmlElement { attributes, .. }
            | NodeKind::HtmlVoidElement { attributes, .. }
            | NodeKind::HtmlSelfClosingElement { attributes, .. }
            | NodeKind::HtmlRawNode { attributes, .. } => attributes,
            _ => &[],
        }
    }

    pub fn as_liquid_tag(&self) -> Option<&LiquidTag> {
        match &self.kind {
            NodeKind::LiquidTag(tag) => Some(tag),
            _ => None,
        }
    }

    pub fn as_branch(&self) -> Option<&LiquidBranch> {
        match &self.kind {
            NodeKind::LiquidBranch(branch) => Some(branch),
            _ => None,
        }
    }

    /// `if`, `unless`, `case` and `for`, whose children are branches.
    pub fn is_branched_tag(&self) -> bool {
        self.as_liquid_tag()
            .is_some_and(|tag| is_branched_tag_name(&tag.name))
    }
}

pub(crate) fn is_branched_tag_name(name: &str) -> bool {
    matches!(name, "if" | "for" | "unless" | "case")
}

pub(crate) fn is_branch_marker_name(name: &str) -> bool {
    matches!(name, "else" | "elsif" | "when")
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NodeKind {
    Document,
    YamlFrontmatter {
        body: String,
    },
    HtmlDoctype {
        legacy_doctype_string: Option<String>,
    },
    HtmlComment {
        body: String,
    },
    HtmlElement {
        name: ElementName,
        attributes: Vec<NodeId>,
    },
    HtmlVoidElement {
        name: String,
        attributes: Vec<NodeId>,
    },
    HtmlSelfClosingElement {
        name: ElementName,
        attributes: Vec<NodeId>,
    },
    HtmlRawNode {
        name: String,
        attributes: Vec<NodeId>,
        body: RawMarkup,
    },
    Attribute(Attribute),
    TextNode {
        value: String,
    },
    LiquidDrop {
        markup: DropMarkup,
        whitespace_start: Trim,
        whitespace_end: Trim,
    },
    LiquidTag(LiquidTag),
    LiquidBranch(LiquidBranch),
    LiquidRawTag(LiquidRawTag),
}

impl NodeKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Document => "Document",
            NodeKind::YamlFrontmatter { .. } => "YAMLFrontmatter",
            NodeKind::HtmlDoctype { .. } => "HtmlDoctype",
            NodeKind::HtmlComment { .. } => "HtmlComment",
            NodeKind::HtmlElement { .. } => "HtmlElement",
            NodeKind::HtmlVoidElement { .. } => "HtmlVoidElement",
            NodeKind::HtmlSelfClosingElement { .. } => "HtmlSelfClosingElement",
            NodeKind::HtmlRawNode { .. } => "HtmlRawNode",
            NodeKind::Attribute(attribute) => match attribute.kind {
                AttrKind::Empty => "AttrEmpty",
                AttrKind::SingleQuoted => "AttrSingleQuoted",
                AttrKind::DoubleQuoted => "AttrDoubleQuoted",
                AttrKind::Unquoted => "AttrUnquoted",
            },
            NodeKind::TextNode { .. } => "TextNode",
            NodeKind::LiquidDrop { .. } => "LiquidDrop",
            NodeKind::LiquidTag(_) => "LiquidTag",
            NodeKind::LiquidBranch(_) => "LiquidBranch",
            NodeKind::LiquidRawTag(_) => "LiquidRawTag",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Attribute {
    pub kind: AttrKind,
    pub name: String,
    pub value: Vec<NodeId>,
    /// Range between the quotes. Empty right after the opening quote when the
    /// value is empty.
    pub attribute_position: Position,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TagMarkup {
    Raw(String),
    Named(NamedMarkup),
    /// Statements of a `{% liquid %}` tag, owned by the tag.
    Statements(Vec<NodeId>),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LiquidTag {
    pub name: String,
    pub markup: TagMarkup,
    pub whitespace_start: Trim,
    pub whitespace_end: Trim,
    /// Trim markers of the closing tag. Only block tags have one.
    pub delimiter_whitespace_start: Option<Trim>,
    pub delimiter_whitespace_end: Option<Trim>,
}

/// One arm of `if`, `unless`, `case` or `for`. The first arm has no name.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LiquidBranch {
    pub name: Option<String>,
    pub markup: TagMarkup,
    pub whitespace_start: Trim,
    pub whitespace_end: Trim,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LiquidRawTag {
    pub name: String,
    pub body: RawMarkup,
    pub whitespace_start: Trim,
    pub whitespace_end: Trim,
    pub delimiter_whitespace_start: Trim,
    pub delimiter_whitespace_end: Trim,
}

/// Language of a body kept as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RawMarkupKind {
    Css,
    Html,
    Javascript,
    Json,
    Markdown,
    Typescript,
    Text,
}

/// Body of a raw element or raw Liquid tag.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawMarkup {
    pub kind: RawMarkupKind,
    pub value: String,
    /// From the end of the opening delimiter to the start of the closing one.
    pub position: Position,
}

/// Non-owning links, filled by [`crate::preprocess`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Family {
    pub parent: Option<NodeId>,
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
}
