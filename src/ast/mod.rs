//! Abstract syntax tree
//!
//! Nodes live in one arena owned by [`Ast`] and refer to each other by
//! [`NodeId`]. Ownership follows the lists a node holds: children, attributes,
//! attribute values and the statements of a `{% liquid %}` tag. The
//! [`Family`] links are filled afterwards and never own anything.

mod builder;
mod node;

use std::ops::{Index, IndexMut};

use crate::cst::{ConcreteNode, Position};
use crate::error::Result;

pub use node::*;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ast {
    source: String,
    nodes: Vec<Node>,
    root: NodeId,
}

/// Parses `source` and builds its tree. Family links and annotations are not
/// filled yet, see [`crate::preprocess`].
pub fn parse_ast(source: &str) -> Result<Ast> {
    let cst = crate::parser::parse(source)?;
    Ast::build(source, cst)
}

impl Ast {
    pub fn build(source: &str, cst: Vec<ConcreteNode>) -> Result<Self> {
        let mut nodes = vec![Node::new(
            NodeKind::Document,
            Position::new(0, source.len()),
        )];
        let children = builder::build_list(source, &mut nodes, cst)?;
        let root = NodeId(0);
        nodes[root.0].children = Some(children);
        log::debug!("built AST with {} nodes", nodes.len());

        Ok(Self {
            source: source.to_string(),
            nodes,
            root,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Every list of nodes owned by `id`, children first.
    pub fn owned_lists(&self, id: NodeId) -> Vec<&[NodeId]> {
        let node = &self[id];
        let mut lists = Vec::new();
        if let Some(children) = &node.children {
            lists.push(children.as_slice());
        }
        match &node.kind {
            NodeKind::HtmlElement { attributes, .. }
            | NodeKind::HtmlVoidElement { attributes, .. }
            | NodeKind::HtmlSelfClosingElement { attributes, .. }
            | NodeKind::HtmlRawNode { attributes, .. } => lists.push(attributes.as_slice()),
            NodeKind::Attribute(attribute) => lists.push(attribute.value.as_slice()),
            NodeKind::LiquidTag(LiquidTag {
                markup: TagMarkup::Statements(statements),
                ..
            }) => lists.push(statements.as_slice()),
            _ => {}
        }
        lists
    }

    pub fn parent(&self, id: NodeId) -> Option<&Node> {
        self[id].family.parent.map(|parent| &self[parent])
    }

    pub fn prev(&self, id: NodeId) -> Option<&Node> {
        self[id].family.prev.map(|prev| &self[prev])
    }

    pub fn next(&self, id: NodeId) -> Option<&Node> {
        self[id].family.next.map(|next| &self[next])
    }

    /// Source text covered by `position`.
    pub fn slice(&self, position: Position) -> &str {
        position.slice(&self.source)
    }
}

impl Index<NodeId> for Ast {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

impl IndexMut<NodeId> for Ast {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }
}
