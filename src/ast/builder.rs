//! Turns the flat concrete node list into a tree.
//!
//! Opening tags push a frame, closing tags pop it. Branched tags get their
//! branches here: the unnamed first branch opens with the tag, and every
//! `elsif`, `else` or `when` closes the current branch and opens the next.

use crate::cst::*;
use crate::error::{Error, Result};

use super::node::*;

/// Tags that are printed with an empty markup whatever the source has.
const TAGS_WITHOUT_MARKUP: &[&str] = &[
    "style", "schema", "javascript", "else", "break", "continue", "comment", "raw",
];

/// Builds the nodes of `cst` into `nodes` and returns the ids of the
/// top-level ones. Every frame opened in `cst` must be closed in it.
pub(crate) fn build_list(
    source: &str,
    nodes: &mut Vec<Node>,
    cst: Vec<ConcreteNode>,
) -> Result<Vec<NodeId>> {
    let mut builder = Builder {
        source,
        nodes,
        top: Vec::new(),
        stack: Vec::new(),
    };
    for node in cst {
        builder.add(node)?;
    }
    builder.finish()
}

struct Builder<'a> {
    source: &'a str,
    nodes: &'a mut Vec<Node>,
    top: Vec<NodeId>,
    /// Open elements, tags and branches, innermost last.
    stack: Vec<NodeId>,
}

/// What a closing tag says it closes.
struct CloseMarker {
    type_name: &'static str,
    name: String,
    position: Position,
    whitespace: Option<(Trim, Trim)>,
}

impl Builder<'_> {
    fn add(&mut self, node: ConcreteNode) -> Result<()> {
        let position = node.position;
        match node.kind {
            ConcreteKind::TextNode { value } => {
                self.push(Node::new(NodeKind::TextNode { value }, position))
            }
            ConcreteKind::LiquidDrop {
                markup,
                whitespace_start,
                whitespace_end,
            } => self.push(Node::new(
                NodeKind::LiquidDrop {
                    markup,
                    whitespace_start,
                    whitespace_end,
                },
                position,
            )),
            ConcreteKind::LiquidTagOpen(tag) => {
                let node = self.liquid_tag(tag, position)?.with_children();
                self.open(node);
                Ok(())
            }
            ConcreteKind::LiquidTagClose {
                name,
                whitespace_start,
                whitespace_end,
            } => self.close(CloseMarker {
                type_name: "LiquidTag",
                name,
                position,
                whitespace: Some((whitespace_start, whitespace_end)),
            }),
            ConcreteKind::LiquidTag(tag) if is_branch_marker_name(&tag.name) => {
                let branch = self.branch(tag, position)?;
                self.switch_branch(branch)
            }
            ConcreteKind::LiquidTag(tag) => {
                let node = self.liquid_tag(tag, position)?;
                self.push(node)
            }
            ConcreteKind::LiquidRawTag(raw) => {
                let body = RawMarkup {
                    kind: liquid_raw_markup_kind(&raw.name, &raw.body),
                    value: raw.body,
                    position: Position::new(raw.block_start.end, raw.block_end.start),
                };
                let mut node = Node::new(
                    NodeKind::LiquidRawTag(LiquidRawTag {
                        name: raw.name,
                        body,
                        whitespace_start: raw.whitespace_start,
                        whitespace_end: raw.whitespace_end,
                        delimiter_whitespace_start: raw.delimiter_whitespace_start,
                        delimiter_whitespace_end: raw.delimiter_whitespace_end,
                    }),
                    position,
                )
                .with_block_start(raw.block_start);
                node.block_end_position = Some(raw.block_end);
                self.push(node)
            }
            ConcreteKind::HtmlTagOpen { name, attributes } => {
                let attributes = self.sub_list(attributes)?;
                let node = Node::new(NodeKind::HtmlElement { name, attributes }, position)
                    .with_block_start(position)
                    .with_children();
                self.open(node);
                Ok(())
            }
            ConcreteKind::HtmlTagClose { name } => self.close(CloseMarker {
                type_name: "HtmlElement",
                name: name.compare_name(),
                position,
                whitespace: None,
            }),
            ConcreteKind::HtmlVoidElement { name, attributes } => {
                let attributes = self.sub_list(attributes)?;
                self.push(
                    Node::new(NodeKind::HtmlVoidElement { name, attributes }, position)
                        .with_block_start(position),
                )
            }
            ConcreteKind::HtmlSelfClosingElement { name, attributes } => {
                let attributes = self.sub_list(attributes)?;
                self.push(
                    Node::new(
                        NodeKind::HtmlSelfClosingElement { name, attributes },
                        position,
                    )
                    .with_block_start(position),
                )
            }
            ConcreteKind::HtmlRawTag {
                name,
                attributes,
                body,
                block_start,
                block_end,
            } => {
                let body = RawMarkup {
                    kind: html_raw_markup_kind(&name, &attributes, &body),
                    value: body,
                    position: Position::new(block_start.end, block_end.start),
                };
                let attributes = self.sub_list(attributes)?;
                let mut node = Node::new(
                    NodeKind::HtmlRawNode {
                        name,
                        attributes,
                        body,
                    },
                    position,
                )
                .with_block_start(block_start);
                node.block_end_position = Some(block_end);
                self.push(node)
            }
            ConcreteKind::Attribute(attribute) => {
                let value = self.sub_list(attribute.value)?;
                let attribute_position = match (value.first(), value.last()) {
                    (Some(first), Some(last)) => Position::new(
                        self.nodes[first.0].position.start,
                        self.nodes[last.0].position.end,
                    ),
                    _ if attribute.kind == AttrKind::Empty => {
                        Position::new(position.end, position.end)
                    }
                    _ => {
                        let start = position.start + attribute.name.len() + "=\"".len();
                        Position::new(start, start)
                    }
                };
                self.push(Node::new(
                    NodeKind::Attribute(Attribute {
                        kind: attribute.kind,
                        name: attribute.name,
                        value,
                        attribute_position,
                    }),
                    position,
                ))
            }
            ConcreteKind::HtmlDoctype {
                legacy_doctype_string,
            } => self.push(Node::new(
                NodeKind::HtmlDoctype {
                    legacy_doctype_string,
                },
                position,
            )),
            ConcreteKind::HtmlComment { body } => {
                self.push(Node::new(NodeKind::HtmlComment { body }, position))
            }
            ConcreteKind::YamlFrontmatter { body } => {
                self.push(Node::new(NodeKind::YamlFrontmatter { body }, position))
            }
        }
    }

    /// Attribute lists, attribute values and statements are built on their
    /// own, so a block opened inside one must close inside it.
    fn sub_list(&mut self, cst: Vec<ConcreteNode>) -> Result<Vec<NodeId>> {
        build_list(self.source, self.nodes, cst)
    }

    fn markup(&mut self, name: &str, markup: ConcreteMarkup) -> Result<TagMarkup> {
        Ok(match markup {
            ConcreteMarkup::Raw(_) if TAGS_WITHOUT_MARKUP.contains(&name) => {
                TagMarkup::Raw(String::new())
            }
            ConcreteMarkup::Raw(markup) => TagMarkup::Raw(markup),
            ConcreteMarkup::Named(named) => TagMarkup::Named(named),
            ConcreteMarkup::Statements(statements) => {
                TagMarkup::Statements(self.sub_list(statements)?)
            }
        })
    }

    fn liquid_tag(&mut self, tag: ConcreteTag, position: Position) -> Result<Node> {
        let markup = self.markup(&tag.name, tag.markup)?;
        Ok(Node::new(
            NodeKind::LiquidTag(LiquidTag {
                name: tag.name,
                markup,
                whitespace_start: tag.whitespace_start,
                whitespace_end: tag.whitespace_end,
                delimiter_whitespace_start: None,
                delimiter_whitespace_end: None,
            }),
            position,
        )
        .with_block_start(position))
    }

    fn branch(&mut self, tag: ConcreteTag, position: Position) -> Result<Node> {
        let markup = self.markup(&tag.name, tag.markup)?;
        Ok(Node::new(
            NodeKind::LiquidBranch(LiquidBranch {
                name: Some(tag.name),
                markup,
                whitespace_start: tag.whitespace_start,
                whitespace_end: tag.whitespace_end,
            }),
            position,
        )
        .with_block_start(position)
        .with_children())
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn current_children(&mut self) -> &mut Vec<NodeId> {
        match self.stack.last() {
            Some(&frame) => self.nodes[frame.0].children.get_or_insert_with(Vec::new),
            None => &mut self.top,
        }
    }

    fn top_branch(&self) -> Option<NodeId> {
        self.stack
            .last()
            .copied()
            .filter(|frame| matches!(self.nodes[frame.0].kind, NodeKind::LiquidBranch(_)))
    }

    fn open(&mut self, node: Node) {
        let branched = node.is_branched_tag();
        let end = node.position.end;
        let id = self.alloc(node);
        self.current_children().push(id);
        self.stack.push(id);
        log::trace!("open {} at {}", self.nodes[id.0].type_name(), end);

        if branched {
            let default_branch = Node::new(
                NodeKind::LiquidBranch(LiquidBranch {
                    name: None,
                    markup: TagMarkup::Raw(String::new()),
                    whitespace_start: Trim::Keep,
                    whitespace_end: Trim::Keep,
                }),
                Position::new(end, end),
            )
            .with_block_start(Position::new(end, end))
            .with_children();
            self.open(default_branch);
        }
    }

    fn push(&mut self, node: Node) -> Result<()> {
        if let Some(branch) = self.top_branch() {
            let end = node.position.end;
            let position = &mut self.nodes[branch.0].position;
            position.end = position.end.max(end);
        }
        let id = self.alloc(node);
        self.current_children().push(id);
        Ok(())
    }

    /// Ends the current branch where `branch` starts and opens `branch`.
    fn switch_branch(&mut self, branch: Node) -> Result<()> {
        let Some(current) = self.top_branch() else {
            let message = match self.stack.last() {
                Some(&frame) => {
                    let open = &self.nodes[frame.0];
                    format!(
                        "Attempting to open LiquidBranch '{}' before {} '{}' was closed",
                        branch.name().unwrap_or_default(),
                        open.type_name(),
                        open.name().unwrap_or_default()
                    )
                }
                None => format!(
                    "Attempting to open LiquidBranch '{}' outside of a branched tag",
                    branch.name().unwrap_or_default()
                ),
            };
            return Err(Error::structural(
                message,
                self.source,
                branch.position.start,
                branch.position.end,
            ));
        };
        self.nodes[current.0].position.end = branch.position.start;
        self.stack.pop();
        log::trace!("switch branch at {}", branch.position.start);
        self.open(branch);
        Ok(())
    }

    fn close(&mut self, marker: CloseMarker) -> Result<()> {
        if let Some(branch) = self.top_branch() {
            self.nodes[branch.0].position.end = marker.position.start;
            self.stack.pop();
        }

        let Some(&frame) = self.stack.last() else {
            return Err(Error::structural(
                format!(
                    "Attempting to close {} '{}' before it was opened",
                    marker.type_name, marker.name
                ),
                self.source,
                marker.position.start,
                marker.position.end,
            ));
        };

        let open = &mut self.nodes[frame.0];
        if open.type_name() != marker.type_name || open.name().as_deref() != Some(&marker.name) {
            return Err(Error::structural(
                format!(
                    "Attempting to close {} '{}' before {} '{}' was closed",
                    marker.type_name,
                    marker.name,
                    open.type_name(),
                    open.name().unwrap_or_default()
                ),
                self.source,
                open.position.start,
                marker.position.end,
            ));
        }

        open.position.end = marker.position.end;
        open.block_end_position = Some(marker.position);
        if let (NodeKind::LiquidTag(tag), Some((start, end))) = (&mut open.kind, marker.whitespace) {
            tag.delimiter_whitespace_start = Some(start);
            tag.delimiter_whitespace_end = Some(end);
        }
        log::trace!("close {} '{}'", marker.type_name, marker.name);
        self.stack.pop();
        Ok(())
    }

    fn finish(self) -> Result<Vec<NodeId>> {
        let unclosed = self
            .stack
            .iter()
            .rev()
            .map(|frame| &self.nodes[frame.0])
            .find(|node| !matches!(node.kind, NodeKind::LiquidBranch(_)));
        if let Some(node) = unclosed {
            let end = node.block_start_position.unwrap_or(node.position).end;
            return Err(Error::structural(
                format!(
                    "Attempting to end parsing before {} '{}' was closed",
                    node.type_name(),
                    node.name().unwrap_or_default()
                ),
                self.source,
                node.position.start,
                end,
            ));
        }
        Ok(self.top)
    }
}

fn contains_liquid(body: &str) -> bool {
    body.contains("{{") || body.contains("{%")
}

fn liquid_raw_markup_kind(name: &str, body: &str) -> RawMarkupKind {
    match name {
        "javascript" => RawMarkupKind::Javascript,
        "style" | "stylesheet" if contains_liquid(body) => RawMarkupKind::Text,
        "style" | "stylesheet" => RawMarkupKind::Css,
        "schema" => RawMarkupKind::Json,
        _ => RawMarkupKind::Text,
    }
}

fn html_raw_markup_kind(name: &str, attributes: &[ConcreteNode], body: &str) -> RawMarkupKind {
    match name {
        "script" => {
            let script_type = attributes.iter().find_map(|node| match &node.kind {
                ConcreteKind::Attribute(attribute) if attribute.name == "type" => {
                    match attribute.value.first().map(|value| &value.kind) {
                        Some(ConcreteKind::TextNode { value }) => Some(value.as_str()),
                        _ => None,
                    }
                }
                _ => None,
            });
            match script_type {
                Some("text/markdown") => RawMarkupKind::Markdown,
                Some("application/x-typescript") => RawMarkupKind::Typescript,
                Some("text/html") => RawMarkupKind::Html,
                Some(t) if t.ends_with("json") || t.ends_with("importmap") => RawMarkupKind::Json,
                Some("speculationrules") => RawMarkupKind::Json,
                _ => RawMarkupKind::Javascript,
            }
        }
        "style" if contains_liquid(body) => RawMarkupKind::Text,
        "style" => RawMarkupKind::Css,
        _ => RawMarkupKind::Text,
    }
}
