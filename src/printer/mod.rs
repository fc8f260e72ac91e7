//! Print decision engine
//!
//! Turns an annotated [`Ast`] into a [`Doc`]. Every node is printed by the
//! module that owns its kind: [`element`] for HTML elements and attributes,
//! [`liquid`] for drops, tags and branches, [`markup`] for the structured
//! markup inside them and [`children`] for sibling lists. The delimiter
//! borrowing rules live in [`tag`].

mod children;
mod element;
mod embed;
mod liquid;
mod markup;
mod tag;
mod utils;

use crate::ast::{Ast, NodeId, NodeKind};
use crate::config::FormatOptions;
use crate::doc::{docs, group, hardline, indent, join, line, Doc, GroupId, GroupIds};

pub use embed::{EmbeddedFormatter, PassThrough};

/// Group ids and modes threaded from a parent to the node it prints.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Args {
    /// Group whose break decides the trim marker before the node.
    pub leading_space_group_id: Option<GroupId>,
    /// Group whose break decides the trim marker after the node.
    pub trailing_space_group_id: Option<GroupId>,
    /// Printing a statement of `{% liquid %}`: no delimiters, one line.
    pub is_liquid_statement: bool,
}

impl Args {
    fn spaces(leading: Option<GroupId>, trailing: Option<GroupId>) -> Self {
        Self {
            leading_space_group_id: leading,
            trailing_space_group_id: trailing,
            ..Self::default()
        }
    }
}

pub struct Printer<'a> {
    ast: &'a Ast,
    options: &'a FormatOptions,
    embed: &'a dyn EmbeddedFormatter,
    group_ids: GroupIds,
}

impl<'a> Printer<'a> {
    pub fn new(ast: &'a Ast, options: &'a FormatOptions, embed: &'a dyn EmbeddedFormatter) -> Self {
        Self {
            ast,
            options,
            embed,
            group_ids: GroupIds::new(),
        }
    }

    /// Document of the whole tree, ending with a newline.
    pub fn print_document(&self) -> Doc {
        let root = self.ast.root();
        let doc = docs![self.print_children(root, Args::default()), hardline()];
        log::debug!("printed document of {} nodes", self.ast.len());
        doc
    }

    fn fresh_id(&self) -> GroupId {
        self.group_ids.fresh()
    }

    fn source(&self) -> &'a str {
        self.ast.source()
    }

    fn print_node(&self, id: NodeId, args: Args) -> Doc {
        let node = &self.ast[id];
        match &node.kind {
            NodeKind::Document => docs![self.print_children(id, args), hardline()],
            NodeKind::HtmlElement { .. }
            | NodeKind::HtmlVoidElement { .. }
            | NodeKind::HtmlSelfClosingElement { .. } => self.print_element(id),
            NodeKind::HtmlRawNode { .. } => self.print_raw_node(id),
            NodeKind::Attribute(_) => self.print_attribute(id),
            NodeKind::TextNode { value } => self.print_text(id, value),
            NodeKind::LiquidDrop { .. } => self.print_liquid_drop(id, args),
            NodeKind::LiquidTag(_) => self.print_liquid_tag(id, args),
            NodeKind::LiquidBranch(_) => self.print_liquid_branch(id, args),
            NodeKind::LiquidRawTag(_) => self.print_liquid_raw_tag(id, args),
            NodeKind::HtmlDoctype {
                legacy_doctype_string,
            } => match legacy_doctype_string {
                None => Doc::from("<!doctype html>"),
                Some(_) => Doc::from(self.ast.slice(node.position)),
            },
            NodeKind::HtmlComment { body } => docs![
                "<!--",
                group(docs![
                    indent(docs![
                        line(),
                        join(hardline(), lines_to_docs(utils::reindent(utils::body_lines(body), true))),
                    ]),
                    line(),
                ]),
                "-->",
            ],
            NodeKind::YamlFrontmatter { body } => docs!["---", hardline(), body.as_str(), "---"],
        }
    }
}

fn lines_to_docs(lines: Vec<String>) -> Vec<Doc> {
    lines.into_iter().map(Doc::from).collect()
}

/// Prints an annotated tree.
pub fn print_document(ast: &Ast, options: &FormatOptions, embed: &dyn EmbeddedFormatter) -> Doc {
    Printer::new(ast, options, embed).print_document()
}
