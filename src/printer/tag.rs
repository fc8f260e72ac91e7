//! Opening and closing tags, and the delimiter borrowing between neighbours.
//!
//! When no whitespace may appear between two nodes, the `>` or `</x` between
//! them is printed by the neighbour instead, so that a line break can only
//! fall inside a tag.

use crate::ast::{Ast, Node, NodeId, NodeKind};
use crate::cst::{DropMarkup, ElementName};
use crate::doc::{break_parent, docs, hardline, indent, join, line, replace_text_end_of_line, softline, Doc, GroupId};

use super::utils::*;
use super::Printer;

pub(super) fn needs_to_borrow_prev_closing_tag_end_marker(ast: &Ast, id: NodeId) -> bool {
    let node = &ast[id];
    !node.is_liquid()
        && ast.prev(id).is_some_and(Node::is_html)
        && has_meaningful_lack_of_leading_whitespace(node)
}

pub(super) fn needs_to_borrow_last_child_closing_tag_end_marker(ast: &Ast, id: NodeId) -> bool {
    let node = &ast[id];
    node.is_html()
        && node.family.last_child.is_some_and(|last| {
            has_meaningful_lack_of_trailing_whitespace(&ast[last])
                && ast[last_descendant(ast, last)].is_html()
        })
        && !is_pre_like(node)
}

pub(super) fn needs_to_borrow_parent_closing_tag_start_marker(ast: &Ast, id: NodeId) -> bool {
    let node = &ast[id];
    let last = &ast[last_descendant(ast, id)];
    ast.parent(id).is_some_and(Node::is_html)
        && node.family.next.is_none()
        && has_meaningful_lack_of_trailing_whitespace(node)
        && !node.is_liquid()
        && (last.is_text() || last.is_liquid())
}

pub(super) fn needs_to_borrow_next_opening_tag_start_marker(ast: &Ast, id: NodeId) -> bool {
    let node = &ast[id];
    ast.next(id).is_some_and(Node::is_html)
        && node.is_text()
        && has_meaningful_lack_of_trailing_whitespace(node)
}

pub(super) fn needs_to_borrow_parent_opening_tag_end_marker(ast: &Ast, id: NodeId) -> bool {
    let node = &ast[id];
    ast.parent(id).is_some_and(Node::is_html)
        && node.family.prev.is_none()
        && has_meaningful_lack_of_leading_whitespace(node)
        && !node.is_liquid()
}

fn element_name(node: &Node) -> Option<String> {
    let name = match &node.kind {
        NodeKind::HtmlElement { name, .. } | NodeKind::HtmlSelfClosingElement { name, .. } => name,
        NodeKind::HtmlVoidElement { name, .. } | NodeKind::HtmlRawNode { name, .. } => {
            return Some(name.clone())
        }
        _ => return None,
    };
    Some(match name {
        ElementName::Tag(name) => name.clone(),
        ElementName::Drop(DropMarkup::Raw(markup)) => format!("{{{{ {} }}}}", markup.trim()),
        ElementName::Drop(DropMarkup::Variable(variable)) => {
            format!("{{{{ {} }}}}", variable.raw_source)
        }
    })
}

pub(super) fn opening_tag_start_marker(node: &Node) -> String {
    match &node.kind {
        NodeKind::HtmlComment { .. } => "<!--".to_string(),
        _ => element_name(node).map_or_else(String::new, |name| format!("<{name}")),
    }
}

pub(super) fn opening_tag_end_marker(node: &Node) -> &'static str {
    match node.kind {
        NodeKind::HtmlComment { .. } => "-->",
        NodeKind::HtmlSelfClosingElement { .. } | NodeKind::HtmlVoidElement { .. } => "",
        _ => ">",
    }
}

/// Closing markers are dropped for unclosed content kept verbatim.
fn should_not_print_closing_tag(ast: &Ast, id: NodeId) -> bool {
    let node = &ast[id];
    !has_no_close_marker(node)
        && node.block_end_position.is_none()
        && (has_prettier_ignore(ast, id)
            || node
                .family
                .parent
                .is_some_and(|parent| should_preserve_content(ast, parent)))
}

pub(super) fn closing_tag_start_marker(ast: &Ast, id: NodeId) -> String {
    if should_not_print_closing_tag(ast, id) {
        return String::new();
    }
    let node = &ast[id];
    match node.kind {
        NodeKind::HtmlElement { .. } | NodeKind::HtmlRawNode { .. } => {
            element_name(node).map_or_else(String::new, |name| format!("</{name}"))
        }
        _ => String::new(),
    }
}

pub(super) fn closing_tag_end_marker(ast: &Ast, id: NodeId) -> &'static str {
    if should_not_print_closing_tag(ast, id) {
        return "";
    }
    match ast[id].kind {
        NodeKind::HtmlSelfClosingElement { .. } => "/>",
        _ => ">",
    }
}

/// The `prettier-ignore-attribute` comment before an element: `None` when
/// there is none, an empty list when every attribute is kept as is.
fn ignored_attributes(ast: &Ast, id: NodeId) -> Option<Vec<String>> {
    let NodeKind::HtmlComment { body } = &ast.prev(id)?.kind else {
        return None;
    };
    let rest = body.trim().strip_prefix("prettier-ignore-attribute")?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.split_whitespace().map(str::to_string).collect())
}

impl Printer<'_> {
    pub(super) fn print_opening_tag(&self, id: NodeId, attr_group_id: GroupId) -> Doc {
        let node = &self.ast[id];
        docs![
            self.print_opening_tag_start(id),
            self.print_attributes(id, attr_group_id),
            if has_no_close_marker(node) {
                Doc::nil()
            } else {
                self.print_opening_tag_end(id)
            },
        ]
    }

    fn print_opening_tag_start(&self, id: NodeId) -> Doc {
        let borrowed = self.ast[id]
            .family
            .prev
            .is_some_and(|prev| needs_to_borrow_next_opening_tag_start_marker(self.ast, prev));
        if borrowed {
            return Doc::nil();
        }
        docs![
            self.print_opening_tag_prefix(id),
            opening_tag_start_marker(&self.ast[id]),
        ]
    }

    fn print_opening_tag_end(&self, id: NodeId) -> Doc {
        let borrowed = self.ast[id]
            .family
            .first_child
            .is_some_and(|first| needs_to_borrow_parent_opening_tag_end_marker(self.ast, first));
        if borrowed {
            Doc::nil()
        } else {
            Doc::from(opening_tag_end_marker(&self.ast[id]))
        }
    }

    /// Marker borrowed from the parent or the previous sibling.
    pub(super) fn print_opening_tag_prefix(&self, id: NodeId) -> Doc {
        let ast = self.ast;
        if needs_to_borrow_parent_opening_tag_end_marker(ast, id) {
            return match ast.parent(id) {
                Some(parent) => Doc::from(opening_tag_end_marker(parent)),
                None => Doc::nil(),
            };
        }
        if needs_to_borrow_prev_closing_tag_end_marker(ast, id) {
            return match ast[id].family.prev {
                Some(prev) => Doc::from(closing_tag_end_marker(ast, prev)),
                None => Doc::nil(),
            };
        }
        Doc::nil()
    }

    pub(super) fn print_closing_tag(&self, id: NodeId) -> Doc {
        docs![
            if has_no_close_marker(&self.ast[id]) {
                Doc::nil()
            } else {
                self.print_closing_tag_start(id)
            },
            self.print_closing_tag_end(id),
        ]
    }

    fn print_closing_tag_start(&self, id: NodeId) -> Doc {
        let ast = self.ast;
        let borrowed = ast[id]
            .family
            .last_child
            .is_some_and(|last| needs_to_borrow_parent_closing_tag_start_marker(ast, last));
        if borrowed {
            return Doc::nil();
        }
        docs![
            self.print_closing_tag_prefix(id),
            closing_tag_start_marker(ast, id),
        ]
    }

    fn print_closing_tag_end(&self, id: NodeId) -> Doc {
        if self.closing_tag_end_is_borrowed(id) {
            return Doc::nil();
        }
        docs![
            closing_tag_end_marker(self.ast, id),
            self.print_closing_tag_suffix(id),
        ]
    }

    /// Whether the next sibling, or the parent when there is none, prints
    /// the `>` of this node.
    pub(super) fn closing_tag_end_is_borrowed(&self, id: NodeId) -> bool {
        let ast = self.ast;
        match (ast[id].family.next, ast[id].family.parent) {
            (Some(next), _) => needs_to_borrow_prev_closing_tag_end_marker(ast, next),
            (None, Some(parent)) => needs_to_borrow_last_child_closing_tag_end_marker(ast, parent),
            (None, None) => false,
        }
    }

    fn print_closing_tag_prefix(&self, id: NodeId) -> Doc {
        let ast = self.ast;
        if !needs_to_borrow_last_child_closing_tag_end_marker(ast, id) {
            return Doc::nil();
        }
        match ast[id].family.last_child {
            Some(last) => Doc::from(closing_tag_end_marker(ast, last)),
            None => Doc::nil(),
        }
    }

    /// Marker borrowed from the parent or the next sibling.
    pub(super) fn print_closing_tag_suffix(&self, id: NodeId) -> Doc {
        let ast = self.ast;
        if needs_to_borrow_parent_closing_tag_start_marker(ast, id) {
            return match ast[id].family.parent {
                Some(parent) => Doc::from(closing_tag_start_marker(ast, parent)),
                None => Doc::nil(),
            };
        }
        if needs_to_borrow_next_opening_tag_start_marker(ast, id) {
            return match ast.next(id) {
                Some(next) => Doc::from(opening_tag_start_marker(next)),
                None => Doc::nil(),
            };
        }
        Doc::nil()
    }

    fn print_attributes(&self, id: NodeId, attr_group_id: GroupId) -> Doc {
        let ast = self.ast;
        let options = self.options;
        let node = &ast[id];
        let attributes = node.attributes();
        if matches!(node.kind, NodeKind::HtmlComment { .. }) {
            return Doc::nil();
        }
        if attributes.is_empty() {
            return if is_self_closing(node) {
                Doc::from(" ")
            } else {
                Doc::nil()
            };
        }

        let ignored = ignored_attributes(ast, id);
        let printed: Vec<Doc> = attributes
            .iter()
            .map(|&attribute| {
                let keep = match &ignored {
                    Some(names) if names.is_empty() => true,
                    Some(names) => ast[attribute]
                        .name()
                        .is_some_and(|name| names.contains(&name)),
                    None => false,
                };
                if keep {
                    replace_text_end_of_line(ast.slice(ast[attribute].position))
                } else {
                    self.print_node(attribute, super::Args::spaces(None, Some(attr_group_id)))
                }
            })
            .collect();

        let is_link = node.html_name() == Some("link");
        let force_not_to_break = (options.single_line_link_tags && is_link)
            || ((is_self_closing(node)
                || matches!(node.kind, NodeKind::HtmlVoidElement { .. })
                || (matches!(node.kind, NodeKind::HtmlElement { .. })
                    && !node.children().is_empty()))
                && attributes.len() == 1
                && !ast[attributes[0]].is_liquid());
        let force_break = node
            .block_start_position
            .is_some_and(|position| ast.slice(position).contains('\n'));

        let attribute_line = if force_not_to_break {
            Doc::from(" ")
        } else if options.single_attribute_per_line && attributes.len() > 1 {
            hardline()
        } else {
            line()
        };

        let mut parts = vec![indent(docs![
            if force_not_to_break {
                Doc::from(" ")
            } else {
                line()
            },
            if force_break {
                break_parent()
            } else {
                Doc::nil()
            },
            join(attribute_line, printed),
        ])];

        let first_borrows = node
            .family
            .first_child
            .is_some_and(|first| needs_to_borrow_parent_opening_tag_end_marker(ast, first));
        let parent_borrows = has_no_close_marker(node)
            && node
                .family
                .parent
                .is_some_and(|parent| needs_to_borrow_last_child_closing_tag_end_marker(ast, parent));
        let self_closing = is_self_closing(node);
        parts.push(if first_borrows || parent_borrows || force_not_to_break || options.bracket_same_line {
            Doc::from(if self_closing { " " } else { "" })
        } else if self_closing {
            line()
        } else {
            softline()
        });
        Doc::Concat(parts)
    }
}
