//! HTML elements, raw elements, attributes and text.

use crate::ast::{NodeId, NodeKind, RawMarkup, RawMarkupKind};
use crate::cst::AttrKind;
use crate::doc::{
    break_parent, dedent_to_root, docs, fill, group, group_with, hardline, indent, join, line,
    replace_text_end_of_line, softline, Doc,
};

use super::tag::*;
use super::utils::*;
use super::{lines_to_docs, Args, Printer};

fn contains_liquid(body: &str) -> bool {
    body.contains("{{") || body.contains("{%")
}

/// Splits text on runs of two or more line breaks.
fn paragraphs(text: &str) -> Vec<&str> {
    let mut paragraphs = Vec::new();
    let mut start = 0;
    let mut index = 0;
    let bytes = text.as_bytes();
    while index < bytes.len() {
        let mut end = index;
        let mut breaks = 0;
        loop {
            match bytes.get(end..) {
                Some([b'\n', ..]) => end += 1,
                Some([b'\r', b'\n', ..]) => end += 2,
                _ => break,
            }
            breaks += 1;
        }
        if breaks >= 2 {
            paragraphs.push(&text[start..index]);
            start = end;
            index = end;
        } else {
            index = end.max(index + 1);
        }
    }
    paragraphs.push(&text[start..]);
    paragraphs.retain(|paragraph| !paragraph.is_empty());
    paragraphs
}

impl Printer<'_> {
    pub(super) fn print_element(&self, id: NodeId) -> Doc {
        let ast = self.ast;
        let node = &ast[id];
        let attr_group_id = self.fresh_id();
        let element_group_id = self.fresh_id();
        let opening_tag = || group_with(self.print_opening_tag(id, attr_group_id), Some(attr_group_id), false);

        if has_no_close_marker(node) {
            return docs![
                opening_tag(),
                self.print_closing_tag(id),
                self.print_closing_tag_suffix(id),
            ];
        }

        if should_preserve_content(ast, id) {
            return docs![
                self.print_opening_tag_prefix(id),
                opening_tag(),
                replace_text_end_of_line(&self.node_content(id)),
                self.print_closing_tag(id),
                self.print_closing_tag_suffix(id),
            ];
        }

        let print_tag = |doc: Doc| {
            group_with(
                docs![opening_tag(), doc, self.print_closing_tag(id)],
                Some(element_group_id),
                false,
            )
        };

        let (Some(first), Some(last)) = (node.family.first_child, node.family.last_child) else {
            let annotation = &node.annotation;
            return print_tag(
                if annotation.has_dangling_whitespace && annotation.is_dangling_whitespace_sensitive {
                    line()
                } else {
                    Doc::nil()
                },
            );
        };

        let first = &ast[first];
        let line_before_children = if first.annotation.has_leading_whitespace
            && first.annotation.is_leading_whitespace_sensitive
        {
            line()
        } else if first.is_text()
            && node.annotation.is_whitespace_sensitive
            && node.annotation.is_indentation_sensitive
        {
            dedent_to_root(softline())
        } else {
            softline()
        };

        let last = &ast[last];
        let trailing_space =
            last.annotation.has_trailing_whitespace && last.annotation.is_trailing_whitespace_sensitive;
        let line_after_children = match (self.closing_tag_end_is_borrowed(id), trailing_space) {
            (true, true) => Doc::from(" "),
            (true, false) => Doc::nil(),
            (false, true) => line(),
            (false, false) => softline(),
        };

        print_tag(docs![
            if force_break_content(ast, id) {
                break_parent()
            } else {
                Doc::nil()
            },
            indent(docs![
                line_before_children,
                self.print_children(id, Args::spaces(Some(element_group_id), Some(element_group_id))),
            ]),
            line_after_children,
        ])
    }

    /// Source between the tags of an element, adjusted for borrowed markers.
    fn node_content(&self, id: NodeId) -> String {
        let ast = self.ast;
        let node = &ast[id];
        let (Some(block_start), Some(block_end)) = (node.block_start_position, node.block_end_position) else {
            return String::new();
        };

        let mut start = block_start.end;
        if node
            .family
            .first_child
            .is_some_and(|first| needs_to_borrow_parent_opening_tag_end_marker(ast, first))
        {
            start -= opening_tag_end_marker(node).len();
        }
        let mut end = block_end.start;
        match node.family.last_child {
            Some(last) if needs_to_borrow_parent_closing_tag_start_marker(ast, last) => {
                end += closing_tag_start_marker(ast, id).len();
            }
            Some(last) if needs_to_borrow_last_child_closing_tag_end_marker(ast, id) => {
                end -= closing_tag_end_marker(ast, last).len();
            }
            _ => {}
        }
        self.source().get(start..end).unwrap_or_default().to_string()
    }

    pub(super) fn print_raw_node(&self, id: NodeId) -> Doc {
        let node = &self.ast[id];
        let NodeKind::HtmlRawNode { name, attributes, body } = &node.kind else {
            return Doc::nil();
        };

        let mut parts = vec![group(docs![
            "<",
            name.as_str(),
            self.print_raw_node_attributes(id, attributes),
            ">",
        ])];
        if !body.value.trim().is_empty() {
            let printed = docs![hardline(), self.print_raw_markup(body)];
            if body.kind == RawMarkupKind::Markdown {
                parts.push(dedent_to_root(printed));
            } else {
                parts.push(indent(printed));
            }
            parts.push(hardline());
        }
        parts.push(docs!["</", name.as_str(), ">"]);
        group(parts)
    }

    fn print_raw_node_attributes(&self, id: NodeId, attributes: &[NodeId]) -> Doc {
        if attributes.is_empty() {
            return Doc::nil();
        }
        let should_break = self.ast[id]
            .block_start_position
            .is_some_and(|position| has_line_break_in_range(self.source(), position.start, position.end));
        let printed = attributes
            .iter()
            .map(|&attribute| self.print_node(attribute, Args::default()));
        group_with(
            docs![indent(docs![line(), join(line(), printed)]), softline()],
            None,
            should_break,
        )
    }

    /// Body of a raw element or raw tag. The embedded formatter goes first;
    /// otherwise the body is re-indented line by line.
    pub(super) fn print_raw_markup(&self, body: &RawMarkup) -> Doc {
        if !contains_liquid(&body.value) {
            if let Some(formatted) = self.embed.format(&body.value, body.kind, self.options) {
                log::trace!("embedded {:?} body formatted", body.kind);
                return join(hardline(), formatted.trim_end().lines().map(Doc::from));
            }
        }

        let lines = body_lines(&body.value);
        let skip_first_line = !matches!(
            self.source().as_bytes().get(body.position.start),
            Some(b'\r' | b'\n')
        );
        match lines.first() {
            Some(first) if !first.trim().is_empty() => {
                join(hardline(), lines_to_docs(reindent(lines, skip_first_line)))
            }
            _ => softline(),
        }
    }

    pub(super) fn print_attribute(&self, id: NodeId) -> Doc {
        let ast = self.ast;
        let NodeKind::Attribute(attribute) = &ast[id].kind else {
            return Doc::nil();
        };
        if attribute.kind == AttrKind::Empty {
            return Doc::from(attribute.name.as_str());
        }

        let position = attribute.attribute_position;
        let value = ast.slice(position);
        let preferred = if self.options.single_quote { '\'' } else { '"' };
        let contains_preferred = attribute.value.iter().any(|&part| {
            matches!(&ast[part].kind, NodeKind::TextNode { value } if value.contains(preferred))
        });
        let quote = match (preferred, contains_preferred) {
            ('"', true) | ('\'', false) => "'",
            _ => "\"",
        };

        let printed_value = if has_line_break_in_range(self.source(), position.start, position.end) {
            group_with(
                docs![
                    indent(docs![
                        softline(),
                        join(hardline(), lines_to_docs(reindent(body_lines(value), true))),
                    ]),
                    softline(),
                ],
                Some(self.fresh_id()),
                false,
            )
        } else {
            Doc::from(value)
        };

        docs![attribute.name.as_str(), "=", quote, printed_value, quote]
    }

    pub(super) fn print_text(&self, id: NodeId, value: &str) -> Doc {
        if value.trim().is_empty() {
            return Doc::nil();
        }

        let paragraphs = paragraphs(value).into_iter().map(|paragraph| {
            let words = paragraph.split_whitespace().map(Doc::from);
            fill(match join(line(), words) {
                Doc::Concat(parts) => parts,
                other => vec![other],
            })
        });

        docs![
            self.print_opening_tag_prefix(id),
            join(docs![hardline(), hardline()], paragraphs),
            self.print_closing_tag_suffix(id),
        ]
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::paragraphs;

    #[test]
    fn test_paragraphs() {
        assert_eq!(paragraphs("a b\nc"), vec!["a b\nc"]);
        assert_eq!(paragraphs("a\n\nb"), vec!["a", "b"]);
        assert_eq!(paragraphs("a\r\n\r\n\nb\n\nc"), vec!["a", "b", "c"]);
        assert_eq!(paragraphs("a\n \nb"), vec!["a\n \nb"]);
    }
}
