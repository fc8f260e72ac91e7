//! Sibling lists and the whitespace between siblings.

use crate::ast::{NodeId, NodeKind};
use crate::doc::{break_parent, docs, group, group_with, hardline, if_break, line, replace_text_end_of_line, softline, Doc};

use super::tag::*;
use super::utils::*;
use super::{Args, Printer};

/// What may stand between two siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Separator {
    /// Nothing: the siblings touch.
    None,
    /// Breaks to nothing when the line is full.
    Soft,
    /// A space, or a line break when the line is full.
    Line,
    Hard,
}

impl Separator {
    fn doc(self) -> Doc {
        match self {
            Separator::None => Doc::nil(),
            Separator::Soft => softline(),
            Separator::Line => line(),
            Separator::Hard => hardline(),
        }
    }
}

impl Printer<'_> {
    pub(super) fn print_children(&self, id: NodeId, args: Args) -> Doc {
        let ast = self.ast;
        let node = &ast[id];
        let children = node.children();

        if args.is_liquid_statement {
            let mut parts = Vec::with_capacity(children.len());
            for &child in children {
                if let Some(prev) = ast[child].family.prev {
                    parts.push(hardline());
                    if force_next_empty_line(ast, prev) {
                        parts.push(hardline());
                    }
                }
                parts.push(self.print_child(child, args));
            }
            return Doc::Concat(parts);
        }

        if force_break_children(node) {
            let mut parts = vec![break_parent()];
            for &child in children {
                if let Some(prev) = ast[child].family.prev {
                    let separator = self.print_between_line(prev, child);
                    if separator != Separator::None {
                        parts.push(separator.doc());
                        if force_next_empty_line(ast, prev) {
                            parts.push(hardline());
                        }
                    }
                }
                parts.push(self.print_child(child, args));
            }
            return Doc::Concat(parts);
        }

        let group_ids: Vec<_> = children.iter().map(|_| self.fresh_id()).collect();
        let mut parts = Vec::with_capacity(children.len());
        for (index, &child) in children.iter().enumerate() {
            let child_node = &ast[child];
            let child_args = Args {
                leading_space_group_id: Some(group_ids[index]),
                trailing_space_group_id: Some(group_ids[index]),
                ..args
            };

            if child_node.is_text() {
                match child_node.family.prev {
                    Some(prev) if ast[prev].is_text() => {
                        let separator = self.print_between_line(prev, child);
                        if separator == Separator::None {
                            parts.push(self.print_child(child, child_args));
                        } else if force_next_empty_line(ast, prev) {
                            parts.push(docs![hardline(), hardline(), self.print_child(child, child_args)]);
                        } else {
                            parts.push(docs![separator.doc(), self.print_child(child, child_args)]);
                        }
                    }
                    _ => parts.push(self.print_child(child, child_args)),
                }
                continue;
            }

            let mut prev_parts = Vec::new();
            let mut leading_parts = Vec::new();
            let mut trailing_parts = Vec::new();
            let mut next_parts = Vec::new();

            if let Some(prev) = child_node.family.prev {
                let separator = self.print_between_line(prev, child);
                if separator != Separator::None {
                    if force_next_empty_line(ast, prev) {
                        prev_parts.extend([hardline(), hardline()]);
                    } else if separator == Separator::Hard {
                        prev_parts.push(hardline());
                    } else if ast[prev].is_text() {
                        leading_parts.push(separator.doc());
                    } else {
                        leading_parts.push(if_break("", softline(), Some(group_ids[index - 1])));
                    }
                }
            }

            if let Some(next) = child_node.family.next {
                let separator = self.print_between_line(child, next);
                if separator != Separator::None {
                    let next_is_text = ast[next].is_text();
                    if force_next_empty_line(ast, child) {
                        if next_is_text {
                            next_parts.extend([hardline(), hardline()]);
                        }
                    } else if separator == Separator::Hard {
                        if next_is_text {
                            next_parts.push(hardline());
                        }
                    } else {
                        trailing_parts.push(separator.doc());
                    }
                }
            }

            let mut printed = vec![self.print_child(child, child_args)];
            printed.extend(trailing_parts);
            leading_parts.push(group_with(printed, Some(group_ids[index]), false));

            parts.extend(prev_parts);
            parts.push(group(leading_parts));
            parts.extend(next_parts);
        }
        Doc::Concat(parts)
    }

    /// A child after a `prettier-ignore` comment is printed from source.
    fn print_child(&self, id: NodeId, args: Args) -> Doc {
        let ast = self.ast;
        if !has_prettier_ignore(ast, id) {
            return self.print_node(id, args);
        }

        let node = &ast[id];
        let mut start = node.position.start;
        if node
            .family
            .prev
            .is_some_and(|prev| needs_to_borrow_next_opening_tag_start_marker(ast, prev))
        {
            start += opening_tag_start_marker(node).len();
        }
        let mut end = node.position.end;
        if node
            .family
            .next
            .is_some_and(|next| needs_to_borrow_prev_closing_tag_end_marker(ast, next))
        {
            end -= closing_tag_end_marker(ast, id).len();
        }

        docs![
            self.print_opening_tag_prefix(id),
            replace_text_end_of_line(self.source().get(start..end).unwrap_or_default()),
            self.print_closing_tag_suffix(id),
        ]
    }

    fn print_between_line(&self, prev: NodeId, next: NodeId) -> Separator {
        let ast = self.ast;
        let (prev_node, next_node) = (&ast[prev], &ast[next]);

        if prev_node.is_text() && next_node.is_text() {
            if !prev_node.annotation.is_trailing_whitespace_sensitive {
                return if prefer_hardline_as_leading_spaces(ast, next) {
                    Separator::Hard
                } else {
                    Separator::Soft
                };
            }
            if !prev_node.annotation.has_trailing_whitespace {
                return Separator::None;
            }
            return if prefer_hardline_as_leading_spaces(ast, next) {
                Separator::Hard
            } else {
                Separator::Line
            };
        }

        let touches = (needs_to_borrow_next_opening_tag_start_marker(ast, prev)
            && (has_prettier_ignore(ast, next)
                || next_node.family.first_child.is_some()
                || is_self_closing(next_node)
                || (matches!(next_node.kind, NodeKind::HtmlElement { .. }) && !next_node.attributes().is_empty())))
            || (matches!(next_node.kind, NodeKind::HtmlElement { .. })
                && is_self_closing(prev_node)
                && needs_to_borrow_prev_closing_tag_end_marker(ast, next));
        if touches {
            return Separator::None;
        }

        let nested_borrow = || {
            let Some(last) = prev_node.family.last_child else {
                return false;
            };
            let Some(last_last) = ast[last].family.last_child else {
                return false;
            };
            needs_to_borrow_parent_closing_tag_start_marker(ast, last)
                && needs_to_borrow_parent_closing_tag_start_marker(ast, last_last)
        };
        if !next_node.annotation.is_leading_whitespace_sensitive
            || prefer_hardline_as_leading_spaces(ast, next)
            || (needs_to_borrow_prev_closing_tag_end_marker(ast, next) && nested_borrow())
        {
            return Separator::Hard;
        }

        if next_node.annotation.has_leading_whitespace {
            Separator::Line
        } else {
            Separator::Soft
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Separator;
    use crate::ast::parse_ast;
    use crate::config::FormatOptions;
    use crate::preprocess::preprocess;
    use crate::printer::{PassThrough, Printer};

    fn separators(source: &str) -> Vec<Separator> {
        let options = FormatOptions::default();
        let mut ast = parse_ast(source).unwrap();
        preprocess(&mut ast, &options);
        let printer = Printer::new(&ast, &options, &PassThrough);
        let children = ast[ast.root()].children().to_vec();
        children
            .windows(2)
            .map(|pair| printer.print_between_line(pair[0], pair[1]))
            .collect()
    }

    #[test]
    fn test_block_siblings_are_separated_by_hard_lines() {
        assert_eq!(separators("<div></div><p></p>"), vec![Separator::Hard]);
    }

    #[test]
    fn test_inline_siblings() {
        assert_eq!(separators("<b>a</b> <i>b</i>"), vec![Separator::Line]);
        assert_eq!(separators("<b>a</b><i>b</i>"), vec![Separator::Soft]);
    }
}
