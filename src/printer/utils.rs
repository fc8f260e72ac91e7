//! Node predicates and text helpers shared by the printers.

use crate::ast::{Ast, Node, NodeId, NodeKind, TagMarkup};
use crate::cst::Trim;
use crate::doc::{if_break, Doc, GroupId};
use crate::preprocess::CssDisplay;

pub(super) fn has_line_break_in_range(source: &str, start: usize, end: usize) -> bool {
    source
        .get(start..)
        .and_then(|rest| rest.find('\n'))
        .is_some_and(|index| start + index < end)
}

pub(super) fn is_pre_like(node: &Node) -> bool {
    node.annotation.css_whitespace.is_pre_like()
}

/// Void and self-closing elements and comments end with their opening tag.
pub(super) fn has_no_close_marker(node: &Node) -> bool {
    matches!(
        node.kind,
        NodeKind::HtmlSelfClosingElement { .. }
            | NodeKind::HtmlVoidElement { .. }
            | NodeKind::HtmlComment { .. }
    )
}

pub(super) fn is_self_closing(node: &Node) -> bool {
    matches!(node.kind, NodeKind::HtmlSelfClosingElement { .. })
}

/// A node sitting directly in the attribute list of an element.
pub(super) fn is_attribute_node(ast: &Ast, id: NodeId) -> bool {
    ast.parent(id)
        .is_some_and(|parent| parent.is_html() && parent.attributes().contains(&id))
}

fn has_non_text_child(ast: &Ast, node: &Node) -> bool {
    node.children().iter().any(|child| !ast[*child].is_text())
}

pub(super) fn should_preserve_content(ast: &Ast, id: NodeId) -> bool {
    let node = &ast[id];
    is_pre_like(node) && has_non_text_child(ast, node)
}

fn starts_with_prettier_ignore(text: &str) -> bool {
    text.lines()
        .any(|line| line.trim_start().starts_with("prettier-ignore"))
}

pub(super) fn is_prettier_ignore(node: &Node) -> bool {
    match &node.kind {
        NodeKind::HtmlComment { body } => starts_with_prettier_ignore(body),
        NodeKind::LiquidTag(tag) if tag.name == "#" => match &tag.markup {
            TagMarkup::Raw(markup) => starts_with_prettier_ignore(markup),
            _ => false,
        },
        _ => false,
    }
}

pub(super) fn has_prettier_ignore(ast: &Ast, id: NodeId) -> bool {
    is_prettier_ignore(&ast[id]) || ast.prev(id).is_some_and(is_prettier_ignore)
}

/// Whether a blank line separates `id` from its next sibling.
pub(super) fn force_next_empty_line(ast: &Ast, id: NodeId) -> bool {
    let Some(next) = ast.next(id) else {
        return false;
    };
    let source = ast.source();
    let end = ast[id].position.end;
    let Some(first) = source.get(end..).and_then(|rest| rest.find('\n')) else {
        return false;
    };
    let first = end + first;
    source
        .get(first + 1..)
        .and_then(|rest| rest.find('\n'))
        .is_some_and(|second| first + 1 + second < next.position.start)
}

pub(super) fn force_break_children(node: &Node) -> bool {
    let NodeKind::HtmlElement { name, .. } = &node.kind else {
        return false;
    };
    let Some(name) = name.as_tag() else {
        return false;
    };
    !node.children().is_empty()
        && (matches!(name, "html" | "head" | "ul" | "ol" | "select")
            || (node.annotation.css_display.is_table()
                && node.annotation.css_display != CssDisplay::TableCell))
}

pub(super) fn force_break_content(ast: &Ast, id: NodeId) -> bool {
    let node = &ast[id];
    if force_break_children(node) {
        return true;
    }
    if let NodeKind::HtmlElement { name, .. } = &node.kind {
        if let Some(name) = name.as_tag() {
            if !node.children().is_empty()
                && (matches!(name, "body" | "script" | "style")
                    || node
                        .children()
                        .iter()
                        .any(|child| has_non_text_child(ast, &ast[*child])))
            {
                return true;
            }
        }
    }
    match (node.family.first_child, node.family.last_child) {
        (Some(first), Some(last)) if first == last => {
            !ast[first].is_text()
                && has_leading_line_break(ast, first)
                && (!ast[last].annotation.is_trailing_whitespace_sensitive
                    || has_trailing_line_break(ast, last))
        }
        _ => false,
    }
}

fn has_surrounding_line_break(ast: &Ast, id: NodeId) -> bool {
    has_leading_line_break(ast, id) && has_trailing_line_break(ast, id)
}

fn has_leading_line_break(ast: &Ast, id: NodeId) -> bool {
    let node = &ast[id];
    let Some(parent) = ast.parent(id) else {
        return false;
    };
    let start = match ast.prev(id) {
        Some(prev) => prev.position.end,
        None => parent
            .block_start_position
            .map_or(parent.position.start, |block_start| block_start.end),
    };
    node.annotation.has_leading_whitespace
        && has_line_break_in_range(ast.source(), start, node.position.start)
}

fn has_trailing_line_break(ast: &Ast, id: NodeId) -> bool {
    let node = &ast[id];
    let Some(parent) = ast.parent(id) else {
        return false;
    };
    let end = match ast.next(id) {
        Some(next) => next.position.start,
        None => parent
            .block_end_position
            .map_or(parent.position.end, |block_end| block_end.start),
    };
    node.annotation.has_trailing_whitespace
        && has_line_break_in_range(ast.source(), node.position.end, end)
}

fn prefer_hardline_as_surrounding_spaces(ast: &Ast, id: NodeId) -> bool {
    let node = &ast[id];
    match &node.kind {
        NodeKind::HtmlComment { .. } => true,
        NodeKind::HtmlElement { name, .. } => matches!(name.as_tag(), Some("script" | "select")),
        NodeKind::LiquidTag(_) => {
            if ast.prev(id).is_some_and(Node::is_text) || ast.next(id).is_some_and(Node::is_text) {
                return false;
            }
            !node.children().is_empty()
        }
        _ => false,
    }
}

pub(super) fn prefer_hardline_as_leading_spaces(ast: &Ast, id: NodeId) -> bool {
    let node = &ast[id];
    prefer_hardline_as_surrounding_spaces(ast, id)
        || (node.is_liquid() && ast.prev(id).is_some_and(Node::is_liquid))
        || node
            .family
            .prev
            .is_some_and(|prev| prefer_hardline_as_trailing_spaces(ast, prev))
        || has_surrounding_line_break(ast, id)
}

pub(super) fn prefer_hardline_as_trailing_spaces(ast: &Ast, id: NodeId) -> bool {
    let node = &ast[id];
    prefer_hardline_as_surrounding_spaces(ast, id)
        || (node.is_liquid()
            && ast
                .next(id)
                .is_some_and(|next| next.is_liquid() || next.is_html()))
        || matches!(&node.kind, NodeKind::HtmlElement { name, .. } if name.is("br"))
        || has_surrounding_line_break(ast, id)
}

pub(super) fn has_meaningful_lack_of_leading_whitespace(node: &Node) -> bool {
    node.annotation.is_leading_whitespace_sensitive && !node.annotation.has_leading_whitespace
}

pub(super) fn has_meaningful_lack_of_trailing_whitespace(node: &Node) -> bool {
    node.annotation.is_trailing_whitespace_sensitive && !node.annotation.has_trailing_whitespace
}

pub(super) fn has_meaningful_lack_of_dangling_whitespace(node: &Node) -> bool {
    node.annotation.is_dangling_whitespace_sensitive && !node.annotation.has_dangling_whitespace
}

pub(super) fn last_descendant(ast: &Ast, id: NodeId) -> NodeId {
    match ast[id].family.last_child {
        Some(last) => last_descendant(ast, last),
        None => id,
    }
}

/// Trim marker that becomes `-` when the group `group_id` breaks and the
/// whitespace next to it must not grow. A marker the author wrote stays.
pub(super) fn whitespace_trim(current: Trim, needs_stripping_on_break: bool, group_id: Option<GroupId>) -> Doc {
    let on_break = if needs_stripping_on_break {
        Trim::Strip
    } else {
        current
    };
    if_break(on_break.as_str(), current.as_str(), group_id)
}

/// Lines of a body without its leading blank lines and trailing whitespace.
pub(super) fn body_lines(body: &str) -> Vec<String> {
    let body = body.trim_start_matches([' ', '\t']);
    let body = body.trim_start_matches(['\r', '\n']);
    let body = body.trim_end();
    body.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

pub(super) fn markup_lines(markup: &str) -> Vec<&str> {
    markup.trim().split('\n').collect()
}

/// Strips the smallest indentation of the non-blank lines from every line,
/// ignoring the first line when `skip_first` is set.
pub(super) fn reindent(lines: Vec<String>, skip_first: bool) -> Vec<String> {
    let skip = usize::from(skip_first);
    let min_indent = lines
        .iter()
        .skip(skip)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .min();
    let Some(min_indent) = min_indent else {
        return lines;
    };

    lines
        .into_iter()
        .map(|line| {
            let indent: usize = line
                .chars()
                .take(min_indent)
                .take_while(|c| c.is_whitespace())
                .map(char::len_utf8)
                .sum();
            let stripped = if line[..indent].chars().count() == min_indent {
                &line[indent..]
            } else {
                line.as_str()
            };
            stripped.trim_end().to_string()
        })
        .collect()
}

pub(super) fn originally_had_line_breaks(ast: &Ast, id: NodeId) -> bool {
    let position = ast[id].position;
    has_line_break_in_range(ast.source(), position.start, position.end)
}

fn is_multiline_liquid_tag(node: &Node) -> bool {
    matches!(node.kind, NodeKind::LiquidTag(_)) && !node.children().is_empty()
}

/// A tag whose body, or one of whose branches, holds a tag with children.
pub(super) fn is_deeply_nested(ast: &Ast, id: NodeId) -> bool {
    let node = &ast[id];
    if node.is_branched_tag() {
        return node
            .children()
            .iter()
            .any(|branch| is_deeply_nested(ast, *branch));
    }
    node.children()
        .iter()
        .any(|child| is_multiline_liquid_tag(&ast[*child]))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ast::parse_ast;
    use crate::config::FormatOptions;
    use crate::preprocess::preprocess;

    fn annotated(source: &str) -> Ast {
        let mut ast = parse_ast(source).unwrap();
        preprocess(&mut ast, &FormatOptions::default());
        ast
    }

    fn first_child(ast: &Ast) -> NodeId {
        ast[ast.root()].children()[0]
    }

    #[test]
    fn test_line_break_in_range() {
        assert!(has_line_break_in_range("a\nb", 0, 3));
        assert!(!has_line_break_in_range("a\nb", 2, 3));
        assert!(!has_line_break_in_range("a\nb", 0, 1));
        assert!(!has_line_break_in_range("ab", 5, 9));
    }

    #[test]
    fn test_body_lines() {
        assert_eq!(body_lines("\n\n  a\n    b\n  \n"), vec!["  a", "    b"]);
        assert_eq!(body_lines("  x\r\n  y  "), vec!["x", "  y"]);
        assert_eq!(body_lines("   "), vec![""]);
    }

    #[test]
    fn test_markup_lines() {
        assert_eq!(markup_lines("  a\n  b  "), vec!["a", "  b"]);
    }

    #[test]
    fn test_reindent() {
        let lines = vec!["  a".to_string(), "    b".to_string(), "".to_string(), "  c  ".to_string()];
        assert_eq!(reindent(lines, false), vec!["a", "  b", "", "c"]);

        let lines = vec!["first".to_string(), "      x".to_string(), "    y".to_string()];
        assert_eq!(reindent(lines, true), vec!["first", "  x", "y"]);

        let lines = vec!["only".to_string()];
        assert_eq!(reindent(lines, true), vec!["only"]);
    }

    #[test]
    fn test_prettier_ignore() {
        let ast = annotated("<!-- prettier-ignore -->\n<div   a >x</div>");
        let children = ast[ast.root()].children().to_vec();
        assert!(is_prettier_ignore(&ast[children[0]]));
        assert!(has_prettier_ignore(&ast, children[1]));

        let ast = annotated("{% # prettier-ignore %}\n{{ a }}");
        let children = ast[ast.root()].children().to_vec();
        assert!(has_prettier_ignore(&ast, children[1]));
    }

    #[test]
    fn test_force_next_empty_line() {
        let ast = annotated("<p>a</p>\n\n<p>b</p>\n<p>c</p>");
        let children = ast[ast.root()].children().to_vec();
        assert!(force_next_empty_line(&ast, children[0]));
        assert!(!force_next_empty_line(&ast, children[1]));
        assert!(!force_next_empty_line(&ast, children[2]));
    }

    #[test]
    fn test_force_break() {
        let ast = annotated("<ul><li>a</li></ul>");
        assert!(force_break_children(&ast[first_child(&ast)]));

        let ast = annotated("<table><tr><td>a</td></tr></table>");
        let table = first_child(&ast);
        let tr = ast[table].children()[0];
        let td = ast[tr].children()[0];
        assert!(force_break_children(&ast[tr]));
        assert!(!force_break_children(&ast[td]));

        let ast = annotated("<div><p><b>a</b></p></div>");
        assert!(force_break_content(&ast, first_child(&ast)));

        let ast = annotated("<div><p>a</p></div>");
        assert!(!force_break_content(&ast, first_child(&ast)));

        let ast = annotated("<div>\n  <p>a</p>\n</div>");
        assert!(force_break_content(&ast, first_child(&ast)));
    }

    #[test]
    fn test_is_deeply_nested() {
        let ast = annotated("{% if a %}{% if b %}x{% endif %}{% endif %}");
        assert!(is_deeply_nested(&ast, first_child(&ast)));

        let ast = annotated("{% if a %}{{ b }}{% endif %}");
        assert!(!is_deeply_nested(&ast, first_child(&ast)));

        let ast = annotated("{% capture a %}{% assign x = 1 %}{% endcapture %}");
        assert!(!is_deeply_nested(&ast, first_child(&ast)));

        // An empty `for` still holds its default branch.
        let ast = annotated("{% capture a %}{% for x in y %}{% endfor %}{% endcapture %}");
        assert!(is_deeply_nested(&ast, first_child(&ast)));
    }

    #[test]
    fn test_attribute_node() {
        let ast = annotated("<div {% if a %}hidden{% endif %} class=\"x\"></div>");
        let div = first_child(&ast);
        let attributes = ast[div].attributes().to_vec();
        assert!(is_attribute_node(&ast, attributes[0]));
        assert!(is_attribute_node(&ast, attributes[1]));
        assert!(!is_attribute_node(&ast, div));
    }

    #[test]
    fn test_last_descendant() {
        let ast = annotated("<div><p>a<b>c</b></p></div>");
        let div = first_child(&ast);
        let last = last_descendant(&ast, div);
        assert!(matches!(&ast[last].kind, NodeKind::TextNode { value } if value == "c"));
    }
}
