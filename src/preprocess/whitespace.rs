use crate::ast::{Ast, Node, NodeId, NodeKind};

use super::css::html_element_whitespace;

/// Whether the source character at `index` is whitespace. Out of range is not.
fn is_whitespace_at(source: &str, index: Option<usize>) -> bool {
    index
        .and_then(|index| source.get(index..))
        .and_then(|rest| rest.chars().next())
        .is_some_and(char::is_whitespace)
}

fn is_script_like(node: &Node) -> bool {
    matches!(node.kind, NodeKind::HtmlRawNode { .. })
}

fn is_pre_like(node: &Node) -> bool {
    node.annotation.css_whitespace.is_pre_like()
}

/// `{%-`, `{{-`: strips whitespace before the node.
pub fn is_trimming_outer_left(node: &Node) -> bool {
    match &node.kind {
        NodeKind::LiquidTag(tag) => tag.whitespace_start.is_strip(),
        NodeKind::LiquidRawTag(tag) => tag.whitespace_start.is_strip(),
        NodeKind::LiquidBranch(branch) => branch.whitespace_start.is_strip(),
        NodeKind::LiquidDrop {
            whitespace_start, ..
        } => whitespace_start.is_strip(),
        _ => false,
    }
}

/// `-%}` of the closing tag, or of the tag itself when it has none.
pub fn is_trimming_outer_right(node: &Node) -> bool {
    match &node.kind {
        NodeKind::LiquidTag(tag) => tag
            .delimiter_whitespace_end
            .unwrap_or(tag.whitespace_end)
            .is_strip(),
        NodeKind::LiquidRawTag(tag) => tag.delimiter_whitespace_end.is_strip(),
        NodeKind::LiquidDrop { whitespace_end, .. } => whitespace_end.is_strip(),
        _ => false,
    }
}

/// `-%}` of an opening tag: strips whitespace before the first child.
pub fn is_trimming_inner_left(ast: &Ast, id: NodeId) -> bool {
    let node = &ast[id];
    match &node.kind {
        NodeKind::LiquidTag(tag) => {
            tag.delimiter_whitespace_end.is_some() && tag.whitespace_end.is_strip()
        }
        NodeKind::LiquidRawTag(tag) => tag.whitespace_end.is_strip(),
        NodeKind::LiquidBranch(branch) => match node.family.parent {
            Some(parent) if ast[parent].as_liquid_tag().is_some() => {
                if node.family.prev.is_none() {
                    is_trimming_inner_left(ast, parent)
                } else {
                    branch.whitespace_end.is_strip()
                }
            }
            _ => false,
        },
        _ => false,
    }
}

/// `{%-` of a closing tag: strips whitespace after the last child.
pub fn is_trimming_inner_right(ast: &Ast, id: NodeId) -> bool {
    let node = &ast[id];
    match &node.kind {
        NodeKind::LiquidTag(tag) => tag.delimiter_whitespace_start.is_some_and(|t| t.is_strip()),
        NodeKind::LiquidRawTag(tag) => tag.delimiter_whitespace_start.is_strip(),
        NodeKind::LiquidBranch(_) => match node.family.parent {
            Some(parent) if ast[parent].as_liquid_tag().is_some() => match node.family.next {
                None => is_trimming_inner_right(ast, parent),
                Some(next) => is_trimming_outer_left(&ast[next]),
            },
            _ => false,
        },
        _ => false,
    }
}

fn is_leading_whitespace_sensitive(ast: &Ast, id: NodeId) -> bool {
    let node = &ast[id];
    let prev = ast.prev(id);
    if is_trimming_outer_left(node) {
        return false;
    }
    if prev.is_some_and(is_trimming_outer_right) {
        return false;
    }
    let Some(parent_id) = node.family.parent else {
        return false;
    };
    let parent = &ast[parent_id];
    if parent.annotation.css_display == super::CssDisplay::None {
        return false;
    }
    if is_pre_like(parent) {
        return true;
    }
    if is_script_like(node) {
        return false;
    }
    if prev.is_none()
        && (matches!(parent.kind, NodeKind::Document)
            || is_pre_like(node)
            || is_script_like(parent)
            || !parent.annotation.css_display.is_inner_whitespace_sensitive()
            || is_trimming_inner_left(ast, parent_id))
    {
        return false;
    }
    if prev.is_some_and(|prev| !prev.annotation.css_display.is_outer_whitespace_sensitive()) {
        return false;
    }
    node.annotation.css_display.is_outer_whitespace_sensitive()
}

fn is_trailing_whitespace_sensitive(ast: &Ast, id: NodeId) -> bool {
    let node = &ast[id];
    let next = ast.next(id);
    if is_trimming_outer_right(node) {
        return false;
    }
    if next.is_some_and(is_trimming_outer_left) {
        return false;
    }
    let Some(parent_id) = node.family.parent else {
        return false;
    };
    let parent = &ast[parent_id];
    if parent.annotation.css_display == super::CssDisplay::None {
        return false;
    }
    if is_pre_like(parent) {
        return true;
    }
    if is_script_like(node) {
        return false;
    }
    if node.is_html_named("br") {
        return false;
    }
    if next.is_none()
        && (matches!(parent.kind, NodeKind::Document)
            || is_pre_like(node)
            || is_script_like(parent)
            || !parent.annotation.css_display.is_inner_whitespace_sensitive()
            || is_trimming_inner_right(ast, parent_id)
            || node.is_attribute())
    {
        return false;
    }
    if next.is_some_and(|next| !next.annotation.css_display.is_outer_whitespace_sensitive()) {
        return false;
    }
    node.annotation.css_display.is_outer_whitespace_sensitive()
}

fn is_dangling_whitespace_sensitive(ast: &Ast, id: NodeId) -> bool {
    let node = &ast[id];
    node.annotation.css_display.is_inner_whitespace_sensitive()
        && !is_script_like(node)
        && !is_trimming_inner_left(ast, id)
        && !is_trimming_inner_right(ast, id)
}

fn has_dangling_whitespace(ast: &Ast, id: NodeId) -> bool {
    let node = &ast[id];
    let Some(children) = &node.children else {
        return false;
    };
    if matches!(node.kind, NodeKind::Document) {
        return children.is_empty() && !ast.source().is_empty();
    }
    if node.is_branched_tag() && children.len() == 1 {
        return has_dangling_whitespace(ast, children[0]);
    }
    if !children.is_empty() {
        return false;
    }
    let inside = node.block_start_position.map(|position| position.end);
    is_whitespace_at(ast.source(), inside)
}

fn has_leading_whitespace(ast: &Ast, id: NodeId) -> bool {
    let node = &ast[id];
    if matches!(node.kind, NodeKind::LiquidBranch(_)) && node.family.prev.is_none() {
        return match node.family.first_child {
            Some(child) => has_leading_whitespace(ast, child),
            None => has_dangling_whitespace(ast, id),
        };
    }
    is_whitespace_at(ast.source(), node.position.start.checked_sub(1))
}

fn has_trailing_whitespace(ast: &Ast, id: NodeId) -> bool {
    let node = &ast[id];
    if matches!(node.kind, NodeKind::LiquidBranch(_)) {
        return match node.family.last_child {
            Some(child) => has_trailing_whitespace(ast, child),
            None => has_dangling_whitespace(ast, id),
        };
    }
    is_whitespace_at(ast.source(), Some(node.position.end))
}

pub(super) fn annotate(ast: &mut Ast) {
    let flags: Vec<_> = ast
        .ids()
        .map(|id| {
            let node = &ast[id];
            let indentation_sensitive = html_element_whitespace(ast, id).is_pre_like();
            let leading = is_leading_whitespace_sensitive(ast, id)
                && node
                    .family
                    .prev
                    .is_none_or(|prev| is_trailing_whitespace_sensitive(ast, prev));
            let trailing = is_trailing_whitespace_sensitive(ast, id)
                && node
                    .family
                    .next
                    .is_none_or(|next| is_leading_whitespace_sensitive(ast, next));
            (
                id,
                [
                    indentation_sensitive,
                    is_dangling_whitespace_sensitive(ast, id),
                    leading,
                    trailing,
                    has_leading_whitespace(ast, id),
                    has_trailing_whitespace(ast, id),
                    has_dangling_whitespace(ast, id),
                ],
            )
        })
        .collect();

    for (id, [indentation, dangling, leading, trailing, has_leading, has_trailing, has_dangling]) in
        flags
    {
        let annotation = &mut ast[id].annotation;
        annotation.is_indentation_sensitive = indentation;
        annotation.is_whitespace_sensitive = indentation;
        annotation.is_dangling_whitespace_sensitive = dangling;
        annotation.is_leading_whitespace_sensitive = leading;
        annotation.is_trailing_whitespace_sensitive = trailing;
        annotation.has_leading_whitespace = has_leading;
        annotation.has_trailing_whitespace = has_trailing;
        annotation.has_dangling_whitespace = has_dangling;
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{annotated, find};
    use super::*;

    #[test]
    fn test_inline_siblings_are_sensitive() {
        let ast = annotated("<p>Hello <b>world</b>!</p>");
        let b = find(&ast, "HtmlElement", Some("b"));
        let annotation = &ast[b].annotation;
        assert!(annotation.is_leading_whitespace_sensitive);
        assert!(annotation.is_trailing_whitespace_sensitive);
        assert!(annotation.has_leading_whitespace);
        assert!(!annotation.has_trailing_whitespace);
    }

    #[test]
    fn test_block_children_are_not_sensitive() {
        let ast = annotated("<div> <div>a</div> </div>");
        let inner = ast[ast[ast.root()].children()[0]].children()[0];
        let annotation = &ast[inner].annotation;
        assert!(!annotation.is_leading_whitespace_sensitive);
        assert!(!annotation.is_trailing_whitespace_sensitive);
        assert!(annotation.has_leading_whitespace);
        assert!(annotation.has_trailing_whitespace);
    }

    #[test]
    fn test_first_child_of_document_is_not_sensitive() {
        let ast = annotated("hello <b>x</b>");
        let text = ast[ast.root()].children()[0];
        assert!(!ast[text].annotation.is_leading_whitespace_sensitive);
        assert!(ast[text].annotation.is_trailing_whitespace_sensitive);
    }

    #[test]
    fn test_dangling_whitespace() {
        let ast = annotated("<div>   </div><span> </span><b></b>");
        let div = find(&ast, "HtmlElement", Some("div"));
        assert!(ast[div].annotation.has_dangling_whitespace);
        assert!(!ast[div].annotation.is_dangling_whitespace_sensitive);

        let span = find(&ast, "HtmlElement", Some("span"));
        assert!(ast[span].annotation.has_dangling_whitespace);
        assert!(ast[span].annotation.is_dangling_whitespace_sensitive);

        let b = find(&ast, "HtmlElement", Some("b"));
        assert!(!ast[b].annotation.has_dangling_whitespace);
    }

    #[test]
    fn test_empty_document_with_whitespace() {
        let ast = annotated("  \n");
        assert!(ast[ast.root()].annotation.has_dangling_whitespace);
        let ast = annotated("");
        assert!(!ast[ast.root()].annotation.has_dangling_whitespace);
    }

    #[test]
    fn test_trim_markers_remove_sensitivity() {
        let ast = annotated("<p>a {{- x -}} b</p>");
        let drop = find(&ast, "LiquidDrop", None);
        assert!(!ast[drop].annotation.is_leading_whitespace_sensitive);
        assert!(!ast[drop].annotation.is_trailing_whitespace_sensitive);

        let texts: Vec<_> = ast.ids().filter(|id| ast[*id].is_text()).collect();
        assert!(!ast[texts[0]].annotation.is_trailing_whitespace_sensitive);
        assert!(!ast[texts[1]].annotation.is_leading_whitespace_sensitive);
    }

    #[test]
    fn test_trimming_sides_of_block_tags() {
        let ast = annotated("{%- if a -%}x{%- else %}y{% endif -%}");
        let tag = find(&ast, "LiquidTag", Some("if"));
        assert!(is_trimming_outer_left(&ast[tag]));
        assert!(is_trimming_outer_right(&ast[tag]));
        assert!(is_trimming_inner_left(&ast, tag));
        assert!(!is_trimming_inner_right(&ast, tag));

        let branches = ast[tag].children().to_vec();
        assert!(is_trimming_inner_left(&ast, branches[0]));
        assert!(is_trimming_inner_right(&ast, branches[0]));
        assert!(!is_trimming_inner_left(&ast, branches[1]));
        assert!(!is_trimming_inner_right(&ast, branches[1]));
        assert!(!is_trimming_outer_right(&ast[branches[0]]));
    }

    #[test]
    fn test_inline_tag_has_no_inner_sides() {
        let ast = annotated("{% assign x = 1 -%}");
        let tag = find(&ast, "LiquidTag", Some("assign"));
        assert!(!is_trimming_inner_left(&ast, tag));
        assert!(is_trimming_outer_right(&ast[tag]));
    }

    #[test]
    fn test_branch_whitespace_defers_to_children() {
        let ast = annotated("<span>{% if a %} x {% endif %}</span>");
        let tag = find(&ast, "LiquidTag", Some("if"));
        let branch = ast[tag].children()[0];
        assert!(ast[branch].annotation.has_leading_whitespace);
        assert!(ast[branch].annotation.has_trailing_whitespace);
    }

    #[test]
    fn test_br_is_never_trailing_sensitive() {
        let ast = annotated("<p>a<br>b</p>");
        let br = find(&ast, "HtmlVoidElement", Some("br"));
        assert!(ast[br].annotation.is_leading_whitespace_sensitive);
        assert!(!ast[br].annotation.is_trailing_whitespace_sensitive);
    }

    #[test]
    fn test_pre_is_indentation_sensitive() {
        let ast = annotated("<pre>\n  a\n</pre>");
        let pre = find(&ast, "HtmlElement", Some("pre"));
        assert!(ast[pre].annotation.is_indentation_sensitive);
        let text = ast[pre].children()[0];
        assert!(ast[text].annotation.is_leading_whitespace_sensitive);
    }

    #[test]
    fn test_last_attribute_is_not_trailing_sensitive() {
        let ast = annotated("<a href=x class=y></a>");
        let a = find(&ast, "HtmlElement", Some("a"));
        let attributes = ast[a].attributes();
        assert!(!ast[attributes[1]].annotation.is_trailing_whitespace_sensitive);
    }
}
