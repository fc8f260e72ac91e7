//! Annotation pass
//!
//! Runs after the tree is built and before printing. The family pass links
//! every node to its parent and siblings, then every node gets its CSS display
//! and white-space values, and finally the whitespace flags the printer reads
//! to decide whether a space may become a line break or disappear.
//!
//! Flags are computed from CSS values and trim markers only, never from other
//! flags, so the order nodes are visited in does not matter.

mod css;
mod family;
mod whitespace;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ast::Ast;
use crate::config::FormatOptions;

pub use css::{CssDisplay, CssWhitespace};
pub use whitespace::{
    is_trimming_inner_left, is_trimming_inner_right, is_trimming_outer_left,
    is_trimming_outer_right,
};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Annotation {
    pub css_display: CssDisplay,
    pub css_whitespace: CssWhitespace,
    pub is_indentation_sensitive: bool,
    pub is_whitespace_sensitive: bool,
    pub is_dangling_whitespace_sensitive: bool,
    pub is_leading_whitespace_sensitive: bool,
    pub is_trailing_whitespace_sensitive: bool,
    pub has_leading_whitespace: bool,
    pub has_trailing_whitespace: bool,
    pub has_dangling_whitespace: bool,
}

/// Fills family links and annotations of every node of `ast`.
pub fn preprocess(ast: &mut Ast, options: &FormatOptions) {
    family::link(ast);
    css::annotate(ast, options);
    whitespace::annotate(ast);
    log::debug!("annotated {} nodes", ast.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{parse_ast, NodeId};

    pub(super) fn annotated(source: &str) -> Ast {
        annotated_with(source, &FormatOptions::default())
    }

    pub(super) fn annotated_with(source: &str, options: &FormatOptions) -> Ast {
        let mut ast = parse_ast(source).unwrap();
        preprocess(&mut ast, options);
        ast
    }

    /// First node, in arena order, whose type and name match.
    pub(super) fn find(ast: &Ast, type_name: &str, name: Option<&str>) -> NodeId {
        ast.ids()
            .find(|id| ast[*id].type_name() == type_name && ast[*id].name().as_deref() == name)
            .unwrap()
    }

    #[test]
    fn test_every_node_is_annotated() {
        let ast = annotated("<p>a <b>{{ x }}</b></p>");
        let root = &ast[ast.root()];
        assert_eq!(root.annotation.css_display, CssDisplay::Block);

        let b = find(&ast, "HtmlElement", Some("b"));
        assert_eq!(ast[b].annotation.css_display, CssDisplay::Inline);
        assert!(ast[b].annotation.is_leading_whitespace_sensitive);
        assert!(ast[b].annotation.has_leading_whitespace);
    }
}
