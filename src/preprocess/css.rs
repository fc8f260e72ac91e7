use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ast::{Ast, NodeId, NodeKind};
use crate::config::{FormatOptions, HtmlWhitespaceSensitivity};

/// CSS `display` of a node as the browser would lay it out.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CssDisplay {
    Block,
    #[default]
    Inline,
    InlineBlock,
    ListItem,
    None,
    Ruby,
    RubyText,
    Table,
    TableCaption,
    TableCell,
    TableColumn,
    TableColumnGroup,
    TableFooterGroup,
    TableHeaderGroup,
    TableRow,
    TableRowGroup,
    /// A value given by a `<!-- display: x -->` comment that has no variant.
    Other(String),
}

impl CssDisplay {
    pub fn parse(value: &str) -> Self {
        match value {
            "block" => CssDisplay::Block,
            "inline" => CssDisplay::Inline,
            "inline-block" => CssDisplay::InlineBlock,
            "list-item" => CssDisplay::ListItem,
            "none" => CssDisplay::None,
            "ruby" => CssDisplay::Ruby,
            "ruby-text" => CssDisplay::RubyText,
            "table" => CssDisplay::Table,
            "table-caption" => CssDisplay::TableCaption,
            "table-cell" => CssDisplay::TableCell,
            "table-column" => CssDisplay::TableColumn,
            "table-column-group" => CssDisplay::TableColumnGroup,
            "table-footer-group" => CssDisplay::TableFooterGroup,
            "table-header-group" => CssDisplay::TableHeaderGroup,
            "table-row" => CssDisplay::TableRow,
            "table-row-group" => CssDisplay::TableRowGroup,
            other => CssDisplay::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CssDisplay::Block => "block",
            CssDisplay::Inline => "inline",
            CssDisplay::InlineBlock => "inline-block",
            CssDisplay::ListItem => "list-item",
            CssDisplay::None => "none",
            CssDisplay::Ruby => "ruby",
            CssDisplay::RubyText => "ruby-text",
            CssDisplay::Table => "table",
            CssDisplay::TableCaption => "table-caption",
            CssDisplay::TableCell => "table-cell",
            CssDisplay::TableColumn => "table-column",
            CssDisplay::TableColumnGroup => "table-column-group",
            CssDisplay::TableFooterGroup => "table-footer-group",
            CssDisplay::TableHeaderGroup => "table-header-group",
            CssDisplay::TableRow => "table-row",
            CssDisplay::TableRowGroup => "table-row-group",
            CssDisplay::Other(value) => value,
        }
    }

    /// `table` and every `table-*` value.
    pub fn is_table(&self) -> bool {
        self.as_str().starts_with("table")
    }

    pub fn is_block_like(&self) -> bool {
        matches!(self, CssDisplay::Block | CssDisplay::ListItem) || self.is_table()
    }

    pub fn is_outer_whitespace_sensitive(&self) -> bool {
        !self.is_block_like()
    }

    /// Whitespace just inside the node, and whitespace of an empty node.
    pub fn is_inner_whitespace_sensitive(&self) -> bool {
        !self.is_block_like() && *self != CssDisplay::InlineBlock
    }
}

impl fmt::Display for CssDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CSS `white-space` of a node.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CssWhitespace {
    #[default]
    Normal,
    Pre,
    PreWrap,
    NoWrap,
    Initial,
}

impl CssWhitespace {
    pub fn is_pre_like(self) -> bool {
        matches!(self, CssWhitespace::Pre | CssWhitespace::PreWrap)
    }
}

/// Default `display` of HTML elements, as user agents style them.
fn html_display(name: &str) -> Option<CssDisplay> {
    let display = match name {
        // hidden
        "area" | "base" | "basefont" | "datalist" | "head" | "link" | "meta" | "noembed"
        | "noframes" | "rp" | "style" | "title" => CssDisplay::None,
        // template content is printed like inline content
        "template" => CssDisplay::Inline,
        "html" | "body" | "address" | "blockquote" | "center" | "div" | "figure"
        | "figcaption" | "footer" | "form" | "header" | "hr" | "legend" | "listing" | "main"
        | "p" | "plaintext" | "pre" | "xmp" | "article" | "aside" | "h1" | "h2" | "h3" | "h4"
        | "h5" | "h6" | "hgroup" | "nav" | "section" | "dir" | "dd" | "dl" | "dt" | "menu"
        | "ol" | "ul" | "fieldset" | "details" | "summary" | "dialog" | "option" | "optgroup"
        | "source" | "track" | "script" | "param" => CssDisplay::Block,
        "li" => CssDisplay::ListItem,
        "table" => CssDisplay::Table,
        "caption" => CssDisplay::TableCaption,
        "colgroup" => CssDisplay::TableColumnGroup,
        "col" => CssDisplay::TableColumn,
        "thead" => CssDisplay::TableHeaderGroup,
        "tbody" => CssDisplay::TableRowGroup,
        "tfoot" => CssDisplay::TableFooterGroup,
        "tr" => CssDisplay::TableRow,
        "td" | "th" => CssDisplay::TableCell,
        "button" | "meter" | "progress" | "object" | "video" | "audio" | "select" | "input" => {
            CssDisplay::InlineBlock
        }
        "ruby" => CssDisplay::Ruby,
        "rt" => CssDisplay::RubyText,
        _ => return None,
    };
    Some(display)
}

/// Liquid tags are blocks, except the ones that only ever print a value.
fn liquid_display(name: &str) -> CssDisplay {
    match name {
        "echo" | "cycle" | "increment" | "decrement" => CssDisplay::Inline,
        _ => CssDisplay::Block,
    }
}

fn html_whitespace(name: &str) -> CssWhitespace {
    match name {
        "pre" | "listing" | "xmp" => CssWhitespace::Pre,
        "textarea" | "plaintext" => CssWhitespace::PreWrap,
        "nobr" => CssWhitespace::NoWrap,
        "table" => CssWhitespace::Initial,
        _ => CssWhitespace::Normal,
    }
}

/// `white-space` from the HTML table only. Raw bodies do not count.
pub(super) fn html_element_whitespace(ast: &Ast, id: NodeId) -> CssWhitespace {
    let node = &ast[id];
    match node.html_name() {
        Some(name) if is_element(&node.kind) => html_whitespace(&name.to_ascii_lowercase()),
        _ => CssWhitespace::Normal,
    }
}

fn is_element(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::HtmlElement { .. }
            | NodeKind::HtmlVoidElement { .. }
            | NodeKind::HtmlSelfClosingElement { .. }
            | NodeKind::HtmlRawNode { .. }
    )
}

/// `display` named by a `<!-- display: x -->` comment.
fn display_override(body: &str) -> Option<CssDisplay> {
    let value = body.trim().strip_prefix("display:")?.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_lowercase()) {
        return None;
    }
    Some(CssDisplay::parse(value))
}

fn css_display(ast: &Ast, id: NodeId, options: &FormatOptions) -> CssDisplay {
    let node = &ast[id];
    if let Some(NodeKind::HtmlComment { body }) = ast.prev(id).map(|prev| &prev.kind) {
        if let Some(display) = display_override(body) {
            return display;
        }
    }

    let sensitivity = options.html_whitespace_sensitivity;
    match &node.kind {
        NodeKind::HtmlElement { .. }
        | NodeKind::HtmlVoidElement { .. }
        | NodeKind::HtmlSelfClosingElement { .. }
        | NodeKind::HtmlRawNode { .. } => match sensitivity {
            HtmlWhitespaceSensitivity::Strict => CssDisplay::Inline,
            HtmlWhitespaceSensitivity::Ignore => CssDisplay::Block,
            HtmlWhitespaceSensitivity::Css => node
                .html_name()
                .and_then(|name| html_display(&name.to_ascii_lowercase()))
                .unwrap_or_default(),
        },
        NodeKind::LiquidTag(_) | NodeKind::LiquidRawTag(_) => match sensitivity {
            HtmlWhitespaceSensitivity::Strict => CssDisplay::Inline,
            HtmlWhitespaceSensitivity::Ignore => CssDisplay::Block,
            HtmlWhitespaceSensitivity::Css => {
                liquid_display(node.name().as_deref().unwrap_or_default())
            }
        },
        NodeKind::TextNode { .. }
        | NodeKind::LiquidBranch(_)
        | NodeKind::LiquidDrop { .. }
        | NodeKind::Attribute(_) => CssDisplay::Inline,
        NodeKind::HtmlDoctype { .. }
        | NodeKind::HtmlComment { .. }
        | NodeKind::Document
        | NodeKind::YamlFrontmatter { .. } => CssDisplay::Block,
    }
}

fn css_whitespace(ast: &Ast, id: NodeId) -> CssWhitespace {
    match &ast[id].kind {
        NodeKind::YamlFrontmatter { .. } | NodeKind::LiquidRawTag(_) => CssWhitespace::Pre,
        _ => html_element_whitespace(ast, id),
    }
}

pub(super) fn annotate(ast: &mut Ast, options: &FormatOptions) {
    let values: Vec<_> = ast
        .ids()
        .map(|id| (id, css_display(ast, id, options), css_whitespace(ast, id)))
        .collect();
    for (id, display, whitespace) in values {
        let annotation = &mut ast[id].annotation;
        annotation.css_display = display;
        annotation.css_whitespace = whitespace;
    }
}
