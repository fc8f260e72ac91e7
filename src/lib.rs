//! Formatter for Liquid templates mixed with HTML.
//!
//! Formatting runs in four stages: [`parser`] reads the source into a flat
//! list of concrete nodes, [`ast`] nests them into a tree, [`preprocess`]
//! annotates every node with its display and whitespace rules, and
//! [`printer`] turns the tree into a [`doc::Doc`] rendered at the configured
//! width.
//!
//! ```
//! use liquidfmt::{format, FormatOptions};
//!
//! let output = format("<p>{{name}}</p>", &FormatOptions::default()).unwrap();
//! assert_eq!(output, "<p>{{ name }}</p>\n");
//! ```

pub mod ast;
pub mod config;
pub mod cst;
pub mod doc;
pub mod error;
pub mod parser;
pub mod preprocess;
pub mod printer;
pub mod result;

pub use ast::parse_ast;
pub use config::{FormatOptions, HtmlWhitespaceSensitivity};
pub use error::{Error, LocatedError, Result};
pub use printer::{EmbeddedFormatter, PassThrough};

/// Formats `source`. Bodies of `<script>`, `<style>` and raw tags are
/// re-indented but otherwise kept.
pub fn format(source: &str, options: &FormatOptions) -> Result<String> {
    format_with(source, options, &PassThrough)
}

/// Formats `source`, handing embedded bodies to `embed` first.
pub fn format_with(source: &str, options: &FormatOptions, embed: &dyn EmbeddedFormatter) -> Result<String> {
    let mut ast = parse_ast(source)?;
    preprocess::preprocess(&mut ast, options);
    let doc = printer::print_document(&ast, options, embed);
    let output = doc::render(&doc, options.print_width, options.tab_width);
    log::debug!("formatted {} bytes into {} bytes", source.len(), output.len());
    Ok(output)
}

/// Concrete nodes of `source`, before nesting.
pub fn parse_cst(source: &str) -> Result<Vec<cst::ConcreteNode>> {
    parser::parse(source)
}
