mod common;
mod expression;
mod html;
mod liquid;
mod markup;
mod statement;
mod text;

use nom::combinator::{cut, opt};
use nom::Parser;
use nom_language::error::{VerboseError, VerboseErrorKind};

use crate::cst::*;
use crate::error::{Error, Result};
use crate::result::ParseResult;

use self::common::sp0;
use self::html::html_node;
use self::liquid::liquid_node;
use self::text::{text_node, yaml_frontmatter};

pub use self::html::{RAW_ELEMENTS, VOID_ELEMENTS};
pub use self::liquid::{BLOCK_TAGS, RAW_TAGS};
pub use self::statement::parse_statements;

/// Parses a whole template into its flat list of concrete nodes.
pub fn parse(source: &str) -> Result<Vec<ConcreteNode>> {
    let (_, nodes) = document(Span::new_extra(source, 0)).map_err(|e| to_error(source, 0, e))?;
    log::debug!("parsed {} concrete nodes", nodes.len());
    Ok(nodes)
}

fn document(input: Span) -> ParseResult<Span, Vec<ConcreteNode>> {
    let (mut input, frontmatter) = opt(yaml_frontmatter).parse(input)?;
    let mut nodes: Vec<_> = frontmatter.into_iter().collect();
    loop {
        let (rest, _) = sp0(input)?;
        if rest.fragment().is_empty() {
            return Ok((rest, nodes));
        }
        let (rest, node) = cut(node).parse(rest)?;
        nodes.push(node);
        input = rest;
    }
}

fn node(input: Span) -> ParseResult<Span, ConcreteNode> {
    let fragment = *input.fragment();
    if fragment.starts_with("{{") || fragment.starts_with("{%") {
        liquid_node(input)
    } else if fragment.starts_with('<') {
        html_node(input)
    } else {
        text_node(input)
    }
}

pub(crate) fn to_error(source: &str, base: usize, err: nom::Err<VerboseError<Span>>) -> Error {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => grammar_error(source, base, e),
        nom::Err::Incomplete(_) => Error::grammar(
            "Unexpected end of input",
            source,
            source.len(),
            source.len(),
        ),
    }
}

/// Converts a nom error into a located grammar error. The reported offset is
/// the innermost failure, and the message names the innermost construct that
/// was being parsed.
pub(crate) fn grammar_error(source: &str, base: usize, err: VerboseError<Span>) -> Error {
    let offset = err
        .errors
        .first()
        .map(|(span, _)| Position::offset(span).saturating_sub(base))
        .unwrap_or(source.len());
    let construct = err
        .errors
        .iter()
        .find_map(|(_, kind)| match kind {
            VerboseErrorKind::Context(ctx) => Some(*ctx),
            _ => None,
        })
        .unwrap_or("document");
    let found = source
        .get(offset..)
        .and_then(|rest| rest.chars().next())
        .map(|c| format!("{c:?}"))
        .unwrap_or_else(|| "end of input".to_string());
    log::trace!("grammar error trace: {:?}", err.errors.iter().map(|(_, kind)| kind).collect::<Vec<_>>());
    Error::grammar(
        format!("Unexpected {found} while parsing {construct}"),
        source,
        offset,
        offset + 1,
    )
}
