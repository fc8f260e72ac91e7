//! Grammar of the body of a `{% liquid %}` tag: one tag per line, without
//! delimiters.

use nom::bytes::complete::{tag, take_till};
use nom::character::complete::satisfy;
use nom::combinator::opt;
use nom::error::{context, ErrorKind, ParseError};
use nom::sequence::preceded;
use nom::{Input, Parser};
use nom_language::error::VerboseError;

use crate::cst::*;
use crate::error::Result;
use crate::result::ParseResult;

use super::common::*;
use super::to_error;
use super::liquid::{tag_markup_value, BLOCK_TAGS, RAW_TAGS};

/// Parses `markup` as a list of statements. `base` is the offset of `markup`
/// inside the document; every position in the result is shifted by it. Error
/// locations are relative to `markup`.
pub fn parse_statements(markup: &str, base: usize) -> Result<Vec<ConcreteNode>> {
    let (_, nodes) =
        statements(Span::new_extra(markup, base)).map_err(|e| to_error(markup, base, e))?;
    Ok(nodes)
}

pub fn statements(input: Span) -> ParseResult<Span, Vec<ConcreteNode>> {
    let mut nodes = Vec::new();
    let mut input = input;
    loop {
        let (rest, _) = sp0(input)?;
        if rest.fragment().is_empty() {
            return Ok((rest, nodes));
        }
        let (rest, node) = context("liquid statement", statement).parse(rest)?;
        nodes.push(node);
        input = rest;
    }
}

fn statement(input: Span) -> ParseResult<Span, ConcreteNode> {
    if let Ok(parsed) = inline_comment_statement(input) {
        return Ok(parsed);
    }
    if let Ok(parsed) = raw_statement(input) {
        return Ok(parsed);
    }
    tag_statement(input)
}

/// Rest of the current line.
fn line_markup(input: Span) -> ParseResult<Span, Span> {
    take_till(|c| c == '\n').parse(input)
}

fn trim_line<'a>(markup: Span<'a>) -> &'a str {
    markup.fragment().trim_end_matches('\r')
}

fn inline_comment_statement(input: Span) -> ParseResult<Span, ConcreteNode> {
    let start = input;
    let (input, _) = preceded(lit("#"), opt(satisfy(|c| c == ' ' || c == '\t'))).parse(input)?;
    let (input, markup) = line_markup(input)?;
    Ok((
        input,
        ConcreteNode::new(
            ConcreteKind::LiquidTag(ConcreteTag {
                name: "#".to_string(),
                markup: ConcreteMarkup::Raw(trim_line(markup).trim_end().to_string()),
                whitespace_start: Trim::Keep,
                whitespace_end: Trim::Keep,
            }),
            Position::from_range(&start, &input),
        ),
    ))
}

/// `raw` or `comment` on its own line, with a body running to the matching
/// `end` line.
fn raw_statement(input: Span) -> ParseResult<Span, ConcreteNode> {
    let start = input;
    let (input, name) = tag_name(input)?;
    let name = *name.fragment();
    if name != "comment" && !RAW_TAGS.contains(&name) {
        return Err(nom::Err::Error(VerboseError::from_error_kind(
            start,
            ErrorKind::Tag,
        )));
    }
    let (input, _) = line_markup(input)?;
    let block_start = Position::from_range(&start, &input);
    let (input, body) = take_until_match(raw_statement_end(name)).parse(input)?;
    let (input, _) = (line_break, hsp0).parse(input)?;
    let close = input;
    let (input, _) = (tag("end"), keyword(name), line_markup).parse(input)?;
    Ok((
        input,
        ConcreteNode::new(
            ConcreteKind::LiquidRawTag(ConcreteRawTag {
                name: name.to_string(),
                body: body.fragment().to_string(),
                whitespace_start: Trim::Keep,
                whitespace_end: Trim::Keep,
                delimiter_whitespace_start: Trim::Keep,
                delimiter_whitespace_end: Trim::Keep,
                block_start,
                block_end: Position::from_range(&close, &input),
            }),
            Position::from_range(&start, &input),
        ),
    ))
}

fn raw_statement_end<'a>(name: &'a str) -> impl FnMut(Span<'a>) -> ParseResult<Span<'a>, ()> {
    move |input: Span<'a>| {
        let (input, _) = (line_break, hsp0, lit("end"), keyword(name)).parse(input)?;
        Ok((input, ()))
    }
}

fn tag_statement(input: Span) -> ParseResult<Span, ConcreteNode> {
    let start = input;
    let (input, name) = context("tag name", tag_name).parse(input)?;
    let name = *name.fragment();
    let (input, _) = hsp0(input)?;
    let (input, markup) = line_markup(input)?;
    let markup = markup.take(trim_line(markup).len());
    let position = Position::new(Position::offset(&start), Position::from_span(&markup).end);

    let kind = if let Some(block) = name
        .strip_prefix("end")
        .filter(|block| BLOCK_TAGS.contains(block))
    {
        ConcreteKind::LiquidTagClose {
            name: block.to_string(),
            whitespace_start: Trim::Keep,
            whitespace_end: Trim::Keep,
        }
    } else {
        let tag = ConcreteTag {
            name: name.to_string(),
            markup: tag_markup_value(name, markup),
            whitespace_start: Trim::Keep,
            whitespace_end: Trim::Keep,
        };
        if BLOCK_TAGS.contains(&name) {
            ConcreteKind::LiquidTagOpen(tag)
        } else {
            ConcreteKind::LiquidTag(tag)
        }
    };
    Ok((input, ConcreteNode::new(kind, position)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(nodes: &[ConcreteNode]) -> Vec<String> {
        nodes
            .iter()
            .map(|node| match &node.kind {
                ConcreteKind::LiquidTag(tag) | ConcreteKind::LiquidTagOpen(tag) => tag.name.clone(),
                ConcreteKind::LiquidTagClose { name, .. } => format!("end{name}"),
                ConcreteKind::LiquidRawTag(raw) => raw.name.clone(),
                other => other.type_name().to_string(),
            })
            .collect()
    }

    #[test]
    fn test_statements() {
        let nodes = parse_statements(
            "\n  # note\n  if a\n    echo a | upcase\n  endif\n  render 'x'\n",
            100,
        )
        .unwrap();
        assert_eq!(names(&nodes), ["#", "if", "echo", "endif", "render"]);
        assert_eq!(nodes[0].position, Position::new(103, 109));
        assert!(matches!(
            &nodes[2].kind,
            ConcreteKind::LiquidTag(ConcreteTag { markup: ConcreteMarkup::Named(NamedMarkup::Echo(_)), .. })
        ));
    }

    #[test]
    fn test_statement_positions_exclude_line_breaks() {
        let nodes = parse_statements("assign x = 1\r\necho x", 0).unwrap();
        assert_eq!(nodes[0].position, Position::new(0, 12));
        assert_eq!(nodes[1].position, Position::new(14, 20));
    }

    #[test]
    fn test_comment_statement() {
        let source = "comment\n  anything { here\n  endcomment\necho 1";
        let nodes = parse_statements(source, 0).unwrap();
        assert_eq!(names(&nodes), ["comment", "echo"]);
        let ConcreteKind::LiquidRawTag(raw) = &nodes[0].kind else {
            panic!("expected a raw statement");
        };
        assert_eq!(raw.body, "\n  anything { here");
    }

    #[test]
    fn test_invalid_statement_reports_offset() {
        let err = parse_statements("echo x\n{{ y }}", 40).unwrap_err();
        let location = err.location().unwrap();
        assert_eq!(location.offset(), 7);
        assert_eq!(location.line, 2);
    }
}
