use nom::branch::alt;
use nom::bytes::complete::{tag, take_while};
use nom::character::complete::{char, multispace0, multispace1, satisfy, space0};
use nom::combinator::{map, not, opt, recognize};
use nom::error::{ErrorKind, ParseError};
use nom::sequence::terminated;
use nom::{Input, Parser};
use nom_language::error::VerboseError;

use crate::cst::{Position, Span, Trim};
use crate::result::ParseResult;

pub fn lit<'a>(
    literal: &'a str,
) -> impl Parser<Span<'a>, Output = Span<'a>, Error = VerboseError<Span<'a>>> {
    tag(literal)
}

/// Any whitespace, line breaks included.
pub fn sp0(input: Span) -> ParseResult<Span, Span> {
    multispace0(input)
}

pub fn sp1(input: Span) -> ParseResult<Span, Span> {
    multispace1(input)
}

/// Spaces and tabs only.
pub fn hsp0(input: Span) -> ParseResult<Span, Span> {
    space0(input)
}

pub fn line_break(input: Span) -> ParseResult<Span, Span> {
    alt((lit("\r\n"), lit("\n"))).parse(input)
}

/// Optional `-` next to a Liquid delimiter.
pub fn trim_marker(input: Span) -> ParseResult<Span, Trim> {
    map(opt(char('-')), |marker| match marker {
        Some(_) => Trim::Strip,
        None => Trim::Keep,
    })
    .parse(input)
}

pub fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// Succeeds without consuming input when the next character cannot continue
/// an identifier.
pub fn end_of_identifier(input: Span) -> ParseResult<Span, ()> {
    not(satisfy(is_identifier_char)).parse(input)
}

pub fn keyword<'a>(
    word: &'a str,
) -> impl Parser<Span<'a>, Output = Span<'a>, Error = VerboseError<Span<'a>>> {
    terminated(tag(word), end_of_identifier)
}

/// Name of a variable or of a named argument.
pub fn variable_segment(input: Span) -> ParseResult<Span, Span> {
    recognize((
        satisfy(|c| c.is_alphabetic() || c == '_'),
        take_while(is_identifier_char),
    ))
    .parse(input)
}

/// A variable segment that may end with `?`, as in `product.empty?`.
pub fn identifier(input: Span) -> ParseResult<Span, Span> {
    recognize((variable_segment, opt(char('?')))).parse(input)
}

/// Name of a Liquid tag.
pub fn tag_name(input: Span) -> ParseResult<Span, Span> {
    terminated(
        recognize((
            satisfy(char::is_alphabetic),
            take_while(|c: char| c.is_alphanumeric() || c == '_'),
        )),
        end_of_identifier,
    )
    .parse(input)
}

/// Consumes input up to the first position where `stop` matches. The match
/// itself is left in the input.
pub fn take_until_match<'a, O, P>(
    mut stop: P,
) -> impl FnMut(Span<'a>) -> ParseResult<Span<'a>, Span<'a>>
where
    P: Parser<Span<'a>, Output = O, Error = VerboseError<Span<'a>>>,
{
    move |input: Span<'a>| {
        let fragment = *input.fragment();
        for index in (0..=fragment.len()).filter(|i| fragment.is_char_boundary(*i)) {
            let (rest, taken) = input.take_split(index);
            if stop.parse(rest).is_ok() {
                return Ok((rest, taken));
            }
        }
        Err(nom::Err::Error(VerboseError::from_error_kind(
            input,
            ErrorKind::TakeUntil,
        )))
    }
}

/// Takes at least one character, stopping where `stop` holds for the rest of
/// the input.
pub fn take_text1<'a>(
    stop: impl Fn(&str) -> bool,
) -> impl FnMut(Span<'a>) -> ParseResult<Span<'a>, Span<'a>> {
    move |input: Span<'a>| {
        let fragment = *input.fragment();
        let end = fragment
            .char_indices()
            .map(|(i, _)| i)
            .find(|&i| stop(&fragment[i..]))
            .unwrap_or(fragment.len());
        if end == 0 {
            return Err(nom::Err::Error(VerboseError::from_error_kind(
                input,
                ErrorKind::TakeWhile1,
            )));
        }
        Ok(input.take_split(end))
    }
}

/// Narrows `span` to its content without surrounding whitespace, keeping
/// offsets intact.
pub fn trim_span(span: Span) -> Span {
    let fragment = *span.fragment();
    let span = span.take_from(fragment.len() - fragment.trim_start().len());
    let len = span.fragment().trim_end().len();
    span.take(len)
}

/// Byte length consumed between `start` and `rest`.
pub fn consumed_len(start: &Span, rest: &Span) -> usize {
    Position::offset(rest) - Position::offset(start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(s: &str) -> Span {
        Span::new_extra(s, 0)
    }

    #[test]
    fn test_trim_marker() {
        let (rest, trim) = trim_marker(span("-%}")).unwrap();
        assert_eq!(trim, Trim::Strip);
        assert_eq!(*rest.fragment(), "%}");

        let (rest, trim) = trim_marker(span("%}")).unwrap();
        assert_eq!(trim, Trim::Keep);
        assert_eq!(*rest.fragment(), "%}");
    }

    #[test]
    fn test_identifiers() {
        let (rest, name) = variable_segment(span("product-title.size")).unwrap();
        assert_eq!(*name.fragment(), "product-title");
        assert_eq!(*rest.fragment(), ".size");

        let (_, name) = identifier(span("empty? ")).unwrap();
        assert_eq!(*name.fragment(), "empty?");

        assert!(variable_segment(span("1abc")).is_err());
        assert!(tag_name(span("if-x")).is_err());
        assert_eq!(*tag_name(span("endif ")).unwrap().1.fragment(), "endif");
    }

    #[test]
    fn test_keyword_needs_word_boundary() {
        assert!(keyword("in").parse(span("in x")).is_ok());
        assert!(keyword("in").parse(span("index")).is_err());
    }

    #[test]
    fn test_take_until_match() {
        let (rest, taken) = take_until_match(lit("%}")).parse(span("a b %} c")).unwrap();
        assert_eq!(*taken.fragment(), "a b ");
        assert_eq!(*rest.fragment(), "%} c");
        assert_eq!(Position::offset(&rest), 4);

        assert!(take_until_match(lit("%}")).parse(span("no end")).is_err());
    }

    #[test]
    fn test_take_text1() {
        let mut text = take_text1(|s| s.starts_with('<'));
        let (rest, taken) = text.parse(span("héllo <b>")).unwrap();
        assert_eq!(*taken.fragment(), "héllo ");
        assert_eq!(*rest.fragment(), "<b>");
        assert!(text.parse(span("<b>")).is_err());
    }

    #[test]
    fn test_trim_span_keeps_offsets() {
        let trimmed = trim_span(span("  abc  "));
        assert_eq!(*trimmed.fragment(), "abc");
        assert_eq!(Position::from_span(&trimmed), Position::new(2, 5));
    }
}
