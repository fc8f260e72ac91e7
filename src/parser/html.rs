use nom::branch::alt;
use nom::bytes::complete::{tag_no_case, take_while};
use nom::character::complete::{char, satisfy};
use nom::combinator::{map, not, opt, recognize};
use nom::error::{context, ErrorKind, ParseError};
use nom::multi::{many0, many1};
use nom::sequence::{delimited, preceded, terminated};
use nom::Parser;
use nom_language::error::VerboseError;

use crate::cst::*;
use crate::result::ParseResult;

use super::common::*;
use super::liquid::{drop_parts, liquid_drop, liquid_node};

/// Elements that never have a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link",
    "meta", "param", "source", "track", "wbr",
];

/// Elements whose body is kept as text up to the matching closing tag.
pub const RAW_ELEMENTS: &[&str] = &["script", "style", "svg"];

pub fn html_node(input: Span) -> ParseResult<Span, ConcreteNode> {
    context(
        "HTML",
        alt((
            html_comment,
            html_doctype,
            html_raw_tag,
            html_void_element,
            html_tag_close,
            html_element,
        )),
    )
    .parse(input)
}

/// `<!-- body -->`
pub fn html_comment(input: Span) -> ParseResult<Span, ConcreteNode> {
    let start = input;
    let (input, body) = delimited(
        lit("<!--"),
        context("HTML comment", take_until_match(lit("-->"))),
        lit("-->"),
    )
    .parse(input)?;
    Ok((
        input,
        ConcreteNode::new(
            ConcreteKind::HtmlComment {
                body: body.fragment().trim().to_string(),
            },
            Position::from_range(&start, &input),
        ),
    ))
}

/// `<!doctype html legacy>`, case-insensitive.
pub fn html_doctype(input: Span) -> ParseResult<Span, ConcreteNode> {
    let start = input;
    let (input, _) = (lit("<!"), tag_no_case("doctype"), sp1, tag_no_case("html")).parse(input)?;
    let (input, legacy) = terminated(take_while(|c| c != '>'), char('>')).parse(input)?;
    let legacy = legacy.fragment().trim();
    Ok((
        input,
        ConcreteNode::new(
            ConcreteKind::HtmlDoctype {
                legacy_doctype_string: (!legacy.is_empty()).then(|| legacy.to_string()),
            },
            Position::from_range(&start, &input),
        ),
    ))
}

fn is_tag_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == ':' || c == '_'
}

pub fn html_tag_name(input: Span) -> ParseResult<Span, Span> {
    recognize((satisfy(|c| c.is_ascii_alphabetic()), take_while(is_tag_name_char))).parse(input)
}

/// One of `names`, as a whole tag name.
fn known_tag_name<'a>(
    names: &'static [&'static str],
) -> impl FnMut(Span<'a>) -> ParseResult<Span<'a>, &'static str> {
    move |input: Span<'a>| {
        for &name in names {
            if let Ok((rest, _)) = terminated(
                tag_no_case::<_, _, VerboseError<Span>>(name),
                not(satisfy(is_tag_name_char)),
            )
            .parse(input)
            {
                return Ok((rest, name));
            }
        }
        Err(nom::Err::Error(VerboseError::from_error_kind(
            input,
            ErrorKind::Tag,
        )))
    }
}

/// Tag name or a `{{ drop }}` standing for one.
pub fn element_name(input: Span) -> ParseResult<Span, ElementName> {
    alt((
        map(drop_parts, |(markup, _, _)| ElementName::Drop(markup)),
        map(html_tag_name, |name| ElementName::Tag(name.fragment().to_string())),
    ))
    .parse(input)
}

/// `<script>`, `<style>` and `<svg>` with an opaque body.
pub fn html_raw_tag(input: Span) -> ParseResult<Span, ConcreteNode> {
    let start = input;
    let (input, name) = preceded(lit("<"), known_tag_name(RAW_ELEMENTS)).parse(input)?;
    let (input, attributes) = attribute_list(input)?;
    let (input, _) = (sp0, lit(">")).parse(input)?;
    let block_start = Position::from_range(&start, &input);
    let (input, body) =
        context("raw element body", take_until_match(raw_tag_end(name))).parse(input)?;
    let close = input;
    let (input, _) = raw_tag_end(name)(input)?;
    Ok((
        input,
        ConcreteNode::new(
            ConcreteKind::HtmlRawTag {
                name: name.to_string(),
                attributes,
                body: body.fragment().to_string(),
                block_start,
                block_end: Position::from_range(&close, &input),
            },
            Position::from_range(&start, &input),
        ),
    ))
}

fn raw_tag_end<'a>(name: &'static str) -> impl FnMut(Span<'a>) -> ParseResult<Span<'a>, ()> {
    move |input: Span<'a>| {
        let (input, _) = (lit("</"), tag_no_case(name), sp0, lit(">")).parse(input)?;
        Ok((input, ()))
    }
}

/// `<br>`, `<img ... />` and the other elements listed in [`VOID_ELEMENTS`].
pub fn html_void_element(input: Span) -> ParseResult<Span, ConcreteNode> {
    let start = input;
    let (input, name) = preceded(lit("<"), known_tag_name(VOID_ELEMENTS)).parse(input)?;
    let (input, attributes) = attribute_list(input)?;
    let (input, _) = (sp0, opt(lit("/")), lit(">")).parse(input)?;
    Ok((
        input,
        ConcreteNode::new(
            ConcreteKind::HtmlVoidElement {
                name: name.to_string(),
                attributes,
            },
            Position::from_range(&start, &input),
        ),
    ))
}

/// `<name attrs>` or `<name attrs />`.
pub fn html_element(input: Span) -> ParseResult<Span, ConcreteNode> {
    let start = input;
    let (input, name) = preceded(lit("<"), context("tag name", element_name)).parse(input)?;
    let (input, attributes) = attribute_list(input)?;
    let (input, self_closing) =
        preceded(sp0, alt((map(lit("/>"), |_| true), map(lit(">"), |_| false)))).parse(input)?;
    let kind = if self_closing {
        ConcreteKind::HtmlSelfClosingElement { name, attributes }
    } else {
        ConcreteKind::HtmlTagOpen { name, attributes }
    };
    Ok((input, ConcreteNode::new(kind, Position::from_range(&start, &input))))
}

/// `</name>`
pub fn html_tag_close(input: Span) -> ParseResult<Span, ConcreteNode> {
    let start = input;
    let (input, name) = delimited(lit("</"), element_name, (sp0, lit(">"))).parse(input)?;
    Ok((
        input,
        ConcreteNode::new(
            ConcreteKind::HtmlTagClose { name },
            Position::from_range(&start, &input),
        ),
    ))
}

/// Attributes and Liquid nodes inside an opening tag.
pub fn attribute_list(input: Span) -> ParseResult<Span, Vec<ConcreteNode>> {
    many0(preceded(
        sp0,
        alt((attribute_with_value, liquid_node, attribute_empty)),
    ))
    .parse(input)
}

/// Text stops of attribute names.
fn ends_attribute_name(rest: &str) -> bool {
    rest.starts_with(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '=' | '>' | '<'))
        || rest.starts_with("/>")
        || rest.starts_with("{{")
        || rest.starts_with("{%")
}

fn attribute_name(input: Span) -> ParseResult<Span, Span> {
    recognize(many1(alt((
        recognize(liquid_drop),
        take_text1(ends_attribute_name),
    ))))
    .parse(input)
}

fn attribute_empty(input: Span) -> ParseResult<Span, ConcreteNode> {
    let start = input;
    let (input, name) = attribute_name(input)?;
    Ok((
        input,
        ConcreteNode::new(
            ConcreteKind::Attribute(ConcreteAttribute {
                kind: AttrKind::Empty,
                name: name.fragment().to_string(),
                value: Vec::new(),
            }),
            Position::from_range(&start, &input),
        ),
    ))
}

fn attribute_with_value(input: Span) -> ParseResult<Span, ConcreteNode> {
    let start = input;
    let (input, name) = terminated(attribute_name, (sp0, char('='), sp0)).parse(input)?;
    let (input, (kind, value)) = alt((
        map(
            delimited(char('"'), quoted_value('"'), char('"')),
            |value| (AttrKind::DoubleQuoted, value),
        ),
        map(
            delimited(char('\''), quoted_value('\''), char('\'')),
            |value| (AttrKind::SingleQuoted, value),
        ),
        map(unquoted_value, |value| (AttrKind::Unquoted, value)),
    ))
    .parse(input)?;
    Ok((
        input,
        ConcreteNode::new(
            ConcreteKind::Attribute(ConcreteAttribute {
                kind,
                name: name.fragment().to_string(),
                value,
            }),
            Position::from_range(&start, &input),
        ),
    ))
}

fn quoted_value<'a>(quote: char) -> impl FnMut(Span<'a>) -> ParseResult<Span<'a>, Vec<ConcreteNode>> {
    move |input: Span<'a>| {
        many0(alt((
            liquid_node,
            value_text(move |rest: &str| {
                rest.starts_with(quote) || rest.starts_with("{{") || rest.starts_with("{%")
            }),
        )))
        .parse(input)
    }
}

fn unquoted_value(input: Span) -> ParseResult<Span, Vec<ConcreteNode>> {
    many1(alt((
        liquid_node,
        value_text(|rest: &str| {
            rest.starts_with(|c: char| {
                c.is_whitespace() || matches!(c, '"' | '\'' | '=' | '<' | '>' | '`')
            }) || rest.starts_with("{{")
                || rest.starts_with("{%")
        }),
    )))
    .parse(input)
}

/// Text inside an attribute value. Whitespace is significant there, so the
/// node is not trimmed.
fn value_text<'a>(
    stop: impl Fn(&str) -> bool,
) -> impl FnMut(Span<'a>) -> ParseResult<Span<'a>, ConcreteNode> {
    let mut text = take_text1(stop);
    move |input: Span<'a>| {
        let (input, value) = text(input)?;
        Ok((
            input,
            ConcreteNode::new(
                ConcreteKind::TextNode {
                    value: value.fragment().to_string(),
                },
                Position::from_span(&value),
            ),
        ))
    }
}
