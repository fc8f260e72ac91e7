use nom::branch::alt;
use nom::character::complete::satisfy;
use nom::combinator::{cut, opt};
use nom::error::{context, ErrorKind, ParseError};
use nom::sequence::{preceded, terminated};
use nom::{Input, Parser};
use nom_language::error::VerboseError;

use crate::cst::*;
use crate::result::ParseResult;

use super::common::*;
use super::expression::liquid_variable;
use super::markup::{named_markup, NAMED_TAGS};
use super::statement::statements;

/// Tags that open a block closed by `end<name>`.
pub const BLOCK_TAGS: &[&str] = &[
    "capture", "case", "for", "form", "if", "paginate", "tablerow", "unless",
];

/// Tags whose body is kept as text.
pub const RAW_TAGS: &[&str] = &["raw", "javascript", "schema", "stylesheet", "style"];

pub fn liquid_node(input: Span) -> ParseResult<Span, ConcreteNode> {
    context(
        "liquid",
        alt((liquid_block_comment, liquid_raw_tag, liquid_drop, liquid_tag)),
    )
    .parse(input)
}

/// `{{ markup }}`
pub fn liquid_drop(input: Span) -> ParseResult<Span, ConcreteNode> {
    let start = input;
    let (input, (markup, whitespace_start, whitespace_end)) = drop_parts(input)?;
    Ok((
        input,
        ConcreteNode::new(
            ConcreteKind::LiquidDrop {
                markup,
                whitespace_start,
                whitespace_end,
            },
            Position::from_range(&start, &input),
        ),
    ))
}

pub fn drop_parts(input: Span) -> ParseResult<Span, (DropMarkup, Trim, Trim)> {
    let (input, whitespace_start) = preceded(lit("{{"), trim_marker).parse(input)?;
    let (input, _) = sp0(input)?;
    let (input, markup) =
        context("liquid drop", take_until_match(alt((lit("-}}"), lit("}}"))))).parse(input)?;
    let (input, whitespace_end) = terminated(trim_marker, lit("}}")).parse(input)?;
    Ok((input, (drop_markup(markup), whitespace_start, whitespace_end)))
}

fn drop_markup(markup: Span) -> DropMarkup {
    match liquid_variable.parse(markup) {
        Ok((rest, variable)) if rest.fragment().trim().is_empty() => DropMarkup::Variable(variable),
        _ => DropMarkup::Raw(markup.fragment().trim_end().to_string()),
    }
}

/// `{%` followed by the trim marker and spaces.
fn tag_open(input: Span) -> ParseResult<Span, Trim> {
    terminated(preceded(lit("{%"), trim_marker), sp0).parse(input)
}

/// Optional trim marker and `%}`.
fn tag_close(input: Span) -> ParseResult<Span, Trim> {
    preceded(sp0, terminated(trim_marker, lit("%}"))).parse(input)
}

fn tag_markup(input: Span) -> ParseResult<Span, Span> {
    take_until_match(alt((lit("-%}"), lit("%}")))).parse(input)
}

/// `{% comment %}...{% endcomment %}`, nesting allowed.
pub fn liquid_block_comment(input: Span) -> ParseResult<Span, ConcreteNode> {
    let start = input;
    let (input, (whitespace_start, whitespace_end)) = comment_start(input)?;
    let block_start = Position::from_range(&start, &input);
    let (input, body) = comment_body(input)?;
    let close = input;
    let (input, (delimiter_whitespace_start, delimiter_whitespace_end)) = comment_end(input)?;
    Ok((
        input,
        ConcreteNode::new(
            ConcreteKind::LiquidRawTag(ConcreteRawTag {
                name: "comment".to_string(),
                body: body.fragment().to_string(),
                whitespace_start,
                whitespace_end,
                delimiter_whitespace_start,
                delimiter_whitespace_end,
                block_start,
                block_end: Position::from_range(&close, &input),
            }),
            Position::from_range(&start, &input),
        ),
    ))
}

fn comment_start(input: Span) -> ParseResult<Span, (Trim, Trim)> {
    let (input, whitespace_start) = tag_open(input)?;
    let (input, _) = (keyword("comment"), tag_markup).parse(input)?;
    let (input, whitespace_end) = tag_close(input)?;
    Ok((input, (whitespace_start, whitespace_end)))
}

fn comment_end(input: Span) -> ParseResult<Span, (Trim, Trim)> {
    let (input, whitespace_start) = tag_open(input)?;
    let (input, _) = (keyword("endcomment"), tag_markup).parse(input)?;
    let (input, whitespace_end) = tag_close(input)?;
    Ok((input, (whitespace_start, whitespace_end)))
}

fn comment_body(input: Span) -> ParseResult<Span, Span> {
    let mut rest = input;
    loop {
        if comment_end(rest).is_ok() {
            break;
        }
        if let Ok((after, _)) = liquid_block_comment(rest) {
            rest = after;
            continue;
        }
        match rest.fragment().chars().next() {
            Some(c) => rest = rest.take_from(c.len_utf8()),
            None => {
                return Err(nom::Err::Error(VerboseError::from_error_kind(
                    rest,
                    ErrorKind::TakeUntil,
                )))
            }
        }
    }
    Ok((rest, input.take(consumed_len(&input, &rest))))
}

/// `{% raw %}...{% endraw %}` and the other tags listed in [`RAW_TAGS`].
pub fn liquid_raw_tag(input: Span) -> ParseResult<Span, ConcreteNode> {
    let start = input;
    let (input, whitespace_start) = tag_open(input)?;
    let (input, name) = tag_name(input)?;
    let name = *name.fragment();
    if !RAW_TAGS.contains(&name) {
        return Err(nom::Err::Error(VerboseError::from_error_kind(
            start,
            ErrorKind::Tag,
        )));
    }
    let (input, _) = tag_markup(input)?;
    let (input, whitespace_end) = tag_close(input)?;
    let block_start = Position::from_range(&start, &input);
    let (input, body) = take_until_match(raw_tag_end(name)).parse(input)?;
    let close = input;
    let (input, (delimiter_whitespace_start, delimiter_whitespace_end)) =
        raw_tag_end(name).parse(input)?;
    Ok((
        input,
        ConcreteNode::new(
            ConcreteKind::LiquidRawTag(ConcreteRawTag {
                name: name.to_string(),
                body: body.fragment().to_string(),
                whitespace_start,
                whitespace_end,
                delimiter_whitespace_start,
                delimiter_whitespace_end,
                block_start,
                block_end: Position::from_range(&close, &input),
            }),
            Position::from_range(&start, &input),
        ),
    ))
}

fn raw_tag_end<'a>(name: &'a str) -> impl FnMut(Span<'a>) -> ParseResult<Span<'a>, (Trim, Trim)> {
    move |input: Span<'a>| {
        let (input, whitespace_start) = tag_open(input)?;
        let (input, _) = (lit("end"), keyword(name)).parse(input)?;
        let (input, whitespace_end) = tag_close(input)?;
        Ok((input, (whitespace_start, whitespace_end)))
    }
}

/// Any other `{% %}` tag: block openers, block closers, branch markers,
/// inline comments and plain tags.
pub fn liquid_tag(input: Span) -> ParseResult<Span, ConcreteNode> {
    let start = input;
    let (input, whitespace_start) = tag_open(input)?;

    if let Ok((input, _)) = lit("#").parse(input) {
        let (input, _) = opt(satisfy(char::is_whitespace)).parse(input)?;
        let (input, markup) = tag_markup(input)?;
        let (input, whitespace_end) = tag_close(input)?;
        let tag = ConcreteTag {
            name: "#".to_string(),
            markup: ConcreteMarkup::Raw(markup.fragment().trim_end().to_string()),
            whitespace_start,
            whitespace_end,
        };
        return Ok((
            input,
            ConcreteNode::new(
                ConcreteKind::LiquidTag(tag),
                Position::from_range(&start, &input),
            ),
        ));
    }

    let (input, name) = context("tag name", tag_name).parse(input)?;
    let name = *name.fragment();
    let (input, _) = sp0(input)?;

    if let Some(block) = name
        .strip_prefix("end")
        .filter(|block| BLOCK_TAGS.contains(block))
    {
        let (input, _) = tag_markup(input)?;
        let (input, whitespace_end) = tag_close(input)?;
        return Ok((
            input,
            ConcreteNode::new(
                ConcreteKind::LiquidTagClose {
                    name: block.to_string(),
                    whitespace_start,
                    whitespace_end,
                },
                Position::from_range(&start, &input),
            ),
        ));
    }

    let (input, markup) = tag_markup(input)?;
    let markup = if name == "liquid" {
        let (_, nodes) = cut(statements).parse(markup)?;
        ConcreteMarkup::Statements(nodes)
    } else {
        tag_markup_value(name, markup)
    };
    let (input, whitespace_end) = tag_close(input)?;
    let tag = ConcreteTag {
        name: name.to_string(),
        markup,
        whitespace_start,
        whitespace_end,
    };
    let position = Position::from_range(&start, &input);
    let kind = if BLOCK_TAGS.contains(&name) {
        ConcreteKind::LiquidTagOpen(tag)
    } else {
        ConcreteKind::LiquidTag(tag)
    };
    Ok((input, ConcreteNode::new(kind, position)))
}

/// Structured markup for tags with a grammar, trimmed text otherwise.
pub fn tag_markup_value(name: &str, markup: Span) -> ConcreteMarkup {
    NAMED_TAGS
        .contains(&name)
        .then(|| named_markup(name, markup))
        .flatten()
        .map(ConcreteMarkup::Named)
        .unwrap_or_else(|| ConcreteMarkup::Raw(markup.fragment().trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(s: &str) -> Span {
        Span::new_extra(s, 0)
    }

    fn parse(s: &str) -> ConcreteNode {
        let (rest, node) = liquid_node(span(s)).unwrap();
        assert_eq!(*rest.fragment(), "", "unconsumed input for {s:?}");
        node
    }

    #[test]
    fn test_drop() {
        let node = parse("{{- product.title | upcase -}}");
        assert_eq!(node.position, Position::new(0, 30));
        let ConcreteKind::LiquidDrop {
            markup: DropMarkup::Variable(variable),
            whitespace_start,
            whitespace_end,
        } = node.kind
        else {
            panic!("expected a parsed drop");
        };
        assert_eq!(whitespace_start, Trim::Strip);
        assert_eq!(whitespace_end, Trim::Strip);
        assert_eq!(variable.raw_source, "product.title | upcase");
    }

    #[test]
    fn test_drop_with_unparseable_markup() {
        let node = parse("{{ 'a' + 1  }}");
        assert_eq!(
            node.kind,
            ConcreteKind::LiquidDrop {
                markup: DropMarkup::Raw("'a' + 1".to_string()),
                whitespace_start: Trim::Keep,
                whitespace_end: Trim::Keep,
            }
        );
    }

    #[test]
    fn test_tag_kinds() {
        assert!(matches!(
            parse("{% if a %}").kind,
            ConcreteKind::LiquidTagOpen(ConcreteTag { ref name, markup: ConcreteMarkup::Named(_), .. }) if name == "if"
        ));
        assert!(matches!(
            parse("{%- endif -%}").kind,
            ConcreteKind::LiquidTagClose { ref name, whitespace_start: Trim::Strip, whitespace_end: Trim::Strip } if name == "if"
        ));
        assert!(matches!(
            parse("{% else %}").kind,
            ConcreteKind::LiquidTag(ConcreteTag { ref name, markup: ConcreteMarkup::Raw(ref m), .. }) if name == "else" && m.is_empty()
        ));
        assert!(matches!(
            parse("{% endfoo %}").kind,
            ConcreteKind::LiquidTag(ConcreteTag { ref name, .. }) if name == "endfoo"
        ));
        assert!(matches!(
            parse("{% section header %}").kind,
            ConcreteKind::LiquidTag(ConcreteTag { markup: ConcreteMarkup::Raw(ref m), .. }) if m == "header"
        ));
    }

    #[test]
    fn test_inline_comment() {
        let node = parse("{% # a note  %}");
        assert_eq!(
            node.kind,
            ConcreteKind::LiquidTag(ConcreteTag {
                name: "#".to_string(),
                markup: ConcreteMarkup::Raw("a note".to_string()),
                whitespace_start: Trim::Keep,
                whitespace_end: Trim::Keep,
            })
        );
    }

    #[test]
    fn test_raw_tag() {
        let source = "{% raw %} {{ x }} {%- endraw %}";
        let ConcreteKind::LiquidRawTag(raw) = parse(source).kind else {
            panic!("expected a raw tag");
        };
        assert_eq!(raw.name, "raw");
        assert_eq!(raw.body, " {{ x }} ");
        assert_eq!(raw.block_start, Position::new(0, 9));
        assert_eq!(raw.block_end, Position::new(18, source.len()));
        assert_eq!(raw.delimiter_whitespace_start, Trim::Strip);
    }

    #[test]
    fn test_unterminated_raw_tag_is_a_plain_tag() {
        assert!(matches!(
            parse("{% raw %}").kind,
            ConcreteKind::LiquidTag(ConcreteTag { ref name, .. }) if name == "raw"
        ));
    }

    #[test]
    fn test_nested_block_comment() {
        let source = "{% comment %}a{% comment %}b{% endcomment %}c{% endcomment %}";
        let ConcreteKind::LiquidRawTag(raw) = parse(source).kind else {
            panic!("expected a comment");
        };
        assert_eq!(raw.name, "comment");
        assert_eq!(raw.body, "a{% comment %}b{% endcomment %}c");
    }

    #[test]
    fn test_liquid_tag_statements() {
        let source = "{% liquid\n  assign x = 1\n  echo x\n%}";
        let ConcreteKind::LiquidTag(tag) = parse(source).kind else {
            panic!("expected a liquid tag");
        };
        let ConcreteMarkup::Statements(statements) = tag.markup else {
            panic!("expected statements");
        };
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].position, Position::new(12, 24));
        assert_eq!(&source[12..24], "assign x = 1");
    }

    #[test]
    fn test_liquid_tag_with_bad_statements_fails() {
        let result = liquid_node(span("{% liquid\n  assign x = 1\n  <p>\n%}"));
        assert!(matches!(result, Err(nom::Err::Failure(_))));
    }
}
