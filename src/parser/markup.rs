//! Grammars of the tags whose markup has a known structure.

use nom::branch::alt;
use nom::character::complete::char;
use nom::combinator::{all_consuming, map, opt, value};
use nom::multi::{many0, separated_list1};
use nom::sequence::{preceded, terminated};
use nom::Parser;

use crate::cst::*;
use crate::result::ParseResult;

use super::common::{keyword, sp0, sp1, variable_segment};
use super::expression::*;

/// Tags whose markup is parsed into structured values.
pub const NAMED_TAGS: &[&str] = &[
    "echo", "assign", "cycle", "increment", "decrement", "capture", "layout", "section", "render",
    "include", "form", "for", "tablerow", "paginate", "if", "unless", "elsif", "case", "when",
    "liquid",
];

/// Parses the markup of the tag `name`. `None` means the tag has no markup
/// grammar or the markup does not follow it, in which case it is kept as
/// text.
pub fn named_markup(name: &str, markup: Span) -> Option<NamedMarkup> {
    let parsed = match name {
        "echo" => whole(map(liquid_variable, NamedMarkup::Echo), markup),
        "assign" => whole(map(assign_markup, NamedMarkup::Assign), markup),
        "cycle" => whole(map(cycle_markup, NamedMarkup::Cycle), markup),
        "increment" | "decrement" | "capture" => whole(
            map(variable_segment_as_lookup, NamedMarkup::Expression),
            markup,
        ),
        "layout" | "case" => whole(map(liquid_expression, NamedMarkup::Expression), markup),
        "section" => whole(
            map(liquid_string, |s| {
                NamedMarkup::Expression(LiquidExpression::String(s))
            }),
            markup,
        ),
        "render" | "include" => whole(map(render_markup, NamedMarkup::Render), markup),
        "form" => whole(
            map(
                separated_list1(argument_separator, liquid_argument),
                NamedMarkup::Form,
            ),
            markup,
        ),
        "for" | "tablerow" => whole(map(for_markup, NamedMarkup::For), markup),
        "paginate" => whole(map(paginate_markup, NamedMarkup::Paginate), markup),
        "if" | "unless" | "elsif" => whole(
            map(conditional_expression, NamedMarkup::Conditional),
            markup,
        ),
        "when" => whole(map(when_markup, NamedMarkup::When), markup),
        _ => return None,
    };
    match parsed {
        Ok((_, named)) => Some(named),
        Err(err) => {
            log::trace!("markup of `{name}` kept as text: {err:?}");
            None
        }
    }
}

fn whole<'a, P>(parser: P, markup: Span<'a>) -> ParseResult<Span<'a>, NamedMarkup>
where
    P: Parser<Span<'a>, Output = NamedMarkup, Error = nom_language::error::VerboseError<Span<'a>>>,
{
    all_consuming(terminated(parser, sp0)).parse(markup)
}

pub fn assign_markup(input: Span) -> ParseResult<Span, AssignMarkup> {
    let start = input;
    let (input, (name, _, _, _, value)) =
        (variable_segment, sp0, char('='), sp0, liquid_variable).parse(input)?;
    Ok((
        input,
        AssignMarkup {
            name: name.fragment().to_string(),
            value,
            position: Position::from_range(&start, &input),
        },
    ))
}

pub fn cycle_markup(input: Span) -> ParseResult<Span, CycleMarkup> {
    let start = input;
    let (input, group_name) =
        opt(terminated(liquid_expression, (sp0, char(':'), sp0))).parse(input)?;
    let (input, args) = separated_list1(argument_separator, liquid_expression).parse(input)?;
    Ok((
        input,
        CycleMarkup {
            group_name,
            args,
            position: Position::from_range(&start, &input),
        },
    ))
}

pub fn render_markup(input: Span) -> ParseResult<Span, RenderMarkup> {
    let start = input;
    let (input, snippet) = alt((
        map(liquid_string, LiquidExpression::String),
        variable_segment_as_lookup,
    ))
    .parse(input)?;
    let (input, variable) = opt(preceded(sp1, render_variable)).parse(input)?;
    let (input, alias) = opt(preceded((sp1, keyword("as"), sp1), variable_segment)).parse(input)?;
    let (input, args) = opt(preceded(
        argument_separator,
        separated_list1(argument_separator, named_argument),
    ))
    .parse(input)?;
    Ok((
        input,
        RenderMarkup {
            snippet,
            variable,
            alias: alias.map(|a| a.fragment().to_string()),
            args: args.unwrap_or_default(),
            position: Position::from_range(&start, &input),
        },
    ))
}

fn render_variable(input: Span) -> ParseResult<Span, RenderVariableExpression> {
    let start = input;
    let (input, (kind, _, name)) = (
        alt((
            value(RenderKind::For, keyword("for")),
            value(RenderKind::With, keyword("with")),
        )),
        sp1,
        liquid_expression,
    )
        .parse(input)?;
    Ok((
        input,
        RenderVariableExpression {
            kind,
            name,
            position: Position::from_range(&start, &input),
        },
    ))
}

pub fn for_markup(input: Span) -> ParseResult<Span, ForMarkup> {
    let start = input;
    let (input, (variable_name, _, _, _, collection)) =
        (variable_segment, sp1, keyword("in"), sp1, liquid_expression).parse(input)?;
    let (input, reversed) = opt(preceded(sp1, keyword("reversed"))).parse(input)?;
    let (input, args) = many0(preceded(optional_comma_separator, named_argument)).parse(input)?;
    Ok((
        input,
        ForMarkup {
            variable_name: variable_name.fragment().to_string(),
            collection,
            reversed: reversed.is_some(),
            args,
            position: Position::from_range(&start, &input),
        },
    ))
}

pub fn paginate_markup(input: Span) -> ParseResult<Span, PaginateMarkup> {
    let start = input;
    let (input, (collection, _, _, _, page_size)) =
        (liquid_expression, sp1, keyword("by"), sp1, liquid_expression).parse(input)?;
    let (input, args) = many0(preceded(optional_comma_separator, named_argument)).parse(input)?;
    Ok((
        input,
        PaginateMarkup {
            collection,
            page_size,
            args,
            position: Position::from_range(&start, &input),
        },
    ))
}

pub fn when_markup(input: Span) -> ParseResult<Span, Vec<LiquidExpression>> {
    separated_list1(
        alt((argument_separator, value((), (sp1, keyword("or"), sp1)))),
        liquid_expression,
    )
    .parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(s: &str) -> Span {
        Span::new_extra(s, 0)
    }

    #[test]
    fn test_unknown_tag_has_no_grammar() {
        assert_eq!(named_markup("style", span("anything")), None);
    }

    #[test]
    fn test_markup_must_be_consumed_entirely() {
        assert!(named_markup("assign", span("x = 1 ")).is_some());
        assert_eq!(named_markup("assign", span("x = = 1")), None);
        assert_eq!(named_markup("if", span("a == ")), None);
    }

    #[test]
    fn test_assign() {
        let Some(NamedMarkup::Assign(assign)) =
            named_markup("assign", span("total = price | times: 2"))
        else {
            panic!("expected assign markup");
        };
        assert_eq!(assign.name, "total");
        assert_eq!(assign.value.filters.len(), 1);
    }

    #[test]
    fn test_cycle() {
        let Some(NamedMarkup::Cycle(cycle)) =
            named_markup("cycle", span("'group': 'a', 'b', 'c'"))
        else {
            panic!("expected cycle markup");
        };
        assert!(cycle.group_name.is_some());
        assert_eq!(cycle.args.len(), 3);

        let Some(NamedMarkup::Cycle(cycle)) = named_markup("cycle", span("'a', 'b'")) else {
            panic!("expected cycle markup");
        };
        assert!(cycle.group_name.is_none());
        assert_eq!(cycle.args.len(), 2);
    }

    #[test]
    fn test_render() {
        let Some(NamedMarkup::Render(render)) = named_markup(
            "render",
            span("'card' with product as item, size: 2, show: true"),
        ) else {
            panic!("expected render markup");
        };
        assert!(matches!(render.snippet, LiquidExpression::String(_)));
        assert_eq!(
            render.variable.as_ref().map(|v| v.kind),
            Some(RenderKind::With)
        );
        assert_eq!(render.alias.as_deref(), Some("item"));
        assert_eq!(render.args.len(), 2);
    }

    #[test]
    fn test_for() {
        let Some(NamedMarkup::For(for_markup)) =
            named_markup("for", span("item in items reversed limit: 2, offset: 1"))
        else {
            panic!("expected for markup");
        };
        assert_eq!(for_markup.variable_name, "item");
        assert!(for_markup.reversed);
        assert_eq!(for_markup.args.len(), 2);

        let Some(NamedMarkup::For(for_markup)) =
            named_markup("tablerow", span("i in (1..3) cols:2"))
        else {
            panic!("expected for markup");
        };
        assert!(!for_markup.reversed);
        assert_eq!(for_markup.args[0].name, "cols");
    }

    #[test]
    fn test_paginate() {
        let Some(NamedMarkup::Paginate(paginate)) =
            named_markup("paginate", span("collection.products by 12, window_size: 2"))
        else {
            panic!("expected paginate markup");
        };
        assert!(matches!(paginate.page_size, LiquidExpression::Number(_)));
        assert_eq!(paginate.args.len(), 1);
    }

    #[test]
    fn test_when() {
        let Some(NamedMarkup::When(values)) = named_markup("when", span("'a', 'b' or 'c'")) else {
            panic!("expected when markup");
        };
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn test_form_and_section() {
        assert!(matches!(
            named_markup("form", span("'product', product, id: 'x'")),
            Some(NamedMarkup::Form(args)) if args.len() == 3
        ));
        assert!(matches!(
            named_markup("section", span("'header'")),
            Some(NamedMarkup::Expression(LiquidExpression::String(_)))
        ));
        assert_eq!(named_markup("section", span("header")), None);
    }
}
