use nom::branch::alt;
use nom::bytes::complete::take_till;
use nom::character::complete::{char, digit1, satisfy};
use nom::combinator::{map, not, opt, recognize, value};
use nom::error::context;
use nom::multi::{many0, many1, separated_list1};
use nom::sequence::{delimited, preceded, terminated};
use nom::Parser;

use crate::cst::*;
use crate::result::ParseResult;

use super::common::{consumed_len, identifier, keyword, lit, sp0, sp1, variable_segment};

pub fn liquid_expression(input: Span) -> ParseResult<Span, LiquidExpression> {
    context(
        "expression",
        alt((
            map(liquid_string, LiquidExpression::String),
            map(liquid_number, LiquidExpression::Number),
            map(liquid_literal, LiquidExpression::Literal),
            map(liquid_range, |range| LiquidExpression::Range(Box::new(range))),
            map(variable_lookup, LiquidExpression::VariableLookup),
        )),
    )
    .parse(input)
}

pub fn liquid_string(input: Span) -> ParseResult<Span, LiquidString> {
    let start = input;
    let (input, (single, value)) = context(
        "string",
        alt((
            map(
                delimited(char('\''), take_till(|c| c == '\''), char('\'')),
                |v: Span| (true, v),
            ),
            map(
                delimited(char('"'), take_till(|c| c == '"'), char('"')),
                |v: Span| (false, v),
            ),
        )),
    )
    .parse(input)?;
    Ok((
        input,
        LiquidString {
            value: value.fragment().to_string(),
            single,
            position: Position::from_range(&start, &input),
        },
    ))
}

pub fn liquid_number(input: Span) -> ParseResult<Span, LiquidNumber> {
    let (input, number) = context(
        "number",
        terminated(
            recognize((opt(char('-')), digit1, opt((char('.'), digit1)))),
            not(satisfy(|c| c.is_alphabetic() || c == '_')),
        ),
    )
    .parse(input)?;
    Ok((
        input,
        LiquidNumber {
            value: number.fragment().to_string(),
            position: Position::from_span(&number),
        },
    ))
}

pub fn liquid_literal(input: Span) -> ParseResult<Span, LiquidLiteral> {
    let (input, (word, value)) = context(
        "literal",
        alt((
            map(keyword("nil"), |w| (w, LiteralValue::Null)),
            map(keyword("null"), |w| (w, LiteralValue::Null)),
            map(keyword("true"), |w| (w, LiteralValue::Bool(true))),
            map(keyword("false"), |w| (w, LiteralValue::Bool(false))),
            map(keyword("blank"), |w| (w, LiteralValue::Empty)),
            map(keyword("empty"), |w| (w, LiteralValue::Empty)),
        )),
    )
    .parse(input)?;
    Ok((
        input,
        LiquidLiteral {
            keyword: word.fragment().to_string(),
            value,
            position: Position::from_span(&word),
        },
    ))
}

pub fn liquid_range(input: Span) -> ParseResult<Span, LiquidRange> {
    let start = input;
    let (input, (_, _, range_start, _, _, _, range_end, _, _)) = context(
        "range",
        (
            char('('),
            sp0,
            liquid_expression,
            sp0,
            lit(".."),
            sp0,
            liquid_expression,
            sp0,
            char(')'),
        ),
    )
    .parse(input)?;
    Ok((
        input,
        LiquidRange {
            start: range_start,
            end: range_end,
            position: Position::from_range(&start, &input),
        },
    ))
}

pub fn variable_lookup(input: Span) -> ParseResult<Span, VariableLookup> {
    let start = input;
    let (input, name) = opt(identifier).parse(input)?;
    let (input, lookups) = if name.is_some() {
        many0(lookup).parse(input)?
    } else {
        context("variable lookup", many1(lookup)).parse(input)?
    };
    Ok((
        input,
        VariableLookup {
            name: name.map(|n| n.fragment().to_string()),
            lookups,
            position: Position::from_range(&start, &input),
        },
    ))
}

/// A variable made of a single segment, as used by `increment` or `capture`.
pub fn variable_segment_as_lookup(input: Span) -> ParseResult<Span, LiquidExpression> {
    let (input, name) = variable_segment(input)?;
    Ok((
        input,
        LiquidExpression::VariableLookup(VariableLookup {
            name: Some(name.fragment().to_string()),
            lookups: vec![],
            position: Position::from_span(&name),
        }),
    ))
}

fn lookup(input: Span) -> ParseResult<Span, LiquidExpression> {
    alt((index_lookup, dot_lookup)).parse(input)
}

fn index_lookup(input: Span) -> ParseResult<Span, LiquidExpression> {
    delimited(
        (sp0, char('['), sp0),
        liquid_expression,
        (sp0, char(']')),
    )
    .parse(input)
}

fn dot_lookup(input: Span) -> ParseResult<Span, LiquidExpression> {
    let (input, name) = preceded((sp0, char('.'), sp0), identifier).parse(input)?;
    Ok((
        input,
        LiquidExpression::String(LiquidString {
            value: name.fragment().to_string(),
            single: false,
            position: Position::from_span(&name),
        }),
    ))
}

/// An expression followed by filters: `product.title | upcase | truncate: 10`.
pub fn liquid_variable(input: Span) -> ParseResult<Span, LiquidVariable> {
    let start = input;
    let (input, expression) = liquid_expression(input)?;
    let (input, filters) = many0(liquid_filter).parse(input)?;
    let raw_source = &start.fragment()[..consumed_len(&start, &input)];
    Ok((
        input,
        LiquidVariable {
            expression,
            filters,
            raw_source: raw_source.trim_end().to_string(),
            position: Position::from_range(&start, &input),
        },
    ))
}

pub fn liquid_filter(input: Span) -> ParseResult<Span, LiquidFilter> {
    let (input, _) = (sp0, char('|'), sp0).parse(input)?;
    let start = input;
    let (input, name) = context("filter", identifier).parse(input)?;
    let (input, args) = opt(preceded(
        (sp0, char(':'), sp0),
        separated_list1(argument_separator, liquid_argument),
    ))
    .parse(input)?;
    Ok((
        input,
        LiquidFilter {
            name: name.fragment().to_string(),
            args: args.unwrap_or_default(),
            position: Position::from_range(&start, &input),
        },
    ))
}

pub fn argument_separator(input: Span) -> ParseResult<Span, ()> {
    value((), (sp0, char(','), sp0)).parse(input)
}

/// Separator between `for` and `paginate` arguments, where the comma is
/// optional.
pub fn optional_comma_separator(input: Span) -> ParseResult<Span, ()> {
    value((), alt((argument_separator, value((), sp1)))).parse(input)
}

pub fn liquid_argument(input: Span) -> ParseResult<Span, LiquidArgument> {
    alt((
        map(named_argument, LiquidArgument::Named),
        map(liquid_expression, LiquidArgument::Positional),
    ))
    .parse(input)
}

pub fn named_argument(input: Span) -> ParseResult<Span, NamedArgument> {
    let start = input;
    let (input, (name, _, _, _, value)) =
        (variable_segment, sp0, char(':'), sp0, liquid_expression).parse(input)?;
    Ok((
        input,
        NamedArgument {
            name: name.fragment().to_string(),
            value,
            position: Position::from_range(&start, &input),
        },
    ))
}

pub fn conditional_expression(input: Span) -> ParseResult<Span, ConditionalExpression> {
    let (input, first) = condition(input)?;
    let (input, rest) = many0((preceded(sp1, relation), preceded(sp1, condition))).parse(input)?;
    Ok((input, fold_conditions(first, rest)))
}

fn relation(input: Span) -> ParseResult<Span, Relation> {
    alt((
        value(Relation::And, keyword("and")),
        value(Relation::Or, keyword("or")),
    ))
    .parse(input)
}

fn condition(input: Span) -> ParseResult<Span, ConditionalExpression> {
    alt((
        map(comparison, |c| ConditionalExpression::Comparison(Box::new(c))),
        map(liquid_expression, ConditionalExpression::Expression),
    ))
    .parse(input)
}

fn comparison(input: Span) -> ParseResult<Span, Comparison> {
    let start = input;
    let (input, (left, _, comparator, _, right)) =
        (liquid_expression, sp0, comparator, sp0, liquid_expression).parse(input)?;
    Ok((
        input,
        Comparison {
            comparator,
            left,
            right,
            position: Position::from_range(&start, &input),
        },
    ))
}

fn comparator(input: Span) -> ParseResult<Span, Comparator> {
    alt((
        value(Comparator::Eq, lit("==")),
        value(Comparator::Ne, lit("!=")),
        value(Comparator::Ge, lit(">=")),
        value(Comparator::Le, lit("<=")),
        value(Comparator::Gt, lit(">")),
        value(Comparator::Lt, lit("<")),
        value(Comparator::Contains, keyword("contains")),
    ))
    .parse(input)
}

/// Folds `a and b or c` into `a and (b or c)`.
fn fold_conditions(
    first: ConditionalExpression,
    mut rest: Vec<(Relation, ConditionalExpression)>,
) -> ConditionalExpression {
    let Some((mut relation, mut right)) = rest.pop() else {
        return first;
    };
    while let Some((previous, left)) = rest.pop() {
        right = logical(relation, left, right);
        relation = previous;
    }
    logical(relation, first, right)
}

fn logical(
    relation: Relation,
    left: ConditionalExpression,
    right: ConditionalExpression,
) -> ConditionalExpression {
    let position = Position::new(left.position().start, right.position().end);
    ConditionalExpression::Logical(Box::new(LogicalExpression {
        relation,
        left,
        right,
        position,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(s: &str) -> Span {
        Span::new_extra(s, 0)
    }

    fn lookup_name(expression: &LiquidExpression) -> Option<&str> {
        match expression {
            LiquidExpression::VariableLookup(v) => v.name.as_deref(),
            _ => None,
        }
    }

    #[test]
    fn test_string() {
        let (rest, s) = liquid_string(span("'it\"s' x")).unwrap();
        assert_eq!(s.value, "it\"s");
        assert!(s.single);
        assert_eq!(s.position, Position::new(0, 6));
        assert_eq!(*rest.fragment(), " x");

        let (_, s) = liquid_string(span("\"a\"")).unwrap();
        assert!(!s.single);
        assert!(liquid_string(span("'open")).is_err());
    }

    #[test]
    fn test_number() {
        assert_eq!(liquid_number(span("-1.5")).unwrap().1.value, "-1.5");
        let (rest, n) = liquid_number(span("1..3")).unwrap();
        assert_eq!(n.value, "1");
        assert_eq!(*rest.fragment(), "..3");
        assert!(liquid_number(span("1abc")).is_err());
    }

    #[test]
    fn test_literal() {
        assert_eq!(
            liquid_literal(span("nil")).unwrap().1.value,
            LiteralValue::Null
        );
        assert_eq!(
            liquid_literal(span("blank")).unwrap().1.value,
            LiteralValue::Empty
        );
        assert!(liquid_literal(span("nilly")).is_err());
        assert_eq!(
            lookup_name(&liquid_expression(span("nilly")).unwrap().1),
            Some("nilly")
        );
    }

    #[test]
    fn test_range() {
        let (rest, expression) = liquid_expression(span("(1..items.size)")).unwrap();
        assert_eq!(*rest.fragment(), "");
        let LiquidExpression::Range(range) = expression else {
            panic!("expected a range");
        };
        assert!(matches!(range.start, LiquidExpression::Number(_)));
        assert_eq!(lookup_name(&range.end), Some("items"));
    }

    #[test]
    fn test_variable_lookup() {
        let (rest, lookup) = variable_lookup(span("product.variants[0]['title'] |")).unwrap();
        assert_eq!(*rest.fragment(), " |");
        assert_eq!(lookup.name.as_deref(), Some("product"));
        assert_eq!(lookup.lookups.len(), 3);
        assert!(matches!(
            &lookup.lookups[0],
            LiquidExpression::String(LiquidString { value, .. }) if value == "variants"
        ));
        assert!(matches!(&lookup.lookups[1], LiquidExpression::Number(_)));

        let (_, lookup) = variable_lookup(span("['key'].size")).unwrap();
        assert_eq!(lookup.name, None);
        assert_eq!(lookup.lookups.len(), 2);
    }

    #[test]
    fn test_variable_with_filters() {
        let (rest, variable) =
            liquid_variable(span("title | truncate: 10, '...' | append: suffix: true  ")).unwrap();
        assert_eq!(*rest.fragment(), "  ");
        assert_eq!(variable.filters.len(), 2);
        assert_eq!(variable.filters[0].name, "truncate");
        assert_eq!(variable.filters[0].args.len(), 2);
        assert!(matches!(
            &variable.filters[1].args[0],
            LiquidArgument::Named(NamedArgument { name, .. }) if name == "suffix"
        ));
        assert_eq!(
            variable.raw_source,
            "title | truncate: 10, '...' | append: suffix: true"
        );
    }

    #[test]
    fn test_conditional_folds_right() {
        let (rest, condition) =
            conditional_expression(span("a == 1 and b or c contains 'x'")).unwrap();
        assert_eq!(*rest.fragment(), "");
        let ConditionalExpression::Logical(outer) = condition else {
            panic!("expected a logical expression");
        };
        assert_eq!(outer.relation, Relation::And);
        assert!(matches!(outer.left, ConditionalExpression::Comparison(_)));
        let ConditionalExpression::Logical(inner) = &outer.right else {
            panic!("expected a nested logical expression");
        };
        assert_eq!(inner.relation, Relation::Or);
        assert!(matches!(
            &inner.right,
            ConditionalExpression::Comparison(c) if c.comparator == Comparator::Contains
        ));
        assert_eq!(outer.position, Position::new(0, 30));
    }
}
