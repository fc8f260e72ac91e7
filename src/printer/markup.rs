//! Structured markup of drops and tags.

use crate::cst::{
    ConditionalExpression, LiquidArgument, LiquidExpression, LiquidFilter, LiquidVariable,
    NamedArgument, NamedMarkup,
};
use crate::doc::{docs, group, indent, join, line, Doc};

use super::Printer;

/// Lookups written with a dot: `product.title`, `items.first?`.
fn is_dot_lookup(value: &str) -> bool {
    let name = value.strip_suffix('?').unwrap_or(value);
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn comma_line() -> Doc {
    docs![",", line()]
}

impl Printer<'_> {
    pub(super) fn print_named_markup(&self, markup: &NamedMarkup) -> Doc {
        match markup {
            NamedMarkup::Assign(assign) => {
                docs![assign.name.as_str(), " = ", self.print_variable(&assign.value)]
            }
            NamedMarkup::Cycle(cycle) => {
                let mut parts = Vec::new();
                if let Some(group_name) = &cycle.group_name {
                    parts.push(self.print_expression(group_name, false));
                    parts.push(Doc::from(":"));
                }
                let whitespace = if cycle.args.len() > 1 {
                    line()
                } else {
                    Doc::from(" ")
                };
                parts.push(whitespace.clone());
                parts.push(join(
                    docs![",", whitespace],
                    cycle.args.iter().map(|arg| self.print_expression(arg, false)),
                ));
                Doc::Concat(parts)
            }
            NamedMarkup::Echo(variable) => self.print_variable(variable),
            NamedMarkup::Expression(expression) => self.print_expression(expression, false),
            NamedMarkup::Render(render) => {
                let mut parts = vec![self.print_expression(&render.snippet, false)];
                if let Some(variable) = &render.variable {
                    parts.push(if render.alias.is_some() {
                        line()
                    } else {
                        Doc::from(" ")
                    });
                    parts.push(docs![
                        variable.kind.as_str(),
                        " ",
                        self.print_expression(&variable.name, false),
                    ]);
                }
                if let Some(alias) = &render.alias {
                    parts.push(docs![" as ", alias.as_str()]);
                }
                if !render.args.is_empty() {
                    parts.push(comma_line());
                    parts.push(self.print_named_arguments(&render.args));
                }
                Doc::Concat(parts)
            }
            NamedMarkup::Form(args) => join(
                comma_line(),
                args.iter().map(|arg| self.print_argument(arg)),
            ),
            NamedMarkup::For(markup) => {
                let mut parts = vec![
                    Doc::from(markup.variable_name.as_str()),
                    Doc::from(" in "),
                    self.print_expression(&markup.collection, false),
                ];
                if markup.reversed {
                    parts.push(docs![line(), "reversed"]);
                }
                if !markup.args.is_empty() {
                    parts.push(line());
                    parts.push(join(
                        line(),
                        markup.args.iter().map(|arg| self.print_named_argument(arg)),
                    ));
                }
                Doc::Concat(parts)
            }
            NamedMarkup::Paginate(markup) => {
                let mut parts = vec![
                    self.print_expression(&markup.collection, false),
                    line(),
                    Doc::from("by "),
                    self.print_expression(&markup.page_size, false),
                ];
                if !markup.args.is_empty() {
                    parts.push(comma_line());
                    parts.push(self.print_named_arguments(&markup.args));
                }
                Doc::Concat(parts)
            }
            NamedMarkup::Conditional(condition) => self.print_conditional(condition),
            NamedMarkup::When(values) => join(
                comma_line(),
                values.iter().map(|value| self.print_expression(value, false)),
            ),
        }
    }

    pub(super) fn print_conditional(&self, condition: &ConditionalExpression) -> Doc {
        match condition {
            ConditionalExpression::Logical(logical) => docs![
                self.print_conditional(&logical.left),
                line(),
                logical.relation.as_str(),
                " ",
                self.print_conditional(&logical.right),
            ],
            ConditionalExpression::Comparison(comparison) => group(docs![
                self.print_expression(&comparison.left, false),
                indent(docs![
                    line(),
                    comparison.comparator.as_str(),
                    " ",
                    self.print_expression(&comparison.right, false),
                ]),
            ]),
            ConditionalExpression::Expression(expression) => self.print_expression(expression, false),
        }
    }

    /// An expression followed by its filters, one per line when broken.
    pub(super) fn print_variable(&self, variable: &LiquidVariable) -> Doc {
        let expression = self.print_expression(&variable.expression, false);
        if variable.filters.is_empty() {
            return expression;
        }
        docs![
            expression,
            line(),
            join(line(), variable.filters.iter().map(|filter| self.print_filter(filter))),
        ]
    }

    fn print_filter(&self, filter: &LiquidFilter) -> Doc {
        let mut parts = vec![Doc::from("| "), Doc::from(filter.name.as_str())];
        match filter.args.split_first() {
            None => {}
            Some((LiquidArgument::Positional(first), rest)) => {
                parts.push(Doc::from(": "));
                parts.push(self.print_expression(first, false));
                if !rest.is_empty() {
                    parts.push(indent(docs![
                        comma_line(),
                        join(comma_line(), rest.iter().map(|arg| self.print_argument(arg))),
                    ]));
                }
            }
            Some(_) => {
                parts.push(Doc::from(":"));
                parts.push(indent(docs![
                    line(),
                    join(comma_line(), filter.args.iter().map(|arg| self.print_argument(arg))),
                ]));
            }
        }
        group(parts)
    }

    fn print_argument(&self, argument: &LiquidArgument) -> Doc {
        match argument {
            LiquidArgument::Positional(expression) => self.print_expression(expression, false),
            LiquidArgument::Named(named) => self.print_named_argument(named),
        }
    }

    fn print_named_argument(&self, argument: &NamedArgument) -> Doc {
        docs![
            argument.name.as_str(),
            ": ",
            self.print_expression(&argument.value, false),
        ]
    }

    fn print_named_arguments(&self, arguments: &[NamedArgument]) -> Doc {
        join(
            comma_line(),
            arguments.iter().map(|arg| self.print_named_argument(arg)),
        )
    }

    /// `truncate` drops the fraction of numbers, as inside ranges.
    pub(super) fn print_expression(&self, expression: &LiquidExpression, truncate: bool) -> Doc {
        match expression {
            LiquidExpression::String(string) => {
                let preferred = if self.options.liquid_single_quote { '\'' } else { '"' };
                let quote = match (preferred, string.value.contains(preferred)) {
                    ('"', true) | ('\'', false) => "'",
                    _ => "\"",
                };
                docs![quote, string.value.as_str(), quote]
            }
            LiquidExpression::Number(number) => {
                let value = number.value.as_str();
                if !truncate {
                    return Doc::from(value);
                }
                match value.rsplit_once('.') {
                    Some((whole, fraction))
                        if !fraction.is_empty() && fraction.chars().all(|c| c.is_ascii_digit()) =>
                    {
                        Doc::from(whole)
                    }
                    _ => Doc::from(value),
                }
            }
            LiquidExpression::Literal(literal) => match literal.keyword.as_str() {
                "nil" => Doc::from("null"),
                keyword => Doc::from(keyword),
            },
            LiquidExpression::Range(range) => docs![
                "(",
                self.print_expression(&range.start, true),
                "..",
                self.print_expression(&range.end, true),
                ")",
            ],
            LiquidExpression::VariableLookup(lookup) => {
                let mut parts = vec![Doc::from(lookup.name.as_deref().unwrap_or_default())];
                for (index, part) in lookup.lookups.iter().enumerate() {
                    let is_global_string_lookup = index == 0 && lookup.name.is_none();
                    match part {
                        LiquidExpression::String(string)
                            if !is_global_string_lookup && is_dot_lookup(&string.value) =>
                        {
                            parts.push(docs![".", string.value.as_str()]);
                        }
                        _ => parts.push(docs!["[", self.print_expression(part, false), "]"]),
                    }
                }
                Doc::Concat(parts)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::is_dot_lookup;
    use crate::ast::{parse_ast, NodeKind};
    use crate::config::FormatOptions;
    use crate::cst::DropMarkup;
    use crate::doc::{group, render};
    use crate::printer::{PassThrough, Printer};

    fn print_drop_markup(source: &str, options: &FormatOptions) -> String {
        let ast = parse_ast(source).unwrap();
        let drop = ast[ast.root()].children()[0];
        let NodeKind::LiquidDrop {
            markup: DropMarkup::Variable(variable),
            ..
        } = &ast[drop].kind
        else {
            panic!("expected a parsed drop");
        };
        let printer = Printer::new(&ast, options, &PassThrough);
        render(
            &group(printer.print_variable(variable)),
            options.print_width,
            options.tab_width,
        )
    }

    #[test]
    fn test_dot_lookup() {
        assert!(is_dot_lookup("title"));
        assert!(is_dot_lookup("first?"));
        assert!(is_dot_lookup("Image_2"));
        assert!(!is_dot_lookup("data-id"));
        assert!(!is_dot_lookup(""));
    }

    #[test]
    fn test_lookups() {
        let options = FormatOptions::default();
        assert_eq!(print_drop_markup("{{ product['title'] }}", &options), "product.title");
        assert_eq!(print_drop_markup("{{ product['data-id'] }}", &options), "product['data-id']");
        assert_eq!(print_drop_markup("{{ ['x'] }}", &options), "['x']");
    }

    #[test]
    fn test_string_quotes() {
        let mut options = FormatOptions::default();
        assert_eq!(print_drop_markup("{{ \"a\" }}", &options), "'a'");
        assert_eq!(print_drop_markup("{{ \"it's\" }}", &options), "\"it's\"");
        options.liquid_single_quote = false;
        assert_eq!(print_drop_markup("{{ 'a' }}", &options), "\"a\"");
    }

    #[test]
    fn test_nil_prints_as_null() {
        let options = FormatOptions::default();
        assert_eq!(print_drop_markup("{{ nil }}", &options), "null");
    }

    #[test]
    fn test_range_truncates_numbers() {
        let options = FormatOptions::default();
        assert_eq!(print_drop_markup("{{ (1.5..3) }}", &options), "(1..3)");
    }

    #[test]
    fn test_filters() {
        let options = FormatOptions::default();
        assert_eq!(
            print_drop_markup("{{ x | default: 'a', allow_false: true | upcase }}", &options),
            "x | default: 'a', allow_false: true | upcase"
        );
        assert_eq!(
            print_drop_markup("{{ x | img_url: width: 100 }}", &options),
            "x | img_url: width: 100"
        );
    }
}
