//! Liquid drops, tags, branches and raw tags.

use crate::ast::{Ast, NodeId, NodeKind, RawMarkup, TagMarkup};
use crate::cst::{ConditionalExpression, DropMarkup, NamedMarkup, Trim};
use crate::doc::{
    docs, group, group_with, hardline, if_break, indent, join, line, remove_lines,
    replace_text_end_of_line, softline, Doc,
};

use super::embed::format_json;
use super::utils::*;
use super::{lines_to_docs, Args, Printer};

/// Tags printed on several lines whatever their width.
const TAGS_THAT_ALWAYS_BREAK: [&str; 2] = ["for", "case"];

fn needs_block_start_leading_stripping(ast: &Ast, id: NodeId) -> bool {
    let node = &ast[id];
    match node.kind {
        NodeKind::LiquidTag(_) => {
            !is_attribute_node(ast, id) && has_meaningful_lack_of_leading_whitespace(node)
        }
        NodeKind::LiquidBranch(_) => {
            !node
                .family
                .parent
                .is_some_and(|parent| is_attribute_node(ast, parent))
                && has_meaningful_lack_of_leading_whitespace(node)
        }
        _ => false,
    }
}

fn needs_block_start_trailing_stripping(ast: &Ast, id: NodeId) -> bool {
    let node = &ast[id];
    match node.kind {
        NodeKind::LiquidTag(_) => {
            if node.is_branched_tag() {
                return node
                    .family
                    .first_child
                    .is_some_and(|first| needs_block_start_leading_stripping(ast, first));
            }
            if !node.is_parent() {
                return has_meaningful_lack_of_trailing_whitespace(node);
            }
            match node.family.first_child {
                Some(first) => has_meaningful_lack_of_leading_whitespace(&ast[first]),
                None => has_meaningful_lack_of_dangling_whitespace(node),
            }
        }
        NodeKind::LiquidBranch(_) => {
            if node
                .family
                .parent
                .is_some_and(|parent| is_attribute_node(ast, parent))
            {
                return false;
            }
            match node.family.first_child {
                Some(first) => has_meaningful_lack_of_leading_whitespace(&ast[first]),
                None => has_meaningful_lack_of_dangling_whitespace(node),
            }
        }
        _ => false,
    }
}

fn needs_block_end_leading_stripping(ast: &Ast, id: NodeId) -> bool {
    let node = &ast[id];
    if is_attribute_node(ast, id) {
        return false;
    }
    match node.family.last_child {
        Some(last) => has_meaningful_lack_of_trailing_whitespace(&ast[last]),
        None => has_meaningful_lack_of_dangling_whitespace(node),
    }
}

/// An extra line when the source had a blank line between two statements.
fn space_between_statements(ast: &Ast, id: NodeId) -> Doc {
    let Some(prev) = ast[id].family.prev else {
        return Doc::nil();
    };
    let between = ast
        .source()
        .get(ast[prev].position.end..ast[id].position.start)
        .unwrap_or_default();
    if between.matches('\n').count() > 1 {
        hardline()
    } else {
        Doc::nil()
    }
}

fn has_trailing_line(condition: &ConditionalExpression) -> bool {
    matches!(
        condition,
        ConditionalExpression::Comparison(_) | ConditionalExpression::Logical(_)
    )
}

impl Printer<'_> {
    pub(super) fn print_liquid_drop(&self, id: NodeId, args: Args) -> Doc {
        let node = &self.ast[id];
        let NodeKind::LiquidDrop {
            markup,
            whitespace_start,
            whitespace_end,
        } = &node.kind
        else {
            return Doc::nil();
        };

        let whitespace_start = whitespace_trim(
            *whitespace_start,
            has_meaningful_lack_of_leading_whitespace(node),
            args.leading_space_group_id,
        );
        let whitespace_end = whitespace_trim(
            *whitespace_end,
            has_meaningful_lack_of_trailing_whitespace(node),
            args.trailing_space_group_id,
        );

        match markup {
            DropMarkup::Variable(variable) => {
                let whitespace = if variable.filters.is_empty() {
                    Doc::from(" ")
                } else {
                    line()
                };
                group(docs![
                    "{{",
                    whitespace_start,
                    indent(docs![whitespace.clone(), self.print_variable(variable)]),
                    whitespace,
                    whitespace_end,
                    "}}",
                ])
            }
            DropMarkup::Raw(markup) => {
                let lines = markup_lines(markup);
                if lines.len() > 1 {
                    return group(docs![
                        "{{",
                        whitespace_start,
                        indent(docs![
                            hardline(),
                            join(hardline(), lines.into_iter().map(|line| Doc::from(line.trim()))),
                        ]),
                        hardline(),
                        whitespace_end,
                        "}}",
                    ]);
                }
                group(docs!["{{", whitespace_start, " ", markup.trim(), " ", whitespace_end, "}}"])
            }
        }
    }

    pub(super) fn print_liquid_tag(&self, id: NodeId, args: Args) -> Doc {
        let ast = self.ast;
        let node = &ast[id];
        let Some(tag) = node.as_liquid_tag() else {
            return Doc::nil();
        };
        if !node.is_parent() || node.block_end_position.is_none() {
            return self.print_liquid_block_start(id, args);
        }

        let tag_group_id = self.fresh_id();
        let block_start = self.print_liquid_block_start(
            id,
            Args {
                trailing_space_group_id: Some(tag_group_id),
                ..args
            },
        );
        let block_end = self.print_liquid_block_end(
            id,
            Args {
                leading_space_group_id: Some(tag_group_id),
                ..args
            },
        );
        let inner_args = Args {
            leading_space_group_id: Some(tag_group_id),
            trailing_space_group_id: Some(tag_group_id),
            ..args
        };

        let body = if node.is_branched_tag() {
            let branches: Vec<Doc> = node
                .children()
                .iter()
                .map(|&branch| self.print_node(branch, inner_args))
                .filter(|doc| !doc.is_empty())
                .collect();
            if tag.name == "case" {
                indent(branches)
            } else {
                Doc::Concat(branches)
            }
        } else if !node.children().is_empty() {
            indent(docs![
                self.inner_leading_whitespace(id),
                self.print_children(id, inner_args),
            ])
        } else {
            Doc::nil()
        };

        let should_break = TAGS_THAT_ALWAYS_BREAK.contains(&tag.name.as_str())
            || originally_had_line_breaks(ast, id)
            || is_attribute_node(ast, id)
            || is_deeply_nested(ast, id);
        log::trace!("tag {} breaks: {should_break}", tag.name);

        group_with(
            docs![block_start, body, self.inner_trailing_whitespace(id), block_end],
            Some(tag_group_id),
            should_break,
        )
    }

    /// Opening delimiter of a tag or a named branch.
    fn print_liquid_block_start(&self, id: NodeId, args: Args) -> Doc {
        let ast = self.ast;
        let node = &ast[id];
        let (name, markup, whitespace_start, whitespace_end) = match &node.kind {
            NodeKind::LiquidTag(tag) => (
                tag.name.as_str(),
                &tag.markup,
                tag.whitespace_start,
                tag.whitespace_end,
            ),
            NodeKind::LiquidBranch(branch) => match &branch.name {
                Some(name) => (
                    name.as_str(),
                    &branch.markup,
                    branch.whitespace_start,
                    branch.whitespace_end,
                ),
                None => return Doc::nil(),
            },
            _ => return Doc::nil(),
        };

        let whitespace_start = whitespace_trim(
            whitespace_start,
            needs_block_start_leading_stripping(ast, id),
            args.leading_space_group_id,
        );
        let whitespace_end = whitespace_trim(
            whitespace_end,
            needs_block_start_trailing_stripping(ast, id),
            args.trailing_space_group_id,
        );

        let markup = match markup {
            TagMarkup::Named(named) => {
                return self.print_named_block_start(name, named, args, whitespace_start, whitespace_end)
            }
            TagMarkup::Statements(statements) => {
                return self.print_liquid_statements(name, statements, args, whitespace_start, whitespace_end)
            }
            TagMarkup::Raw(markup) => markup,
        };

        if args.is_liquid_statement {
            let skip_leading_space =
                markup.trim().is_empty() || (name == "#" && markup.starts_with('#'));
            return remove_lines(docs![
                name,
                if skip_leading_space { "" } else { " " },
                markup.as_str(),
            ]);
        }

        let lines = markup_lines(markup);
        if name == "liquid" {
            let lines = lines.into_iter().map(str::to_string).collect();
            return group(docs![
                "{%",
                whitespace_start,
                " ",
                name,
                indent(docs![hardline(), join(hardline(), lines_to_docs(reindent(lines, true)))]),
                hardline(),
                whitespace_end,
                "%}",
            ]);
        }
        if lines.len() > 1 {
            return group(docs![
                "{%",
                whitespace_start,
                indent(docs![
                    hardline(),
                    name,
                    " ",
                    join(hardline(), lines.into_iter().map(|line| Doc::from(line.trim()))),
                ]),
                hardline(),
                whitespace_end,
                "%}",
            ]);
        }

        let markup = markup.trim();
        group(docs![
            "{%",
            whitespace_start,
            " ",
            name,
            if markup.is_empty() {
                String::new()
            } else {
                format!(" {markup}")
            },
            " ",
            whitespace_end,
            "%}",
        ])
    }

    fn print_named_block_start(
        &self,
        name: &str,
        markup: &NamedMarkup,
        args: Args,
        whitespace_start: Doc,
        whitespace_end: Doc,
    ) -> Doc {
        let statement = args.is_liquid_statement;
        let tag = |separator: Doc, printed_markup: Doc, trailing: Doc| {
            let mut parts = Vec::new();
            if !statement {
                parts.extend([Doc::from("{%"), whitespace_start.clone(), Doc::from(" ")]);
            }
            parts.extend([Doc::from(name), separator, indent(printed_markup)]);
            if !statement {
                parts.extend([trailing, whitespace_end.clone(), Doc::from("%}")]);
            }
            if statement {
                remove_lines(Doc::Concat(parts))
            } else {
                group(parts)
            }
        };
        let line_if = |condition: bool| if condition { line() } else { Doc::from(" ") };

        let printed = self.print_named_markup(markup);
        match markup {
            NamedMarkup::Echo(variable) => tag(" ".into(), printed, line_if(!variable.filters.is_empty())),
            NamedMarkup::Assign(assign) => {
                tag(" ".into(), printed, line_if(!assign.value.filters.is_empty()))
            }
            NamedMarkup::Cycle(cycle) => {
                let separator = if cycle.group_name.is_some() { " " } else { "" };
                tag(separator.into(), printed, line_if(cycle.args.len() > 1))
            }
            NamedMarkup::Render(render) => tag(
                " ".into(),
                printed,
                line_if(!render.args.is_empty() || (render.variable.is_some() && render.alias.is_some())),
            ),
            NamedMarkup::Expression(_) => tag(" ".into(), printed, " ".into()),
            NamedMarkup::Form(args) => tag(" ".into(), printed, line_if(args.len() > 1)),
            NamedMarkup::For(markup) => tag(
                " ".into(),
                printed,
                line_if(markup.reversed || !markup.args.is_empty()),
            ),
            NamedMarkup::Paginate(_) => tag(" ".into(), printed, line()),
            NamedMarkup::Conditional(condition) => {
                tag(" ".into(), printed, line_if(has_trailing_line(condition)))
            }
            NamedMarkup::When(values) => tag(" ".into(), printed, line_if(values.len() > 1)),
        }
    }

    /// `{% liquid %}`: one statement per line, blank lines kept.
    fn print_liquid_statements(
        &self,
        name: &str,
        statements: &[NodeId],
        args: Args,
        whitespace_start: Doc,
        whitespace_end: Doc,
    ) -> Doc {
        let statement_args = Args {
            is_liquid_statement: true,
            ..args
        };
        let printed = statements.iter().map(|&statement| {
            docs![
                space_between_statements(self.ast, statement),
                self.print_node(statement, statement_args),
            ]
        });
        let body = indent(docs![hardline(), join(hardline(), printed)]);

        if args.is_liquid_statement {
            return group(docs![name, body]);
        }
        group(docs![
            "{%",
            whitespace_start,
            " ",
            name,
            body,
            hardline(),
            whitespace_end,
            "%}",
        ])
    }

    fn print_liquid_block_end(&self, id: NodeId, args: Args) -> Doc {
        let ast = self.ast;
        let node = &ast[id];
        let Some(tag) = node.as_liquid_tag() else {
            return Doc::nil();
        };
        if !node.is_parent() || node.block_end_position.is_none() {
            return Doc::nil();
        }
        if args.is_liquid_statement {
            return docs!["end", tag.name.as_str()];
        }

        let whitespace_start = whitespace_trim(
            tag.delimiter_whitespace_start.unwrap_or(Trim::Keep),
            needs_block_end_leading_stripping(ast, id),
            args.leading_space_group_id,
        );
        let whitespace_end = whitespace_trim(
            tag.delimiter_whitespace_end.unwrap_or(Trim::Keep),
            has_meaningful_lack_of_trailing_whitespace(node),
            args.trailing_space_group_id,
        );
        group(docs![
            "{%",
            whitespace_start,
            format!(" end{} ", tag.name),
            whitespace_end,
            "%}",
        ])
    }

    pub(super) fn print_liquid_branch(&self, id: NodeId, args: Args) -> Doc {
        let ast = self.ast;
        let node = &ast[id];
        let Some(branch) = node.as_branch() else {
            return Doc::nil();
        };

        if branch.name.is_none() {
            return self.print_default_branch(id, args);
        }

        let prev_is_empty = node
            .family
            .prev
            .is_some_and(|prev| ast[prev].children().is_empty());
        let outer_leading_whitespace = if node.annotation.has_leading_whitespace && !prev_is_empty {
            line()
        } else {
            softline()
        };

        docs![
            outer_leading_whitespace,
            self.print_liquid_block_start(id, args),
            indent(docs![
                self.inner_leading_whitespace(id),
                self.print_children(id, args),
            ]),
        ]
    }

    /// The unnamed first branch, printed right after the tag's opening.
    fn print_default_branch(&self, id: NodeId, args: Args) -> Doc {
        let ast = self.ast;
        let node = &ast[id];
        let Some(parent) = node.family.parent else {
            return Doc::nil();
        };

        if node.children().is_empty() {
            if ast[parent].children().len() == 1 || !node.annotation.has_dangling_whitespace {
                return Doc::nil();
            }
        }
        if node.annotation.has_dangling_whitespace {
            return if_break("", " ", None);
        }

        indent(docs![
            self.inner_leading_whitespace(parent),
            self.print_children(id, args),
        ])
    }

    fn inner_leading_whitespace(&self, id: NodeId) -> Doc {
        let node = &self.ast[id];
        let Some(first) = node.family.first_child else {
            return if node.annotation.is_dangling_whitespace_sensitive
                && node.annotation.has_dangling_whitespace
            {
                line()
            } else {
                Doc::nil()
            };
        };
        let first = &self.ast[first].annotation;
        if first.has_leading_whitespace && first.is_leading_whitespace_sensitive {
            line()
        } else {
            softline()
        }
    }

    fn inner_trailing_whitespace(&self, id: NodeId) -> Doc {
        let node = &self.ast[id];
        if matches!(node.kind, NodeKind::LiquidBranch(_)) || node.block_end_position.is_none() {
            return Doc::nil();
        }
        let Some(last) = node.family.last_child else {
            return Doc::nil();
        };
        let last = &self.ast[last].annotation;
        if last.has_trailing_whitespace && last.is_trailing_whitespace_sensitive {
            line()
        } else {
            softline()
        }
    }

    pub(super) fn print_liquid_raw_tag(&self, id: NodeId, args: Args) -> Doc {
        let node = &self.ast[id];
        let NodeKind::LiquidRawTag(tag) = &node.kind else {
            return Doc::nil();
        };
        let name = tag.name.as_str();
        let body = &tag.body;

        let (block_start, block_end) = if args.is_liquid_statement {
            (Doc::from(name), docs!["end", name])
        } else {
            (
                group(docs![
                    "{%",
                    tag.whitespace_start.as_str(),
                    " ",
                    name,
                    " ",
                    tag.whitespace_end.as_str(),
                    "%}",
                ]),
                docs![
                    "{%",
                    tag.delimiter_whitespace_start.as_str(),
                    " end",
                    name,
                    " ",
                    tag.delimiter_whitespace_end.as_str(),
                    "%}",
                ],
            )
        };

        let print_as_is = name == "raw"
            || !has_line_break_in_range(self.source(), body.position.start, body.position.end);
        let printed_body = if print_as_is {
            replace_text_end_of_line(self.ast.slice(body.position))
        } else if body.value.trim().is_empty() {
            hardline()
        } else if name == "schema" {
            self.print_schema(body)
        } else {
            docs![indent(docs![hardline(), self.print_raw_markup(body)]), hardline()]
        };

        docs![block_start, printed_body, block_end]
    }

    /// `{% schema %}` stays flush with the tag unless `indent_schema` is set,
    /// in which case valid JSON is also re-serialized.
    fn print_schema(&self, body: &RawMarkup) -> Doc {
        if !self.options.indent_schema {
            return docs![hardline(), self.print_raw_markup(body), hardline()];
        }
        let printed = match format_json(&body.value, self.options.tab_width) {
            Some(json) => join(hardline(), json.lines().map(Doc::from)),
            None => self.print_raw_markup(body),
        };
        docs![indent(docs![hardline(), printed]), hardline()]
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ast::parse_ast;
    use crate::config::FormatOptions;
    use crate::preprocess::preprocess;

    fn annotated(source: &str) -> Ast {
        let mut ast = parse_ast(source).unwrap();
        preprocess(&mut ast, &FormatOptions::default());
        ast
    }

    #[test]
    fn test_space_between_statements() {
        let ast = annotated("{% liquid\n  assign a = 1\n\n  echo a\n  echo b\n%}");
        let tag = ast[ast.root()].children()[0];
        let Some(TagMarkup::Statements(statements)) =
            ast[tag].as_liquid_tag().map(|tag| &tag.markup)
        else {
            panic!("expected statements");
        };
        assert_eq!(space_between_statements(&ast, statements[0]), Doc::nil());
        assert_eq!(space_between_statements(&ast, statements[1]), hardline());
        assert_eq!(space_between_statements(&ast, statements[2]), Doc::nil());
    }

    #[test]
    fn test_block_start_stripping_follows_first_child() {
        let ast = annotated("<span>{% if a %}<b>x</b>{% endif %}</span>");
        let span = ast[ast.root()].children()[0];
        let tag = ast[span].children()[0];
        assert_eq!(
            needs_block_start_trailing_stripping(&ast, tag),
            ast[tag]
                .family
                .first_child
                .is_some_and(|branch| needs_block_start_leading_stripping(&ast, branch))
        );
    }

    #[test]
    fn test_trailing_line_after_comparisons() {
        let ast = annotated("{% if a == b %}{% endif %}{% if a %}{% endif %}");
        let conditions: Vec<bool> = ast[ast.root()]
            .children()
            .iter()
            .filter_map(|&tag| match &ast[tag].as_liquid_tag()?.markup {
                TagMarkup::Named(NamedMarkup::Conditional(condition)) => {
                    Some(has_trailing_line(condition))
                }
                _ => None,
            })
            .collect();
        assert_eq!(conditions, vec![true, false]);
    }
}
