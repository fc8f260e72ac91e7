use nom::bytes::complete::take_until;
use nom::branch::alt;
use nom::combinator::{eof, value};
use nom::error::context;
use nom::Parser;

use crate::cst::*;
use crate::result::ParseResult;

use super::common::*;

/// Start of anything that is not text.
fn opens_node(rest: &str) -> bool {
    rest.starts_with('<') || rest.starts_with("{{") || rest.starts_with("{%")
}

/// Text up to the next tag, drop or element, without trailing whitespace.
/// Leading whitespace is consumed by the caller.
pub fn text_node(input: Span) -> ParseResult<Span, ConcreteNode> {
    let (input, text) = take_text1(opens_node)(input)?;
    let text = trim_span(text);
    Ok((
        input,
        ConcreteNode::new(
            ConcreteKind::TextNode {
                value: text.fragment().to_string(),
            },
            Position::from_span(&text),
        ),
    ))
}

/// `---` fenced block. Only valid at the start of a document.
pub fn yaml_frontmatter(input: Span) -> ParseResult<Span, ConcreteNode> {
    let start = input;
    let (input, _) = (lit("---"), hsp0, line_break).parse(input)?;
    let (input, body) = context("front matter", take_until("---")).parse(input)?;
    let (input, _) = (lit("---"), hsp0, alt((value((), line_break), value((), eof)))).parse(input)?;
    Ok((
        input,
        ConcreteNode::new(
            ConcreteKind::YamlFrontmatter {
                body: body.fragment().to_string(),
            },
            Position::from_range(&start, &input),
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(s: &str) -> Span {
        Span::new_extra(s, 0)
    }

    #[test]
    fn test_text_is_trimmed_at_the_end() {
        let (rest, node) = text_node(span("Hello,  world \n<b>")).unwrap();
        assert_eq!(*rest.fragment(), "<b>");
        assert_eq!(
            node.kind,
            ConcreteKind::TextNode {
                value: "Hello,  world".to_string()
            }
        );
        assert_eq!(node.position, Position::new(0, 13));
    }

    #[test]
    fn test_text_stops_at_liquid() {
        let (rest, node) = text_node(span("a { b {{ c }}")).unwrap();
        assert_eq!(*rest.fragment(), "{{ c }}");
        assert_eq!(node.position, Position::new(0, 5));
    }

    #[test]
    fn test_frontmatter() {
        let source = "---\ntitle: x\n---\n<p></p>";
        let (rest, node) = yaml_frontmatter(span(source)).unwrap();
        assert_eq!(*rest.fragment(), "<p></p>");
        assert_eq!(
            node.kind,
            ConcreteKind::YamlFrontmatter {
                body: "title: x\n".to_string()
            }
        );
        assert_eq!(node.position, Position::new(0, 17));
    }
}
