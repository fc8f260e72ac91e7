//! Span and position utilities for CST

use nom_locate::LocatedSpan;

/// Input type of the parsers. The extra field is the byte offset of the
/// fragment's origin inside the whole document, so a sub-grammar parsed from a
/// copied slice still reports absolute positions.
pub type Span<'a> = LocatedSpan<&'a str, usize>;

/// Half-open byte range into the source text.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub start: usize,
    pub end: usize,
}

impl Position {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Absolute offset of the first character of `span`.
    pub fn offset(span: &Span) -> usize {
        span.location_offset() + span.extra
    }

    /// Range between the starts of two spans, the second being the remaining
    /// input after the construct.
    pub fn from_range(start_span: &Span, end_span: &Span) -> Self {
        Self::new(Self::offset(start_span), Self::offset(end_span))
    }

    /// Range covered by `span` itself.
    pub fn from_span(span: &Span) -> Self {
        let start = Self::offset(span);
        Self::new(start, start + span.fragment().len())
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn slice<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.start..self.end).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use nom::Input;

    use super::*;

    #[test]
    fn test_position_from_span_with_base() {
        let span = Span::new_extra("abc def", 10);
        let rest = span.take_from(4);
        assert_eq!(Position::offset(&rest), 14);
        assert_eq!(Position::from_range(&span, &rest), Position::new(10, 14));
        assert_eq!(Position::from_span(&rest), Position::new(14, 17));
    }

    #[test]
    fn test_position_slice() {
        let position = Position::new(2, 5);
        assert_eq!(position.slice("{{ x }}"), " x ");
        assert_eq!(position.len(), 3);
        assert!(!position.is_empty());
        assert_eq!(Position::new(3, 30).slice("short"), "");
    }
}
