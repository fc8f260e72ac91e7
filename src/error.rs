use std::fmt;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The source does not match the template grammar.
    #[error("{0}")]
    Grammar(LocatedError),
    /// The source parsed but its open and close markers do not pair up.
    #[error("{0}")]
    Structural(LocatedError),
    #[cfg(feature = "serde")]
    #[error("Invalid options: {0}")]
    Options(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn grammar(message: impl Into<String>, source: &str, start: usize, end: usize) -> Self {
        Error::Grammar(LocatedError::new(message, source, start, end))
    }

    pub(crate) fn structural(
        message: impl Into<String>,
        source: &str,
        start: usize,
        end: usize,
    ) -> Self {
        Error::Structural(LocatedError::new(message, source, start, end))
    }

    /// The source location of a grammar or structural error.
    pub fn location(&self) -> Option<&LocatedError> {
        match self {
            Error::Grammar(e) | Error::Structural(e) => Some(e),
            #[cfg(feature = "serde")]
            Error::Options(_) => None,
        }
    }

    pub fn is_grammar(&self) -> bool {
        matches!(self, Error::Grammar(_))
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, Error::Structural(_))
    }
}

/// An error message anchored to a byte range of the source it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedError {
    pub message: String,
    /// Byte offset of the offending construct.
    pub start: usize,
    pub end: usize,
    /// 1-based line of `start`.
    pub line: usize,
    /// 1-based column of `start`, counted in characters.
    pub column: usize,
    pub source: String,
}

impl LocatedError {
    pub fn new(message: impl Into<String>, source: &str, start: usize, end: usize) -> Self {
        let start = floor_char_boundary(source, start.min(source.len()));
        let end = end.clamp(start, source.len());
        let before = &source[..start];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = source[line_start..start].chars().count() + 1;

        Self {
            message: message.into(),
            start,
            end,
            line,
            column,
            source: source.to_string(),
        }
    }

    pub fn offset(&self) -> usize {
        self.start
    }

    fn line_text(&self) -> &str {
        self.source.lines().nth(self.line - 1).unwrap_or("")
    }
}

impl fmt::Display for LocatedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({}:{})", self.message, self.line, self.column)?;
        writeln!(f, "{:>5} | {}", self.line, self.line_text())?;
        write!(f, "      | {}^", " ".repeat(self.column - 1))
    }
}

fn floor_char_boundary(source: &str, mut index: usize) -> usize {
    while !source.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_located_error_line_and_column() {
        let err = LocatedError::new("boom", "ab\ncd\nef", 4, 5);
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 2);
        assert_eq!(err.offset(), 4);
        assert_eq!(err.to_string(), "boom (2:2)\n    2 | cd\n      |  ^");
    }

    #[test]
    fn test_located_error_clamps_offsets() {
        let err = LocatedError::new("boom", "héllo", 2, 100);
        assert_eq!(err.start, 1);
        assert_eq!(err.end, 6);
        assert_eq!(err.column, 2);
    }
}
