//! Layout documents
//!
//! A [`Doc`] describes text together with the places where it may break. The
//! printer decides which groups fit in the line width and which must break,
//! see [`render`].

mod printer;

use std::cell::Cell;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use printer::render;

/// Handle naming a group so that [`Doc::IfBreak`] can follow its mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GroupId(u32);

/// Source of fresh [`GroupId`]s for one print call.
#[derive(Debug, Default)]
pub struct GroupIds {
    next: Cell<u32>,
}

impl GroupIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&self) -> GroupId {
        let id = self.next.get();
        self.next.set(id + 1);
        GroupId(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LineKind {
    /// Nothing when flat.
    Soft,
    /// A space when flat.
    Normal,
    /// Always a newline.
    Hard,
    /// Always a newline, without indentation.
    Literal,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Doc {
    Text(String),
    Concat(Vec<Doc>),
    Group {
        id: Option<GroupId>,
        should_break: bool,
        contents: Box<Doc>,
    },
    Indent(Box<Doc>),
    /// Contents are indented as if at the start of the document.
    DedentToRoot(Box<Doc>),
    Line(LineKind),
    /// `break_contents` when the group breaks, `flat_contents` otherwise. The
    /// group is the enclosing one unless `group_id` names another.
    IfBreak {
        break_contents: Box<Doc>,
        flat_contents: Box<Doc>,
        group_id: Option<GroupId>,
    },
    /// Alternating contents and separators. Separators break only when the
    /// next content does not fit.
    Fill(Vec<Doc>),
    /// Forces every enclosing group to break.
    BreakParent,
}

impl Doc {
    pub fn nil() -> Self {
        Doc::Text(String::new())
    }

    /// Prints nothing whatever the mode.
    pub fn is_empty(&self) -> bool {
        match self {
            Doc::Text(text) => text.is_empty(),
            Doc::Concat(parts) => parts.iter().all(Doc::is_empty),
            _ => false,
        }
    }
}

impl From<&str> for Doc {
    fn from(text: &str) -> Self {
        Doc::Text(text.to_string())
    }
}

impl From<String> for Doc {
    fn from(text: String) -> Self {
        Doc::Text(text)
    }
}

impl From<Vec<Doc>> for Doc {
    fn from(parts: Vec<Doc>) -> Self {
        Doc::Concat(parts)
    }
}

/// Concatenation of anything convertible into a [`Doc`].
macro_rules! docs {
    () => {
        $crate::doc::Doc::Concat(Vec::new())
    };
    ($($part:expr),+ $(,)?) => {
        $crate::doc::Doc::Concat(vec![$($crate::doc::Doc::from($part)),+])
    };
}

pub(crate) use docs;

pub fn text(text: impl Into<String>) -> Doc {
    Doc::Text(text.into())
}

pub fn group(contents: impl Into<Doc>) -> Doc {
    Doc::Group {
        id: None,
        should_break: false,
        contents: Box::new(contents.into()),
    }
}

pub fn group_with(contents: impl Into<Doc>, id: Option<GroupId>, should_break: bool) -> Doc {
    Doc::Group {
        id,
        should_break,
        contents: Box::new(contents.into()),
    }
}

pub fn indent(contents: impl Into<Doc>) -> Doc {
    Doc::Indent(Box::new(contents.into()))
}

pub fn dedent_to_root(contents: impl Into<Doc>) -> Doc {
    Doc::DedentToRoot(Box::new(contents.into()))
}

pub fn line() -> Doc {
    Doc::Line(LineKind::Normal)
}

pub fn softline() -> Doc {
    Doc::Line(LineKind::Soft)
}

pub fn hardline() -> Doc {
    Doc::Concat(vec![Doc::Line(LineKind::Hard), Doc::BreakParent])
}

pub fn literalline() -> Doc {
    Doc::Concat(vec![Doc::Line(LineKind::Literal), Doc::BreakParent])
}

pub fn break_parent() -> Doc {
    Doc::BreakParent
}

pub fn fill(parts: Vec<Doc>) -> Doc {
    Doc::Fill(parts)
}

pub fn if_break(break_contents: impl Into<Doc>, flat_contents: impl Into<Doc>, group_id: Option<GroupId>) -> Doc {
    Doc::IfBreak {
        break_contents: Box::new(break_contents.into()),
        flat_contents: Box::new(flat_contents.into()),
        group_id,
    }
}

pub fn join(separator: Doc, docs: impl IntoIterator<Item = Doc>) -> Doc {
    let mut parts = Vec::new();
    for (i, doc) in docs.into_iter().enumerate() {
        if i > 0 {
            parts.push(separator.clone());
        }
        parts.push(doc);
    }
    Doc::Concat(parts)
}

/// Flattens soft lines and conditional content so that `doc` prints on one
/// line. Hard lines stay.
pub fn remove_lines(doc: Doc) -> Doc {
    match doc {
        Doc::Line(LineKind::Soft) => Doc::nil(),
        Doc::Line(LineKind::Normal) => text(" "),
        Doc::IfBreak { flat_contents, .. } => remove_lines(*flat_contents),
        Doc::Concat(parts) => Doc::Concat(parts.into_iter().map(remove_lines).collect()),
        Doc::Fill(parts) => Doc::Fill(parts.into_iter().map(remove_lines).collect()),
        Doc::Group {
            id,
            should_break,
            contents,
        } => Doc::Group {
            id,
            should_break,
            contents: Box::new(remove_lines(*contents)),
        },
        Doc::Indent(contents) => indent(remove_lines(*contents)),
        Doc::DedentToRoot(contents) => dedent_to_root(remove_lines(*contents)),
        other => other,
    }
}

/// Text printed as is, each newline becoming a [`literalline`].
pub fn replace_text_end_of_line(source: &str) -> Doc {
    join(literalline(), source.split('\n').map(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_ids_are_fresh() {
        let ids = GroupIds::new();
        let a = ids.fresh();
        let b = ids.fresh();
        assert_ne!(a, b);
    }

    #[test]
    fn test_docs_macro() {
        let doc = docs!["a", text("b"), line()];
        assert_eq!(
            doc,
            Doc::Concat(vec![text("a"), text("b"), Doc::Line(LineKind::Normal)])
        );
        assert!(docs![].is_empty());
        assert!(docs!["", docs![""]].is_empty());
        assert!(!docs![softline()].is_empty());
    }

    #[test]
    fn test_join() {
        assert_eq!(
            join(text(","), vec![text("a"), text("b")]),
            docs!["a", ",", "b"]
        );
        assert_eq!(join(text(","), Vec::new()), docs![]);
    }

    #[test]
    fn test_remove_lines() {
        let doc = remove_lines(group(docs!["a", line(), "b", softline(), if_break("x", "y", None)]));
        assert_eq!(render(&doc, 1, 2), "a by");
        let doc = remove_lines(docs!["a", hardline(), "b"]);
        assert_eq!(render(&doc, 80, 2), "a\nb");
    }
}
