//! Concrete Syntax Tree (CST) module
//!
//! The concrete tree is a flat sequence of tokens as they appear in the
//! source: opening and closing markers are separate nodes and nothing is
//! nested yet except attribute lists, attribute values and the statements of
//! a `{% liquid %}` tag. Every node records the byte range it was parsed from.

pub mod markup;
pub mod node;
pub mod span;

pub use markup::*;
pub use node::*;
pub use span::{Position, Span};
