//! Lossless conversion between LaTeX-like markup and a generic structured
//! tree, and back.
//!
//! The scanner consumes the whole input in one forward pass and builds a
//! [`Node`] tree that keeps every literal detail: whitespace runs, comments,
//! verbatim payloads, and the full command/argument nesting. The writer
//! reverses the trip, so serializing a parsed tree reproduces the input for
//! all supported constructs.
//!
//! ```
//! use textree::{parse_tex, write_tex, SyntaxTable};
//!
//! let syntax = SyntaxTable::builtin();
//! let tree = parse_tex(r"\emph{hi}", syntax).root;
//! assert_eq!(write_tex(&tree, syntax), r"\emph{hi}");
//! ```
//!
//! Which commands take arguments, which text shortcuts apply, and which
//! names are verbatim all come from a [`SyntaxTable`] — constructed once and
//! shared by reference into both directions.

pub mod node;
pub mod scanner;
pub mod syntax;
pub mod writer;

pub use node::Node;
pub use scanner::{Conversion, ParseFailure, Scanner};
pub use syntax::{Arity, SyntaxTable};
pub use writer::write_tex;

/// Convert text to a tree. Returns the tree together with an optional
/// diagnostic; on a fault the tree is partial, holding everything built
/// before the fault position.
pub fn parse_tex(input: &str, syntax: &SyntaxTable) -> Conversion {
    Scanner::new(input, syntax).scan()
}
