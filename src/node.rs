use serde::{Deserialize, Serialize};

/// A node of the document tree.
///
/// The tree is rooted and ordered; child order is document order. Nodes are
/// only ever built by the scanner and are plain data afterwards — the
/// parse-time pending-argument counters live on the scanner's frame stack,
/// never here.
///
/// The serde schema is the round-trip contract: a `kind` field tagging the
/// variant, `name` on tags and environments, `arg` for a tag's inline
/// single-character argument, and exact child ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Node {
    /// Document root.
    #[serde(rename = "tex")]
    Root {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<Node>,
    },
    /// A literal run with at least one non-whitespace character.
    Text { text: String },
    /// A whitespace-only literal run.
    Spaces { text: String },
    /// Everything after a `%` up to the end of the line, `%` excluded.
    Comment { text: String },
    /// One control sequence or math toggle. `arg` holds the inline
    /// single-character argument captured by the `\foo x` shortcut.
    Tag {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        arg: Option<char>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<Node>,
    },
    /// An anonymous `{...}` not bound to any tag argument.
    Group {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<Node>,
    },
    /// A required argument. Either a brace group (children) or the single
    /// character captured inline by `_`/`^` (text leaf); never both.
    Arg {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<Node>,
    },
    /// An optional `[...]` argument.
    Opt {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<Node>,
    },
    /// A `\begin{name}...\end{name}` region. The begin/end tags themselves
    /// do not survive parsing.
    Env {
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<Node>,
    },
    /// A verbatim payload, captured literally and never re-scanned.
    Verb { text: String },
}

impl Node {
    /// The node's children, empty for leaf variants.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Root { children }
            | Node::Tag { children, .. }
            | Node::Group { children }
            | Node::Arg { children, .. }
            | Node::Opt { children }
            | Node::Env { children, .. } => children,
            Node::Text { .. }
            | Node::Spaces { .. }
            | Node::Comment { .. }
            | Node::Verb { .. } => &[],
        }
    }
}
