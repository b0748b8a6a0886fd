use std::fmt;

use crate::{
    node::Node,
    syntax::{Arity, SyntaxTable},
};

/// Characters a backslash escapes to themselves.
pub(crate) const ESCAPABLE: &str = "#$%^&_{}~\\";

/// How many characters of context a diagnostic shows on each side.
const CONTEXT_WINDOW: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ScanError {
    /// Needed one more non-space character for an inline argument.
    UnexpectedEof(usize),
    /// `}` with only the root open.
    UnbalancedClose(usize),
    /// `\end{...}` closed with nothing left to close.
    EndOutsideEnvironment(usize),
    /// A verbatim-flagged tag whose inline delimiter was never captured.
    MissingVerbDelimiter(usize, String),
    /// A verbatim payload that ran to end of input.
    UnterminatedVerb(usize, char),
    /// A verbatim environment with no matching `\end{name}`.
    UnterminatedVerbEnv(usize, String),
}

impl ScanError {
    fn position(&self) -> usize {
        match self {
            ScanError::UnexpectedEof(pos)
            | ScanError::UnbalancedClose(pos)
            | ScanError::EndOutsideEnvironment(pos)
            | ScanError::MissingVerbDelimiter(pos, _)
            | ScanError::UnterminatedVerb(pos, _)
            | ScanError::UnterminatedVerbEnv(pos, _) => *pos,
        }
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::UnexpectedEof(_) => {
                write!(f, "unexpected end of input while reading an argument")
            }
            ScanError::UnbalancedClose(_) => write!(f, "`}}` without a matching open brace"),
            ScanError::EndOutsideEnvironment(_) => {
                write!(f, "`\\end` without an open environment")
            }
            ScanError::MissingVerbDelimiter(_, name) => {
                write!(f, "verbatim tag `\\{}` is missing its delimiter character", name)
            }
            ScanError::UnterminatedVerb(_, delimiter) => {
                write!(f, "verbatim text never closed by `{}`", delimiter)
            }
            ScanError::UnterminatedVerbEnv(_, name) => {
                write!(f, "verbatim environment never closed by `\\end{{{}}}`", name)
            }
        }
    }
}

/// The single failure kind a conversion can report.
///
/// `context` is the raw input around `position`; `Display` renders it with a
/// caret under the fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    /// Character index of the fault in the input.
    pub position: usize,
    pub message: String,
    /// Input window around the fault position.
    pub context: String,
}

impl ParseFailure {
    fn new(error: &ScanError, chars: &[char]) -> ParseFailure {
        let position = error.position();
        let start = position.saturating_sub(CONTEXT_WINDOW);
        let end = (position + CONTEXT_WINDOW).min(chars.len());
        ParseFailure {
            position,
            message: error.to_string(),
            context: chars[start..end].iter().collect(),
        }
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "parse failure at {}: {}", self.position, self.message)?;
        writeln!(f, "  {}", self.context)?;
        write!(f, "  {}^", " ".repeat(self.position.min(CONTEXT_WINDOW)))
    }
}

impl std::error::Error for ParseFailure {}

/// Result of scanning one input: the tree, plus the diagnostic if the pass
/// aborted early. On a fault the tree holds everything built before the
/// fault position; nothing after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub root: Node,
    pub failure: Option<ParseFailure>,
}

impl Conversion {
    /// The full tree, or the diagnostic if the scan was cut short.
    pub fn into_result(self) -> Result<Node, ParseFailure> {
        match self.failure {
            Some(failure) => Err(failure),
            None => Ok(self.root),
        }
    }
}

#[derive(Debug)]
enum FrameKind {
    Root,
    Tag { name: String, arg: Option<char> },
    Env { name: String },
    Group,
    Arg,
    Opt,
}

/// One open structural node. The pending counters exist only here; they are
/// gone once the frame folds into a `Node`.
#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    children: Vec<Node>,
    required: u8,
    optional: u8,
}

impl Frame {
    fn new(kind: FrameKind) -> Frame {
        Frame {
            kind,
            children: Vec::new(),
            required: 0,
            optional: 0,
        }
    }

    fn takes_required(&self) -> bool {
        matches!(self.kind, FrameKind::Tag { .. } | FrameKind::Env { .. }) && self.required > 0
    }

    fn takes_optional(&self) -> bool {
        matches!(self.kind, FrameKind::Tag { .. } | FrameKind::Env { .. }) && self.optional > 0
    }

    fn into_node(self) -> Node {
        match self.kind {
            FrameKind::Root => Node::Root {
                children: self.children,
            },
            FrameKind::Tag { name, arg } => Node::Tag {
                name,
                arg,
                children: self.children,
            },
            FrameKind::Env { name } => Node::Env {
                name,
                children: self.children,
            },
            FrameKind::Group => Node::Group {
                children: self.children,
            },
            FrameKind::Arg => Node::Arg {
                text: None,
                children: self.children,
            },
            FrameKind::Opt => Node::Opt {
                children: self.children,
            },
        }
    }
}

/// The text → tree automaton: a single forward pass over the input with an
/// explicit stack of open frames. The stack bottom is always the root frame;
/// the topmost frame is the sole mutation point.
pub struct Scanner<'a> {
    syntax: &'a SyntaxTable,
    chars: Vec<char>,
    i: usize,
    stack: Vec<Frame>,
    buffer: String,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &str, syntax: &'a SyntaxTable) -> Scanner<'a> {
        Scanner {
            syntax,
            chars: input.chars().collect(),
            i: 0,
            stack: vec![Frame::new(FrameKind::Root)],
            buffer: String::new(),
        }
    }

    /// Consume the whole input. Open frames left at end of input fold up
    /// silently; only the faults in `ScanError` cut the pass short.
    pub fn scan(mut self) -> Conversion {
        let failure = match self.run() {
            Ok(()) => None,
            Err(error) => Some(ParseFailure::new(&error, &self.chars)),
        };

        while self.stack.len() > 1 {
            let node = self.pop().into_node();
            self.top().children.push(node);
        }
        let root = self.pop().into_node();

        Conversion { root, failure }
    }

    fn run(&mut self) -> Result<(), ScanError> {
        while self.i < self.chars.len() {
            let c = self.chars[self.i];

            // Paragraph break
            if c == '\n' && self.peek(1) == Some('\n') {
                self.flush();
                self.append(Node::Tag {
                    name: "par".into(),
                    arg: None,
                    children: Vec::new(),
                });
                self.i += 2;
                continue;
            }

            // Every line break forces a text/space boundary
            if c == '\n' {
                self.buffer.push('\n');
                self.i += 1;
                self.flush();
                continue;
            }

            if c == '%' {
                self.comment();
                continue;
            }

            // \<punct> puts the bare punctuation in the accumulator
            if c == '\\' {
                if let Some(next) = self.peek(1) {
                    if ESCAPABLE.contains(next) {
                        self.buffer.push(next);
                        self.i += 2;
                        continue;
                    }
                }
            }

            // Text shortcuts, first configured sequence wins
            if let Some((len, substitution)) = self.syntax.match_shortcut(&self.chars[self.i..]) {
                self.buffer.push(substitution);
                self.i += len;
                continue;
            }

            if c == '\\' && self.peek(1).map_or(false, |ch| ch.is_alphabetic()) {
                self.control_sequence()?;
                continue;
            }

            if c == '$' || c == '_' || c == '^' {
                self.math_or_script(c)?;
                continue;
            }

            if c == '{' {
                self.flush();
                let kind = if self.top().takes_required() {
                    FrameKind::Arg
                } else {
                    FrameKind::Group
                };
                self.stack.push(Frame::new(kind));
                self.i += 1;
                continue;
            }

            if c == '}' {
                self.close_brace()?;
                continue;
            }

            if c == '[' && self.top().takes_optional() {
                self.flush();
                self.stack.push(Frame::new(FrameKind::Opt));
                self.i += 1;
                continue;
            }

            if c == ']' && matches!(self.top().kind, FrameKind::Opt) {
                self.flush();
                let node = self.pop().into_node();
                let parent = self.top();
                parent.children.push(node);
                // Optional arguments are 0-or-1, never accumulated
                parent.optional = 0;
                self.i += 1;
                continue;
            }

            // Anything else is literal
            self.buffer.push(c);
            self.i += 1;
        }

        self.flush();
        Ok(())
    }

    /// `%` to end of line. Note there is no flush here: the accumulator keeps
    /// collecting across a mid-line comment, so surrounding text lands after
    /// the Comment node.
    fn comment(&mut self) {
        self.i += 1;
        let start = self.i;
        while self.i < self.chars.len() && self.chars[self.i] != '\n' {
            self.i += 1;
        }
        let text: String = self.chars[start..self.i].iter().collect();
        self.i += 1;
        self.append(Node::Comment { text });
        self.append(Node::Spaces { text: "\n".into() });
    }

    /// `\` followed by a letter run: create the tag, apply the configured
    /// arity, maybe capture an inline argument or a verbatim payload, and
    /// descend while arguments are still pending.
    fn control_sequence(&mut self) -> Result<(), ScanError> {
        self.flush();
        self.i += 1;
        let start = self.i;
        while self.i < self.chars.len() && self.chars[self.i].is_alphabetic() {
            self.i += 1;
        }
        let name: String = self.chars[start..self.i].iter().collect();

        let Arity {
            mut required,
            mut optional,
        } = self.syntax.tag_arity(&name);
        let mut arg = None;
        let mut children = Vec::new();

        // An optional argument only stays pending when a `[` is actually next
        if optional > 0 && self.peek_nonspace() != Some('[') {
            optional = 0;
        }

        // `\foo x` behaves as `\foo{x}`
        if required == 1 && optional == 0 && self.peek_nonspace() != Some('{') {
            let j = self
                .next_nonspace()
                .ok_or(ScanError::UnexpectedEof(self.i))?;
            if j > self.i {
                let spaces: String = self.chars[self.i..j].iter().collect();
                children.push(Node::Spaces { text: spaces });
            }
            arg = Some(self.chars[j]);
            self.i = j + 1;
            required = 0;
        }

        // The inline argument of a verbatim tag is its delimiter
        if self.syntax.is_verb_tag(&name) {
            let delimiter =
                arg.ok_or_else(|| ScanError::MissingVerbDelimiter(self.i, name.clone()))?;
            let verb_start = self.i;
            while self.i < self.chars.len() && self.chars[self.i] != delimiter {
                self.i += 1;
            }
            if self.i >= self.chars.len() {
                return Err(ScanError::UnterminatedVerb(verb_start, delimiter));
            }
            let text: String = self.chars[verb_start..self.i].iter().collect();
            self.i += 1;
            children.push(Node::Verb { text });
        }

        if required > 0 || optional > 0 {
            let mut frame = Frame::new(FrameKind::Tag { name, arg });
            frame.children = children;
            frame.required = required;
            frame.optional = optional;
            self.stack.push(frame);
        } else {
            self.append(Node::Tag {
                name,
                arg,
                children,
            });
        }
        Ok(())
    }

    /// `$` toggles a math region; `_` and `^` are one-argument tags whose
    /// argument is captured like an inline argument unless a brace group
    /// follows.
    fn math_or_script(&mut self, c: char) -> Result<(), ScanError> {
        self.flush();

        if c == '$' {
            let open_len = match &self.top().kind {
                FrameKind::Tag { name, .. } if name == "$" || name == "$$" => Some(name.len()),
                _ => None,
            };
            if let Some(open_len) = open_len {
                // Close: consume as many dollars as were opened
                self.i += 1;
                if open_len == 2 && self.peek(0) == Some('$') {
                    self.i += 1;
                }
                let node = self.pop().into_node();
                self.top().children.push(node);
                return Ok(());
            }

            let name = if self.peek(1) == Some('$') {
                self.i += 2;
                "$$"
            } else {
                self.i += 1;
                "$"
            };
            self.stack.push(Frame::new(FrameKind::Tag {
                name: name.into(),
                arg: None,
            }));
            return Ok(());
        }

        let name = c.to_string();
        self.i += 1;

        if self.peek_nonspace() != Some('{') {
            let j = self
                .next_nonspace()
                .ok_or(ScanError::UnexpectedEof(self.i))?;
            let mut children = Vec::new();
            if j > self.i {
                let spaces: String = self.chars[self.i..j].iter().collect();
                children.push(Node::Spaces { text: spaces });
            }
            children.push(Node::Arg {
                text: Some(self.chars[j].to_string()),
                children: Vec::new(),
            });
            self.i = j + 1;
            self.append(Node::Tag {
                name,
                arg: None,
                children,
            });
            return Ok(());
        }

        let mut frame = Frame::new(FrameKind::Tag { name, arg: None });
        frame.required = 1;
        self.stack.push(frame);
        Ok(())
    }

    /// `}` closes the open frame, then runs the required-argument
    /// bookkeeping on what it lands on. Tags named `begin` and `end` never
    /// survive their own closing.
    fn close_brace(&mut self) -> Result<(), ScanError> {
        self.flush();
        let pos = self.i;
        if self.stack.len() == 1 {
            return Err(ScanError::UnbalancedClose(pos));
        }
        self.i += 1;

        let node = self.pop().into_node();
        self.top().children.push(node);

        // The decrement-and-close applies to tag frames only; an
        // environment's counters only ever classify `{` as Arg
        let tag_closes = {
            let top = self.top();
            match top.kind {
                FrameKind::Tag { .. } if top.required > 0 => {
                    top.required -= 1;
                    top.required == 0
                }
                _ => false,
            }
        };
        if !tag_closes {
            return Ok(());
        }

        let tag = self.pop();
        let (is_begin, is_end) = match &tag.kind {
            FrameKind::Tag { name, .. } => (name == "begin", name == "end"),
            _ => (false, false),
        };
        if is_begin {
            self.open_environment(tag, pos)?;
        } else if is_end {
            // The end tag and its argument vanish, unvalidated; the
            // enclosing frame closes with it
            if self.stack.len() == 1 {
                return Err(ScanError::EndOutsideEnvironment(pos));
            }
            let node = self.pop().into_node();
            self.top().children.push(node);
        } else {
            let node = tag.into_node();
            self.top().children.push(node);
        }
        Ok(())
    }

    /// Transmute a closed `begin` tag into an open Env frame. The begin
    /// tag's subtree is discarded; only the argument text survives as the
    /// environment name. Verbatim environments capture straight to their
    /// `\end{name}` and close on the spot.
    fn open_environment(&mut self, begin: Frame, pos: usize) -> Result<(), ScanError> {
        let name = env_name(&begin);

        if self.syntax.is_verb_env(&name) {
            let delimiter: Vec<char> = format!("\\end{{{}}}", name).chars().collect();
            let start = self.i;
            let mut found = None;
            let mut j = start;
            while j + delimiter.len() <= self.chars.len() {
                if self.chars[j..j + delimiter.len()] == delimiter[..] {
                    found = Some(j);
                    break;
                }
                j += 1;
            }
            let end = found.ok_or_else(|| ScanError::UnterminatedVerbEnv(pos, name.clone()))?;
            let text: String = self.chars[start..end].iter().collect();
            self.i = end + delimiter.len();
            self.append(Node::Env {
                name,
                children: vec![Node::Verb { text }],
            });
            return Ok(());
        }

        let arity = self.syntax.env_arity(&name);
        let mut frame = Frame::new(FrameKind::Env { name });
        frame.required = arity.required;
        frame.optional = arity.optional;
        self.stack.push(frame);
        Ok(())
    }

    /// Flush the literal accumulator into Spaces / Text / Spaces siblings.
    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let buffer = std::mem::take(&mut self.buffer);

        if buffer.chars().all(char::is_whitespace) {
            self.append(Node::Spaces { text: buffer });
            return;
        }

        let leading = buffer.len() - buffer.trim_start().len();
        let trailing_start = leading + buffer.trim().len();
        if leading > 0 {
            self.append(Node::Spaces {
                text: buffer[..leading].into(),
            });
        }
        self.append(Node::Text {
            text: buffer[leading..trailing_start].into(),
        });
        if trailing_start < buffer.len() {
            self.append(Node::Spaces {
                text: buffer[trailing_start..].into(),
            });
        }
    }

    fn append(&mut self, node: Node) {
        self.top().children.push(node);
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.i + ahead).copied()
    }

    /// Index of the next non-whitespace character at or after the cursor.
    fn next_nonspace(&self) -> Option<usize> {
        (self.i..self.chars.len()).find(|&j| !self.chars[j].is_whitespace())
    }

    fn peek_nonspace(&self) -> Option<char> {
        self.next_nonspace().map(|j| self.chars[j])
    }

    fn top(&mut self) -> &mut Frame {
        // The root frame is never popped while scanning
        self.stack.last_mut().expect("scanner stack holds the root frame")
    }

    fn pop(&mut self) -> Frame {
        self.stack.pop().expect("scanner stack holds the root frame")
    }
}

fn env_name(begin: &Frame) -> String {
    let mut name = String::new();
    for child in begin.children.iter().rev() {
        if let Node::Arg { children, .. } = child {
            for node in children {
                match node {
                    Node::Text { text } | Node::Spaces { text } => name.push_str(text),
                    _ => {}
                }
            }
            break;
        }
    }
    name
}
