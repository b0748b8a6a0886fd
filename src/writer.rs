use crate::{node::Node, scanner::ESCAPABLE, syntax::SyntaxTable};

/// Serialize a tree back to TeX text.
///
/// Pre-order traversal: each node contributes a prefix before its children
/// and a tail after them. Total over any `Node` tree; re-parsing the output
/// reproduces the tree for all supported constructs. The known exception is
/// deliberate: `$`/`$$` regions emit their delimiter only on close, and
/// `_`/`^` emit nothing around their argument.
pub fn write_tex(root: &Node, syntax: &SyntaxTable) -> String {
    let mut writer = Writer {
        syntax,
        out: String::new(),
    };
    writer.write(root);
    writer.out
}

struct Writer<'a> {
    syntax: &'a SyntaxTable,
    out: String,
}

impl<'a> Writer<'a> {
    fn write(&mut self, node: &Node) {
        let mut tail = String::new();

        match node {
            Node::Root { .. } => {}
            Node::Comment { text } => {
                self.out.push('%');
                self.out.push_str(text);
            }
            Node::Text { text } | Node::Spaces { text } => {
                let escaped = escape(text, self.syntax);
                self.out.push_str(&escaped);
            }
            Node::Verb { text } => self.out.push_str(text),
            Node::Tag { name, arg, .. } => match name.as_str() {
                // The opening delimiter is never emitted, only the close
                "$" | "$$" => tail.push_str(name),
                "^" | "_" => {}
                "par" => self.out.push_str("\n\n"),
                _ => {
                    self.out.push('\\');
                    self.out.push_str(name);
                    if let Some(arg) = arg {
                        self.out.push(*arg);
                        if self.syntax.is_verb_tag(name) {
                            tail.push(*arg);
                        }
                    }
                }
            },
            Node::Group { .. } => {
                self.out.push('{');
                tail.push('}');
            }
            Node::Arg { text, children } => {
                if !children.is_empty() || text.is_none() {
                    self.out.push('{');
                    tail.push('}');
                } else if let Some(text) = text {
                    // Inline capture from `_`/`^`, emitted raw
                    self.out.push_str(text);
                }
            }
            Node::Opt { .. } => {
                self.out.push('[');
                tail.push(']');
            }
            Node::Env { name, .. } => {
                self.out.push_str("\\begin{");
                self.out.push_str(name);
                self.out.push('}');
                tail.push_str("\\end{");
                tail.push_str(name);
                tail.push('}');
            }
        }

        for child in node.children() {
            self.write(child);
        }
        self.out.push_str(&tail);
    }
}

/// Reverse the scanner's punctuation-escaping and shortcut substitution.
/// Applied to Text/Spaces payloads only; Verb, Comment, and inline argument
/// text pass through untouched.
pub(crate) fn escape(text: &str, syntax: &SyntaxTable) -> String {
    let mut out = String::new();
    for ch in text.chars() {
        if ESCAPABLE.contains(ch) {
            out.push('\\');
            out.push(ch);
        } else if let Some(sequence) = syntax.shortcut_for(ch) {
            out.push_str(sequence);
        } else {
            out.push(ch);
        }
    }
    out
}
