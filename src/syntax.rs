use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

/// Argument counts configured for a tag or environment name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Arity {
    pub required: u8,
    pub optional: u8,
}

impl Arity {
    pub const NONE: Arity = Arity {
        required: 0,
        optional: 0,
    };

    pub fn new(required: u8, optional: u8) -> Arity {
        Arity { required, optional }
    }
}

/// The syntax configuration shared by the scanner and the writer.
///
/// Constructed once and passed by reference; nothing mutates it after
/// construction. Names absent from the tables get `Arity::NONE`, which makes
/// unknown commands a safe pass-through rather than an error.
#[derive(Debug, Clone)]
pub struct SyntaxTable {
    tags: HashMap<String, Arity>,
    envs: HashMap<String, Arity>,
    // Ordered; the scanner takes the first matching sequence
    shortcuts: Vec<(String, char)>,
    verb_tags: HashSet<String>,
    verb_envs: HashSet<String>,
}

static BUILTIN: Lazy<SyntaxTable> = Lazy::new(|| {
    let mut table = SyntaxTable::empty();

    table.add_tag("documentclass", 1, 1);
    table.add_tag("usepackage", 1, 1);
    table.add_tag("begin", 1, 0);
    table.add_tag("end", 1, 0);
    table.add_tag("emph", 1, 0);
    table.add_tag("left", 1, 0);
    table.add_tag("right", 1, 0);
    table.add_tag("verb", 1, 0);
    table.add_tag("frac", 2, 0);

    table.add_env("figure", 0, 1);
    table.add_env("array", 1, 1);
    table.add_env("tabular", 1, 1);

    table.add_shortcut("\\-", '\u{00AD}');
    table.add_shortcut("---", '\u{2014}');
    table.add_shortcut("~", '\u{00A0}');
    table.add_shortcut("\"=", '\u{2010}');

    table.add_verb_tag("verb");

    table.add_verb_env("verbatim");
    table.add_verb_env("lstlisting");

    table
});

impl SyntaxTable {
    /// A table with nothing configured. Every command is then a
    /// zero-argument pass-through and no shortcuts apply.
    pub fn empty() -> SyntaxTable {
        SyntaxTable {
            tags: HashMap::new(),
            envs: HashMap::new(),
            shortcuts: Vec::new(),
            verb_tags: HashSet::new(),
            verb_envs: HashSet::new(),
        }
    }

    /// The builtin table: common LaTeX arities, the usual text shortcuts,
    /// and `\verb` / `verbatim` / `lstlisting` flagged verbatim.
    pub fn builtin() -> &'static SyntaxTable {
        &BUILTIN
    }

    pub fn add_tag(&mut self, name: impl Into<String>, required: u8, optional: u8) {
        self.tags.insert(name.into(), Arity::new(required, optional));
    }

    pub fn add_env(&mut self, name: impl Into<String>, required: u8, optional: u8) {
        self.envs.insert(name.into(), Arity::new(required, optional));
    }

    pub fn add_shortcut(&mut self, sequence: impl Into<String>, substitution: char) {
        self.shortcuts.push((sequence.into(), substitution));
    }

    pub fn add_verb_tag(&mut self, name: impl Into<String>) {
        self.verb_tags.insert(name.into());
    }

    pub fn add_verb_env(&mut self, name: impl Into<String>) {
        self.verb_envs.insert(name.into());
    }

    pub fn tag_arity(&self, name: &str) -> Arity {
        self.tags.get(name).copied().unwrap_or(Arity::NONE)
    }

    pub fn env_arity(&self, name: &str) -> Arity {
        self.envs.get(name).copied().unwrap_or(Arity::NONE)
    }

    pub fn is_verb_tag(&self, name: &str) -> bool {
        self.verb_tags.contains(name)
    }

    pub fn is_verb_env(&self, name: &str) -> bool {
        self.verb_envs.contains(name)
    }

    /// First configured sequence matching a prefix of `rest`, with its
    /// length in characters.
    pub(crate) fn match_shortcut(&self, rest: &[char]) -> Option<(usize, char)> {
        for (sequence, substitution) in &self.shortcuts {
            let len = sequence.chars().count();
            if rest.len() >= len && sequence.chars().zip(rest).all(|(a, &b)| a == b) {
                return Some((len, *substitution));
            }
        }
        None
    }

    /// Reverse lookup for the escaper: the sequence whose substitution
    /// character is `ch`, in table order.
    pub(crate) fn shortcut_for(&self, ch: char) -> Option<&str> {
        self.shortcuts
            .iter()
            .find(|(_, substitution)| *substitution == ch)
            .map(|(sequence, _)| sequence.as_str())
    }
}

impl Default for SyntaxTable {
    fn default() -> SyntaxTable {
        BUILTIN.clone()
    }
}
