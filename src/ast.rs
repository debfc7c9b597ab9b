//! AST types for the regex engine.

use std::fmt::{self, Write};

use crate::CodePoint;
use crate::unicode::Property;

/// Ordered alternatives (`a|b|c`); the first branch that leads to an overall
/// match wins. Zero branches is the empty body of `()` or of an empty
/// pattern, and matches the empty string once.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Disjunction {
    pub branches: Vec<Alternative>,
}

/// A sequence of terms matched one after another.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Alternative {
    pub terms: Vec<Node>,
}

/// A single term of an alternative.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// An atom followed by `*`, `+`, `?` or `{..}`.
    Quantified {
        atom: Box<Node>,
        quantifier: Quantifier,
    },
    /// `(...)`, `(?:...)` or `(?<name>...)`.
    Group(Group),
    /// Matches a single literal code point.
    Char(CodePoint),
    /// Matches any code point (line terminators excluded in multiline mode).
    Dot,
    /// Character class like `[abc]`, `[a-z]`, `[^abc]`.
    Class(CharacterClass),
    /// `\d`, `\w`, `\s`, `\p{..}` and their negations.
    Predefined(PredefinedClass),
    /// `^`
    BeginAnchor,
    /// `$`
    EndAnchor,
    /// `\b`, or `\B` when negated.
    WordBoundary { negated: bool },
    /// `(?=...)` or `(?!...)`.
    LookAhead { negated: bool, body: Disjunction },
    /// `(?<=...)` or `(?<!...)`.
    LookBehind { negated: bool, body: Disjunction },
    /// `\1` or `\k<name>`. Parsed, but rejected by the compiler.
    BackReference(GroupReference),
}

/// Repetition bounds. `max` of `None` is unbounded; otherwise `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantifier {
    pub min: u32,
    pub max: Option<u32>,
    pub lazy: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Group {
    pub body: Disjunction,
    /// `None` for `(?:...)`. Capturing groups come out of the parser as
    /// `Some(0)` and receive their number from [`Disjunction::allocate_captures`].
    pub capture: Option<u32>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CharacterClass {
    pub negated: bool,
    pub members: Vec<ClassMember>,
}

/// Item within a character class.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    /// Single code point.
    Literal(CodePoint),
    /// Inclusive range `a-z`.
    Range { lo: CodePoint, hi: CodePoint },
    /// Predefined class within a class, e.g. `[\d]`.
    Predefined(PredefinedClass),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PredefinedClass {
    /// `\d`: ASCII digits.
    Digit,
    /// `\D`
    NotDigit,
    /// `\s`: white space and line terminators.
    Space,
    /// `\S`
    NotSpace,
    /// `\w`: `[A-Za-z0-9_]`.
    Word,
    /// `\W`
    NotWord,
    /// `\p{name=value}`, or `\P{..}` when negated. `name` and `value` are
    /// kept as written; `property` is what they resolved to.
    UnicodeProperty {
        name: Option<String>,
        value: String,
        negated: bool,
        property: Property,
    },
}

/// Target of a backreference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupReference {
    Index(u32),
    Name(String),
}

impl Quantifier {
    pub fn new(min: u32, max: Option<u32>) -> Self {
        Quantifier { min, max, lazy: false }
    }

    /// Whether `count` repetitions stay within the upper bound.
    pub fn allows(&self, count: usize) -> bool {
        self.max.is_none_or(|max| count <= max as usize)
    }
}

impl Disjunction {
    /// Number every capturing group depth-first, left to right, starting at
    /// `next`. Returns the number the next group would get.
    pub fn allocate_captures(&mut self, mut next: u32) -> u32 {
        for branch in &mut self.branches {
            next = branch.allocate_captures(next);
        }
        next
    }

    /// Visit every node in textual order, descending into groups, quantified
    /// atoms and lookaround bodies.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        for branch in &self.branches {
            for term in &branch.terms {
                term.walk(visit);
            }
        }
    }

    /// Indented debug rendering, one node per line.
    pub fn to_tree(&self) -> String {
        let mut out = String::new();
        self.write_tree(&mut out, 0);
        out
    }

    fn write_tree(&self, out: &mut String, depth: usize) {
        line(out, depth, format_args!("disjunction"));
        for branch in &self.branches {
            line(out, depth + 1, format_args!("alternative"));
            for term in &branch.terms {
                term.write_tree(out, depth + 2);
            }
        }
    }
}

impl Alternative {
    pub fn allocate_captures(&mut self, mut next: u32) -> u32 {
        for term in &mut self.terms {
            next = term.allocate_captures(next);
        }
        next
    }
}

impl Node {
    pub fn allocate_captures(&mut self, next: u32) -> u32 {
        match self {
            Node::Quantified { atom, .. } => atom.allocate_captures(next),
            Node::Group(group) => {
                let mut next = next;
                if group.capture.is_some() {
                    group.capture = Some(next);
                    next += 1;
                }
                group.body.allocate_captures(next)
            }
            Node::LookAhead { body, .. } | Node::LookBehind { body, .. } => {
                body.allocate_captures(next)
            }
            _ => next,
        }
    }

    fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        match self {
            Node::Quantified { atom, .. } => atom.walk(visit),
            Node::Group(Group { body, .. })
            | Node::LookAhead { body, .. }
            | Node::LookBehind { body, .. } => body.walk(visit),
            _ => {}
        }
    }

    fn write_tree(&self, out: &mut String, depth: usize) {
        match self {
            Node::Quantified { atom, quantifier } => {
                let mode = if quantifier.lazy { "lazy" } else { "greedy" };
                let max = quantifier.max.map(|m| m.to_string()).unwrap_or_default();
                let min = quantifier.min;
                line(out, depth, format_args!("quantified {{{min},{max}}} {mode}"));
                atom.write_tree(out, depth + 1);
            }
            Node::Group(group) => {
                match (group.capture, &group.name) {
                    (None, _) => line(out, depth, format_args!("group")),
                    (Some(index), None) => line(out, depth, format_args!("capture #{index}")),
                    (Some(index), Some(name)) => {
                        line(out, depth, format_args!("capture #{index} <{name}>"))
                    }
                }
                group.body.write_tree(out, depth + 1);
            }
            Node::LookAhead { negated, body } => {
                line(out, depth, format_args!("lookahead{}", if *negated { " not" } else { "" }));
                body.write_tree(out, depth + 1);
            }
            Node::LookBehind { negated, body } => {
                line(out, depth, format_args!("lookbehind{}", if *negated { " not" } else { "" }));
                body.write_tree(out, depth + 1);
            }
            Node::Char(cp) => line(out, depth, format_args!("char {self} (U+{cp:04X})")),
            Node::Dot => line(out, depth, format_args!("dot")),
            Node::Class(_) => line(out, depth, format_args!("class {self}")),
            Node::Predefined(_) => line(out, depth, format_args!("predefined {self}")),
            Node::BeginAnchor => line(out, depth, format_args!("begin")),
            Node::EndAnchor => line(out, depth, format_args!("end")),
            Node::WordBoundary { .. } => line(out, depth, format_args!("word boundary {self}")),
            Node::BackReference(_) => line(out, depth, format_args!("backreference {self}")),
        }
    }
}

fn line(out: &mut String, depth: usize, text: fmt::Arguments<'_>) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    // Writing into a String cannot fail.
    let _ = out.write_fmt(text);
    out.push('\n');
}

/// Write a code point so that it reads back as the same literal.
fn write_code_point(f: &mut fmt::Formatter<'_>, cp: CodePoint, in_class: bool) -> fmt::Result {
    let special: &[char] = if in_class {
        &['\\', ']', '[', '^', '-']
    } else {
        &['^', '$', '\\', '.', '*', '+', '?', '(', ')', '[', ']', '{', '}', '|']
    };
    match char::from_u32(cp) {
        Some('\n') => f.write_str("\\n"),
        Some('\r') => f.write_str("\\r"),
        Some('\t') => f.write_str("\\t"),
        Some('\u{0B}') => f.write_str("\\v"),
        Some('\u{0C}') => f.write_str("\\f"),
        Some('\0') => f.write_str("\\0"),
        Some(ch) if special.contains(&ch) => write!(f, "\\{ch}"),
        Some(ch) if !ch.is_control() => write!(f, "{ch}"),
        _ => write!(f, "\\u{{{cp:X}}}"),
    }
}

impl fmt::Display for Disjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, branch) in self.branches.iter().enumerate() {
            if i > 0 {
                f.write_char('|')?;
            }
            write!(f, "{branch}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.terms.iter().try_for_each(|term| write!(f, "{term}"))
    }
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (0, None) => f.write_char('*')?,
            (1, None) => f.write_char('+')?,
            (0, Some(1)) => f.write_char('?')?,
            (min, None) => write!(f, "{{{min},}}")?,
            (min, Some(max)) if min == max => write!(f, "{{{min}}}")?,
            (min, Some(max)) => write!(f, "{{{min},{max}}}")?,
        }
        if self.lazy {
            f.write_char('?')?;
        }
        Ok(())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Quantified { atom, quantifier } => write!(f, "{atom}{quantifier}"),
            Node::Group(group) => match (group.capture, &group.name) {
                (None, _) => write!(f, "(?:{})", group.body),
                (Some(_), Some(name)) => write!(f, "(?<{name}>{})", group.body),
                (Some(_), None) => write!(f, "({})", group.body),
            },
            Node::Char(cp) => write_code_point(f, *cp, false),
            Node::Dot => f.write_char('.'),
            Node::Class(class) => write!(f, "{class}"),
            Node::Predefined(class) => write!(f, "{class}"),
            Node::BeginAnchor => f.write_char('^'),
            Node::EndAnchor => f.write_char('$'),
            Node::WordBoundary { negated } => f.write_str(if *negated { "\\B" } else { "\\b" }),
            Node::LookAhead { negated, body } => {
                write!(f, "(?{}{body})", if *negated { '!' } else { '=' })
            }
            Node::LookBehind { negated, body } => {
                write!(f, "(?<{}{body})", if *negated { '!' } else { '=' })
            }
            Node::BackReference(reference) => write!(f, "{reference}"),
        }
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('[')?;
        if self.negated {
            f.write_char('^')?;
        }
        for member in &self.members {
            match member {
                ClassMember::Literal(cp) => write_code_point(f, *cp, true)?,
                ClassMember::Range { lo, hi } => {
                    write_code_point(f, *lo, true)?;
                    f.write_char('-')?;
                    write_code_point(f, *hi, true)?;
                }
                ClassMember::Predefined(class) => write!(f, "{class}")?,
            }
        }
        f.write_char(']')
    }
}

impl fmt::Display for PredefinedClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredefinedClass::Digit => f.write_str("\\d"),
            PredefinedClass::NotDigit => f.write_str("\\D"),
            PredefinedClass::Space => f.write_str("\\s"),
            PredefinedClass::NotSpace => f.write_str("\\S"),
            PredefinedClass::Word => f.write_str("\\w"),
            PredefinedClass::NotWord => f.write_str("\\W"),
            PredefinedClass::UnicodeProperty { name, value, negated, .. } => {
                f.write_str(if *negated { "\\P{" } else { "\\p{" })?;
                if let Some(name) = name {
                    write!(f, "{name}=")?;
                }
                write!(f, "{value}}}")
            }
        }
    }
}

impl fmt::Display for GroupReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupReference::Index(index) => write!(f, "\\{index}"),
            GroupReference::Name(name) => write!(f, "\\k<{name}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capturing(body: Disjunction) -> Node {
        Node::Group(Group { body, capture: Some(0), name: None })
    }

    fn single(terms: Vec<Node>) -> Disjunction {
        Disjunction { branches: vec![Alternative { terms }] }
    }

    fn capture_numbers(root: &Disjunction) -> Vec<u32> {
        let mut numbers = Vec::new();
        root.walk(&mut |node| {
            if let Node::Group(Group { capture: Some(n), .. }) = node {
                numbers.push(*n);
            }
        });
        numbers
    }

    #[test]
    fn captures_follow_textual_order() {
        // ((a)(?:b)(c))(?=(d))
        let mut root = single(vec![
            capturing(single(vec![
                capturing(single(vec![Node::Char('a' as u32)])),
                Node::Group(Group {
                    body: single(vec![Node::Char('b' as u32)]),
                    capture: None,
                    name: None,
                }),
                capturing(single(vec![Node::Char('c' as u32)])),
            ])),
            Node::LookAhead {
                negated: false,
                body: single(vec![capturing(single(vec![Node::Char('d' as u32)]))]),
            },
        ]);
        assert_eq!(root.allocate_captures(1), 5);
        assert_eq!(capture_numbers(&root), vec![1, 2, 3, 4]);
    }

    #[test]
    fn quantified_groups_are_numbered_once() {
        let mut root = single(vec![Node::Quantified {
            atom: Box::new(capturing(single(vec![Node::Dot]))),
            quantifier: Quantifier::new(0, None),
        }]);
        assert_eq!(root.allocate_captures(1), 2);
        assert_eq!(root.to_string(), "(.)*");
    }

    #[test]
    fn quantifier_display() {
        let lazy = |min, max| Quantifier { min, max, lazy: true };
        assert_eq!(Quantifier::new(1, None).to_string(), "+");
        assert_eq!(Quantifier::new(0, Some(1)).to_string(), "?");
        assert_eq!(Quantifier::new(3, Some(3)).to_string(), "{3}");
        assert_eq!(Quantifier::new(2, None).to_string(), "{2,}");
        assert_eq!(lazy(2, Some(5)).to_string(), "{2,5}?");
        assert_eq!(lazy(0, None).to_string(), "*?");
    }

    #[test]
    fn escapes_special_characters() {
        let root = single(vec![
            Node::Char('.' as u32),
            Node::Char('\n' as u32),
            Node::Class(CharacterClass {
                negated: true,
                members: vec![
                    ClassMember::Literal(']' as u32),
                    ClassMember::Range { lo: 'a' as u32, hi: 'z' as u32 },
                ],
            }),
        ]);
        assert_eq!(root.to_string(), "\\.\\n[^\\]a-z]");
    }

    #[test]
    fn tree_rendering() {
        let mut root = single(vec![
            Node::BeginAnchor,
            Node::Quantified {
                atom: Box::new(capturing(single(vec![Node::Char('a' as u32)]))),
                quantifier: Quantifier { min: 1, max: None, lazy: true },
            },
        ]);
        root.allocate_captures(1);
        let expected = "\
disjunction
  alternative
    begin
    quantified {1,} lazy
      capture #1
        disjunction
          alternative
            char a (U+0061)
";
        assert_eq!(root.to_tree(), expected);
    }
}
