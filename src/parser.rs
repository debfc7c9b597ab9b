//! Regex parser: converts a code-point pattern into an AST.

use std::collections::HashSet;

use crate::CodePoint;
use crate::ast::*;
use crate::error::{Error, SyntaxErrorKind};
use crate::unicode;

/// Parse `pattern` into its AST. Capturing groups are left unnumbered; see
/// [`Disjunction::allocate_captures`].
pub fn parse(pattern: &[CodePoint]) -> Result<Disjunction, Error> {
    Parser::new(pattern).parse()
}

pub struct Parser<'a> {
    pattern: &'a [CodePoint],
    pos: usize,
    names: HashSet<String>,
}

impl<'a> Parser<'a> {
    pub fn new(pattern: &'a [CodePoint]) -> Self {
        Parser {
            pattern,
            pos: 0,
            names: HashSet::new(),
        }
    }

    /// Parse the full pattern.
    pub fn parse(&mut self) -> Result<Disjunction, Error> {
        let root = self.parse_disjunction()?;
        if self.pos < self.pattern.len() {
            // Only a `)` stops a top-level disjunction early.
            return Err(self.error(SyntaxErrorKind::UnmatchedParen));
        }
        Ok(root)
    }

    fn error(&self, kind: SyntaxErrorKind) -> Error {
        Error::syntax(self.pos, kind)
    }

    /// The code point at `pos + offset` as a `char`. Values that are not
    /// scalar values read as U+FFFD, which is never syntax.
    fn peek_at(&self, offset: usize) -> Option<char> {
        self.pattern
            .get(self.pos + offset)
            .map(|&cp| char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    /// Consume and return the raw code point at the cursor.
    fn advance(&mut self) -> Option<CodePoint> {
        let cp = self.pattern.get(self.pos).copied();
        if cp.is_some() {
            self.pos += 1;
        }
        cp
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Parse alternation: `a|b|c`
    fn parse_disjunction(&mut self) -> Result<Disjunction, Error> {
        let first = self.parse_alternative()?;
        if self.peek() != Some('|') {
            if first.terms.is_empty() {
                return Ok(Disjunction::default());
            }
            return Ok(Disjunction { branches: vec![first] });
        }
        let mut branches = vec![first];
        while self.eat('|') {
            branches.push(self.parse_alternative()?);
        }
        Ok(Disjunction { branches })
    }

    /// Parse concatenation: `abc`
    fn parse_alternative(&mut self) -> Result<Alternative, Error> {
        let mut terms = Vec::new();
        while let Some(ch) = self.peek() {
            if ch == ')' || ch == '|' {
                break;
            }
            terms.push(self.parse_term()?);
        }
        Ok(Alternative { terms })
    }

    /// An assertion, or an atom possibly followed by a quantifier.
    fn parse_term(&mut self) -> Result<Node, Error> {
        if let Some(assertion) = self.parse_assertion()? {
            let before = self.pos;
            if self.parse_quantifier()?.is_some() {
                return Err(Error::syntax(before, SyntaxErrorKind::NothingToRepeat));
            }
            return Ok(assertion);
        }
        let atom = self.parse_atom()?;
        Ok(match self.parse_quantifier()? {
            Some(quantifier) => Node::Quantified {
                atom: Box::new(atom),
                quantifier,
            },
            None => atom,
        })
    }

    /// `^`, `$`, `\b`, `\B` and the four lookaround forms. Consumes nothing
    /// when the cursor is not on an assertion.
    fn parse_assertion(&mut self) -> Result<Option<Node>, Error> {
        let open = self.pos;
        let next = (self.peek(), self.peek_at(1), self.peek_at(2), self.peek_at(3));
        let (ahead, negated, skip) = match next {
            (Some('^'), ..) => {
                self.pos += 1;
                return Ok(Some(Node::BeginAnchor));
            }
            (Some('$'), ..) => {
                self.pos += 1;
                return Ok(Some(Node::EndAnchor));
            }
            (Some('\\'), Some(b @ ('b' | 'B')), ..) => {
                self.pos += 2;
                return Ok(Some(Node::WordBoundary { negated: b == 'B' }));
            }
            (Some('('), Some('?'), Some('='), _) => (true, false, 3),
            (Some('('), Some('?'), Some('!'), _) => (true, true, 3),
            (Some('('), Some('?'), Some('<'), Some('=')) => (false, false, 4),
            (Some('('), Some('?'), Some('<'), Some('!')) => (false, true, 4),
            _ => return Ok(None),
        };
        self.pos += skip;
        let body = self.parse_disjunction()?;
        if !self.eat(')') {
            return Err(Error::syntax(open, SyntaxErrorKind::UnterminatedGroup));
        }
        Ok(Some(if ahead {
            Node::LookAhead { negated, body }
        } else {
            Node::LookBehind { negated, body }
        }))
    }

    fn parse_atom(&mut self) -> Result<Node, Error> {
        match self.peek() {
            Some('.') => {
                self.pos += 1;
                Ok(Node::Dot)
            }
            Some('[') => self.parse_char_class(),
            Some('(') => self.parse_group(),
            Some('\\') => self.parse_atom_escape(),
            Some('*' | '+' | '?') => Err(self.error(SyntaxErrorKind::NothingToRepeat)),
            Some('{') if self.brace_quantifier_ahead() => {
                Err(self.error(SyntaxErrorKind::NothingToRepeat))
            }
            // `{`, `}` and `]` that do not form syntax are literals.
            _ => match self.advance() {
                Some(cp) => Ok(Node::Char(cp)),
                None => Err(self.error(SyntaxErrorKind::NothingToRepeat)),
            },
        }
    }

    /// Parse `*`, `+`, `?`, `{n}`, `{n,}`, `{n,m}` and an optional lazy `?`.
    fn parse_quantifier(&mut self) -> Result<Option<Quantifier>, Error> {
        let start = self.pos;
        let (min, max) = match self.peek() {
            Some('*') => {
                self.pos += 1;
                (0, None)
            }
            Some('+') => {
                self.pos += 1;
                (1, None)
            }
            Some('?') => {
                self.pos += 1;
                (0, Some(1))
            }
            Some('{') => match self.parse_brace_quantifier()? {
                Some(bounds) => bounds,
                None => return Ok(None),
            },
            _ => return Ok(None),
        };
        if max.is_some_and(|max| min > max) {
            return Err(Error::syntax(start, SyntaxErrorKind::QuantifierOutOfOrder));
        }
        let lazy = self.eat('?');
        Ok(Some(Quantifier { min, max, lazy }))
    }

    /// Parse the bounds of a brace quantifier. If the text is not a
    /// well-formed quantifier the cursor is restored and `None` returned, so
    /// the `{` reads as a literal.
    fn parse_brace_quantifier(&mut self) -> Result<Option<(u32, Option<u32>)>, Error> {
        let save_pos = self.pos;
        self.pos += 1; // consume '{'
        let bounds = match self.parse_number()? {
            Some(min) if self.eat('}') => Some((min, Some(min))),
            Some(min) if self.eat(',') => {
                if self.eat('}') {
                    Some((min, None))
                } else {
                    match self.parse_number()? {
                        Some(max) if self.eat('}') => Some((min, Some(max))),
                        _ => None,
                    }
                }
            }
            _ => None,
        };
        if bounds.is_none() {
            self.pos = save_pos;
        }
        Ok(bounds)
    }

    fn brace_quantifier_ahead(&mut self) -> bool {
        let save_pos = self.pos;
        let ahead = !matches!(self.parse_brace_quantifier(), Ok(None));
        self.pos = save_pos;
        ahead
    }

    /// Decimal digits at the cursor, or `None` if there are none.
    fn parse_number(&mut self) -> Result<Option<u32>, Error> {
        let start = self.pos;
        let mut value: Option<u32> = None;
        while let Some(digit) = self.peek().and_then(|ch| ch.to_digit(10)) {
            let next = value
                .unwrap_or(0)
                .checked_mul(10)
                .and_then(|v| v.checked_add(digit))
                .ok_or(Error::syntax(start, SyntaxErrorKind::NumberTooLarge))?;
            value = Some(next);
            self.pos += 1;
        }
        Ok(value)
    }

    /// Parse `(...)`, `(?:...)` or `(?<name>...)`.
    fn parse_group(&mut self) -> Result<Node, Error> {
        let open = self.pos;
        self.pos += 1; // consume '('
        let (capture, name) = if self.eat('?') {
            if self.eat(':') {
                (None, None)
            } else if self.eat('<') {
                (Some(0), Some(self.parse_capture_name()?))
            } else {
                return Err(self.error(SyntaxErrorKind::InvalidGroup));
            }
        } else {
            (Some(0), None)
        };
        let body = self.parse_disjunction()?;
        if !self.eat(')') {
            return Err(Error::syntax(open, SyntaxErrorKind::UnterminatedGroup));
        }
        Ok(Node::Group(Group { body, capture, name }))
    }

    /// Name of a `(?<name>` group; must not repeat an earlier one.
    fn parse_capture_name(&mut self) -> Result<String, Error> {
        let start = self.pos;
        let name = self.parse_group_name()?;
        if !self.names.insert(name.clone()) {
            return Err(Error::syntax(start, SyntaxErrorKind::DuplicateGroupName(name)));
        }
        Ok(name)
    }

    /// Parse `name>` after an opening `<`.
    fn parse_group_name(&mut self) -> Result<String, Error> {
        let start = self.pos;
        let mut name = String::new();
        loop {
            match self.peek() {
                Some('>') => {
                    self.pos += 1;
                    break;
                }
                Some(ch) if ch.is_ascii_alphanumeric() || ch == '_' || ch == '$' => {
                    name.push(ch);
                    self.pos += 1;
                }
                _ => return Err(Error::syntax(start, SyntaxErrorKind::InvalidGroupName)),
            }
        }
        if name.is_empty() || name.starts_with(|ch: char| ch.is_ascii_digit()) {
            return Err(Error::syntax(start, SyntaxErrorKind::InvalidGroupName));
        }
        Ok(name)
    }

    /// Parse an escape outside a character class.
    fn parse_atom_escape(&mut self) -> Result<Node, Error> {
        let start = self.pos;
        self.pos += 1; // consume '\'
        if let Some(class) = self.parse_predefined_class(start)? {
            return Ok(Node::Predefined(class));
        }
        match self.peek() {
            None => Err(Error::syntax(start, SyntaxErrorKind::TrailingBackslash)),
            Some('k') if self.peek_at(1) == Some('<') => {
                self.pos += 2;
                let name = self.parse_group_name()?;
                Ok(Node::BackReference(GroupReference::Name(name)))
            }
            Some('1'..='9') => match self.parse_number()? {
                Some(index) => Ok(Node::BackReference(GroupReference::Index(index))),
                None => Err(Error::syntax(start, SyntaxErrorKind::NumberTooLarge)),
            },
            Some(_) => Ok(Node::Char(self.parse_character_escape(start)?)),
        }
    }

    /// `\d \D \s \S \w \W \p{..} \P{..}`, with the cursor after the backslash.
    fn parse_predefined_class(&mut self, start: usize) -> Result<Option<PredefinedClass>, Error> {
        let class = match self.peek() {
            Some('d') => PredefinedClass::Digit,
            Some('D') => PredefinedClass::NotDigit,
            Some('s') => PredefinedClass::Space,
            Some('S') => PredefinedClass::NotSpace,
            Some('w') => PredefinedClass::Word,
            Some('W') => PredefinedClass::NotWord,
            Some(p @ ('p' | 'P')) => {
                self.pos += 1;
                return self.parse_property(start, p == 'P').map(Some);
            }
            _ => return Ok(None),
        };
        self.pos += 1;
        Ok(Some(class))
    }

    /// Parse `{name=value}` or `{value}` after `\p`.
    fn parse_property(&mut self, start: usize, negated: bool) -> Result<PredefinedClass, Error> {
        if !self.eat('{') {
            return Err(Error::syntax(start, SyntaxErrorKind::InvalidPropertyEscape));
        }
        let mut text = String::new();
        loop {
            match self.peek() {
                Some('}') => {
                    self.pos += 1;
                    break;
                }
                Some(ch) => {
                    text.push(ch);
                    self.pos += 1;
                }
                None => return Err(Error::syntax(start, SyntaxErrorKind::InvalidPropertyEscape)),
            }
        }
        let (name, value) = match text.split_once('=') {
            Some((name, value)) => (Some(name.to_string()), value.to_string()),
            None => (None, text.clone()),
        };
        if value.is_empty() || name.as_deref() == Some("") {
            return Err(Error::syntax(start, SyntaxErrorKind::InvalidPropertyEscape));
        }
        let property = unicode::resolve_property(name.as_deref(), &value)
            .ok_or_else(|| Error::syntax(start, SyntaxErrorKind::UnknownProperty(text)))?;
        Ok(PredefinedClass::UnicodeProperty {
            name,
            value,
            negated,
            property,
        })
    }

    /// Escapes that denote a single code point, with the cursor after the
    /// backslash. Unknown escapes stand for the escaped character itself.
    fn parse_character_escape(&mut self, start: usize) -> Result<CodePoint, Error> {
        let ch = self.peek();
        let Some(raw) = self.advance() else {
            return Err(Error::syntax(start, SyntaxErrorKind::TrailingBackslash));
        };
        Ok(match ch {
            Some('f') => 0x0C,
            Some('n') => 0x0A,
            Some('r') => 0x0D,
            Some('t') => 0x09,
            Some('v') => 0x0B,
            Some('0') => 0x00,
            Some('c') => match self.peek() {
                Some(letter) if letter.is_ascii_alphabetic() => {
                    self.pos += 1;
                    CodePoint::from(letter) % 32
                }
                _ => raw,
            },
            Some('x') => self.parse_hex(2).unwrap_or(raw),
            Some('u') if self.peek() == Some('{') => self.parse_braced_unicode(start)?,
            Some('u') => self.parse_hex(4).unwrap_or(raw),
            _ => raw,
        })
    }

    /// Exactly `digits` hex digits; consumes nothing on failure.
    fn parse_hex(&mut self, digits: usize) -> Option<CodePoint> {
        let mut value = 0;
        for offset in 0..digits {
            value = value * 16 + self.peek_at(offset)?.to_digit(16)?;
        }
        self.pos += digits;
        Some(value)
    }

    /// `{H+}` after `\u`.
    fn parse_braced_unicode(&mut self, start: usize) -> Result<CodePoint, Error> {
        let invalid = Error::syntax(start, SyntaxErrorKind::InvalidUnicodeEscape);
        self.pos += 1; // consume '{'
        let mut value: Option<CodePoint> = None;
        while let Some(digit) = self.peek().and_then(|ch| ch.to_digit(16)) {
            let next = value.unwrap_or(0) * 16 + digit;
            if next > 0x10FFFF {
                return Err(invalid);
            }
            value = Some(next);
            self.pos += 1;
        }
        match value {
            Some(value) if self.eat('}') => Ok(value),
            _ => Err(invalid),
        }
    }

    /// Parse a character class: `[abc]`, `[a-z]`, `[^abc]`.
    fn parse_char_class(&mut self) -> Result<Node, Error> {
        let open = self.pos;
        self.pos += 1; // consume '['
        let negated = self.eat('^');
        let mut members = Vec::new();
        loop {
            match self.peek() {
                None => return Err(Error::syntax(open, SyntaxErrorKind::UnterminatedClass)),
                Some(']') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => {}
            }
            let item_start = self.pos;
            let lo = self.parse_class_atom()?;
            // A '-' right before ']' is a literal.
            if self.peek() == Some('-') && !matches!(self.peek_at(1), Some(']') | None) {
                self.pos += 1; // consume '-'
                let hi = self.parse_class_atom()?;
                match (lo, hi) {
                    (ClassMember::Literal(lo), ClassMember::Literal(hi)) => {
                        if lo > hi {
                            return Err(Error::syntax(item_start, SyntaxErrorKind::RangeOutOfOrder));
                        }
                        members.push(ClassMember::Range { lo, hi });
                    }
                    _ => return Err(Error::syntax(item_start, SyntaxErrorKind::InvalidClassRange)),
                }
            } else {
                members.push(lo);
            }
        }
        Ok(Node::Class(CharacterClass { negated, members }))
    }

    fn parse_class_atom(&mut self) -> Result<ClassMember, Error> {
        let start = self.pos;
        if !self.eat('\\') {
            return match self.advance() {
                Some(cp) => Ok(ClassMember::Literal(cp)),
                None => Err(Error::syntax(start, SyntaxErrorKind::UnterminatedClass)),
            };
        }
        if let Some(class) = self.parse_predefined_class(start)? {
            return Ok(ClassMember::Predefined(class));
        }
        if self.eat('b') {
            return Ok(ClassMember::Literal(0x08));
        }
        self.parse_character_escape(start).map(ClassMember::Literal)
    }
}
