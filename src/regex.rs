//! The public matching API over a compiled [`Program`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use log::debug;

use crate::CodePoint;
use crate::ast::Disjunction;
use crate::compiler::{self, Program};
use crate::error::Error;
use crate::flags::Flags;
use crate::matcher::{self, CaptureKey, Outcome, Span};
use crate::text::{from_code_points, to_code_points};

/// A compiled regular expression.
#[derive(Debug, Clone)]
pub struct Regex {
    program: Program,
}

/// Text matched by the whole pattern or one group. Offsets count code
/// points into the subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Capture {
    fn new(subject: &[CodePoint], span: Span, offset: usize) -> Self {
        let text = subject.get(span.start..span.end).map(from_code_points).unwrap_or_default();
        Capture {
            text,
            start: span.start + offset,
            end: span.end + offset,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Result of a successful match. Groups that took no part in the match are
/// absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captures {
    whole: Capture,
    groups: BTreeMap<CaptureKey, Capture>,
    count: usize,
}

impl Captures {
    /// Group `index`; 0 is the whole match.
    pub fn get(&self, index: usize) -> Option<&Capture> {
        if index == 0 {
            return Some(&self.whole);
        }
        let index = u32::try_from(index).ok()?;
        self.groups.get(&CaptureKey::Index(index))
    }

    pub fn name(&self, name: &str) -> Option<&Capture> {
        self.groups.get(&CaptureKey::Name(name.to_string()))
    }

    pub fn whole(&self) -> &Capture {
        &self.whole
    }

    /// Number of groups including the whole match, whether or not they
    /// participated.
    pub fn len(&self) -> usize {
        self.count + 1
    }

    /// Always `false`: group 0, the whole match, is always present.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Every group in index order, starting with the whole match.
    pub fn iter(&self) -> impl Iterator<Item = Option<&Capture>> + '_ {
        (0..self.len()).map(|index| self.get(index))
    }
}

impl Regex {
    pub fn new(pattern: &str) -> Result<Self, Error> {
        Regex::with_flags(pattern, Flags::empty())
    }

    pub fn with_flags(pattern: &str, flags: Flags) -> Result<Self, Error> {
        Regex::from_code_points(&to_code_points(pattern), flags)
    }

    pub fn from_code_points(pattern: &[CodePoint], flags: Flags) -> Result<Self, Error> {
        let program = compiler::compile(pattern, flags)?;
        Ok(Regex { program })
    }

    pub fn ast(&self) -> &Disjunction {
        &self.program.root
    }

    /// Indented rendering of the AST, one node per line.
    pub fn to_tree(&self) -> String {
        self.program.root.to_tree()
    }

    /// Number of capturing groups, not counting the whole match.
    pub fn capture_count(&self) -> usize {
        self.program.capture_count as usize
    }

    pub fn flags(&self) -> Flags {
        self.program.flags
    }

    /// Leftmost match in `subject`.
    pub fn exec(&self, subject: &str) -> Option<Captures> {
        self.exec_code_points(&to_code_points(subject))
    }

    pub fn exec_code_points(&self, subject: &[CodePoint]) -> Option<Captures> {
        let (start, outcome) = matcher::search(&self.program, subject)?;
        debug!("match at {start}..{}", outcome.index);
        Some(self.captures(subject, start, outcome, 0))
    }

    /// A single attempt anchored at `start`, with no scanning.
    pub fn exec_at(&self, subject: &[CodePoint], start: usize) -> Option<Captures> {
        if start > subject.len() {
            return None;
        }
        let outcome = matcher::match_at(&self.program, subject, start)?;
        Some(self.captures(subject, start, outcome, 0))
    }

    pub fn is_match(&self, subject: &str) -> bool {
        self.exec(subject).is_some()
    }

    /// Text of the leftmost match.
    pub fn find(&self, subject: &str) -> Option<String> {
        self.exec(subject).map(|captures| captures.whole.text)
    }

    /// Every match from left to right. After each match the search resumes
    /// on the remainder of the subject, one code point further for empty
    /// matches, so `^` holds at the start of every remainder.
    pub fn find_all(&self, subject: &str) -> Vec<Capture> {
        let subject = to_code_points(subject);
        let mut matches = Vec::new();
        let mut offset = 0;
        while offset <= subject.len() {
            let rest = &subject[offset..];
            let Some((start, outcome)) = matcher::search(&self.program, rest) else {
                break;
            };
            let whole = self.captures(rest, start, outcome, offset).whole;
            debug!("match at {}..{}", whole.start, whole.end);
            offset = whole.start + whole.len().max(1);
            matches.push(whole);
        }
        matches
    }

    /// Code-point offset of the leftmost match.
    pub fn search(&self, subject: &str) -> Option<usize> {
        self.exec(subject).map(|captures| captures.whole.start)
    }

    fn captures(
        &self,
        subject: &[CodePoint],
        start: usize,
        outcome: Outcome,
        offset: usize,
    ) -> Captures {
        let end = usize::try_from(outcome.index).unwrap_or(start).max(start);
        let whole = Capture::new(subject, Span { start, end }, offset);
        let groups = outcome
            .captures
            .into_iter()
            .map(|(key, span)| (key, Capture::new(subject, span, offset)))
            .collect();
        Captures { whole, groups, count: self.capture_count() }
    }
}

impl FromStr for Regex {
    type Err = Error;

    fn from_str(pattern: &str) -> Result<Self, Self::Err> {
        Regex::new(pattern)
    }
}

/// Normalized pattern text, re-parseable into the same AST.
impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(captures: &Captures) -> Vec<Option<&str>> {
        captures.iter().map(|c| c.map(|c| c.text.as_str())).collect()
    }

    #[test]
    fn greedy_and_lazy() {
        assert_eq!(Regex::new("a+").unwrap().find("aaa").as_deref(), Some("aaa"));
        assert_eq!(Regex::new("a+?").unwrap().find("aaa").as_deref(), Some("a"));
        assert_eq!(Regex::new("a|ab").unwrap().find("ab").as_deref(), Some("a"));
    }

    #[test]
    fn groups_and_names() {
        let re = Regex::new("(?<year>\\d{4})-(\\d{2})(x)?").unwrap();
        let captures = re.exec("on 2024-06!").unwrap();
        assert_eq!(texts(&captures), vec![Some("2024-06"), Some("2024"), Some("06"), None]);
        assert_eq!(captures.name("year").map(|c| c.start), Some(3));
        assert_eq!(captures.whole().end, 10);
        assert_eq!(captures.len(), 4);
        assert!(!captures.is_empty());
        assert!(captures.name("month").is_none());
    }

    #[test]
    fn anchors_and_multiline() {
        let re = Regex::new("^b").unwrap();
        assert!(!re.is_match("a\nb"));
        let re = Regex::with_flags("^b$", Flags::MULTILINE).unwrap();
        assert_eq!(re.search("a\nb\nc"), Some(2));
    }

    #[test]
    fn lookaround() {
        assert_eq!(Regex::new("(?=ab)ab").unwrap().find("xab").as_deref(), Some("ab"));
        assert_eq!(Regex::new("(?<=\\$)\\d+").unwrap().find("a1 $42").as_deref(), Some("42"));
        assert_eq!(Regex::new("a(?!b)").unwrap().search("abac"), Some(2));
        // Groups inside lookaround are numbered but never reported.
        let captures = Regex::new("(?<=(b))(c)").unwrap().exec("abc").unwrap();
        assert_eq!(texts(&captures), vec![Some("c"), None, Some("c")]);
    }

    #[test]
    fn word_boundaries_and_classes() {
        assert_eq!(Regex::new("\\bcat\\b").unwrap().search("concat cat"), Some(7));
        assert_eq!(Regex::new("\\Bcat").unwrap().search("cat concat"), Some(7));
        assert_eq!(Regex::new("[^a-c]").unwrap().find("abcd").as_deref(), Some("d"));
    }

    #[test]
    fn ignore_case() {
        let re = Regex::with_flags("straße", Flags::IGNORE_CASE).unwrap();
        assert!(re.is_match("STRAßE"));
        let re = Regex::with_flags("[a-z]+", Flags::IGNORE_CASE).unwrap();
        assert_eq!(re.find("123ABC").as_deref(), Some("ABC"));
    }

    #[test]
    fn find_all_advances_past_each_match() {
        let re = Regex::new("a").unwrap();
        let starts: Vec<_> = re.find_all("aaa").iter().map(|c| c.start).collect();
        assert_eq!(starts, vec![0, 1, 2]);

        let re = Regex::new("a*").unwrap();
        let found: Vec<_> = re.find_all("baa").into_iter().map(|c| (c.start, c.text)).collect();
        assert_eq!(found, vec![(0, String::new()), (1, "aa".to_string()), (3, String::new())]);
    }

    #[test]
    fn exec_at_does_not_scan() {
        let re = Regex::new("b").unwrap();
        let subject = to_code_points("ab");
        assert!(re.exec_at(&subject, 0).is_none());
        assert_eq!(re.exec_at(&subject, 1).map(|c| c.whole().start), Some(1));
        assert!(re.exec_at(&subject, 3).is_none());
    }

    #[test]
    fn empty_pattern_matches_everywhere() {
        let re = Regex::new("").unwrap();
        assert_eq!(re.search(""), Some(0));
        assert_eq!(re.find_all("ab").len(), 3);
    }

    #[test]
    fn display_and_from_str() {
        let re: Regex = "a{1,}?(?:b|)".parse().unwrap();
        assert_eq!(re.to_string(), "a+?(?:b|)");
        assert!("(".parse::<Regex>().is_err());
    }
}
