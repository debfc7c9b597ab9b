//! Compiler: checks the parsed AST, numbers its capture groups and derives
//! the search prefilters.

use log::debug;

use crate::CodePoint;
use crate::ast::*;
use crate::error::Error;
use crate::flags::Flags;
use crate::parser;

/// Compiled program.
#[derive(Debug, Clone)]
pub struct Program {
    pub root: Disjunction,
    pub flags: Flags,
    /// Number of capturing groups, lookaround bodies included.
    pub capture_count: u32,
    /// If every match must start with a specific literal code point, store it here.
    /// Used by the search loop to skip starting positions that can't possibly match.
    pub first_char: Option<CodePoint>,
    /// Whether every branch is anchored at the start (^) of the subject.
    pub anchored_start: bool,
}

/// Parse `pattern` and compile it into a program.
pub fn compile(pattern: &[CodePoint], flags: Flags) -> Result<Program, Error> {
    let mut root = parser::parse(pattern)?;
    let capture_count = root.allocate_captures(1) - 1;
    reject_backreferences(&root)?;

    let first_char = if flags.ignore_case() { None } else { extract_first_char(&root) };
    let anchored_start = !flags.multiline()
        && !root.branches.is_empty()
        && root
            .branches
            .iter()
            .all(|branch| matches!(branch.terms.first(), Some(Node::BeginAnchor)));

    debug!(
        "compiled pattern `{root}`: {capture_count} capture(s), \
         first char {first_char:?}, anchored {anchored_start}"
    );
    Ok(Program {
        root,
        flags,
        capture_count,
        first_char,
        anchored_start,
    })
}

fn reject_backreferences(root: &Disjunction) -> Result<(), Error> {
    let mut found: Option<GroupReference> = None;
    root.walk(&mut |node| {
        if let Node::BackReference(reference) = node {
            found.get_or_insert_with(|| reference.clone());
        }
    });
    match found {
        Some(reference) => Err(Error::UnsupportedBackreference(reference)),
        None => Ok(()),
    }
}

/// Extract the first required literal code point, if any.
fn extract_first_char(root: &Disjunction) -> Option<CodePoint> {
    let [branch] = root.branches.as_slice() else {
        return None;
    };
    let mut terms = branch.terms.iter();
    match terms.next()? {
        Node::Char(cp) => Some(*cp),
        // If the first term is `^`, check the next one
        Node::BeginAnchor => match terms.next()? {
            Node::Char(cp) => Some(*cp),
            _ => None,
        },
        _ => None,
    }
}
