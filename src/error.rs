use thiserror::Error;

use crate::ast::GroupReference;

/// Errors reported while compiling a pattern. Matching itself never fails:
/// "no match" is an ordinary `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The pattern text is not a valid expression.
    #[error("invalid pattern at position {position}: {kind}")]
    Syntax {
        /// Code-point offset into the pattern.
        position: usize,
        kind: SyntaxErrorKind,
    },
    /// The pattern uses a recognized construct the matcher cannot execute.
    #[error("backreference {0} is not supported")]
    UnsupportedBackreference(GroupReference),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    #[error("unmatched ')'")]
    UnmatchedParen,
    #[error("unterminated group")]
    UnterminatedGroup,
    #[error("invalid group")]
    InvalidGroup,
    #[error("invalid capture group name")]
    InvalidGroupName,
    #[error("duplicate capture group name '{0}'")]
    DuplicateGroupName(String),
    #[error("nothing to repeat")]
    NothingToRepeat,
    #[error("numbers out of order in quantifier")]
    QuantifierOutOfOrder,
    #[error("number too large")]
    NumberTooLarge,
    #[error("unterminated character class")]
    UnterminatedClass,
    #[error("range out of order in character class")]
    RangeOutOfOrder,
    #[error("invalid character class range")]
    InvalidClassRange,
    #[error("\\ at end of pattern")]
    TrailingBackslash,
    #[error("invalid unicode escape")]
    InvalidUnicodeEscape,
    #[error("invalid property escape")]
    InvalidPropertyEscape,
    #[error("unknown property '{0}'")]
    UnknownProperty(String),
}

impl Error {
    pub(crate) fn syntax(position: usize, kind: SyntaxErrorKind) -> Self {
        Error::Syntax { position, kind }
    }
}
