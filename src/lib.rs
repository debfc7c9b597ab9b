//! A backtracking regular-expression engine.
//!
//! Patterns are parsed into an AST ([`ast`]) and executed directly by the
//! resumable-state matcher in [`matcher`]; there is no automaton
//! compilation step, so pathological patterns can take exponential time.

pub mod ast;
pub mod class;
pub mod compiler;
pub mod error;
pub mod flags;
pub mod matcher;
pub mod parser;
pub mod regex;
pub mod text;
pub mod unicode;

/// One Unicode scalar value.
pub type CodePoint = u32;

pub use crate::ast::GroupReference;
pub use crate::error::{Error, SyntaxErrorKind};
pub use crate::flags::Flags;
pub use crate::regex::{Capture, Captures, Regex};
