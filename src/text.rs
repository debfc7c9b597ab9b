//! Conversion between Rust strings and code-point buffers.

use crate::CodePoint;

pub fn to_code_points(s: &str) -> Vec<CodePoint> {
    s.chars().map(CodePoint::from).collect()
}

/// Decode a code-point slice. Values that are not scalar values (lone
/// surrogates, anything above U+10FFFF) decode to U+FFFD.
pub fn from_code_points(code_points: &[CodePoint]) -> String {
    code_points
        .iter()
        .map(|&cp| char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}
