//! Single-code-point predicates: literal characters, `.`, bracketed classes
//! and the predefined classes.

use crate::CodePoint;
use crate::ast::{CharacterClass, ClassMember, PredefinedClass};
use crate::flags::Flags;
use crate::unicode;

pub fn is_line_terminator(cp: CodePoint) -> bool {
    matches!(cp, 0x0A | 0x0D | 0x2028 | 0x2029)
}

pub fn is_digit(cp: CodePoint) -> bool {
    (0x30..=0x39).contains(&cp)
}

/// `[A-Za-z0-9_]`
pub fn is_word_char(cp: CodePoint) -> bool {
    char::from_u32(cp).is_some_and(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

pub fn is_space(cp: CodePoint) -> bool {
    matches!(
        cp,
        0x09..=0x0D
            | 0x20
            | 0x85
            | 0xA0
            | 0x1680
            | 0x2000..=0x200A
            | 0x2028
            | 0x2029
            | 0x202F
            | 0x205F
            | 0x3000
            | 0xFEFF
    )
}

fn fold(cp: CodePoint) -> CodePoint {
    unicode::uppercase(cp).unwrap_or(cp)
}

/// Literal comparison. Under `IGNORE_CASE` both sides are uppercased
/// independently, each keeping its own value when it has no mapping.
pub fn char_matches(expected: CodePoint, actual: CodePoint, flags: Flags) -> bool {
    expected == actual || (flags.ignore_case() && fold(expected) == fold(actual))
}

pub fn dot_matches(cp: CodePoint, flags: Flags) -> bool {
    !(flags.multiline() && is_line_terminator(cp))
}

impl CharacterClass {
    pub fn matches(&self, cp: CodePoint, flags: Flags) -> bool {
        let hit = self.members.iter().any(|member| member.matches(cp, flags));
        hit != self.negated
    }
}

impl ClassMember {
    fn matches(&self, cp: CodePoint, flags: Flags) -> bool {
        match self {
            ClassMember::Literal(expected) => char_matches(*expected, cp, flags),
            ClassMember::Range { lo, hi } => {
                let within = |c: CodePoint| (*lo..=*hi).contains(&c);
                within(cp)
                    || (flags.ignore_case()
                        && (unicode::uppercase(cp).is_some_and(within)
                            || unicode::lowercase(cp).is_some_and(within)))
            }
            ClassMember::Predefined(class) => class.matches(cp),
        }
    }
}

impl PredefinedClass {
    pub fn matches(&self, cp: CodePoint) -> bool {
        match self {
            PredefinedClass::Digit => is_digit(cp),
            PredefinedClass::NotDigit => !is_digit(cp),
            PredefinedClass::Space => is_space(cp),
            PredefinedClass::NotSpace => !is_space(cp),
            PredefinedClass::Word => is_word_char(cp),
            PredefinedClass::NotWord => !is_word_char(cp),
            PredefinedClass::UnicodeProperty { negated, property, .. } => {
                property.contains(cp) != *negated
            }
        }
    }
}
