//! Unicode character database lookups: simple case mappings, the General
//! Category and Script properties, and `\p{..}` name resolution.

use unicode_general_category::{GeneralCategory, get_general_category};
use unicode_script::UnicodeScript;

pub use unicode_script::Script;

use crate::CodePoint;

/// General Category values, named by their two-letter abbreviations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Lu,
    Ll,
    Lt,
    Lm,
    Lo,
    Mn,
    Mc,
    Me,
    Nd,
    Nl,
    No,
    Pc,
    Pd,
    Ps,
    Pe,
    Pi,
    Pf,
    Po,
    Sm,
    Sc,
    Sk,
    So,
    Zs,
    Zl,
    Zp,
    Cc,
    Cf,
    Cs,
    Co,
    Cn,
}

static CATEGORY_NAMES: [(Category, &str, &str); 30] = [
    (Category::Lu, "Lu", "Uppercase_Letter"),
    (Category::Ll, "Ll", "Lowercase_Letter"),
    (Category::Lt, "Lt", "Titlecase_Letter"),
    (Category::Lm, "Lm", "Modifier_Letter"),
    (Category::Lo, "Lo", "Other_Letter"),
    (Category::Mn, "Mn", "Nonspacing_Mark"),
    (Category::Mc, "Mc", "Spacing_Mark"),
    (Category::Me, "Me", "Enclosing_Mark"),
    (Category::Nd, "Nd", "Decimal_Number"),
    (Category::Nl, "Nl", "Letter_Number"),
    (Category::No, "No", "Other_Number"),
    (Category::Pc, "Pc", "Connector_Punctuation"),
    (Category::Pd, "Pd", "Dash_Punctuation"),
    (Category::Ps, "Ps", "Open_Punctuation"),
    (Category::Pe, "Pe", "Close_Punctuation"),
    (Category::Pi, "Pi", "Initial_Punctuation"),
    (Category::Pf, "Pf", "Final_Punctuation"),
    (Category::Po, "Po", "Other_Punctuation"),
    (Category::Sm, "Sm", "Math_Symbol"),
    (Category::Sc, "Sc", "Currency_Symbol"),
    (Category::Sk, "Sk", "Modifier_Symbol"),
    (Category::So, "So", "Other_Symbol"),
    (Category::Zs, "Zs", "Space_Separator"),
    (Category::Zl, "Zl", "Line_Separator"),
    (Category::Zp, "Zp", "Paragraph_Separator"),
    (Category::Cc, "Cc", "Control"),
    (Category::Cf, "Cf", "Format"),
    (Category::Cs, "Cs", "Surrogate"),
    (Category::Co, "Co", "Private_Use"),
    (Category::Cn, "Cn", "Unassigned"),
];

use Category::*;

static CATEGORY_GROUPS: [(&str, &str, &[Category]); 8] = [
    ("L", "Letter", &[Lu, Ll, Lt, Lm, Lo]),
    ("LC", "Cased_Letter", &[Lu, Ll, Lt]),
    ("M", "Mark", &[Mn, Mc, Me]),
    ("N", "Number", &[Nd, Nl, No]),
    ("P", "Punctuation", &[Pc, Pd, Ps, Pe, Pi, Pf, Po]),
    ("S", "Symbol", &[Sm, Sc, Sk, So]),
    ("Z", "Separator", &[Zs, Zl, Zp]),
    ("C", "Other", &[Cc, Cf, Cs, Co, Cn]),
];

// Extra spellings from PropertyValueAliases.txt, keyed by loose name.
static CATEGORY_ALIASES: [(&str, &str); 4] = [
    ("digit", "Nd"),
    ("combiningmark", "M"),
    ("punct", "P"),
    ("cntrl", "Cc"),
];

impl Category {
    pub fn short_name(self) -> &'static str {
        CATEGORY_NAMES[self as usize].1
    }

    pub fn long_name(self) -> &'static str {
        CATEGORY_NAMES[self as usize].2
    }
}

impl From<GeneralCategory> for Category {
    fn from(category: GeneralCategory) -> Self {
        match category {
            GeneralCategory::UppercaseLetter => Lu,
            GeneralCategory::LowercaseLetter => Ll,
            GeneralCategory::TitlecaseLetter => Lt,
            GeneralCategory::ModifierLetter => Lm,
            GeneralCategory::OtherLetter => Lo,
            GeneralCategory::NonspacingMark => Mn,
            GeneralCategory::SpacingMark => Mc,
            GeneralCategory::EnclosingMark => Me,
            GeneralCategory::DecimalNumber => Nd,
            GeneralCategory::LetterNumber => Nl,
            GeneralCategory::OtherNumber => No,
            GeneralCategory::ConnectorPunctuation => Pc,
            GeneralCategory::DashPunctuation => Pd,
            GeneralCategory::OpenPunctuation => Ps,
            GeneralCategory::ClosePunctuation => Pe,
            GeneralCategory::InitialPunctuation => Pi,
            GeneralCategory::FinalPunctuation => Pf,
            GeneralCategory::OtherPunctuation => Po,
            GeneralCategory::MathSymbol => Sm,
            GeneralCategory::CurrencySymbol => Sc,
            GeneralCategory::ModifierSymbol => Sk,
            GeneralCategory::OtherSymbol => So,
            GeneralCategory::SpaceSeparator => Zs,
            GeneralCategory::LineSeparator => Zl,
            GeneralCategory::ParagraphSeparator => Zp,
            GeneralCategory::Control => Cc,
            GeneralCategory::Format => Cf,
            GeneralCategory::PrivateUse => Co,
            _ => Cn,
        }
    }
}

/// Which property a `\p{name=..}` name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyName {
    GeneralCategory,
    Script,
}

/// A resolved `\p{..}` predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Category(&'static [Category]),
    Script(Script),
}

impl Property {
    pub fn contains(&self, cp: CodePoint) -> bool {
        match self {
            Property::Category(set) => set.contains(&general_category(cp)),
            Property::Script(expected) => script(cp) == *expected,
        }
    }
}

/// Simple uppercase mapping. `None` when the code point has no
/// single-code-point uppercase form distinct from itself.
pub fn uppercase(cp: CodePoint) -> Option<CodePoint> {
    let ch = char::from_u32(cp)?;
    let mut mapped = ch.to_uppercase();
    match (mapped.next(), mapped.next()) {
        (Some(upper), None) if upper != ch => Some(CodePoint::from(upper)),
        _ => None,
    }
}

pub fn lowercase(cp: CodePoint) -> Option<CodePoint> {
    let ch = char::from_u32(cp)?;
    let mut mapped = ch.to_lowercase();
    match (mapped.next(), mapped.next()) {
        (Some(lower), None) if lower != ch => Some(CodePoint::from(lower)),
        _ => None,
    }
}

pub fn general_category(cp: CodePoint) -> Category {
    match char::from_u32(cp) {
        Some(ch) => Category::from(get_general_category(ch)),
        None if (0xD800..=0xDFFF).contains(&cp) => Cs,
        None => Cn,
    }
}

pub fn script(cp: CodePoint) -> Script {
    char::from_u32(cp).map_or(Script::Unknown, |ch| ch.script())
}

/// Case, whitespace, `_` and `-` insensitive comparison key (UAX44-LM3).
fn loose(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn resolve_property_alias(name: &str) -> Option<PropertyName> {
    match loose(name).as_str() {
        "gc" | "generalcategory" => Some(PropertyName::GeneralCategory),
        "sc" | "script" | "scx" | "scriptextensions" => Some(PropertyName::Script),
        _ => None,
    }
}

/// Resolve the contents of `\p{name=value}`. Without a name the value is
/// looked up as a general category first and as a script second.
pub fn resolve_property(name: Option<&str>, value: &str) -> Option<Property> {
    match name {
        Some(name) => match resolve_property_alias(name)? {
            PropertyName::GeneralCategory => category_value(value),
            PropertyName::Script => script_value(value),
        },
        None => category_value(value).or_else(|| script_value(value)),
    }
}

fn category_value(value: &str) -> Option<Property> {
    let key = loose(value);
    let key = CATEGORY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map_or(key.clone(), |(_, short)| loose(short));
    if let Some((category, _, _)) = CATEGORY_NAMES
        .iter()
        .find(|(_, short, long)| loose(short) == key || loose(long) == key)
    {
        return Some(Property::Category(std::slice::from_ref(category)));
    }
    CATEGORY_GROUPS
        .iter()
        .find(|(short, long, _)| loose(short) == key || loose(long) == key)
        .map(|(_, _, members)| Property::Category(*members))
}

fn script_value(value: &str) -> Option<Property> {
    Script::from_full_name(value)
        .or_else(|| Script::from_short_name(value))
        .or_else(|| Script::from_full_name(&title_case(value)))
        .or_else(|| Script::from_short_name(&title_case(value)))
        .map(Property::Script)
}

// "old_italic" -> "Old_Italic", "grek" -> "Grek"
fn title_case(value: &str) -> String {
    value
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join("_")
}
