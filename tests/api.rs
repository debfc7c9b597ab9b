use regex_backtrack::{Error, Flags, GroupReference, Regex, SyntaxErrorKind};

fn find(pattern: &str, subject: &str) -> Option<String> {
    Regex::new(pattern).unwrap().find(subject)
}

#[test]
fn literal_and_alternation() {
    assert_eq!(find("abc", "xxabcxx").as_deref(), Some("abc"));
    assert_eq!(find("cat|dog", "hotdog").as_deref(), Some("dog"));
    assert_eq!(find("abc", "ab"), None);
}

#[test]
fn quantifiers() {
    assert_eq!(find("a{2}", "aaaa").as_deref(), Some("aa"));
    assert_eq!(find("a{2,}", "aaaa").as_deref(), Some("aaaa"));
    assert_eq!(find("a{1,3}?b", "aaab").as_deref(), Some("aaab"));
    assert_eq!(find("<.+?>", "<a><b>").as_deref(), Some("<a>"));
    assert_eq!(find("<.+>", "<a><b>").as_deref(), Some("<a><b>"));
    // A malformed brace is an ordinary literal.
    assert_eq!(find("a{,2}", "a{,2}").as_deref(), Some("a{,2}"));
}

#[test]
fn nested_backtracking() {
    let captures = Regex::new("(a+)+b").unwrap().exec("aaab").unwrap();
    assert_eq!(captures.whole().text, "aaab");
    assert_eq!(captures.get(1).map(|c| c.text.as_str()), Some("aaa"));

    let captures = Regex::new("(\\w+)\\s(\\w+)").unwrap().exec("hello big world").unwrap();
    assert_eq!(captures.get(2).map(|c| c.text.as_str()), Some("big"));
}

#[test]
fn quantified_group_keeps_last_iteration() {
    let captures = Regex::new("(?:(\\d)-)+").unwrap().exec("1-2-3-").unwrap();
    assert_eq!(captures.get(1).map(|c| (c.text.as_str(), c.start)), Some(("3", 4)));
}

#[test]
fn lookbehind_with_quantifier() {
    assert_eq!(find("(?<=a+)b", "aaab").as_deref(), Some("b"));
    let re = Regex::new("(?<!a)b").unwrap();
    assert_eq!(re.search("abcb"), Some(3));
}

#[test]
fn unicode_properties() {
    assert_eq!(find("\\p{Lu}+", "abcDEFghi").as_deref(), Some("DEF"));
    assert_eq!(find("\\p{Script=Greek}+", "abc αβγ").as_deref(), Some("αβγ"));
    assert_eq!(find("\\P{L}", "ab1").as_deref(), Some("1"));
    assert_eq!(find("[\\p{N}x]+", "ab12x3").as_deref(), Some("12x3"));
    assert_eq!(find("\\p{Letter}", "1é").as_deref(), Some("é"));
}

#[test]
fn astral_code_points_count_once() {
    let re = Regex::new("^.$").unwrap();
    assert!(re.is_match("\u{1F600}"));
    assert_eq!(Regex::new("b").unwrap().search("\u{1F600}b"), Some(1));
}

#[test]
fn ignore_case_literals_and_classes() {
    let re = Regex::with_flags("hello [w-z]orld", Flags::IGNORE_CASE).unwrap();
    assert_eq!(re.find("Say HELLO World").as_deref(), Some("HELLO World"));
    assert_eq!(re.flags(), Flags::IGNORE_CASE);
}

#[test]
fn multiline_dot() {
    assert_eq!(find("a.c", "a\nc").as_deref(), Some("a\nc"));
    let re = Regex::with_flags("a.c", Flags::MULTILINE).unwrap();
    assert!(!re.is_match("a\nc"));
}

#[test]
fn find_all_reports_absolute_offsets() {
    let re = Regex::new("\\d+").unwrap();
    let found: Vec<_> =
        re.find_all("a1b22c333").into_iter().map(|m| (m.start, m.end, m.text)).collect();
    assert_eq!(
        found,
        vec![(1, 2, "1".to_string()), (3, 5, "22".to_string()), (6, 9, "333".to_string())]
    );
    assert!(re.find_all("abc").is_empty());
}

#[test]
fn compile_errors() {
    assert!(matches!(
        Regex::new("a)"),
        Err(Error::Syntax { position: 1, kind: SyntaxErrorKind::UnmatchedParen })
    ));
    assert!(matches!(
        Regex::new("[z-a]"),
        Err(Error::Syntax { kind: SyntaxErrorKind::RangeOutOfOrder, .. })
    ));
    assert!(matches!(
        Regex::new("*a"),
        Err(Error::Syntax { kind: SyntaxErrorKind::NothingToRepeat, .. })
    ));
    assert_eq!(
        Regex::new("(?<n>a)\\k<n>").unwrap_err(),
        Error::UnsupportedBackreference(GroupReference::Name("n".to_string()))
    );
    let message = Regex::new("(a").unwrap_err().to_string();
    assert!(message.contains("unterminated group"), "{message}");
}

#[test]
fn tree_and_introspection() {
    let re = Regex::new("(?<x>a)|b*").unwrap();
    assert_eq!(re.capture_count(), 1);
    assert_eq!(re.ast().branches.len(), 2);
    let tree = re.to_tree();
    assert!(tree.contains("capture #1 <x>"), "{tree}");
    assert!(tree.contains("quantified {0,} greedy"), "{tree}");
}

#[test]
fn word_boundary_holds_at_subject_edges() {
    assert!(Regex::new("\\b").unwrap().is_match(""));
    assert!(Regex::new("a \\b").unwrap().is_match("a "));
    assert_eq!(Regex::new("\\b a").unwrap().search(" a"), Some(0));
    assert!(!Regex::new("\\B").unwrap().is_match(""));
    assert_eq!(Regex::new("\\B").unwrap().search("ab"), Some(1));
    assert_eq!(find("\\bcat\\b", "a cat sat").as_deref(), Some("cat"));
    assert!(!Regex::new("\\bcat\\b").unwrap().is_match("concatenate"));
}

#[test]
fn failing_star_scan_on_long_subject() {
    let subject = "a".repeat(2000);
    assert!(!Regex::new("a*b").unwrap().is_match(&subject));
    let captures = Regex::new("(a)*b").unwrap().exec(&format!("{subject}b")).unwrap();
    assert_eq!(captures.get(1).map(|c| c.start), Some(1999));
}

#[test]
fn group_names_are_ascii() {
    assert!(Regex::new("(?<word_1$>a)").is_ok());
    assert!(matches!(
        Regex::new("(?<é>a)"),
        Err(Error::Syntax { position: 3, kind: SyntaxErrorKind::InvalidGroupName })
    ));
}
