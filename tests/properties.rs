use regex_backtrack::{Flags, Regex};

const PATTERNS: &[&str] = &[
    "a+b?",
    "(a|ab)(c|bcd)?",
    "\\bx\\w*",
    "(?<=a)b",
    "(?<!c)d+",
    "[^a-c]+",
    "a*?$",
    "(?:a*)*b",
    "^.",
    "\\d{2,3}",
    "(?=a)\\w{2}",
    "B|",
];

const ALPHABET: &[char] = &['a', 'b', 'c', 'd', 'x', 'A', 'B', '1', ' ', '\n'];

fn subject(bytes: &[u8]) -> String {
    bytes
        .iter()
        .take(12)
        .map(|b| ALPHABET[*b as usize % ALPHABET.len()])
        .collect()
}

fn regex(pattern: u8, ignore_case: bool, multiline: bool) -> Regex {
    let mut flags = Flags::empty();
    flags.set(Flags::IGNORE_CASE, ignore_case);
    flags.set(Flags::MULTILINE, multiline);
    Regex::with_flags(PATTERNS[pattern as usize % PATTERNS.len()], flags).unwrap()
}

quickcheck::quickcheck! {
    fn matching_is_deterministic(pattern: u8, bytes: Vec<u8>, ignore_case: bool, multiline: bool) -> bool {
        let re = regex(pattern, ignore_case, multiline);
        let subject = subject(&bytes);
        re.exec(&subject) == re.exec(&subject)
    }

    fn reported_match_is_leftmost(pattern: u8, bytes: Vec<u8>, ignore_case: bool, multiline: bool) -> bool {
        let re = regex(pattern, ignore_case, multiline);
        let subject = subject(&bytes);
        let code_points: Vec<u32> = subject.chars().map(u32::from).collect();
        let first = re.search(&subject).unwrap_or(code_points.len() + 1);
        let earlier_miss = (0..first.min(code_points.len() + 1))
            .all(|start| re.exec_at(&code_points, start).is_none());
        let found_agrees = first > code_points.len() || re.exec_at(&code_points, first).is_some();
        earlier_miss && found_agrees
    }

    fn whole_capture_is_subject_slice(pattern: u8, bytes: Vec<u8>, ignore_case: bool, multiline: bool) -> bool {
        let re = regex(pattern, ignore_case, multiline);
        let subject = subject(&bytes);
        match re.exec(&subject) {
            Some(captures) => {
                let whole = captures.whole();
                let slice: String = subject.chars().skip(whole.start).take(whole.end - whole.start).collect();
                whole.start <= whole.end && whole.text == slice
            }
            None => true,
        }
    }

    fn find_all_matches_are_ordered(pattern: u8, bytes: Vec<u8>) -> bool {
        let re = regex(pattern, false, false);
        let subject = subject(&bytes);
        let matches = re.find_all(&subject);
        matches.windows(2).all(|pair| pair[0].end <= pair[1].start && pair[0].start < pair[1].start)
    }
}
