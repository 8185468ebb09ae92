use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

/// A line break followed by one or more blank (whitespace-only) lines.
pub const SEPARATOR_PATTERN: &str = r"\r?\n(?:[ \t]*\r?\n)+";

pub fn separator_regex() -> &'static Regex {
    static SEPARATOR_REGEX: OnceLock<Regex> = OnceLock::new();
    SEPARATOR_REGEX
        .get_or_init(|| Regex::new(SEPARATOR_PATTERN).expect("Invalid separator regex"))
}

/// True if `text` contains at least one paragraph separator
pub fn contains_separator(text: &str) -> bool {
    separator_regex().is_match(text)
}

/// Byte ranges of every separator in `text`, in order
pub fn separator_spans(text: &str) -> Vec<Range<usize>> {
    separator_regex()
        .find_iter(text)
        .map(|m| m.range())
        .collect()
}
