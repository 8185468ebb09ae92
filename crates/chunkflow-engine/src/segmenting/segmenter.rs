use std::ops::Range;

use crate::models::Segment;
use crate::segmenting::separator::separator_regex;

/// Byte ranges of the non-blank runs between separators.
///
/// Runs that contain only whitespace are skipped; everything else is kept
/// verbatim, including leading indentation and trailing spaces.
pub fn paragraph_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut run_start = 0;

    for separator in separator_regex().find_iter(text) {
        push_if_not_blank(text, run_start..separator.start(), &mut spans);
        run_start = separator.end();
    }
    push_if_not_blank(text, run_start..text.len(), &mut spans);

    spans
}

fn push_if_not_blank(text: &str, run: Range<usize>, spans: &mut Vec<Range<usize>>) {
    if !text[run.clone()].trim().is_empty() {
        spans.push(run);
    }
}

/// Build a segment list from scratch. Every segment gets a fresh id and
/// stale metrics.
pub fn segment(text: &str) -> Vec<Segment> {
    paragraph_spans(text).into_iter().map(Segment::new).collect()
}
