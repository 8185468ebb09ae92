use serde::{Deserialize, Serialize};

use chunkflow_config::ScopeThresholds;

use crate::editing::EditDelta;
use crate::segmenting::{contains_separator, paragraph_spans, separator_spans};

/// How much of the document's context-dependent analysis an edit invalidates
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeScope {
    /// Only the segment that was edited
    Local,
    /// Every segment in the document
    Global,
}

const SENTENCE_TERMINATORS: [char; 4] = ['.', '!', '?', '…'];

/// Decide whether an edit could have moved paragraph boundaries.
///
/// Returns `false` only when the segment count is provably unchanged and
/// every separator merely shifted, in which case remapping positions is
/// enough. A delta that does not describe `text_before` always needs a
/// full resegmentation.
pub fn needs_full_resegmentation(text_before: &str, delta: &EditDelta) -> bool {
    match delta.apply(text_before) {
        Some(text_after) => boundaries_changed(text_before, &text_after, delta),
        None => true,
    }
}

/// [`needs_full_resegmentation`] for callers that already hold the text after the edit.
pub(crate) fn boundaries_changed(text_before: &str, text_after: &str, delta: &EditDelta) -> bool {
    if contains_separator(&delta.new_text) || contains_separator(&delta.old_text) {
        return true;
    }

    // Separators can also appear from context, e.g. "a\n" + "\nb"
    let before = separator_spans(text_before);
    let after = separator_spans(text_after);
    if before.len() != after.len() {
        return true;
    }

    // A separator next to the edit can grow or shrink without changing the count
    let separators_moved = before
        .iter()
        .zip(&after)
        .any(|(old, new)| delta.map_untouched(old).as_ref() != Some(new));
    if separators_moved {
        return true;
    }

    // Whitespace-only runs gaining or losing content change the segment count
    paragraph_spans(text_before).len() != paragraph_spans(text_after).len()
}

/// Classify an edit as local or global for contextual re-analysis.
///
/// Mid-sized edits that are neither clearly local nor clearly global are
/// treated as global.
pub fn classify(delta: &EditDelta, thresholds: &ScopeThresholds) -> ChangeScope {
    if contains_separator(&delta.new_text) || contains_separator(&delta.old_text) {
        return ChangeScope::Global;
    }

    let inserted = delta.new_text.chars().count();
    let deleted = delta.old_text.chars().count();
    if inserted > thresholds.global_insert_chars || deleted > thresholds.global_delete_chars {
        return ChangeScope::Global;
    }

    let edited = || delta.new_text.chars().chain(delta.old_text.chars());
    let terminators = edited()
        .filter(|c| SENTENCE_TERMINATORS.contains(c))
        .count();
    let newlines = edited().filter(|&c| c == '\n').count();

    if inserted < thresholds.local_insert_chars
        && deleted < thresholds.local_delete_chars
        && terminators <= thresholds.local_max_terminators
        && newlines <= thresholds.local_max_newlines
    {
        ChangeScope::Local
    } else {
        ChangeScope::Global
    }
}
