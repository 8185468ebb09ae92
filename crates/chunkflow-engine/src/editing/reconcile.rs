use std::collections::HashSet;

use crate::analysis::AnalysisScope;
use crate::models::{Segment, SegmentId};

/// Options for matching freshly derived segments to previous ones
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ReconcilePolicy {
    /// Document version the new segmentation will be committed as
    pub version: u64,
    /// Second pass: unclaimed old segments may claim a new segment with identical text
    pub by_content: bool,
}

#[derive(Clone, Debug, Default)]
pub struct ReconcileOutcome {
    pub segments: Vec<Segment>,
    /// Kept an old identifier and its text is unchanged
    pub preserved: Vec<SegmentId>,
    /// Kept an old identifier but its text differs
    pub altered: Vec<SegmentId>,
    /// Received a fresh identifier
    pub created: Vec<SegmentId>,
    /// Old identifiers that no longer exist
    pub retired: Vec<SegmentId>,
}

/// Re-attach old identifiers and metrics to a segmentation built from scratch.
///
/// A new segment at index `i` inherits the id of the old segment at index `i`
/// when their trimmed texts are equal or one contains the other. Inherited
/// metrics are kept but marked stale: only the contextual class when the
/// text is unchanged, both classes otherwise. Each old id is used at most once and
/// unmatched segments keep the fresh id the segmenter gave them.
///
/// This is positional best effort, not a content diff: after a reorder the
/// segments generally come back with new identifiers unless
/// [`ReconcilePolicy::by_content`] is set.
pub fn reconcile(
    new_segments: Vec<Segment>,
    new_text: &str,
    old_segments: &[Segment],
    old_text: &str,
    policy: ReconcilePolicy,
) -> ReconcileOutcome {
    let mut claimed: HashSet<SegmentId> = HashSet::new();
    let mut matches: Vec<Option<usize>> = vec![None; new_segments.len()];

    for (index, new_segment) in new_segments.iter().enumerate() {
        if let Some(old) = old_segments.get(index)
            && !claimed.contains(&old.id)
            && texts_related(new_segment.text(new_text), old.text(old_text))
        {
            claimed.insert(old.id);
            matches[index] = Some(index);
        }
    }

    if policy.by_content {
        for (index, new_segment) in new_segments.iter().enumerate() {
            if matches[index].is_some() {
                continue;
            }
            let wanted = new_segment.text(new_text).trim();
            let candidate = old_segments
                .iter()
                .position(|old| !claimed.contains(&old.id) && old.text(old_text).trim() == wanted);
            if let Some(old_index) = candidate {
                claimed.insert(old_segments[old_index].id);
                matches[index] = Some(old_index);
            }
        }
    }

    let mut outcome = ReconcileOutcome {
        segments: Vec::with_capacity(new_segments.len()),
        ..ReconcileOutcome::default()
    };

    for (mut segment, matched) in new_segments.into_iter().zip(matches) {
        match matched {
            Some(old_index) => {
                let old = &old_segments[old_index];
                segment.id = old.id;
                segment.metrics = old.metrics.clone();
                if segment.text(new_text) == old.text(old_text) {
                    // Same text in a new context
                    segment
                        .metrics
                        .invalidate(AnalysisScope::Contextual, policy.version);
                    outcome.preserved.push(segment.id);
                } else {
                    segment.metrics.mark_stale(policy.version);
                    outcome.altered.push(segment.id);
                }
            }
            None => {
                segment.metrics.mark_stale(policy.version);
                outcome.created.push(segment.id);
            }
        }
        outcome.segments.push(segment);
    }

    outcome.retired = old_segments
        .iter()
        .map(|old| old.id)
        .filter(|id| !claimed.contains(id))
        .collect();

    outcome
}

fn texts_related(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    a == b || a.contains(b) || b.contains(a)
}
