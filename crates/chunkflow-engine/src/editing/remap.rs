use crate::analysis::AnalysisScope;
use crate::editing::EditDelta;
use crate::models::{Segment, SegmentId};

/// How the remapper treats segments an edit did not touch
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RemapPolicy {
    /// Document version the edit will be committed as
    pub version: u64,
    /// Mark the contextual metrics of segments that only moved (content
    /// unchanged) as stale
    pub invalidate_shifted: bool,
}

/// Result of carrying a segment list through one edit
#[derive(Clone, Debug, Default)]
pub struct RemapOutcome {
    pub segments: Vec<Segment>,
    /// Segments whose own text changed
    pub touched: Vec<SegmentId>,
    /// Segments that moved without their text changing
    pub shifted: Vec<SegmentId>,
    /// Segments whose entire content was replaced by the edit
    pub dropped: Vec<SegmentId>,
}

/// Shift, grow, shrink or drop existing segments for a localized edit while
/// keeping their identities.
///
/// The result is best effort for edits that cross segment boundaries; callers
/// must validate it and fall back to a full resegmentation if it fails.
pub fn remap(segments: &[Segment], delta: &EditDelta, policy: RemapPolicy) -> RemapOutcome {
    let mut outcome = RemapOutcome {
        segments: Vec::with_capacity(segments.len()),
        ..RemapOutcome::default()
    };

    for segment in segments {
        let mut segment = segment.clone();

        if segment.start <= delta.start && delta.end <= segment.end {
            // Edit lies inside the segment, including insertions at either edge
            let end = delta.shift_offset(segment.end);
            if end <= segment.start {
                outcome.dropped.push(segment.id);
                continue;
            }
            segment.end = end;
            segment.metrics.mark_stale(policy.version);
            outcome.touched.push(segment.id);
        } else if segment.end <= delta.start {
            // Entirely before the edit
        } else if segment.start >= delta.end {
            segment.start = delta.shift_offset(segment.start);
            segment.end = delta.shift_offset(segment.end);
            if policy.invalidate_shifted {
                // Own text unchanged, only its position in the document moved
                segment
                    .metrics
                    .invalidate(AnalysisScope::Contextual, policy.version);
            }
            outcome.shifted.push(segment.id);
        } else if delta.start <= segment.start && segment.end <= delta.end {
            // Content fully replaced, no surviving identity
            outcome.dropped.push(segment.id);
            continue;
        } else {
            if delta.start < segment.start {
                // Edit covers the head of the segment
                segment.start = delta.start;
                segment.end = delta.shift_offset(segment.end);
            } else {
                // Edit covers the tail of the segment
                segment.end = delta.new_end();
            }
            segment.metrics.mark_stale(policy.version);
            outcome.touched.push(segment.id);
        }

        outcome.segments.push(segment);
    }

    outcome
}
