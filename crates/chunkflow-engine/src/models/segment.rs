use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use uuid::Uuid;

use crate::models::SegmentMetrics;

/// Stable identifier for a segment that survives edits
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct SegmentId(pub Uuid);

impl SegmentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SegmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A contiguous, non-overlapping slice of the document text.
///
/// `start` is inclusive and `end` exclusive, both byte offsets into the
/// document text. The separator text between two paragraphs belongs to
/// neither neighbour.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    pub start: usize,
    pub end: usize,
    pub metrics: SegmentMetrics,
}

impl Segment {
    /// Create a segment with a fresh identifier and unset (stale) metrics
    pub fn new(range: Range<usize>) -> Self {
        Self {
            id: SegmentId::new(),
            start: range.start,
            end: range.end,
            metrics: SegmentMetrics::default(),
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// True when `offset` lies inside the segment or directly at its end
    /// (a caret placed after the last character still belongs to it).
    pub fn contains_offset(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// This segment's text, or `None` when the range does not fit `text`
    /// (out of bounds or not on character boundaries).
    pub fn try_text<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.start..self.end)
    }

    /// Slice this segment's text out of the document text.
    ///
    /// A range that does not fit means the segment was never validated
    /// against `text`; that is logged as an error and yields an empty string.
    pub fn text<'a>(&self, text: &'a str) -> &'a str {
        self.try_text(text).unwrap_or_else(|| {
            log::error!(
                "segment {} range {}..{} does not fit a text of {} bytes",
                self.id,
                self.start,
                self.end,
                text.len()
            );
            ""
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_segments_get_distinct_ids() {
        let a = Segment::new(0..3);
        let b = Segment::new(0..3);

        assert_ne!(a.id, b.id);
        assert!(a.metrics.is_stale);
    }

    #[test]
    fn test_text_slices_document() {
        let segment = Segment::new(4..9);

        assert_eq!(segment.text("One\n\nTwo\n"), "\nTwo\n");
        assert_eq!(segment.len(), 5);
    }

    #[test]
    fn test_text_out_of_range_is_empty() {
        let segment = Segment::new(4..90);

        assert_eq!(segment.try_text("short"), None);
        assert_eq!(segment.text("short"), "");
    }

    #[test]
    fn test_try_text_rejects_split_characters() {
        // "é" takes bytes 1..3
        let segment = Segment::new(0..2);

        assert_eq!(segment.try_text("héllo"), None);
        assert_eq!(Segment::new(0..3).try_text("héllo"), Some("hé"));
    }

    #[test]
    fn test_contains_offset_includes_end() {
        let segment = Segment::new(2..5);

        assert!(!segment.contains_offset(1));
        assert!(segment.contains_offset(2));
        assert!(segment.contains_offset(5));
        assert!(!segment.contains_offset(6));
    }
}
