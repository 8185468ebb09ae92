use std::collections::HashSet;

use crate::error::ValidationError;
use crate::models::Segment;

/// Structural check used before any segment list is committed.
///
/// Fails on out-of-bounds or empty ranges and on overlapping or unsorted
/// segments.
pub fn validate(segments: &[Segment], text_length: usize) -> bool {
    check_structure(segments, text_length).is_ok()
}

/// Same as [`validate`] but reports which invariant failed.
pub fn check_structure(segments: &[Segment], text_length: usize) -> Result<(), ValidationError> {
    for (index, segment) in segments.iter().enumerate() {
        if segment.end > text_length {
            return Err(ValidationError::OutOfBounds {
                index,
                start: segment.start,
                end: segment.end,
                len: text_length,
            });
        }
        if segment.start >= segment.end {
            return Err(ValidationError::EmptyRange {
                index,
                start: segment.start,
                end: segment.end,
            });
        }
    }

    for (index, pair) in segments.windows(2).enumerate() {
        let (a, b) = (&pair[0], &pair[1]);
        if b.start < a.start {
            return Err(ValidationError::Unsorted { index: index + 1 });
        }
        if !(a.end <= b.start || b.end <= a.start) {
            return Err(ValidationError::Overlap {
                first: index,
                second: index + 1,
            });
        }
    }

    Ok(())
}

/// Full invariant check against the text the segments describe: structure,
/// character boundaries, non-blank content and unique identifiers.
pub fn check_against_text(segments: &[Segment], text: &str) -> Result<(), ValidationError> {
    check_structure(segments, text.len())?;

    let mut seen = HashSet::with_capacity(segments.len());
    for (index, segment) in segments.iter().enumerate() {
        let Some(slice) = text.get(segment.range()) else {
            return Err(ValidationError::NotCharBoundary { index });
        };
        if slice.trim().is_empty() {
            return Err(ValidationError::Blank { index });
        }
        if !seen.insert(segment.id) {
            return Err(ValidationError::DuplicateId(segment.id));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn segments(ranges: &[std::ops::Range<usize>]) -> Vec<Segment> {
        ranges.iter().cloned().map(Segment::new).collect()
    }

    #[test]
    fn test_valid_layout() {
        assert!(validate(&segments(&[0..3, 5..8]), 8));
        assert!(validate(&[], 0));
    }

    #[test]
    fn test_touching_segments_do_not_overlap() {
        assert!(validate(&segments(&[0..3, 3..8]), 8));
    }

    #[test]
    fn test_out_of_bounds() {
        assert_eq!(
            check_structure(&segments(&[0..3, 5..9]), 8),
            Err(ValidationError::OutOfBounds {
                index: 1,
                start: 5,
                end: 9,
                len: 8
            })
        );
    }

    #[test]
    fn test_empty_range() {
        assert_eq!(
            check_structure(&segments(&[2..2]), 8),
            Err(ValidationError::EmptyRange {
                index: 0,
                start: 2,
                end: 2
            })
        );
    }

    #[test]
    fn test_overlap() {
        assert_eq!(
            check_structure(&segments(&[0..4, 3..8]), 8),
            Err(ValidationError::Overlap {
                first: 0,
                second: 1
            })
        );
    }

    #[test]
    fn test_unsorted() {
        assert_eq!(
            check_structure(&segments(&[5..8, 0..3]), 8),
            Err(ValidationError::Unsorted { index: 1 })
        );
    }

    #[test]
    fn test_blank_segment_rejected_against_text() {
        let text = "abc\n\n   ";
        assert_eq!(
            check_against_text(&segments(&[0..3, 5..8]), text),
            Err(ValidationError::Blank { index: 1 })
        );
    }

    #[test]
    fn test_char_boundary_rejected_against_text() {
        let text = "ёж";
        assert_eq!(
            check_against_text(&segments(&[0..1]), text),
            Err(ValidationError::NotCharBoundary { index: 0 })
        );
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let text = "ab\n\ncd";
        let mut list = segments(&[0..2, 4..6]);
        list[1].id = list[0].id;

        assert_eq!(
            check_against_text(&list, text),
            Err(ValidationError::DuplicateId(list[0].id))
        );
    }
}
