use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A single contiguous replacement reported by the editor.
///
/// `start..end` is the replaced byte range in the text *before* the edit,
/// `old_text` is what used to be there and `new_text` what replaces it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditDelta {
    pub start: usize,
    pub end: usize,
    pub old_text: String,
    pub new_text: String,
}

impl EditDelta {
    pub fn new(
        start: usize,
        end: usize,
        old_text: impl Into<String>,
        new_text: impl Into<String>,
    ) -> Self {
        Self {
            start,
            end,
            old_text: old_text.into(),
            new_text: new_text.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::new(at, at, String::new(), text)
    }

    /// Describe replacing `range` of `text` with `new_text`.
    ///
    /// Returns `None` if the range does not fit `text` or splits a character.
    pub fn replace(text: &str, range: Range<usize>, new_text: impl Into<String>) -> Option<Self> {
        let old_text = text.get(range.clone())?;
        Some(Self::new(range.start, range.end, old_text, new_text))
    }

    pub fn delete(text: &str, range: Range<usize>) -> Option<Self> {
        Self::replace(text, range, String::new())
    }

    pub fn removed_len(&self) -> usize {
        self.end - self.start
    }

    pub fn inserted_len(&self) -> usize {
        self.new_text.len()
    }

    /// Change in text length caused by the edit
    pub fn shift(&self) -> isize {
        self.inserted_len() as isize - self.removed_len() as isize
    }

    /// Byte offset just past the inserted text, in the text after the edit
    pub fn new_end(&self) -> usize {
        self.start + self.inserted_len()
    }

    /// Move an offset at or after `end` to where it lands after the edit.
    pub(crate) fn shift_offset(&self, offset: usize) -> usize {
        offset
            .saturating_add(self.inserted_len())
            .saturating_sub(self.removed_len())
    }

    /// Where a range that does not intersect the edit ends up afterwards;
    /// `None` for ranges that overlap the replaced text.
    pub(crate) fn map_untouched(&self, range: &Range<usize>) -> Option<Range<usize>> {
        if range.end <= self.start {
            Some(range.clone())
        } else if range.start >= self.end {
            Some(self.shift_offset(range.start)..self.shift_offset(range.end))
        } else {
            None
        }
    }

    /// Apply the edit to `text`, checking that it actually describes `text`.
    pub fn apply(&self, text: &str) -> Option<String> {
        if self.start > self.end || text.get(self.start..self.end)? != self.old_text {
            return None;
        }
        let mut result = String::with_capacity(text.len() - self.removed_len() + self.inserted_len());
        result.push_str(&text[..self.start]);
        result.push_str(&self.new_text);
        result.push_str(&text[self.end..]);
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_apply_insert() {
        let delta = EditDelta::insert(5, " there");

        assert_eq!(delta.apply("Hello World").as_deref(), Some("Hello there World"));
        assert_eq!(delta.shift(), 6);
        assert_eq!(delta.new_end(), 11);
    }

    #[test]
    fn test_apply_rejects_mismatched_old_text() {
        let delta = EditDelta::new(0, 5, "Howdy", "Hi");

        assert_eq!(delta.apply("Hello World"), None);
    }

    #[test]
    fn test_apply_rejects_out_of_bounds() {
        assert_eq!(EditDelta::insert(50, "x").apply("short"), None);
    }

    #[test]
    fn test_delete_captures_old_text() {
        let delta = EditDelta::delete("Hello World", 5..11).unwrap();

        assert_eq!(delta.old_text, " World");
        assert_eq!(delta.shift(), -6);
        assert_eq!(delta.apply("Hello World").as_deref(), Some("Hello"));
    }

    #[test]
    fn test_map_untouched() {
        let delta = EditDelta::new(4, 6, "xy", "abcd");

        assert_eq!(delta.map_untouched(&(0..4)), Some(0..4));
        assert_eq!(delta.map_untouched(&(6..9)), Some(8..11));
        assert_eq!(delta.map_untouched(&(3..5)), None);
    }
}
