use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Segment, SegmentId};
use crate::segmenting;

/// Session data carried alongside the text. Opaque to the engine beyond
/// pass-through, except for `topic` which is sent to the analysis collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub session_id: String,
    pub topic: String,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

impl DocumentMetadata {
    pub fn new(topic: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: Uuid::new_v4().to_string(),
            topic: topic.into(),
            created_at: now,
            last_modified: now,
        }
    }
}

/// The text buffer and its current partition into segments.
///
/// Only the engine mutates a `Document`; everyone else reads it through
/// [`Document::snapshot`] or the accessors below.
#[derive(Clone, Debug)]
pub struct Document {
    pub(crate) text: String,
    pub(crate) segments: Vec<Segment>,
    /// Incremented on every committed text mutation
    pub(crate) version: u64,
    pub(crate) metadata: DocumentMetadata,
}

/// Immutable copy of a document handed to external consumers
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u64,
    pub text: String,
    pub segments: Vec<Segment>,
    pub metadata: DocumentMetadata,
}

impl Document {
    pub fn new(text: impl Into<String>, topic: impl Into<String>) -> Self {
        Self::with_metadata(text, DocumentMetadata::new(topic))
    }

    /// Restore a document from persisted session metadata; the segments are
    /// always rebuilt from the text.
    pub fn with_metadata(text: impl Into<String>, metadata: DocumentMetadata) -> Self {
        let text = text.into();
        let segments = segmenting::segment(&text);
        Self {
            text,
            segments,
            version: 0,
            metadata,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.iter().find(|segment| segment.id == id)
    }

    pub fn index_of(&self, id: SegmentId) -> Option<usize> {
        self.segments.iter().position(|segment| segment.id == id)
    }

    pub(crate) fn segment_mut(&mut self, id: SegmentId) -> Option<&mut Segment> {
        self.segments.iter_mut().find(|segment| segment.id == id)
    }

    /// Text of the segment with the given id
    pub fn segment_text(&self, id: SegmentId) -> Option<&str> {
        self.segment(id).map(|segment| segment.text(&self.text))
    }

    /// Segment containing `offset` (a caret directly after a segment belongs to it)
    pub fn segment_at(&self, offset: usize) -> Option<&Segment> {
        self.segments
            .iter()
            .find(|segment| segment.contains_offset(offset))
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: self.version,
            text: self.text.clone(),
            segments: self.segments.clone(),
            metadata: self.metadata.clone(),
        }
    }

    /// Replace text and segments in one step. Callers validate first.
    pub(crate) fn commit(&mut self, text: String, segments: Vec<Segment>) {
        self.text = text;
        self.segments = segments;
        self.version += 1;
        self.metadata.last_modified = Utc::now();
    }

    /// Change the topic. Bumps the version so that analysis results computed
    /// for the previous topic are recognised as outdated.
    pub(crate) fn set_topic(&mut self, topic: String) {
        self.metadata.topic = topic;
        self.version += 1;
        self.metadata.last_modified = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_document_is_segmented() {
        let doc = Document::new("A paragraph.\n\nB paragraph.", "topic");

        assert_eq!(doc.version(), 0);
        assert_eq!(doc.segments().len(), 2);
        assert_eq!(doc.segments()[0].range(), 0..12);
        assert_eq!(doc.segments()[1].range(), 14..26);
    }

    #[test]
    fn test_segment_text_lookup() {
        let doc = Document::new("First\n\nSecond", "topic");
        let second = doc.segments()[1].id;

        assert_eq!(doc.segment_text(second), Some("Second"));
        assert_eq!(doc.segment_text(SegmentId::new()), None);
        assert_eq!(doc.index_of(second), Some(1));
    }

    #[test]
    fn test_segment_at_offset() {
        let doc = Document::new("First\n\nSecond", "topic");

        assert_eq!(doc.segment_at(5).map(|s| s.start), Some(0));
        assert!(doc.segment_at(6).is_none());
        assert_eq!(doc.segment_at(7).map(|s| s.start), Some(7));
    }

    #[test]
    fn test_commit_bumps_version_and_timestamp() {
        let mut doc = Document::new("First", "topic");
        let before = doc.metadata().last_modified;

        doc.commit("Second".to_string(), segmenting::segment("Second"));

        assert_eq!(doc.version(), 1);
        assert_eq!(doc.text(), "Second");
        assert!(doc.metadata().last_modified >= before);
        assert_eq!(doc.metadata().created_at, before);
    }

    #[test]
    fn test_snapshot_is_detached_copy() {
        let mut doc = Document::new("First", "topic");
        let snapshot = doc.snapshot();

        doc.commit("Changed".to_string(), segmenting::segment("Changed"));

        assert_eq!(snapshot.text, "First");
        assert_eq!(snapshot.version, 0);
    }
}
