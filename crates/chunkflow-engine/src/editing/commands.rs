use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::models::{Document, SegmentId};

/// Restructuring operations on whole segments.
///
/// Each one is expressed purely as a new document text; the engine then runs
/// that text through segmentation, reconciliation and validation like any
/// other full rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cmd {
    /// Move a segment so it starts at the paragraph slot containing `target_offset`
    Move { id: SegmentId, target_offset: usize },
    /// Merge a segment with the one following it
    MergeAdjacent { id: SegmentId },
    /// Merge two segments into the position of the earlier one
    MergePair { first: SegmentId, second: SegmentId },
    /// Move the segment at index `from` to index `to`
    Reorder { from: usize, to: usize },
    /// Rearrange all segments into the given order
    ReorderAll { order: Vec<SegmentId> },
    /// Split a segment at byte offset `at`, relative to the segment start
    Split { id: SegmentId, at: usize },
}

/// Document text cut into segment bodies and the whitespace around them.
///
/// `gaps` has one more entry than `bodies`: leading whitespace, the
/// separator between each pair of bodies, and trailing whitespace. Rendering
/// interleaves them again, so moving bodies around keeps separators in place.
struct Layout<'a> {
    gaps: Vec<&'a str>,
    bodies: Vec<String>,
}

impl<'a> Layout<'a> {
    fn of(doc: &'a Document) -> Self {
        let text = doc.text();
        let mut gaps = Vec::with_capacity(doc.segments().len() + 1);
        let mut bodies = Vec::with_capacity(doc.segments().len());
        let mut cursor = 0;
        for segment in doc.segments() {
            gaps.push(&text[cursor..segment.start]);
            bodies.push(segment.text(text).to_string());
            cursor = segment.end;
        }
        gaps.push(&text[cursor..]);
        Self { gaps, bodies }
    }

    /// Remove body `index` together with one of the gaps next to it
    fn remove(&mut self, index: usize) {
        self.bodies.remove(index);
        if index < self.bodies.len() {
            self.gaps.remove(index + 1);
        } else {
            self.gaps.remove(index);
        }
    }

    fn render(&self) -> String {
        let mut out = String::new();
        for (gap, body) in self.gaps.iter().zip(&self.bodies) {
            out.push_str(gap);
            out.push_str(body);
        }
        if let Some(trailing) = self.gaps.last() {
            out.push_str(trailing);
        }
        out
    }
}

fn index_of(doc: &Document, id: SegmentId) -> Result<usize> {
    doc.index_of(id).ok_or(EngineError::NotFound(id))
}

fn precondition(message: impl Into<String>) -> EngineError {
    EngineError::Precondition(message.into())
}

/// Text joining two paragraphs into one
pub(crate) fn merged_text(first: &str, second: &str) -> String {
    format!("{}\n{}", first.trim_end(), second.trim_start())
}

/// Compute the document text a command produces.
///
/// Returns `Ok(None)` when the command would leave the text unchanged.
pub(crate) fn compile_command(doc: &Document, cmd: &Cmd) -> Result<Option<String>> {
    let mut layout = Layout::of(doc);

    match cmd {
        Cmd::Move { id, target_offset } => {
            let from = index_of(doc, *id)?;
            if *target_offset > doc.len() {
                return Err(precondition(format!(
                    "target offset {target_offset} is past the end of the text ({})",
                    doc.len()
                )));
            }
            let to = doc
                .segments()
                .iter()
                .filter(|segment| segment.id != *id && segment.start < *target_offset)
                .count();
            if from == to {
                return Ok(None);
            }
            let body = layout.bodies.remove(from);
            layout.bodies.insert(to, body);
        }
        Cmd::Reorder { from, to } => {
            let count = layout.bodies.len();
            if *from >= count || *to >= count {
                return Err(precondition(format!(
                    "reorder {from} -> {to} out of range for {count} segments"
                )));
            }
            if from == to {
                return Ok(None);
            }
            let body = layout.bodies.remove(*from);
            layout.bodies.insert(*to, body);
        }
        Cmd::ReorderAll { order } => {
            let indices = order
                .iter()
                .map(|id| index_of(doc, *id))
                .collect::<Result<Vec<_>>>()?;
            let unique: HashSet<usize> = indices.iter().copied().collect();
            if indices.len() != layout.bodies.len() || unique.len() != indices.len() {
                return Err(precondition(
                    "new order must list every segment exactly once",
                ));
            }
            if indices.iter().enumerate().all(|(position, index)| position == *index) {
                return Ok(None);
            }
            let bodies = indices
                .iter()
                .map(|index| layout.bodies[*index].clone())
                .collect();
            layout.bodies = bodies;
        }
        Cmd::MergeAdjacent { id } => {
            let index = index_of(doc, *id)?;
            if index + 1 >= layout.bodies.len() {
                return Err(precondition("the last segment has no following segment"));
            }
            merge_into(&mut layout, index, index + 1);
        }
        Cmd::MergePair { first, second } => {
            let a = index_of(doc, *first)?;
            let b = index_of(doc, *second)?;
            if a == b {
                return Err(precondition("cannot merge a segment with itself"));
            }
            merge_into(&mut layout, a.min(b), a.max(b));
        }
        Cmd::Split { id, at } => {
            let index = index_of(doc, *id)?;
            let body = &layout.bodies[index];
            if *at == 0 || *at >= body.len() || !body.is_char_boundary(*at) {
                return Err(precondition(format!(
                    "split position {at} invalid for a segment of {} bytes",
                    body.len()
                )));
            }
            let (head, tail) = body.split_at(*at);
            let (head, tail) = (head.trim_end(), tail.trim_start());
            if head.is_empty() || tail.is_empty() {
                return Err(precondition(
                    "split would leave an empty paragraph",
                ));
            }
            let split = format!("{head}\n\n{tail}");
            layout.bodies[index] = split;
        }
    }

    Ok(Some(layout.render()))
}

fn merge_into(layout: &mut Layout<'_>, lower: usize, higher: usize) {
    let merged = merged_text(&layout.bodies[lower], &layout.bodies[higher]);
    layout.bodies[lower] = merged;
    layout.remove(higher);
}
