//! Read-only views over a document: text accessors, the filtered and sorted
//! segment listing, and the aggregate summary. Nothing here mutates state.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::{Document, MetricsState, Segment};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    /// Document order
    Position,
    SignalStrength,
    Complexity,
    Lix,
    /// Byte length of the segment text
    Length,
    SemanticFunction,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentFilter {
    #[default]
    All,
    Stale,
    Fresh,
    Updating,
    /// Segments whose semantic function equals this label (case-insensitive)
    SemanticFunction(String),
}

impl SegmentFilter {
    fn matches(&self, segment: &Segment) -> bool {
        match self {
            SegmentFilter::All => true,
            SegmentFilter::Stale => segment.metrics.state() == MetricsState::Stale,
            SegmentFilter::Fresh => segment.metrics.state() == MetricsState::Fresh,
            SegmentFilter::Updating => segment.metrics.state() == MetricsState::Updating,
            SegmentFilter::SemanticFunction(label) => segment
                .metrics
                .contextual
                .semantic_function
                .as_deref()
                .is_some_and(|function| function.eq_ignore_ascii_case(label)),
        }
    }
}

/// Overall state of the document's analysis
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    /// No segments
    Empty,
    /// Every segment is fresh and none reported a semantic error
    Complete,
    /// Some segments are still stale or updating
    Pending,
    /// Some, but not all, segments reported a semantic error
    PartialError,
    /// Every segment reported a semantic error
    Error,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub segment_count: usize,
    /// Mean over the segments that have a value, rounded to three decimals
    pub avg_complexity: Option<f64>,
    pub avg_signal_strength: Option<f64>,
    pub status: AnalysisStatus,
}

fn average(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then(|| (sum / count as f64 * 1000.0).round() / 1000.0)
}

/// Compare optional values with `None` always last, whatever the direction
fn compare_present<T, F>(a: Option<T>, b: Option<T>, direction: SortDirection, cmp: F) -> Ordering
where
    F: Fn(&T, &T) -> Ordering,
{
    match (a, b) {
        (Some(a), Some(b)) => match direction {
            SortDirection::Ascending => cmp(&a, &b),
            SortDirection::Descending => cmp(&b, &a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl Document {
    /// Texts of all segments in document order
    pub fn all_segment_texts(&self) -> Vec<&str> {
        self.segments
            .iter()
            .map(|segment| segment.text(&self.text))
            .collect()
    }

    /// Segments matching `filter` and, if given, containing `search`
    /// (case-insensitive), ordered by `sort_field`.
    ///
    /// Segments without a value for the sort field come last in either
    /// direction; ties keep document order.
    pub fn filtered_sorted_segments(
        &self,
        sort_field: SortField,
        direction: SortDirection,
        search: Option<&str>,
        filter: &SegmentFilter,
    ) -> Vec<&Segment> {
        let needle = search
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
            .map(str::to_lowercase);

        let mut segments: Vec<&Segment> = self
            .segments
            .iter()
            .filter(|segment| filter.matches(segment))
            .filter(|segment| match &needle {
                Some(needle) => segment.text(&self.text).to_lowercase().contains(needle),
                None => true,
            })
            .collect();

        let by_float = |a: &f64, b: &f64| a.total_cmp(b);
        segments.sort_by(|a, b| match sort_field {
            SortField::Position => compare_present(Some(a.start), Some(b.start), direction, Ord::cmp),
            SortField::Length => compare_present(Some(a.len()), Some(b.len()), direction, Ord::cmp),
            SortField::SignalStrength => compare_present(
                a.metrics.local.signal_strength,
                b.metrics.local.signal_strength,
                direction,
                by_float,
            ),
            SortField::Complexity => compare_present(
                a.metrics.local.complexity,
                b.metrics.local.complexity,
                direction,
                by_float,
            ),
            SortField::Lix => {
                compare_present(a.metrics.local.lix, b.metrics.local.lix, direction, by_float)
            }
            SortField::SemanticFunction => compare_present(
                a.metrics.contextual.semantic_function.as_deref(),
                b.metrics.contextual.semantic_function.as_deref(),
                direction,
                |a: &&str, b: &&str| a.to_lowercase().cmp(&b.to_lowercase()),
            ),
        });

        segments
    }

    pub fn summary(&self) -> DocumentSummary {
        let segment_count = self.segments.len();
        let avg_complexity = average(
            self.segments
                .iter()
                .filter_map(|segment| segment.metrics.local.complexity),
        );
        let avg_signal_strength = average(
            self.segments
                .iter()
                .filter_map(|segment| segment.metrics.local.signal_strength),
        );

        let errors = self
            .segments
            .iter()
            .filter(|segment| segment.metrics.contextual.semantic_error.is_some())
            .count();
        let status = if segment_count == 0 {
            AnalysisStatus::Empty
        } else if errors == segment_count {
            AnalysisStatus::Error
        } else if errors > 0 {
            AnalysisStatus::PartialError
        } else if self.segments.iter().all(|segment| segment.metrics.is_fresh()) {
            AnalysisStatus::Complete
        } else {
            AnalysisStatus::Pending
        };

        DocumentSummary {
            segment_count,
            avg_complexity,
            avg_signal_strength,
            status,
        }
    }
}
