use crate::models::SegmentId;

/// A structural invariant a segment list failed to satisfy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("segment {index} range {start}..{end} out of bounds (text length {len})")]
    OutOfBounds {
        index: usize,
        start: usize,
        end: usize,
        len: usize,
    },
    #[error("segment {index} has an empty range {start}..{end}")]
    EmptyRange {
        index: usize,
        start: usize,
        end: usize,
    },
    #[error("segments {first} and {second} overlap")]
    Overlap { first: usize, second: usize },
    #[error("segment {index} starts before its predecessor")]
    Unsorted { index: usize },
    #[error("segment {index} contains only whitespace")]
    Blank { index: usize },
    #[error("segment {index} does not fall on character boundaries")]
    NotCharBoundary { index: usize },
    #[error("segment id {0} assigned more than once")]
    DuplicateId(SegmentId),
}

/// Why a call to the analysis collaborator did not produce metrics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisFailure {
    #[error("analysis service unavailable")]
    Unavailable,
    #[error("analysis request timed out")]
    Timeout,
    #[error("analysis request rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid segmentation: {0}")]
    Validation(#[from] ValidationError),
    #[error("segment not found: {0}")]
    NotFound(SegmentId),
    #[error("operation not applicable: {0}")]
    Precondition(String),
    #[error("unknown analysis batch: {0}")]
    UnknownBatch(u64),
    #[error("analysis failed: {0}")]
    Analysis(#[from] AnalysisFailure),
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
