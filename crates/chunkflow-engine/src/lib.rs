pub mod analysis;
pub mod editing;
pub mod error;
pub mod models;
pub mod segmenting;
pub mod views;

// Re-export key types for easier usage
pub use analysis::{
    AnalysisBatch, AnalysisProvider, AnalysisRequest, AnalysisScope, BatchId,
    clock::{Clock, ManualClock, SystemClock},
};
pub use chunkflow_config::{EngineSettings, ScopeThresholds};
pub use editing::{ChangeScope, Cmd, EditDelta, EditPath, Engine, Patch};
pub use error::{AnalysisFailure, EngineError, ValidationError};
pub use models::{
    ContextualMetrics, Document, DocumentMetadata, LocalMetrics, MetricsState, MetricsUpdate,
    Segment, SegmentId, SegmentMetrics, Snapshot,
};
pub use segmenting::{segment, validate};
pub use views::{
    AnalysisStatus, DocumentSummary, SegmentFilter, SortDirection, SortField,
};
