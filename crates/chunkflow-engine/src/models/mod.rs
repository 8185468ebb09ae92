pub mod document;
pub mod metrics;
pub mod segment;

pub use document::{Document, DocumentMetadata, Snapshot};
pub use metrics::{ContextualMetrics, LocalMetrics, MetricsState, MetricsUpdate, SegmentMetrics};
pub use segment::{Segment, SegmentId};
