//! Scheduling of metric recomputation.
//!
//! The engine never computes metrics itself. It decides which segments need
//! re-analysis, debounces those requests per metric class in a
//! [`RecomputationQueue`], and hands due work out as [`AnalysisBatch`]es.
//! Whoever runs a batch (synchronously through [`AnalysisProvider`] or on
//! some other task) reports back with the batch id, and the engine applies
//! only the results that still describe the current text.

pub mod clock;
pub mod queue;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisFailure;
use crate::models::{MetricsUpdate, SegmentId};

pub use queue::{BatchId, RecomputationQueue};

/// Which class of metrics a request asks for
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisScope {
    /// Cheap metrics computed from the segment's own text
    Local,
    /// Metrics that also depend on the surrounding document and topic
    Contextual,
}

/// One segment's share of a batch
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub segment_id: SegmentId,
    pub text: String,
}

/// Work handed to the analysis collaborator when a debounce window elapses.
///
/// Texts are copied out of the document at dispatch time, so the batch stays
/// valid however the document changes afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisBatch {
    pub id: BatchId,
    pub scope: AnalysisScope,
    /// Document version the texts were taken from
    pub version: u64,
    pub topic: String,
    /// Requests in document order
    pub requests: Vec<AnalysisRequest>,
    /// Whole document text, only sent with contextual batches
    pub full_text: Option<String>,
}

/// The external analysis collaborator.
///
/// Implementations must be idempotent for the same `(text, scope)` and own
/// any timeout on their side.
pub trait AnalysisProvider {
    fn compute_metrics(
        &self,
        segment_text: &str,
        topic: &str,
        scope: AnalysisScope,
        full_text: Option<&str>,
    ) -> Result<MetricsUpdate, AnalysisFailure>;

    /// Run every request of a batch. The default stops at the first failure;
    /// providers with a real batch endpoint should override this.
    fn compute_batch(
        &self,
        batch: &AnalysisBatch,
    ) -> Result<Vec<(SegmentId, MetricsUpdate)>, AnalysisFailure> {
        batch
            .requests
            .iter()
            .map(|request| {
                self.compute_metrics(
                    &request.text,
                    &batch.topic,
                    batch.scope,
                    batch.full_text.as_deref(),
                )
                .map(|update| (request.segment_id, update))
            })
            .collect()
    }
}
