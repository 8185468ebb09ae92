use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisScope;

/// Metrics derivable from a segment's own text (plus the document topic).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalMetrics {
    pub lix: Option<f64>,
    pub smog: Option<f64>,
    pub complexity: Option<f64>,
    pub signal_strength: Option<f64>,
}

/// Metrics that depend on the surrounding text.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextualMetrics {
    pub semantic_function: Option<String>,
    pub semantic_method: Option<String>,
    pub semantic_error: Option<String>,
}

/// One analysis result, tagged with the class of metrics it carries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum MetricsUpdate {
    Local(LocalMetrics),
    Contextual(ContextualMetrics),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricsState {
    Fresh,
    Stale,
    Updating,
}

/// Validity of one metric class of a segment
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct ClassState {
    /// No result has been applied since the last invalidation
    pub owed: bool,
    /// Document version of the most recent invalidation
    pub invalidated_at: u64,
}

impl Default for ClassState {
    fn default() -> Self {
        Self {
            owed: true,
            invalidated_at: 0,
        }
    }
}

/// Analysis outputs for a segment plus their validity bookkeeping.
///
/// Lifecycle: `Fresh -> Stale -> Updating -> Fresh`, or `Updating -> Stale`
/// when the recomputation fails. A segment is only fresh again once both
/// metric classes have been recomputed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentMetrics {
    pub local: LocalMetrics,
    pub contextual: ContextualMetrics,
    pub is_stale: bool,
    pub is_updating: bool,
    /// Document version at which the metrics were last computed.
    pub version: Option<u64>,
    #[serde(skip)]
    pub(crate) local_state: ClassState,
    #[serde(skip)]
    pub(crate) contextual_state: ClassState,
}

impl Default for SegmentMetrics {
    fn default() -> Self {
        Self {
            local: LocalMetrics::default(),
            contextual: ContextualMetrics::default(),
            is_stale: true,
            is_updating: false,
            version: None,
            local_state: ClassState::default(),
            contextual_state: ClassState::default(),
        }
    }
}

impl SegmentMetrics {
    pub fn state(&self) -> MetricsState {
        if self.is_updating {
            MetricsState::Updating
        } else if self.is_stale {
            MetricsState::Stale
        } else {
            MetricsState::Fresh
        }
    }

    pub fn is_fresh(&self) -> bool {
        self.state() == MetricsState::Fresh
    }

    pub(crate) fn class(&self, scope: AnalysisScope) -> &ClassState {
        match scope {
            AnalysisScope::Local => &self.local_state,
            AnalysisScope::Contextual => &self.contextual_state,
        }
    }

    fn class_mut(&mut self, scope: AnalysisScope) -> &mut ClassState {
        match scope {
            AnalysisScope::Local => &mut self.local_state,
            AnalysisScope::Contextual => &mut self.contextual_state,
        }
    }

    /// Classes still waiting for a result
    pub fn owed(&self) -> Vec<AnalysisScope> {
        [AnalysisScope::Local, AnalysisScope::Contextual]
            .into_iter()
            .filter(|scope| self.class(*scope).owed)
            .collect()
    }

    /// Invalidate one metric class at `version`
    pub(crate) fn invalidate(&mut self, scope: AnalysisScope, version: u64) {
        let state = self.class_mut(scope);
        state.owed = true;
        state.invalidated_at = state.invalidated_at.max(version);
        self.is_stale = true;
    }

    /// Invalidate both metric classes at `version`
    pub(crate) fn mark_stale(&mut self, version: u64) {
        self.invalidate(AnalysisScope::Local, version);
        self.invalidate(AnalysisScope::Contextual, version);
    }

    /// True if a result computed at `version` no longer describes this class
    pub(crate) fn is_outdated(&self, scope: AnalysisScope, version: u64) -> bool {
        self.class(scope).invalidated_at > version
    }

    /// Store a result and settle its class
    pub(crate) fn merge(&mut self, update: MetricsUpdate) {
        let scope = update.scope();
        match update {
            MetricsUpdate::Local(local) => self.local = local,
            MetricsUpdate::Contextual(contextual) => self.contextual = contextual,
        }
        self.class_mut(scope).owed = false;
    }

    pub(crate) fn mark_fresh(&mut self, version: u64) {
        self.local_state.owed = false;
        self.contextual_state.owed = false;
        self.is_stale = false;
        self.version = Some(version);
    }
}

impl MetricsUpdate {
    pub fn scope(&self) -> AnalysisScope {
        match self {
            MetricsUpdate::Local(_) => AnalysisScope::Local,
            MetricsUpdate::Contextual(_) => AnalysisScope::Contextual,
        }
    }
}
