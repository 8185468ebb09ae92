use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::{Duration, Instant};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisScope;
use crate::models::SegmentId;

/// Handle for one dispatched batch of analysis requests
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BatchId(pub u64);

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One pending deadline per queue class. Restarting replaces the previous
/// deadline, so at most one timer per class is ever armed.
#[derive(Debug, Clone)]
struct DebounceTimer {
    interval: Duration,
    deadline: Option<Instant>,
}

impl DebounceTimer {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    fn restart(&mut self, now: Instant) {
        self.deadline = Some(now + self.interval);
    }

    fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    fn cancel(&mut self) {
        self.deadline = None;
    }
}

/// A batch that was handed to the analysis collaborator and has not resolved yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InFlight {
    pub scope: AnalysisScope,
    pub ids: Vec<SegmentId>,
    /// Document version the batch's texts were taken from
    pub version: u64,
}

/// Segments awaiting re-analysis, split by metric class, plus the batches
/// currently out for computation.
#[derive(Debug, Clone)]
pub struct RecomputationQueue {
    local: HashSet<SegmentId>,
    contextual: HashSet<SegmentId>,
    local_timer: DebounceTimer,
    contextual_timer: DebounceTimer,
    in_flight: HashMap<BatchId, InFlight>,
    next_batch: u64,
}

impl RecomputationQueue {
    pub fn new(local_debounce: Duration, contextual_debounce: Duration) -> Self {
        Self {
            local: HashSet::new(),
            contextual: HashSet::new(),
            local_timer: DebounceTimer::new(local_debounce),
            contextual_timer: DebounceTimer::new(contextual_debounce),
            in_flight: HashMap::new(),
            next_batch: 0,
        }
    }

    fn class(&self, scope: AnalysisScope) -> (&HashSet<SegmentId>, &DebounceTimer) {
        match scope {
            AnalysisScope::Local => (&self.local, &self.local_timer),
            AnalysisScope::Contextual => (&self.contextual, &self.contextual_timer),
        }
    }

    fn class_mut(&mut self, scope: AnalysisScope) -> (&mut HashSet<SegmentId>, &mut DebounceTimer) {
        match scope {
            AnalysisScope::Local => (&mut self.local, &mut self.local_timer),
            AnalysisScope::Contextual => (&mut self.contextual, &mut self.contextual_timer),
        }
    }

    /// Add segments to a class and restart that class's debounce timer.
    ///
    /// Nothing is dispatched early: repeated calls inside the window only
    /// grow the set and push the deadline back.
    pub fn enqueue<I>(&mut self, scope: AnalysisScope, ids: I, now: Instant)
    where
        I: IntoIterator<Item = SegmentId>,
    {
        let (set, timer) = self.class_mut(scope);
        let before = set.len();
        let mut any = false;
        for id in ids {
            set.insert(id);
            any = true;
        }
        if any {
            timer.restart(now);
            debug!(
                "queued {} new {:?} segment(s), {} waiting",
                set.len() - before,
                scope,
                set.len()
            );
        }
    }

    /// Drain every class whose deadline has passed. Each drained class is
    /// emptied and its timer cleared in the same step.
    pub fn take_due(&mut self, now: Instant) -> Vec<(AnalysisScope, Vec<SegmentId>)> {
        let mut due = Vec::new();
        for scope in [AnalysisScope::Local, AnalysisScope::Contextual] {
            let (set, timer) = self.class_mut(scope);
            if !timer.is_due(now) {
                continue;
            }
            timer.cancel();
            if !set.is_empty() {
                due.push((scope, set.drain().collect()));
            }
        }
        due
    }

    /// Record a dispatched batch and hand out its id
    pub(crate) fn begin(&mut self, scope: AnalysisScope, ids: Vec<SegmentId>, version: u64) -> BatchId {
        let id = BatchId(self.next_batch);
        self.next_batch += 1;
        self.in_flight.insert(id, InFlight { scope, ids, version });
        id
    }

    pub(crate) fn finish(&mut self, batch: BatchId) -> Option<InFlight> {
        self.in_flight.remove(&batch)
    }

    pub fn is_queued(&self, id: SegmentId, scope: AnalysisScope) -> bool {
        self.class(scope).0.contains(&id)
    }

    pub fn is_in_flight(&self, id: SegmentId) -> bool {
        self.in_flight.values().any(|batch| batch.ids.contains(&id))
    }

    /// Queued in either class or part of an unresolved batch
    pub fn is_pending(&self, id: SegmentId) -> bool {
        self.local.contains(&id) || self.contextual.contains(&id) || self.is_in_flight(id)
    }

    /// Drop a segment that no longer exists. Batches already dispatched keep
    /// it; their results are discarded when they resolve.
    pub fn forget(&mut self, id: SegmentId) {
        self.local.remove(&id);
        self.contextual.remove(&id);
    }

    pub fn queued(&self, scope: AnalysisScope) -> usize {
        self.class(scope).0.len()
    }

    pub fn in_flight_batches(&self) -> usize {
        self.in_flight.len()
    }

    /// Earliest armed deadline across both classes
    pub fn next_deadline(&self) -> Option<Instant> {
        [self.local_timer.deadline, self.contextual_timer.deadline]
            .into_iter()
            .flatten()
            .min()
    }

    pub fn is_idle(&self) -> bool {
        self.local.is_empty() && self.contextual.is_empty() && self.in_flight.is_empty()
    }
}
