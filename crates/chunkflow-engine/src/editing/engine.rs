use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use chunkflow_config::EngineSettings;
use log::{debug, error, warn};

use crate::analysis::clock::{Clock, SystemClock};
use crate::analysis::{
    AnalysisBatch, AnalysisProvider, AnalysisRequest, AnalysisScope, BatchId, RecomputationQueue,
};
use crate::editing::classify::{boundaries_changed, classify};
use crate::editing::commands::compile_command;
use crate::editing::reconcile::{ReconcileOutcome, ReconcilePolicy, reconcile};
use crate::editing::remap::{RemapOutcome, RemapPolicy, remap};
use crate::editing::{ChangeScope, Cmd, EditDelta, EditPath, Patch};
use crate::error::{AnalysisFailure, EngineError, Result, ValidationError};
use crate::models::{Document, MetricsUpdate, Segment, SegmentId, Snapshot};
use crate::segmenting::{check_against_text, segment};

/// Single-writer controller that owns a [`Document`] and its recomputation queue.
///
/// Every mutation goes through `&mut self`, so edits and restructuring are
/// serialized by construction. A host that shares the engine between threads
/// wraps it in a mutex. Analysis never runs inside a mutation: due work is
/// pulled out with [`Engine::take_due_batches`] and reported back with
/// [`Engine::complete_batch`] or [`Engine::fail_batch`].
pub struct Engine {
    doc: Document,
    queue: RecomputationQueue,
    settings: EngineSettings,
    clock: Arc<dyn Clock>,
    cursor: Option<usize>,
}

impl Engine {
    pub fn new(text: impl Into<String>, topic: impl Into<String>, settings: EngineSettings) -> Self {
        Self::with_clock(Document::new(text, topic), settings, Arc::new(SystemClock))
    }

    /// Build an engine around an existing document. All of its segments start
    /// out queued for both metric classes.
    pub fn with_clock(doc: Document, settings: EngineSettings, clock: Arc<dyn Clock>) -> Self {
        let queue =
            RecomputationQueue::new(settings.local_debounce(), settings.contextual_debounce());
        let mut engine = Self {
            doc,
            queue,
            settings,
            clock,
            cursor: None,
        };
        let ids = engine.all_ids();
        engine.enqueue(AnalysisScope::Local, ids.clone());
        engine.enqueue(AnalysisScope::Contextual, ids);
        engine
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn snapshot(&self) -> Snapshot {
        self.doc.snapshot()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn queue(&self) -> &RecomputationQueue {
        &self.queue
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Segment under the last reported cursor position
    pub fn active_segment(&self) -> Option<&Segment> {
        self.cursor.and_then(|offset| self.doc.segment_at(offset))
    }

    /// Earliest moment at which [`Engine::take_due_batches`] will return work
    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue.next_deadline()
    }

    /// No queued or in-flight analysis
    pub fn is_idle(&self) -> bool {
        self.queue.is_idle()
    }

    fn all_ids(&self) -> Vec<SegmentId> {
        self.doc.segments.iter().map(|segment| segment.id).collect()
    }

    fn enqueue(&mut self, scope: AnalysisScope, ids: Vec<SegmentId>) {
        let now = self.clock.now();
        self.queue.enqueue(scope, ids, now);
    }

    fn track_cursor(&mut self, cursor: Option<usize>) {
        if let Some(offset) = cursor {
            self.cursor = Some(offset);
        }
        if let Some(offset) = self.cursor {
            self.cursor = Some(offset.min(self.doc.len()));
        }
    }

    /// Accept the editor's new text.
    ///
    /// `delta` describes the change relative to the current text. Without a
    /// delta, or with one that does not match the current text, the edit is
    /// handled as an opaque full replacement.
    ///
    /// Separator-neutral edits keep every identifier by remapping positions;
    /// anything that may move paragraph boundaries is resegmented and
    /// reconciled. Either result is validated before it is committed, and on
    /// error the document is left as it was.
    pub fn on_edit(
        &mut self,
        new_text: impl Into<String>,
        delta: Option<&EditDelta>,
        cursor: Option<usize>,
    ) -> Result<Patch> {
        let new_text = new_text.into();
        if new_text == self.doc.text {
            self.track_cursor(cursor);
            return Ok(Patch::unchanged(self.doc.version));
        }

        let delta = match delta {
            Some(delta) if delta.apply(&self.doc.text).as_deref() == Some(new_text.as_str()) => {
                Some(delta.clone())
            }
            Some(delta) => {
                warn!(
                    "edit delta {}..{} does not match the document at version {}, treating it as a full replacement",
                    delta.start, delta.end, self.doc.version
                );
                None
            }
            None => None,
        };

        let patch = match delta {
            Some(delta) if !boundaries_changed(&self.doc.text, &new_text, &delta) => {
                let scope = classify(&delta, &self.settings.scope);
                match self.remap_segments(&new_text, &delta) {
                    Ok(outcome) => self.commit_remap(new_text, outcome, scope),
                    Err(err) => {
                        warn!("remapped segments failed validation ({err}), resegmenting");
                        self.resegment(new_text)?
                    }
                }
            }
            _ => self.resegment(new_text)?,
        };

        self.track_cursor(cursor);
        Ok(patch)
    }

    fn remap_segments(
        &self,
        new_text: &str,
        delta: &EditDelta,
    ) -> std::result::Result<RemapOutcome, ValidationError> {
        let policy = RemapPolicy {
            version: self.doc.version + 1,
            invalidate_shifted: self.settings.invalidate_shifted_segments,
        };
        let outcome = remap(&self.doc.segments, delta, policy);
        check_against_text(&outcome.segments, new_text)?;
        Ok(outcome)
    }

    fn commit_remap(&mut self, new_text: String, outcome: RemapOutcome, scope: ChangeScope) -> Patch {
        let RemapOutcome {
            segments,
            touched,
            shifted,
            dropped,
        } = outcome;

        self.doc.commit(new_text, segments);
        let version = self.doc.version;
        for id in &dropped {
            self.queue.forget(*id);
        }

        // Local metrics only depend on the segment's own text
        self.enqueue(AnalysisScope::Local, touched.clone());

        let contextual = match scope {
            ChangeScope::Global => {
                for segment in &mut self.doc.segments {
                    segment.metrics.invalidate(AnalysisScope::Contextual, version);
                }
                self.all_ids()
            }
            ChangeScope::Local if self.settings.invalidate_shifted_segments => {
                touched.iter().chain(&shifted).copied().collect()
            }
            ChangeScope::Local => touched.clone(),
        };
        self.enqueue(AnalysisScope::Contextual, contextual);

        debug!(
            "remapped edit at version {version}: {} touched, {} shifted, {} dropped, {scope:?} scope",
            touched.len(),
            shifted.len(),
            dropped.len()
        );

        Patch {
            version,
            path: EditPath::Remapped,
            scope,
            changed: touched,
            created: Vec::new(),
            removed: dropped,
        }
    }

    /// Rebuild segments from `new_text`, reattach identities and commit.
    ///
    /// Every surviving segment carries stale metrics afterwards, so all of
    /// them are queued for contextual analysis.
    fn resegment(&mut self, new_text: String) -> Result<Patch> {
        let version = self.doc.version + 1;
        let policy = ReconcilePolicy {
            version,
            by_content: self.settings.reconcile_by_content,
        };
        let outcome = reconcile(
            segment(&new_text),
            &new_text,
            &self.doc.segments,
            &self.doc.text,
            policy,
        );
        if let Err(err) = check_against_text(&outcome.segments, &new_text) {
            error!("resegmentation produced an invalid layout at version {version}: {err}");
            return Err(err.into());
        }

        let ReconcileOutcome {
            segments,
            preserved,
            altered,
            created,
            retired,
        } = outcome;

        self.doc.commit(new_text, segments);
        for id in &retired {
            self.queue.forget(*id);
        }

        let local = created.iter().chain(&altered).copied().collect();
        self.enqueue(AnalysisScope::Local, local);
        let all = self.all_ids();
        self.enqueue(AnalysisScope::Contextual, all);

        debug!(
            "resegmented at version {version}: {} preserved, {} altered, {} created, {} retired",
            preserved.len(),
            altered.len(),
            created.len(),
            retired.len()
        );

        Ok(Patch {
            version,
            path: EditPath::Resegmented,
            scope: ChangeScope::Global,
            changed: altered,
            created,
            removed: retired,
        })
    }

    /// Run a restructuring command.
    ///
    /// The command is turned into a new text which then goes through the same
    /// resegment, reconcile and validate pipeline as a full replacement.
    /// Unmet preconditions and unknown ids are reported as errors and leave
    /// the document untouched.
    pub fn apply(&mut self, cmd: Cmd) -> Result<Patch> {
        let new_text = match compile_command(&self.doc, &cmd) {
            Ok(Some(text)) => text,
            Ok(None) => return Ok(Patch::unchanged(self.doc.version)),
            Err(err) => {
                error!("rejected {cmd:?}: {err}");
                return Err(err);
            }
        };

        let patch = self.resegment(new_text)?;
        self.track_cursor(None);
        Ok(patch)
    }

    pub fn move_segment(&mut self, id: SegmentId, target_offset: usize) -> Result<Patch> {
        self.apply(Cmd::Move { id, target_offset })
    }

    pub fn merge_adjacent(&mut self, id: SegmentId) -> Result<Patch> {
        self.apply(Cmd::MergeAdjacent { id })
    }

    pub fn merge_pair(&mut self, first: SegmentId, second: SegmentId) -> Result<Patch> {
        self.apply(Cmd::MergePair { first, second })
    }

    pub fn reorder(&mut self, from: usize, to: usize) -> Result<Patch> {
        self.apply(Cmd::Reorder { from, to })
    }

    pub fn reorder_all(&mut self, order: &[SegmentId]) -> Result<Patch> {
        self.apply(Cmd::ReorderAll {
            order: order.to_vec(),
        })
    }

    pub fn split_segment(&mut self, id: SegmentId, at: usize) -> Result<Patch> {
        self.apply(Cmd::Split { id, at })
    }

    /// Change the analysis topic. Every metric depends on it, so all
    /// segments go stale and are queued for both classes.
    pub fn set_topic(&mut self, topic: impl Into<String>) {
        let topic = topic.into();
        if topic == self.doc.metadata.topic {
            return;
        }

        self.doc.set_topic(topic);
        let version = self.doc.version;
        for segment in &mut self.doc.segments {
            segment.metrics.mark_stale(version);
        }
        let ids = self.all_ids();
        self.enqueue(AnalysisScope::Local, ids.clone());
        self.enqueue(AnalysisScope::Contextual, ids);
        debug!("topic changed at version {version}");
    }

    /// Drain every queue class whose debounce window has elapsed.
    ///
    /// The segments involved are marked updating and their texts copied into
    /// the returned batches. Ids that no longer resolve are skipped.
    pub fn take_due_batches(&mut self) -> Vec<AnalysisBatch> {
        let now = self.clock.now();
        let due = self.queue.take_due(now);
        if due.is_empty() {
            return Vec::new();
        }

        let positions: HashMap<SegmentId, usize> = self
            .doc
            .segments
            .iter()
            .enumerate()
            .map(|(index, segment)| (segment.id, index))
            .collect();

        let mut batches = Vec::with_capacity(due.len());
        for (scope, ids) in due {
            let mut indices: Vec<usize> = ids
                .iter()
                .filter_map(|id| positions.get(id).copied())
                .collect();
            if indices.is_empty() {
                continue;
            }
            indices.sort_unstable();

            let requests: Vec<AnalysisRequest> = indices
                .iter()
                .map(|&index| {
                    let segment = &mut self.doc.segments[index];
                    segment.metrics.is_updating = true;
                    AnalysisRequest {
                        segment_id: segment.id,
                        text: segment.text(&self.doc.text).to_string(),
                    }
                })
                .collect();

            let version = self.doc.version;
            let request_ids = requests.iter().map(|request| request.segment_id).collect();
            let id = self.queue.begin(scope, request_ids, version);
            debug!(
                "dispatching batch {id}: {} {scope:?} request(s) at version {version}",
                requests.len()
            );

            batches.push(AnalysisBatch {
                id,
                scope,
                version,
                topic: self.doc.metadata.topic.clone(),
                requests,
                full_text: (scope == AnalysisScope::Contextual).then(|| self.doc.text.clone()),
            });
        }
        batches
    }

    /// Apply the results of a dispatched batch.
    ///
    /// A result is only applied when its segment still exists and has not
    /// been invalidated since the batch was dispatched. Outdated results are
    /// discarded and the segment is queued again for that class. A segment
    /// becomes fresh once both classes have an applied result and no other
    /// request for it is queued or in flight. Returns the number of results
    /// applied.
    pub fn complete_batch(
        &mut self,
        batch: BatchId,
        results: Vec<(SegmentId, MetricsUpdate)>,
    ) -> Result<usize> {
        let flight = self
            .queue
            .finish(batch)
            .ok_or(EngineError::UnknownBatch(batch.0))?;

        let mut applied = HashSet::new();
        for (id, update) in results {
            if !flight.ids.contains(&id) {
                warn!("batch {batch} returned a result for segment {id} it did not request");
                continue;
            }
            let update_scope = update.scope();
            if update_scope != flight.scope {
                warn!(
                    "batch {batch} returned {update_scope:?} metrics for a {:?} request",
                    flight.scope
                );
                continue;
            }
            let Some(segment) = self.doc.segment_mut(id) else {
                debug!("segment {id} no longer exists, dropping its result from batch {batch}");
                continue;
            };
            if segment.metrics.is_outdated(flight.scope, flight.version) {
                debug!(
                    "segment {id} changed after batch {batch} (version {}), discarding result",
                    flight.version
                );
                continue;
            }
            segment.metrics.merge(update);
            applied.insert(id);
        }

        let version = self.doc.version;
        let mut requeue = Vec::new();
        for id in &flight.ids {
            let in_flight = self.queue.is_in_flight(*id);
            let pending = self.queue.is_pending(*id);
            let Some(segment) = self.doc.segment_mut(*id) else {
                continue;
            };
            segment.metrics.is_updating = in_flight;
            if !applied.contains(id) {
                requeue.push(*id);
            } else if !pending && segment.metrics.owed().is_empty() {
                segment.metrics.mark_fresh(version);
            }
        }
        if !requeue.is_empty() {
            self.enqueue(flight.scope, requeue);
        }

        Ok(applied.len())
    }

    /// Record that a batch could not be computed. Its segments fall back to
    /// stale and stay out of the queue until [`Engine::retry_stale`]; the
    /// failed class stays owed, so a later success in the other class does
    /// not make them fresh.
    pub fn fail_batch(&mut self, batch: BatchId, failure: AnalysisFailure) -> Result<()> {
        let flight = self
            .queue
            .finish(batch)
            .ok_or(EngineError::UnknownBatch(batch.0))?;

        warn!(
            "analysis batch {batch} ({:?}, {} segment(s)) failed: {failure}",
            flight.scope,
            flight.ids.len()
        );
        for id in &flight.ids {
            let in_flight = self.queue.is_in_flight(*id);
            if let Some(segment) = self.doc.segment_mut(*id) {
                segment.metrics.is_updating = in_flight;
                segment.metrics.is_stale = true;
            }
        }
        Ok(())
    }

    /// Queue every stale segment that is neither queued nor in flight, for
    /// each class it still owes a result. Returns how many segments were
    /// queued.
    pub fn retry_stale(&mut self) -> usize {
        let mut local = Vec::new();
        let mut contextual = Vec::new();
        let mut count = 0;
        for segment in &self.doc.segments {
            if !segment.metrics.is_stale || self.queue.is_pending(segment.id) {
                continue;
            }
            let mut owed = segment.metrics.owed();
            if owed.is_empty() {
                owed = vec![AnalysisScope::Local, AnalysisScope::Contextual];
            }
            for scope in owed {
                match scope {
                    AnalysisScope::Local => local.push(segment.id),
                    AnalysisScope::Contextual => contextual.push(segment.id),
                }
            }
            count += 1;
        }
        self.enqueue(AnalysisScope::Local, local);
        self.enqueue(AnalysisScope::Contextual, contextual);
        count
    }

    /// Dispatch all due batches to `provider` and apply the outcome
    /// synchronously. Returns the number of results applied.
    pub fn run_due<P>(&mut self, provider: &P) -> Result<usize>
    where
        P: AnalysisProvider + ?Sized,
    {
        let mut applied = 0;
        for batch in self.take_due_batches() {
            match provider.compute_batch(&batch) {
                Ok(results) => applied += self.complete_batch(batch.id, results)?,
                Err(failure) => self.fail_batch(batch.id, failure)?,
            }
        }
        Ok(applied)
    }
}
