/*!
 * # Editing Core
 *
 * Keeps a document's segment list consistent with its text while the text is
 * rewritten on every keystroke.
 *
 * ## Architecture Overview
 *
 * ### 1. Single Source of Truth: the text
 * - The editor hands over the complete new text on every change, plus an
 *   optional **`EditDelta`** describing the one contiguous replacement
 * - Segments are derived data: byte ranges into that text with stable ids
 *
 * ### 2. Two update paths
 * - **Remap**: edits that provably leave paragraph boundaries alone only move
 *   and resize existing segments, so every id survives
 * - **Resegment**: anything else rebuilds the segment list from scratch and
 *   **reconciles** it with the old one to carry ids and metrics over
 * - Both paths end in the structural validator; a rejected remap falls back
 *   to resegmenting, a rejected resegmentation leaves the document unchanged
 *
 * ### 3. Command-Based Restructuring
 * - Moves, merges, reorders and splits are **Commands** (`Cmd`) that compile
 *   to a new text, then take the resegment path like any other rewrite
 *
 * ### 4. Staleness
 * - Every path reports which segments changed; the engine marks them stale
 *   and queues them for re-analysis (see [`crate::analysis`])
 *
 * ## Module Structure
 *
 * - **`delta`**: `EditDelta` and offset arithmetic
 * - **`classify`**: boundary-change detection and local/global edit scope
 * - **`remap`**: position remapping for boundary-neutral edits
 * - **`reconcile`**: identity matching after a full resegmentation
 * - **`commands`**: `Cmd` enum and its compilation to text
 * - **`patch`**: what a committed mutation changed
 * - **`engine`**: the single-writer `Engine` tying it all together
 *
 * ## Usage Pattern
 *
 * ```rust
 * use chunkflow_engine::editing::*;
 * use chunkflow_engine::EngineSettings;
 *
 * let mut engine = Engine::new("A paragraph.\n\nB paragraph.", "topic", EngineSettings::default());
 * let first = engine.document().segments()[0].id;
 *
 * // Typing inside a paragraph keeps every id
 * let delta = EditDelta::insert(2, "short ");
 * let patch = engine.on_edit("A short paragraph.\n\nB paragraph.", Some(&delta), Some(8)).unwrap();
 * assert_eq!(patch.path, EditPath::Remapped);
 * assert_eq!(engine.document().segments()[0].id, first);
 *
 * // Restructuring goes through the same validated pipeline
 * engine.merge_adjacent(first).unwrap();
 * assert_eq!(engine.document().segments().len(), 1);
 * ```
 */

pub mod classify;
pub mod commands;
pub mod delta;
pub mod engine;
pub mod patch;
pub mod reconcile;
pub mod remap;

pub use classify::{ChangeScope, classify, needs_full_resegmentation};
pub use commands::Cmd;
pub use delta::EditDelta;
pub use engine::Engine;
pub use patch::{EditPath, Patch};
pub use reconcile::{ReconcileOutcome, ReconcilePolicy, reconcile};
pub use remap::{RemapOutcome, RemapPolicy, remap};
