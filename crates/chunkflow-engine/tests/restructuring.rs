//! Move, merge, reorder and split through the engine

use std::sync::Arc;

use chunkflow_engine::{
    AnalysisScope, Cmd, Document, EditPath, Engine, EngineError, EngineSettings, ManualClock,
    SegmentId,
};
use pretty_assertions::assert_eq;

const TEXT: &str = "Alpha one.\n\nBeta two.\n\nGamma three.";

fn engine_with(settings: EngineSettings) -> Engine {
    Engine::with_clock(
        Document::new(TEXT, "topic"),
        settings,
        Arc::new(ManualClock::new()),
    )
}

fn engine() -> Engine {
    engine_with(EngineSettings::default())
}

fn ids(engine: &Engine) -> Vec<SegmentId> {
    engine.document().segments().iter().map(|s| s.id).collect()
}

fn texts(engine: &Engine) -> Vec<&str> {
    engine.document().all_segment_texts()
}

#[test]
fn test_merge_then_split_restores_text() {
    let mut engine = engine();
    let original = ids(&engine);

    let merged = engine.merge_adjacent(original[0]).unwrap();
    assert_eq!(merged.path, EditPath::Resegmented);
    assert_eq!(texts(&engine), vec!["Alpha one.\nBeta two.", "Gamma three."]);
    assert_eq!(ids(&engine)[0], original[0]);

    // Split right after the first paragraph's text
    engine.split_segment(original[0], "Alpha one.".len()).unwrap();

    assert_eq!(engine.document().text(), TEXT);
    assert_eq!(texts(&engine), vec!["Alpha one.", "Beta two.", "Gamma three."]);
    assert_eq!(engine.document().version(), 2);
}

#[test]
fn test_merge_pair_of_non_neighbours() {
    let mut engine = engine();
    let original = ids(&engine);

    engine.merge_pair(original[2], original[0]).unwrap();

    assert_eq!(texts(&engine), vec!["Alpha one.\nGamma three.", "Beta two."]);
    assert_eq!(ids(&engine)[0], original[0]);
}

#[test]
fn test_reorder_changes_text_order() {
    let mut engine = engine();

    engine.reorder(0, 2).unwrap();

    assert_eq!(
        engine.document().text(),
        "Beta two.\n\nGamma three.\n\nAlpha one."
    );
}

#[test]
fn test_reorder_with_content_matching_keeps_ids() {
    let mut engine = engine_with(EngineSettings {
        reconcile_by_content: true,
        ..EngineSettings::default()
    });
    let original = ids(&engine);

    engine.reorder_all(&[original[1], original[2], original[0]]).unwrap();

    assert_eq!(ids(&engine), vec![original[1], original[2], original[0]]);
}

#[test]
fn test_move_to_offset() {
    let mut engine = engine();
    let original = ids(&engine);

    engine.move_segment(original[2], 0).unwrap();

    assert_eq!(texts(&engine), vec!["Gamma three.", "Alpha one.", "Beta two."]);
}

#[test]
fn test_restructuring_queues_everything_for_contextual_analysis() {
    let mut engine = engine();
    let original = ids(&engine);

    engine.merge_adjacent(original[1]).unwrap();

    for id in ids(&engine) {
        assert!(engine.queue().is_queued(id, AnalysisScope::Contextual));
    }
    // The merged segment's own text changed
    assert!(engine.queue().is_queued(original[1], AnalysisScope::Local));
    assert!(!engine.queue().is_pending(original[2]));
}

#[test]
fn test_rejected_commands_leave_document_unchanged() {
    let mut engine = engine();
    let ids = ids(&engine);
    let before = engine.snapshot();
    let rejected = [
        Cmd::MergeAdjacent { id: ids[2] },
        Cmd::MergePair {
            first: ids[0],
            second: ids[0],
        },
        Cmd::Split { id: ids[0], at: 0 },
        Cmd::Reorder { from: 0, to: 9 },
        Cmd::ReorderAll {
            order: vec![ids[0]],
        },
        Cmd::Move {
            id: ids[0],
            target_offset: 999,
        },
    ];

    for cmd in rejected {
        let result = engine.apply(cmd.clone());

        assert!(
            matches!(result, Err(EngineError::Precondition(_))),
            "{cmd:?} gave {result:?}"
        );
        assert_eq!(engine.snapshot(), before);
    }
}

#[test]
fn test_unknown_segment_is_not_found() {
    let mut engine = engine();
    let before = engine.snapshot();
    let missing = SegmentId::new();

    assert_eq!(
        engine.merge_adjacent(missing),
        Err(EngineError::NotFound(missing))
    );
    assert_eq!(engine.snapshot(), before);
}

#[test]
fn test_noop_restructuring_does_not_bump_version() {
    let mut engine = engine();

    let patch = engine.reorder(1, 1).unwrap();

    assert!(patch.is_unchanged());
    assert_eq!(engine.document().version(), 0);
}
