//! Segment identity and layout across sequences of edits

use std::ops::Range;
use std::sync::Arc;

use chunkflow_engine::segmenting::check_against_text;
use chunkflow_engine::{
    Document, EditDelta, EditPath, Engine, EngineSettings, ManualClock, SegmentId, segment,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

const TEXT: &str = "A paragraph.\n\nB paragraph.";

fn engine(text: &str) -> Engine {
    Engine::with_clock(
        Document::new(text, "topic"),
        EngineSettings::default(),
        Arc::new(ManualClock::new()),
    )
}

fn ids(engine: &Engine) -> Vec<SegmentId> {
    engine.document().segments().iter().map(|s| s.id).collect()
}

fn ranges(engine: &Engine) -> Vec<Range<usize>> {
    engine.document().segments().iter().map(|s| s.range()).collect()
}

/// Segments match the text and agree with a fresh segmentation of it
fn assert_consistent(engine: &Engine) {
    let text = engine.document().text();
    check_against_text(engine.document().segments(), text).unwrap();
    assert_eq!(
        engine.document().segments().len(),
        segment(text).len(),
        "text {text:?}"
    );
}

/// Type `typed` at the start of segment `index`, one character at a time
fn type_into(engine: &mut Engine, index: usize, typed: &str) {
    for (offset, ch) in typed.char_indices() {
        let at = engine.document().segments()[index].start + offset;
        edit(engine, EditDelta::insert(at, ch.to_string()));
        assert_consistent(engine);
    }
}

/// Apply `delta` to the engine's current text and report it
fn edit(engine: &mut Engine, delta: EditDelta) -> chunkflow_engine::Patch {
    let new_text = delta
        .apply(engine.document().text())
        .expect("delta should describe the current text");
    engine.on_edit(new_text, Some(&delta), None).unwrap()
}

#[test]
fn test_round_trip_insert_and_remove_separator() {
    let mut engine = engine(TEXT);
    let original = ids(&engine);
    assert_eq!(ranges(&engine), vec![0..12, 14..26]);

    // The extra blank lines join the existing separator: still two segments
    let patch = edit(&mut engine, EditDelta::insert(12, "\n\n"));
    assert_eq!(patch.path, EditPath::Resegmented);
    assert_eq!(ranges(&engine), vec![0..12, 16..28]);
    assert_eq!(ids(&engine), original);

    // Removing them restores the original layout with the same identities
    let removed = EditDelta::delete(engine.document().text(), 12..14).unwrap();
    edit(&mut engine, removed);
    assert_eq!(engine.document().text(), TEXT);
    assert_eq!(ranges(&engine), vec![0..12, 14..26]);
    assert_eq!(ids(&engine), original);
}

#[test]
fn test_deleting_only_separator_merges_into_first_identity() {
    let mut engine = engine(TEXT);
    let original = ids(&engine);

    let patch = edit(&mut engine, EditDelta::delete(TEXT, 12..14).unwrap());

    assert_eq!(engine.document().text(), "A paragraph.B paragraph.");
    assert_eq!(ranges(&engine), vec![0..24]);
    assert_eq!(ids(&engine), vec![original[0]]);
    assert_eq!(patch.removed, vec![original[1]]);
}

#[test]
fn test_splitting_paragraph_by_typing_keeps_first_identity() {
    let mut engine = engine(TEXT);
    let original = ids(&engine);

    edit(&mut engine, EditDelta::insert(2, "\n\n"));

    assert_eq!(engine.document().segments().len(), 3);
    // "A" is a substring of "A paragraph.", so index 0 keeps its id;
    // "paragraph." now sits at index 1 where "B paragraph." contains it
    assert_eq!(ids(&engine)[0], original[0]);
    assert_eq!(ids(&engine)[1], original[1]);
    assert!(!original.contains(&ids(&engine)[2]));
}

#[rstest]
#[case::start_of_first(0)]
#[case::inside_first(5)]
#[case::end_of_first(12)]
#[case::start_of_second(14)]
#[case::inside_second(20)]
#[case::end_of_document(26)]
fn test_typing_inside_a_segment_keeps_all_ids(#[case] at: usize) {
    let mut engine = engine(TEXT);
    let original = ids(&engine);

    let patch = edit(&mut engine, EditDelta::insert(at, "word"));

    assert_eq!(patch.path, EditPath::Remapped);
    assert_eq!(ids(&engine), original);
    assert!(patch.created.is_empty());
    assert!(patch.removed.is_empty());
}

#[rstest]
#[case(0, 3)]
#[case(5, 1)]
#[case(13, 7)]
#[case(26, 4)]
fn test_insertion_shifts_later_segments_exactly(#[case] at: usize, #[case] k: usize) {
    let text = "First one.\n\nSecond one.\n\nThird one.";
    let mut engine = engine(text);
    let before = engine.document().segments().to_vec();

    // Spaces never form a separator on their own
    edit(&mut engine, EditDelta::insert(at, " ".repeat(k)));

    for (old, new) in before.iter().zip(engine.document().segments()) {
        assert_eq!(old.id, new.id);
        if old.start > at {
            assert_eq!((new.start, new.end), (old.start + k, old.end + k));
        }
        if old.end < at {
            assert_eq!(new.range(), old.range());
        }
    }
}

#[test]
fn test_remap_matches_fresh_segmentation() {
    let base = "Intro line.\n\nBody with\nwrapped lines.\n\n  Indented tail.\n";
    let edits = [
        EditDelta::insert(0, "Lead "),
        EditDelta::insert(11, " More."),
        EditDelta::insert(13, "X"),
        EditDelta::delete(base, 18..23).unwrap(),
        EditDelta::replace(base, 22..23, " ").unwrap(),
        EditDelta::insert(base.len() - 1, "!"),
    ];

    for delta in edits {
        let mut engine = engine(base);
        let patch = edit(&mut engine, delta.clone());
        let text = engine.document().text().to_string();

        assert_eq!(patch.path, EditPath::Remapped, "edit {delta:?}");
        let fresh: Vec<_> = segment(&text).iter().map(|s| s.range()).collect();
        assert_eq!(ranges(&engine), fresh, "edit {delta:?}");
    }
}

#[test]
fn test_invariants_hold_over_an_editing_session() {
    let mut engine = engine("");
    let mut text = String::new();
    let typed = "Hello world.\n\nSecond para\nstill second.\n\n\nThird!\n \nFourth.";

    // Type character by character, then delete from the middle
    for ch in typed.chars() {
        let delta = EditDelta::insert(text.len(), ch.to_string());
        text.push(ch);
        engine.on_edit(text.clone(), Some(&delta), Some(text.len())).unwrap();
        check_against_text(engine.document().segments(), engine.document().text()).unwrap();
    }
    assert_eq!(engine.document().segments().len(), 4);

    // Restructure in between keystrokes
    let first = ids(&engine)[0];
    engine.merge_adjacent(first).unwrap();
    assert_consistent(&engine);
    assert_eq!(engine.document().segments().len(), 3);
    type_into(&mut engine, 0, "Oh. ");

    engine.split_segment(first, "Oh. Hello world.".len()).unwrap();
    assert_consistent(&engine);
    assert_eq!(engine.document().segments().len(), 4);
    type_into(&mut engine, 1, "And ");

    engine.reorder(0, 3).unwrap();
    assert_consistent(&engine);
    type_into(&mut engine, 3, "Finally, ");

    let second = ids(&engine)[1];
    engine.merge_adjacent(second).unwrap();
    assert_consistent(&engine);
    assert_eq!(
        engine.document().all_segment_texts(),
        vec![
            "And Second para\nstill second.",
            "Third!\nFourth.",
            "Finally, Oh. Hello world."
        ]
    );

    text = engine.document().text().to_string();
    while text.len() > 20 {
        let delta = EditDelta::delete(&text, 10..11).unwrap();
        text.replace_range(10..11, "");
        engine.on_edit(text.clone(), Some(&delta), None).unwrap();
        check_against_text(engine.document().segments(), engine.document().text()).unwrap();
        assert_eq!(
            engine.document().segments().len(),
            segment(&text).len(),
            "text {text:?}"
        );
    }
}

#[test]
fn test_multibyte_editing() {
    let text = "Привет мир.\n\nВторой абзац.";
    let mut engine = engine(text);
    let original = ids(&engine);

    let at = "Привет".len();
    edit(&mut engine, EditDelta::insert(at, ", дорогой"));

    assert_eq!(ids(&engine), original);
    assert_eq!(
        engine.document().all_segment_texts(),
        vec!["Привет, дорогой мир.", "Второй абзац."]
    );
}

#[test]
fn test_version_increments_per_commit() {
    let mut engine = engine(TEXT);

    edit(&mut engine, EditDelta::insert(0, "x"));
    edit(&mut engine, EditDelta::insert(0, "y"));
    let patch = engine.on_edit("yxA paragraph.\n\nB paragraph.", None, None).unwrap();

    assert!(patch.is_unchanged());
    assert_eq!(engine.document().version(), 2);
}
