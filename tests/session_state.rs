// ../tests/session_state.rs
use ariel_ratatui::state::{NARRATION_EXCERPT_CHARS, Stats};
use ariel_ratatui::*;
use serde_json::json;
use std::fs;

fn scene(value: serde_json::Value) -> Scene {
    serde_json::from_value(value).expect("scene literal should parse")
}

fn relationship_turn(name: &str, friendship: i64, add: &[&str], remove: &[&str]) -> Scene {
    scene(json!({
        "narration": format!("A moment with {name}."),
        "statePatch": {
            "relationships": [{
                "name": name,
                "friendshipDelta": friendship,
                "flagsAdd": add,
                "flagsRemove": remove
            }]
        }
    }))
}

fn numbered_turn(turn: usize) -> Scene {
    scene(json!({
        "chapter": { "sceneTitle": format!("Turn {turn}") },
        "narration": format!("Turn {turn} happens.")
    }))
}

#[test]
fn test_initialize_is_zero_valued() {
    let state = SessionState::initialize();

    assert_eq!(state.stats, Stats::default());
    assert!(state.relationships.is_empty());
    assert!(state.global_flags.is_empty());
    assert!(state.last.is_none());
    assert!(state.history_log.is_empty());
    assert_eq!(state, SessionState::default());
}

#[test]
fn test_merge_without_previous_starts_fresh() {
    let json_str = fs::read_to_string("tests/fixtures/opening_scene.json")
        .expect("Failed to read opening scene fixture");
    let opening = Scene::from_json(&json_str).expect("Failed to parse opening scene");

    let from_none = SessionState::merge(None, &opening);
    let from_fresh = SessionState::merge(Some(SessionState::initialize()), &opening);
    assert_eq!(from_none, from_fresh);

    assert_eq!(
        from_none.stats,
        Stats {
            focus: 2,
            talent: 1,
            reason: 0,
            bond: 0
        }
    );
    let lucien = from_none.relationship("Lucien").expect("Lucien should be tracked");
    assert_eq!((lucien.friendship, lucien.trust, lucien.romance), (1, 2, 0));
    assert!(lucien.flags.contains("met"));
    assert!(from_none.global_flags.contains("arrived"));

    let last = from_none.last.as_ref().expect("last chapter should be set");
    assert_eq!(last.chapter.scene_title.as_deref(), Some("The Lantern Gate"));
    assert_eq!(
        last.gm_notes.next_scene_hook.as_deref(),
        Some("The gate remembers faces.")
    );
}

#[test]
fn test_stats_are_overwritten_not_added() {
    let patch = scene(json!({ "statePatch": { "stats": { "focus": 3, "reason": 2 } } }));

    let once = SessionState::merge(None, &patch);
    let twice = SessionState::merge(Some(once.clone()), &patch);
    assert_eq!(once.stats, twice.stats);

    // Absent stats keep their previous value.
    let partial = scene(json!({ "statePatch": { "stats": { "bond": 4 } } }));
    let state = SessionState::merge(Some(twice), &partial);
    assert_eq!(
        state.stats,
        Stats {
            focus: 3,
            talent: 0,
            reason: 2,
            bond: 4
        }
    );
}

#[test]
fn test_relationship_deltas_accumulate_across_turns() {
    let state = SessionState::merge(None, &relationship_turn("Mira", 2, &["study_buddy"], &[]));
    let state = SessionState::merge(Some(state), &relationship_turn("Mira", -1, &[], &["study_buddy"]));

    let mira = state.relationship("Mira").unwrap();
    assert_eq!(mira.friendship, 1);
    assert!(!mira.flags.contains("study_buddy"));
}

#[test]
fn test_relationship_values_are_not_clamped() {
    let mut state = SessionState::initialize();
    for _ in 0..4 {
        state.apply(&relationship_turn("Rival", -5, &[], &[]));
    }
    for _ in 0..3 {
        state.apply(&relationship_turn("Friend", 5, &[], &[]));
    }

    assert_eq!(state.relationship("Rival").unwrap().friendship, -20);
    assert_eq!(state.relationship("Friend").unwrap().friendship, 15);
}

#[test]
fn test_oversized_deltas_saturate_instead_of_overflowing() {
    let huge = scene(json!({
        "statePatch": {
            "relationships": [{ "name": "Lucien", "friendshipDelta": 1e30, "trustDelta": -1e30 }]
        }
    }));

    let once = SessionState::merge(None, &huge);
    let twice = SessionState::merge(Some(once), &huge);

    let lucien = twice.relationship("Lucien").unwrap();
    assert_eq!(lucien.friendship, i64::MAX);
    assert_eq!(lucien.trust, i64::MIN);
    assert_eq!(lucien.romance, 0);
}

#[test]
fn test_partial_stats_deserialize_with_defaults() {
    let state: SessionState =
        serde_json::from_value(json!({ "stats": { "focus": 2 } })).unwrap();

    assert_eq!(
        state.stats,
        Stats {
            focus: 2,
            ..Stats::default()
        }
    );
}

#[test]
fn test_flag_added_and_removed_in_one_patch_ends_absent() {
    let state = SessionState::merge(
        None,
        &scene(json!({
            "statePatch": {
                "relationships": [{ "name": "Lucien", "flagsAdd": ["owes_favor"], "flagsRemove": ["owes_favor"] }],
                "globalFlagsAdd": ["storm", "curfew"],
                "globalFlagsRemove": ["storm"]
            }
        })),
    );

    assert!(state.relationship("Lucien").unwrap().flags.is_empty());
    assert_eq!(
        state.global_flags.iter().collect::<Vec<_>>(),
        vec!["curfew"]
    );
}

#[test]
fn test_blank_relationship_names_are_ignored() {
    let state = SessionState::merge(
        None,
        &scene(json!({
            "statePatch": {
                "relationships": [
                    { "name": "", "friendshipDelta": 3 },
                    { "name": "   ", "trustDelta": 3 },
                    { "name": " Mira ", "trustDelta": 1 }
                ]
            }
        })),
    );

    assert_eq!(state.relationships.len(), 1);
    assert_eq!(state.relationship("Mira").unwrap().trust, 1);
}

#[test]
fn test_history_log_keeps_the_most_recent_turns() {
    let bound = 4;
    let mut state = SessionState::with_history_bound(bound);
    for turn in 1..=bound + 3 {
        state = SessionState::merge(Some(state), &numbered_turn(turn));
    }

    assert_eq!(state.history_log.len(), bound);
    let titles: Vec<String> = state
        .history_log
        .iter()
        .filter_map(|entry| entry.chapter.scene_title.clone())
        .collect();
    assert_eq!(titles, vec!["Turn 4", "Turn 5", "Turn 6", "Turn 7"]);
}

#[test]
fn test_history_entries_are_excerpts() {
    let long = "word ".repeat(100);
    let state = SessionState::merge(
        None,
        &scene(json!({
            "narration": long,
            "dialogue": [
                { "speaker": "A", "text": "one" },
                { "speaker": "B", "text": "two" },
                { "speaker": "C", "text": "three" },
                { "speaker": "D", "text": "four" }
            ]
        })),
    );

    let entry = &state.history_log[0];
    assert_eq!(entry.narration.chars().count(), NARRATION_EXCERPT_CHARS);
    assert!(entry.narration.ends_with('…'));
    assert_eq!(entry.dialogue, vec!["A: one", "B: two", "C: three"]);
    assert_eq!(entry.chosen, None);
}

#[test]
fn test_record_choice_on_empty_history_is_a_no_op() {
    let mut state = SessionState::initialize();
    state.record_choice(2);
    assert_eq!(state, SessionState::initialize());
}

#[test]
fn test_record_choice_sets_the_newest_entry_once() {
    let mut state = SessionState::merge(None, &numbered_turn(1));
    state = SessionState::merge(Some(state), &numbered_turn(2));

    state.record_choice(3);
    state.record_choice(1);

    assert_eq!(state.history_log[0].chosen, None);
    assert_eq!(state.history_log[1].chosen, Some(3));

    // The next merge opens a fresh entry that can be chosen again.
    state = SessionState::merge(Some(state), &numbered_turn(3));
    state.record_choice(1);
    assert_eq!(state.history_log[2].chosen, Some(1));
}

#[test]
fn test_state_survives_serialization() {
    let json_str = fs::read_to_string("tests/fixtures/opening_scene.json").unwrap();
    let opening = Scene::from_json(&json_str).unwrap();
    let mut state = SessionState::merge(None, &opening);
    state.record_choice(2);

    let saved = serde_json::to_value(&state).unwrap();
    assert_eq!(saved["stats"]["focus"], 2);
    assert_eq!(saved["historyLog"][0]["chosen"], 2);
    assert_eq!(saved["globalFlags"], json!(["arrived"]));

    let restored: SessionState = serde_json::from_value(saved).unwrap();
    assert_eq!(restored, state);
}
