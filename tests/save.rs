// ../tests/save.rs
use ariel_ratatui::save::{FileSlot, SAVE_FILE, SaveSlot, SlotStore, load_or_absent, save_quietly};
use ariel_ratatui::settings::Settings;
use ariel_ratatui::*;
use std::fs;
use tempfile::tempdir;

fn played_slot() -> SaveSlot {
    let json_str = fs::read_to_string("tests/fixtures/opening_scene.json").unwrap();
    let scene = Scene::from_json(&json_str).unwrap();
    let mut state = SessionState::merge(None, &scene);
    state.record_choice(1);
    SaveSlot::new(state, Some(scene))
}

#[test]
fn test_missing_save_loads_as_none() {
    let dir = tempdir().unwrap();
    let slot = FileSlot::in_dir(dir.path());

    assert_eq!(slot.path(), dir.path().join(SAVE_FILE));
    assert!(slot.load().unwrap().is_none());
    assert!(load_or_absent(&slot).is_none());
}

#[test]
fn test_save_then_load_restores_the_session() {
    let dir = tempdir().unwrap();
    let slot = FileSlot::in_dir(dir.path().join("nested"));
    let saved = played_slot();

    slot.save(&saved).unwrap();
    let loaded = slot.load().unwrap().expect("slot should exist after saving");

    assert_eq!(loaded, saved);
    assert!(loaded.updated_at > 0);
}

#[test]
fn test_save_uses_camel_case_keys() {
    let dir = tempdir().unwrap();
    let slot = FileSlot::in_dir(dir.path());
    slot.save(&SaveSlot::new(SessionState::initialize(), None)).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(slot.path()).unwrap()).unwrap();
    assert!(raw.get("updatedAt").is_some());
    assert!(raw["lastScene"].is_null());
    assert!(raw["state"].get("historyLog").is_some());
}

#[test]
fn test_a_newer_save_replaces_the_old_one() {
    let dir = tempdir().unwrap();
    let slot = FileSlot::in_dir(dir.path());

    slot.save(&played_slot()).unwrap();
    let fresh = SaveSlot::new(SessionState::initialize(), None);
    slot.save(&fresh).unwrap();

    assert_eq!(slot.load().unwrap(), Some(fresh));
}

#[test]
fn test_clear_removes_the_slot() {
    let dir = tempdir().unwrap();
    let slot = FileSlot::in_dir(dir.path());
    save_quietly(&slot, &played_slot());
    assert!(slot.path().exists());

    slot.clear().unwrap();
    assert!(!slot.path().exists());
    // Clearing twice is fine.
    slot.clear().unwrap();
}

#[test]
fn test_corrupt_save_is_treated_as_absent() {
    let dir = tempdir().unwrap();
    let slot = FileSlot::in_dir(dir.path());

    fs::write(slot.path(), "{ not json").unwrap();
    assert!(matches!(slot.load(), Err(SaveError::Json(_))));
    assert!(load_or_absent(&slot).is_none());

    fs::write(slot.path(), "  \n").unwrap();
    assert!(slot.load().unwrap().is_none());
}

#[test]
fn test_save_with_partial_stats_still_loads() {
    let dir = tempdir().unwrap();
    let slot = FileSlot::in_dir(dir.path());
    fs::write(
        slot.path(),
        r#"{ "updatedAt": 1, "state": { "stats": { "bond": 3 } }, "lastScene": null }"#,
    )
    .unwrap();

    let loaded = load_or_absent(&slot).expect("a partial save should still load");
    assert_eq!(loaded.state.stats.bond, 3);
    assert_eq!(loaded.state.stats.focus, 0);
}

#[test]
fn test_settings_defaults_and_partial_files() {
    let defaults = Settings::default();
    assert_eq!(defaults.model, "gpt-4o-mini");
    assert_eq!(defaults.max_tokens, 1400);
    assert_eq!(defaults.history_bound, 6);
    assert!(defaults.openai_api_key.is_none());

    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{ "language": "Korean", "history_bound": 3 }"#).unwrap();

    let settings = Settings::load_settings_from_file(&path).unwrap();
    assert_eq!(settings.language, "Korean");
    assert_eq!(settings.history_bound, 3);
    assert_eq!(settings.model, defaults.model);
}

#[test]
fn test_settings_round_trip_through_a_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data").join("settings.json");
    let settings = Settings {
        openai_api_key: Some("sk-test".to_string()),
        debug_mode: true,
        ..Settings::default()
    };

    settings.save_to_file(&path).unwrap();
    assert_eq!(Settings::load_settings_from_file(&path).unwrap(), settings);
    assert!(Settings::load_settings_from_file(dir.path().join("missing.json")).is_err());
}
