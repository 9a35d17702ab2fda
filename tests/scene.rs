// ../tests/scene.rs
use ariel_ratatui::assets::{avatar_path, background_path, character_path, portrait_path};
use ariel_ratatui::narrator::extract_scene;
use ariel_ratatui::scene::{Chapter, Position, Term, VillainPressure, Visuals};
use ariel_ratatui::*;
use serde_json::json;
use std::fs;

fn fixture(name: &str) -> Scene {
    let json_str = fs::read_to_string(format!("tests/fixtures/{name}"))
        .expect("Failed to read scene fixture");
    Scene::from_json(&json_str).expect("Failed to parse scene fixture")
}

fn visuals(value: serde_json::Value) -> Visuals {
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_opening_scene_parses_completely() {
    let scene = fixture("opening_scene.json");

    assert_eq!(scene.chapter.school_year, Some(1));
    assert_eq!(scene.chapter.season(), Some(Term::Fall));
    assert_eq!(scene.chapter.location.as_deref(), Some("Academy courtyard"));
    assert_eq!(scene.visuals.bg_key.as_deref(), Some("courtyard_dusk"));
    assert_eq!(scene.visuals.characters.len(), 2);
    assert_eq!(scene.visuals.characters[1].position(), Some(Position::Right));
    assert_eq!(
        scene.dialogue[0],
        DialogueLine::new("Lucien", "You're late, first-year.")
    );
    assert_eq!(scene.checks[0].kind, "social");
    assert_eq!(scene.checks[0].on_fail.as_deref(), Some("He sighs."));
    assert_eq!(scene.gm_notes.pressure(), Some(VillainPressure::Low));
    assert!(!scene.gm_notes.big_event);
}

#[test]
fn test_only_three_options_are_offered() {
    let scene = fixture("opening_scene.json");

    assert_eq!(scene.choices.len(), 4);
    let ids: Vec<u32> = scene.options().iter().map(|choice| choice.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn test_option_tags() {
    let scene = fixture("opening_scene.json");
    let options = scene.options();

    assert_eq!(options[0].primary_tag(), "school");
    assert!(!options[0].is_risky());
    assert_eq!(options[1].primary_tag(), "romance");
    assert!(options[2].is_risky());
    assert_eq!(options[0].effects_hint.as_deref(), Some("trust up"));

    let untagged: Choice = serde_json::from_value(json!({ "id": 1, "text": "Wait" })).unwrap();
    assert_eq!(untagged.primary_tag(), "choice");
}

#[test]
fn test_malformed_fields_fall_back_to_defaults() {
    let scene = fixture("messy_scene.json");

    assert_eq!(scene.chapter, Chapter::default());
    assert_eq!(scene.narration, "");
    assert!(scene.dialogue.is_empty());

    assert_eq!(scene.visuals.bg_key.as_deref(), Some("42"));
    let ids: Vec<&str> = scene.visuals.characters.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["mira"]);

    assert_eq!(scene.choices.len(), 2);
    assert_eq!(scene.choices[0].id, 2);
    assert_eq!(scene.choices[0].tags, vec!["risk"]);
    assert_eq!(scene.choices[1].id, 3);
    assert_eq!(scene.choices[1].text, "99");

    let patch = &scene.state_patch;
    assert_eq!(patch.stats.focus, Some(5));
    assert_eq!(patch.stats.talent, None);
    assert_eq!(patch.stats.bond, Some(1));
    assert!(patch.global_flags_add.is_empty());
    assert_eq!(patch.relationships[1].friendship_delta, 3);
    assert_eq!(patch.relationships[1].trust_delta, 0);
    assert!(patch.relationships[1].flags_add.is_empty());

    assert!(scene.gm_notes.big_event);
    assert_eq!(scene.gm_notes.pressure(), Some(VillainPressure::High));
}

#[test]
fn test_messy_scene_merges_safely() {
    let state = SessionState::merge(None, &fixture("messy_scene.json"));

    assert_eq!(state.stats.focus, 5);
    assert_eq!(state.stats.talent, 0);
    assert_eq!(state.stats.bond, 1);
    assert_eq!(state.relationships.len(), 1);
    assert_eq!(state.relationship("Mira").unwrap().friendship, 3);
}

#[test]
fn test_empty_object_is_an_empty_scene() {
    let scene = Scene::from_json("{}").unwrap();
    assert_eq!(scene, Scene::default());
    assert!(scene.options().is_empty());
}

#[test]
fn test_chapter_headings() {
    let full = fixture("opening_scene.json").chapter;
    assert_eq!(full.heading(), "Year 1 Fall");
    assert_eq!(full.scene_heading(), "The Lantern Gate");

    let arc_only: Chapter = serde_json::from_value(json!({ "arcTitle": "Exam Week" })).unwrap();
    assert_eq!(arc_only.heading(), "Exam Week");
    assert_eq!(arc_only.scene_heading(), "Exam Week");

    let lower_term: Chapter =
        serde_json::from_value(json!({ "schoolYear": "2", "term": "winter" })).unwrap();
    assert_eq!(lower_term.heading(), "Year 2 Winter");

    assert_eq!(Chapter::default().heading(), "In progress");
    assert_eq!(Chapter::default().scene_heading(), "Scene");
}

#[test]
fn test_avatar_prefers_the_protagonist() {
    let scene = fixture("opening_scene.json");
    assert_eq!(avatar_path(&scene.visuals), "img/chars/ariel/smile.png");

    let spotlight = visuals(json!({
        "characters": [{ "id": "mira" }, { "id": "lucien", "expression": "blush" }],
        "spotlight": "lucien"
    }));
    assert_eq!(avatar_path(&spotlight), "img/chars/lucien/blush.png");

    let first = visuals(json!({ "characters": [{ "id": "mira" }], "spotlight": "nobody" }));
    assert_eq!(avatar_path(&first), "img/chars/mira/neutral.png");
    assert!(first.spotlighted().is_none());

    assert_eq!(
        avatar_path(&Visuals::default()),
        "img/chars/ariel/neutral.png"
    );
}

#[test]
fn test_asset_paths() {
    let scene = fixture("opening_scene.json");
    let spotlight = scene.visuals.spotlighted().unwrap();
    assert_eq!(portrait_path(spotlight), "img/chars/lucien/serious.png");

    assert_eq!(
        background_path("courtyard_dusk").as_deref(),
        Some("img/bg/courtyard_dusk.jpg")
    );
    assert_eq!(background_path(""), None);
    assert_eq!(
        background_path("old library").as_deref(),
        Some("img/bg/old%20library.jpg")
    );
    assert_eq!(character_path("", ""), "img/chars/unknown/neutral.png");
    assert_eq!(character_path("élise", "smile"), "img/chars/%C3%A9lise/smile.png");
}

#[test]
fn test_extract_scene_from_fenced_reply() {
    let reply = "```json\n{\"narration\": \"Rain.\", \"choices\": [{\"id\": 1, \"text\": \"Run\"}]}\n```";
    let scene = extract_scene(reply).expect("fenced JSON should be found");

    assert_eq!(scene.narration, "Rain.");
    assert_eq!(scene.options()[0].text, "Run");
}

#[test]
fn test_extract_scene_from_surrounding_prose() {
    let reply = "Here is your scene:\n{\"narration\": \"Snow.\"}\nEnjoy!";
    assert_eq!(extract_scene(reply).unwrap().narration, "Snow.");
}

#[test]
fn test_extract_scene_repairs_trailing_commas() {
    let reply = "{\"narration\": \"Fog.\", \"dialogue\": [{\"speaker\": \"Mira\", \"text\": \"Hm\"},\n ],}";
    let scene = extract_scene(reply).expect("trailing commas should be tolerated");

    assert_eq!(scene.narration, "Fog.");
    assert_eq!(scene.dialogue, vec![DialogueLine::new("Mira", "Hm")]);
}

#[test]
fn test_extract_scene_rejects_non_json() {
    assert!(extract_scene("").is_none());
    assert!(extract_scene("I cannot continue the story.").is_none());
    assert!(extract_scene("} backwards {").is_none());
    assert!(extract_scene("{\"narration\": ").is_none());
}
