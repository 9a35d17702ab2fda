// src/scene.rs
//
// One turn of narrative as produced by the generator. Every field is validated and
// defaulted while deserializing so the rest of the crate never sees a half-formed scene.
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::lenient;

/// Protagonist id, preferred for the avatar slot.
pub const PROTAGONIST_ID: &str = "ariel";
pub const DEFAULT_EXPRESSION: &str = "neutral";
/// Options beyond this count are never offered to the player.
pub const MAX_OPTIONS: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Scene {
    #[serde(deserialize_with = "lenient::object")]
    pub chapter: Chapter,
    #[serde(deserialize_with = "lenient::object")]
    pub visuals: Visuals,
    #[serde(deserialize_with = "lenient::string")]
    pub narration: String,
    #[serde(deserialize_with = "lenient::seq")]
    pub dialogue: Vec<DialogueLine>,
    #[serde(deserialize_with = "lenient::seq")]
    pub choices: Vec<Choice>,
    #[serde(deserialize_with = "lenient::seq")]
    pub checks: Vec<Check>,
    #[serde(deserialize_with = "lenient::object")]
    pub state_patch: StatePatch,
    #[serde(deserialize_with = "lenient::object")]
    pub gm_notes: GmNotes,
}

impl Scene {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// The selectable options, capped at three.
    pub fn options(&self) -> &[Choice] {
        &self.choices[..self.choices.len().min(MAX_OPTIONS)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(ascii_case_insensitive)]
pub enum Term {
    Fall,
    Winter,
    Spring,
    Summer,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Chapter {
    #[serde(deserialize_with = "lenient::opt_uint")]
    pub school_year: Option<u32>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub term: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub arc_title: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub scene_title: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub location: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub time: Option<String>,
}

impl Chapter {
    pub fn season(&self) -> Option<Term> {
        self.term.as_deref().and_then(|term| term.parse().ok())
    }

    /// "Year 2 Winter", falling back to the arc title and then to "In progress".
    pub fn heading(&self) -> String {
        let year = self.school_year.map(|year| format!("Year {year}"));
        let term = match (self.season(), self.term.as_deref()) {
            (Some(season), _) => Some(season.to_string()),
            (None, term) => term.map(String::from),
        };
        let parts: Vec<String> = [year, term].into_iter().flatten().collect();
        if !parts.is_empty() {
            return parts.join(" ");
        }
        self.arc_title
            .clone()
            .unwrap_or_else(|| "In progress".to_string())
    }

    pub fn scene_heading(&self) -> String {
        self.scene_title
            .clone()
            .or_else(|| self.arc_title.clone())
            .unwrap_or_else(|| "Scene".to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Position {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterRef {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub expression: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub position: Option<String>,
}

impl CharacterRef {
    pub fn expression(&self) -> &str {
        self.expression.as_deref().unwrap_or(DEFAULT_EXPRESSION)
    }

    pub fn position(&self) -> Option<Position> {
        self.position.as_deref().and_then(|p| p.parse().ok())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Visuals {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub bg_key: Option<String>,
    #[serde(deserialize_with = "lenient::seq")]
    pub characters: Vec<CharacterRef>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub spotlight: Option<String>,
}

impl Visuals {
    fn find(&self, id: &str) -> Option<&CharacterRef> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// The character shown in the avatar slot: protagonist, then spotlight, then whoever
    /// is listed first.
    pub fn avatar(&self) -> Option<&CharacterRef> {
        self.find(PROTAGONIST_ID)
            .or_else(|| self.spotlight.as_deref().and_then(|id| self.find(id)))
            .or_else(|| self.characters.first())
            .filter(|c| !c.id.is_empty())
    }

    /// Only shown when the spotlight id names a character present in the scene.
    pub fn spotlighted(&self) -> Option<&CharacterRef> {
        self.spotlight
            .as_deref()
            .and_then(|id| self.find(id))
            .filter(|c| !c.id.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueLine {
    #[serde(deserialize_with = "lenient::string")]
    pub speaker: String,
    #[serde(deserialize_with = "lenient::string")]
    pub text: String,
}

impl DialogueLine {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
        }
    }

    /// How a line reads on screen, also what the capacity oracle measures.
    pub fn rendered(&self) -> String {
        format!("{}: {}", self.speaker, self.text)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Choice {
    #[serde(deserialize_with = "lenient::uint")]
    pub id: u32,
    #[serde(deserialize_with = "lenient::string")]
    pub text: String,
    #[serde(deserialize_with = "lenient::strings")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub effects_hint: Option<String>,
}

impl Choice {
    pub fn primary_tag(&self) -> &str {
        self.tags.first().map(String::as_str).unwrap_or("choice")
    }

    pub fn is_risky(&self) -> bool {
        matches!(self.primary_tag(), "risk" | "mystery")
    }
}

/// A dice check the narrator attached to the scene, e.g. `1d10 + focus >= 8`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Check {
    #[serde(rename = "type", deserialize_with = "lenient::string")]
    pub kind: String,
    #[serde(deserialize_with = "lenient::string")]
    pub formula: String,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub on_success: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub on_fail: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsPatch {
    #[serde(deserialize_with = "lenient::opt_int")]
    pub focus: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_int")]
    pub talent: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_int")]
    pub reason: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_int")]
    pub bond: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelationshipDelta {
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(deserialize_with = "lenient::int")]
    pub friendship_delta: i64,
    #[serde(deserialize_with = "lenient::int")]
    pub trust_delta: i64,
    #[serde(deserialize_with = "lenient::int")]
    pub romance_delta: i64,
    #[serde(deserialize_with = "lenient::strings")]
    pub flags_add: Vec<String>,
    #[serde(deserialize_with = "lenient::strings")]
    pub flags_remove: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatePatch {
    #[serde(deserialize_with = "lenient::object")]
    pub stats: StatsPatch,
    #[serde(deserialize_with = "lenient::seq")]
    pub relationships: Vec<RelationshipDelta>,
    #[serde(deserialize_with = "lenient::strings")]
    pub global_flags_add: Vec<String>,
    #[serde(deserialize_with = "lenient::strings")]
    pub global_flags_remove: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum VillainPressure {
    Low,
    Mid,
    High,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GmNotes {
    #[serde(deserialize_with = "lenient::boolean")]
    pub big_event: bool,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub big_event_id: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub villain_pressure: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub romance_route_focus: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub next_scene_hook: Option<String>,
}

impl GmNotes {
    pub fn pressure(&self) -> Option<VillainPressure> {
        self.villain_pressure.as_deref().and_then(|p| p.parse().ok())
    }
}
