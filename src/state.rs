// src/state.rs
//
// The durable player record. Every turn's delta flows through `merge`; nothing else
// mutates a `SessionState`.
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::scene::{Chapter, GmNotes, Scene};

pub const DEFAULT_HISTORY_BOUND: usize = 6;
/// Character budget for the narration excerpt kept in a history entry.
pub const NARRATION_EXCERPT_CHARS: usize = 220;
pub const DIALOGUE_EXCERPT_LINES: usize = 3;
pub const DIALOGUE_EXCERPT_CHARS: usize = 80;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub focus: i64,
    pub talent: i64,
    pub reason: i64,
    pub bond: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Relationship {
    pub friendship: i64,
    pub trust: i64,
    pub romance: i64,
    pub flags: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LastSeen {
    pub chapter: Chapter,
    pub gm_notes: GmNotes,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryEntry {
    pub chapter: Chapter,
    pub narration: String,
    pub dialogue: Vec<String>,
    pub chosen: Option<u32>,
}

impl HistoryEntry {
    fn from_scene(scene: &Scene) -> Self {
        Self {
            chapter: scene.chapter.clone(),
            narration: excerpt(&scene.narration, NARRATION_EXCERPT_CHARS),
            dialogue: scene
                .dialogue
                .iter()
                .take(DIALOGUE_EXCERPT_LINES)
                .map(|line| excerpt(&line.rendered(), DIALOGUE_EXCERPT_CHARS))
                .collect(),
            chosen: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionState {
    pub stats: Stats,
    pub relationships: BTreeMap<String, Relationship>,
    pub global_flags: BTreeSet<String>,
    pub last: Option<LastSeen>,
    pub history_log: VecDeque<HistoryEntry>,
    pub history_bound: usize,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::initialize()
    }
}

impl SessionState {
    /// A zero-valued session, used for new games and when no save exists.
    pub fn initialize() -> Self {
        Self::with_history_bound(DEFAULT_HISTORY_BOUND)
    }

    pub fn with_history_bound(history_bound: usize) -> Self {
        Self {
            stats: Stats::default(),
            relationships: BTreeMap::new(),
            global_flags: BTreeSet::new(),
            last: None,
            history_log: VecDeque::new(),
            history_bound,
        }
    }

    /// Merge `scene` into `previous`, or into a fresh session when there is none.
    pub fn merge(previous: Option<SessionState>, scene: &Scene) -> SessionState {
        let mut state = previous.unwrap_or_else(Self::initialize);
        state.apply(scene);
        state
    }

    /// In-place form of [`SessionState::merge`]. Applying the same scene twice
    /// double-counts its deltas; callers own that guarantee.
    pub fn apply(&mut self, scene: &Scene) {
        let patch = &scene.state_patch;

        let stats = &patch.stats;
        self.stats = Stats {
            focus: stats.focus.unwrap_or(self.stats.focus),
            talent: stats.talent.unwrap_or(self.stats.talent),
            reason: stats.reason.unwrap_or(self.stats.reason),
            bond: stats.bond.unwrap_or(self.stats.bond),
        };

        for delta in &patch.relationships {
            let name = delta.name.trim();
            if name.is_empty() {
                continue;
            }
            let slot = self.relationships.entry(name.to_string()).or_default();
            // Deltas come from model output and may be absurdly large.
            slot.friendship = slot.friendship.saturating_add(delta.friendship_delta);
            slot.trust = slot.trust.saturating_add(delta.trust_delta);
            slot.romance = slot.romance.saturating_add(delta.romance_delta);
            slot.flags.extend(delta.flags_add.iter().cloned());
            for flag in &delta.flags_remove {
                slot.flags.remove(flag);
            }
        }

        self.global_flags
            .extend(patch.global_flags_add.iter().cloned());
        for flag in &patch.global_flags_remove {
            self.global_flags.remove(flag);
        }

        self.last = Some(LastSeen {
            chapter: scene.chapter.clone(),
            gm_notes: scene.gm_notes.clone(),
        });

        self.history_log.push_back(HistoryEntry::from_scene(scene));
        while self.history_log.len() > self.history_bound {
            self.history_log.pop_front();
        }
    }

    /// Set the option chosen from the newest history entry. Only the first call
    /// after a merge has any effect.
    pub fn record_choice(&mut self, option_id: u32) {
        if let Some(entry) = self.history_log.back_mut() {
            if entry.chosen.is_none() {
                entry.chosen = Some(option_id);
            }
        }
    }

    pub fn relationship(&self, name: &str) -> Option<&Relationship> {
        self.relationships.get(name)
    }
}

fn excerpt(text: &str, budget: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= budget {
        return collapsed;
    }
    let mut cut: String = collapsed.chars().take(budget.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
