// src/narrator/mod.rs
//
// The boundary to whatever writes the story. The session only ever sees a
// `TurnOutcome`: a fully defaulted scene or a failure it can show and retry.
pub mod openai;
pub mod response;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::NarratorError;
use crate::scene::Scene;
use crate::state::SessionState;

pub use openai::OpenAiNarrator;
pub use response::extract_scene;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequest {
    /// `None` starts a new story.
    pub state: Option<SessionState>,
    pub choice_id: Option<u32>,
    #[serde(default)]
    pub user_text: String,
}

impl TurnRequest {
    pub fn new_game(state: SessionState) -> Self {
        Self {
            state: Some(state),
            choice_id: None,
            user_text: String::new(),
        }
    }

    pub fn choose(state: SessionState, choice_id: u32) -> Self {
        Self {
            state: Some(state),
            choice_id: Some(choice_id),
            user_text: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    Success(Box<Scene>),
    Failure(String),
}

impl From<Result<Scene, NarratorError>> for TurnOutcome {
    fn from(result: Result<Scene, NarratorError>) -> Self {
        match result {
            Ok(scene) => TurnOutcome::Success(Box::new(scene)),
            Err(e) => TurnOutcome::Failure(e.to_string()),
        }
    }
}

#[async_trait]
pub trait Narrator: Send + Sync {
    /// At most one call per player action; no retries happen behind this call.
    async fn next_scene(&self, request: TurnRequest) -> TurnOutcome;
}
