// src/narrator/openai.rs
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ResponseFormat,
    },
};
use async_trait::async_trait;
use serde::Serialize;

use super::{Narrator, TurnOutcome, TurnRequest, extract_scene};
use crate::error::NarratorError;
use crate::scene::Scene;
use crate::settings::Settings;

const GAME_MASTER_PROMPT: &str = r#"You are the game master of a mobile, text-based role-playing game set in a school of magic.
The player controls Ariel, a cheerful first-year student, and advances the story by picking one of three numbered choices.
The campaign mixes school life, friendship and romance with a hidden-villain mystery: a secret faction stages "accidents" to harm the descendants of heroic families.
Show relationship changes through behaviour and dialogue, never by stating numbers in the narration.

Reply with a single JSON object and nothing else, following this schema:
{
  "chapter": {"schoolYear": 1, "term": "Fall|Winter|Spring|Summer", "arcTitle": "", "sceneTitle": "", "location": "", "time": ""},
  "visuals": {"bgKey": "", "characters": [{"id": "ariel", "expression": "neutral|smile|angry|sad|blush|serious|surprised", "position": "left|center|right"}], "spotlight": ""},
  "narration": "",
  "dialogue": [{"speaker": "", "text": ""}],
  "choices": [{"id": 1, "text": "", "tags": ["friendship|romance|school|mystery|risk"], "effectsHint": ""}],
  "checks": [{"type": "class|exam|stealth|combat|social", "formula": "1d10 + focus >= 8", "onSuccess": "", "onFail": ""}],
  "statePatch": {
    "stats": {"focus": 0, "talent": 0, "reason": 0, "bond": 0},
    "relationships": [{"name": "", "friendshipDelta": 0, "trustDelta": 0, "romanceDelta": 0, "flagsAdd": [], "flagsRemove": []}],
    "globalFlagsAdd": [],
    "globalFlagsRemove": []
  },
  "gmNotes": {"bigEvent": false, "bigEventId": "", "villainPressure": "low|mid|high", "romanceRouteFocus": "", "nextSceneHook": ""}
}
Stats are absolute current values. Relationship values are deltas for this turn only."#;

const NEW_GAME_INSTRUCTION: &str =
    "Start a new game in the autumn term of the first year, right after arrival. Output only the first scene JSON.";
const CHOICE_INSTRUCTION: &str =
    "The player picked choiceId. Continue the story from that choice and output only the next scene JSON.";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TurnInput<'a> {
    #[serde(flatten)]
    request: &'a TurnRequest,
    instruction: &'a str,
    language: &'a str,
}

pub struct OpenAiNarrator {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    language: String,
}

impl OpenAiNarrator {
    pub fn new(settings: &Settings) -> Result<Self, NarratorError> {
        let api_key = settings
            .openai_api_key
            .clone()
            .ok_or(NarratorError::MissingApiKey)?;
        let client = Client::with_config(OpenAIConfig::new().with_api_key(api_key));
        Ok(Self {
            client,
            model: settings.model.clone(),
            temperature: settings.temperature,
            top_p: settings.top_p,
            max_tokens: settings.max_tokens,
            language: settings.language.clone(),
        })
    }

    fn prompt(&self, request: &TurnRequest) -> Result<String, NarratorError> {
        let instruction = if request.choice_id.is_some() {
            CHOICE_INSTRUCTION
        } else {
            NEW_GAME_INSTRUCTION
        };
        let turn_input = TurnInput {
            request,
            instruction,
            language: &self.language,
        };
        let turn_json = serde_json::to_string(&turn_input)?;
        Ok([
            "[Current turn input (JSON)]",
            turn_json.as_str(),
            "",
            "Reply with a single JSON object only.",
        ]
        .join("\n"))
    }

    async fn generate(&self, request: &TurnRequest) -> Result<Scene, NarratorError> {
        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(GAME_MASTER_PROMPT)
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(self.prompt(request)?)
                    .build()?
                    .into(),
            ])
            .temperature(self.temperature)
            .top_p(self.top_p)
            .max_completion_tokens(self.max_tokens)
            .response_format(ResponseFormat::JsonObject)
            .build()?;

        log::debug!(
            "Requesting scene from {} (choice {:?})",
            self.model,
            request.choice_id
        );
        let response = self.client.chat().create(chat_request).await?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(NarratorError::EmptyReply)?;

        extract_scene(&text).ok_or_else(|| {
            log::warn!("Narrator reply was not a scene: {text}");
            NarratorError::InvalidScene { raw: text }
        })
    }
}

#[async_trait]
impl Narrator for OpenAiNarrator {
    async fn next_scene(&self, request: TurnRequest) -> TurnOutcome {
        let outcome = TurnOutcome::from(self.generate(&request).await);
        if let TurnOutcome::Failure(reason) = &outcome {
            log::error!("Turn failed: {reason}");
        }
        outcome
    }
}
