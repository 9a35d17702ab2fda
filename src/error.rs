use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

// Enum for handling various application-level errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Narrator error: {0}")]
    Narrator(#[from] NarratorError), // Errors raised while producing a scene.

    #[error("Save error: {0}")]
    Save(#[from] SaveError), // Errors reading or writing the save slot.

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("Home directory not found")]
    NoHomeDir,

    #[error("Logger error: {0}")]
    Logger(#[from] log::SetLoggerError),
}

// Errors from the narrative generator boundary. They all surface to the player
// as a retryable turn failure.
#[derive(Debug, Error)]
pub enum NarratorError {
    #[error("OpenAI API error: {0}")]
    OpenAI(#[from] async_openai::error::OpenAIError),

    #[error("No OpenAI API key configured")]
    MissingApiKey,

    #[error("The narrator sent an empty reply")]
    EmptyReply,

    #[error("Model output was not valid scene JSON")]
    InvalidScene { raw: String },

    #[error("Failed to encode the turn request: {0}")]
    Request(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
