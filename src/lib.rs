pub mod app;
pub mod assets;
pub mod error;
pub mod game;
mod lenient;
pub mod logging;
pub mod narrator;
pub mod paginate;
pub mod save;
pub mod scene;
pub mod settings;
pub mod state;
pub mod tui;
pub mod ui;

// Re-export commonly used items for easier access
pub use error::{AppError, NarratorError, Result, SaveError};
pub use game::{GameSession, Notice, Rejection, Selection};
pub use narrator::{Narrator, TurnOutcome, TurnRequest};
pub use paginate::{CapacityOracle, Page, paginate, split_narration};
pub use scene::{Choice, DialogueLine, Scene};
pub use state::SessionState;
