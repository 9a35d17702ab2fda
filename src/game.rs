// src/game.rs
//
// Everything one play session needs between turns: the accumulated state, the scene
// on screen, its pages and the busy flag. Input handlers and the narrator task talk
// to this object only; it never does I/O itself.
use crate::narrator::{TurnOutcome, TurnRequest};
use crate::paginate::{CapacityOracle, Page, paginate};
use crate::save::SaveSlot;
use crate::scene::{Choice, Scene};
use crate::state::{DEFAULT_HISTORY_BOUND, SessionState, Stats};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// A turn is in flight or its pages are still being laid out.
    Busy,
    /// The scene offers no option at that position.
    InvalidOption,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Send this to the narrator; the session is busy until it resolves.
    Request(TurnRequest),
    /// Pages remained, so the key turned the page instead of choosing.
    TurnedPage,
    /// The scene came without options; the only way forward is a new game.
    Recover,
    Rejected(Rejection),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    NewGame,
    Resumed,
    TurnFailed(String),
    NoOptions,
    SaveCleared,
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::NewGame => write!(f, "New game started"),
            Notice::Resumed => write!(f, "Welcome back"),
            Notice::TurnFailed(reason) => write!(f, "The narrator stumbled: {reason}"),
            Notice::NoOptions => write!(f, "No options this time. Press 1 to start over"),
            Notice::SaveCleared => write!(f, "Save deleted"),
        }
    }
}

#[derive(Debug)]
pub struct GameSession {
    state: SessionState,
    scene: Option<Scene>,
    pages: Vec<Page>,
    page_index: usize,
    busy: bool,
    layout_pending: bool,
    pending_choice: Option<u32>,
    notice: Option<Notice>,
    history_bound: usize,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_BOUND)
    }
}

impl GameSession {
    pub fn new(history_bound: usize) -> Self {
        Self {
            state: SessionState::with_history_bound(history_bound),
            scene: None,
            pages: vec![Page::default()],
            page_index: 0,
            busy: false,
            layout_pending: false,
            pending_choice: None,
            notice: None,
            history_bound,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn layout_pending(&self) -> bool {
        self.layout_pending
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    /// Reset to a zero-valued session and ask for an opening scene.
    pub fn begin_new_game(&mut self) -> Result<TurnRequest, Rejection> {
        if self.busy {
            return Err(Rejection::Busy);
        }
        self.state = SessionState::with_history_bound(self.history_bound);
        self.scene = None;
        self.pages = vec![Page::default()];
        self.page_index = 0;
        self.pending_choice = None;
        self.busy = true;
        Ok(TurnRequest::new_game(self.state.clone()))
    }

    /// The slot to persist right after a new game begins, before any scene arrives.
    pub fn fresh_save(&self) -> SaveSlot {
        SaveSlot::new(self.state.clone(), None)
    }

    /// Pick the option shown at 1-based position `position`.
    pub fn select_option(&mut self, position: usize) -> Selection {
        if self.busy {
            return Selection::Rejected(Rejection::Busy);
        }
        if self.has_next_page() {
            self.next_page();
            return Selection::TurnedPage;
        }
        let options = self.options();
        if options.is_empty() {
            return Selection::Recover;
        }
        let Some(choice) = position.checked_sub(1).and_then(|i| options.get(i)) else {
            return Selection::Rejected(Rejection::InvalidOption);
        };
        let choice_id = choice.id;

        self.pending_choice = Some(choice_id);
        self.busy = true;
        Selection::Request(TurnRequest::choose(self.state.clone(), choice_id))
    }

    /// Apply the narrator's answer. On success the pending choice is recorded against
    /// the previous turn, the scene is merged exactly once and layout is scheduled for
    /// the next frame; the returned slot should be persisted. A failure leaves the state
    /// untouched and clears the busy flag.
    pub fn resolve_turn(&mut self, outcome: TurnOutcome) -> Option<SaveSlot> {
        match outcome {
            TurnOutcome::Success(scene) => {
                if let Some(choice_id) = self.pending_choice.take() {
                    self.state.record_choice(choice_id);
                }
                self.state.apply(&scene);
                if scene.options().is_empty() {
                    self.notice = Some(Notice::NoOptions);
                }
                self.scene = Some(*scene);
                self.layout_pending = true;
                self.busy = true;
                Some(SaveSlot::new(self.state.clone(), self.scene.clone()))
            }
            TurnOutcome::Failure(reason) => {
                self.pending_choice = None;
                self.busy = false;
                self.notice = Some(Notice::TurnFailed(reason));
                None
            }
        }
    }

    /// Restore a saved session. The saved scene was merged before it was saved, so it
    /// is only shown again.
    pub fn resume(&mut self, slot: SaveSlot) -> bool {
        let Some(scene) = slot.last_scene else {
            return false;
        };
        self.state = slot.state;
        self.scene = Some(scene);
        self.pending_choice = None;
        self.layout_pending = true;
        self.busy = true;
        self.notice = Some(Notice::Resumed);
        true
    }

    /// Lay out the current scene against `oracle`, show its first page and release the
    /// busy flag. Does nothing unless layout was scheduled.
    pub fn paginate_pending<O>(&mut self, oracle: &O) -> bool
    where
        O: CapacityOracle + ?Sized,
    {
        if !self.layout_pending {
            return false;
        }
        self.pages = match &self.scene {
            Some(scene) => paginate(&scene.narration, &scene.dialogue, oracle),
            None => vec![Page::default()],
        };
        self.page_index = 0;
        self.layout_pending = false;
        self.busy = false;
        true
    }

    /// Schedule a fresh layout of the current scene, e.g. after the viewport changed.
    /// Ignored while a turn is in flight.
    pub fn relayout(&mut self) {
        if self.scene.is_some() && !(self.busy && !self.layout_pending) {
            self.layout_pending = true;
            self.busy = true;
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn current_page(&self) -> &Page {
        &self.pages[self.page_index]
    }

    /// Show page `index`, clamped to the available pages.
    pub fn show_page(&mut self, index: usize) -> &Page {
        self.page_index = index.min(self.pages.len().saturating_sub(1));
        self.current_page()
    }

    pub fn has_next_page(&self) -> bool {
        self.page_index + 1 < self.pages.len()
    }

    pub fn next_page(&mut self) -> bool {
        if self.busy || !self.has_next_page() {
            return false;
        }
        self.page_index += 1;
        true
    }

    pub fn options(&self) -> &[Choice] {
        self.scene.as_ref().map(Scene::options).unwrap_or(&[])
    }

    pub fn stats(&self) -> Stats {
        self.state.stats
    }

    pub fn chapter_heading(&self) -> String {
        self.scene
            .as_ref()
            .map(|scene| scene.chapter.heading())
            .unwrap_or_else(|| "In progress".to_string())
    }

    pub fn scene_heading(&self) -> String {
        self.scene
            .as_ref()
            .map(|scene| scene.chapter.scene_heading())
            .unwrap_or_else(|| "Scene".to_string())
    }
}
