// /app.rs
use crate::game::{GameSession, Notice, Rejection, Selection};
use crate::narrator::{Narrator, TurnOutcome, TurnRequest};
use crate::save::{SlotStore, load_or_absent, save_quietly};
use crate::tui::{Tui, TuiEvent};
use crate::ui::{self, TextViewport, spinner::Spinner};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::mpsc;

// Ticks run at 4 per second, so a notice stays up for about three seconds.
const NOTICE_TICKS: u32 = 12;

#[derive(Debug)]
pub enum Action {
    Quit,
    NewGame,
    Choose(usize),
    NextPage,
    ClearSave,
    TurnResolved(TurnOutcome),
}

enum Step {
    Tui(TuiEvent),
    Action(Action),
    Closed,
}

pub struct App {
    running: bool,
    session: GameSession,
    narrator: Arc<dyn Narrator>,
    store: Box<dyn SlotStore>,

    // --- UI elements
    spinner: Spinner,
    viewport: Option<TextViewport>,
    notice_ticks: u32,

    action_sender: mpsc::UnboundedSender<Action>,
    action_receiver: mpsc::UnboundedReceiver<Action>,
}

impl App {
    pub fn new(
        narrator: Arc<dyn Narrator>,
        store: Box<dyn SlotStore>,
        history_bound: usize,
    ) -> Self {
        let (action_sender, action_receiver) = mpsc::unbounded_channel();
        Self {
            running: true,
            session: GameSession::new(history_bound),
            narrator,
            store,
            spinner: Spinner::new(),
            viewport: None,
            notice_ticks: 0,
            action_sender,
            action_receiver,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?
            .tick_rate(4.0) // 4 ticks per second
            .frame_rate(30.0); // 30 frames per second

        tui.enter()?; // Starts event handler, enters raw mode, enters alternate screen
        self.boot();

        loop {
            let mut drawn = None;
            tui.draw(|frame| {
                drawn = ui::draw(frame, &self.session, &self.spinner);
            })?;
            self.viewport = drawn;
            // Pages are laid out against the boxes that were just drawn, and shown
            // from the next frame on.
            if let Some(viewport) = self.viewport {
                self.session.paginate_pending(&viewport);
            }

            let step = tokio::select! {
                event = tui.next() => event.map_or(Step::Closed, Step::Tui),
                action = self.action_receiver.recv() => action.map_or(Step::Closed, Step::Action),
            };
            match step {
                Step::Tui(event) => self.handle_tui_event(event),
                Step::Action(action) => self.handle_action(action),
                Step::Closed => self.quit(),
            }

            if !self.running {
                break;
            }
        }

        tui.exit()?; // stops event handler, exits raw mode, exits alternate screen
        Ok(())
    }

    /// Continue from the save slot, or start over when there is nothing to show.
    pub fn boot(&mut self) {
        let resumed =
            load_or_absent(self.store.as_ref()).is_some_and(|slot| self.session.resume(slot));
        if resumed {
            log::info!("Resumed saved session");
            self.notice_ticks = NOTICE_TICKS;
        } else {
            self.start_new_game();
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    fn handle_tui_event(&mut self, event: TuiEvent) {
        match event {
            TuiEvent::Key(key_event) => {
                if let Some(action) = self.on_key(key_event) {
                    self.handle_action(action)
                }
            }
            TuiEvent::Tick => self.on_tick(),
            TuiEvent::Resize(width, height) => {
                log::debug!("Terminal resized to {width}x{height}");
                self.session.relayout();
            }
            TuiEvent::Init | TuiEvent::Render => {}
            TuiEvent::Error => log::warn!("Terminal event stream reported an error"),
        }
    }

    fn on_tick(&mut self) {
        if self.session.is_busy() {
            self.spinner.tick();
        }
        if self.session.notice().is_some() {
            if self.notice_ticks == 0 {
                self.session.dismiss_notice();
            } else {
                self.notice_ticks -= 1;
            }
        }
    }

    fn on_key(&self, key_event: KeyEvent) -> Option<Action> {
        match key_event.code {
            KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::Quit)
            }
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            KeyCode::Char(' ')
            | KeyCode::Enter
            | KeyCode::Right
            | KeyCode::Char('l')
            | KeyCode::Char('j') => Some(Action::NextPage),
            KeyCode::Char(c @ '1'..='3') => c
                .to_digit(10)
                .map(|position| Action::Choose(position as usize)),
            KeyCode::Char('n') => Some(Action::NewGame),
            KeyCode::Char('X') => Some(Action::ClearSave),
            _ => None,
        }
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.quit(),
            Action::NewGame => self.start_new_game(),
            Action::Choose(position) => self.choose(position),
            Action::NextPage => {
                self.session.next_page();
            }
            Action::ClearSave => {
                match self.store.clear() {
                    Ok(()) => self.notify(Notice::SaveCleared),
                    Err(e) => log::warn!("Failed to delete save slot: {e}"),
                }
            }
            Action::TurnResolved(outcome) => {
                if let Some(slot) = self.session.resolve_turn(outcome) {
                    save_quietly(self.store.as_ref(), &slot);
                }
                if self.session.notice().is_some() {
                    self.notice_ticks = NOTICE_TICKS;
                }
            }
        }
    }

    fn start_new_game(&mut self) {
        match self.session.begin_new_game() {
            Ok(request) => {
                save_quietly(self.store.as_ref(), &self.session.fresh_save());
                self.notify(Notice::NewGame);
                self.spawn_turn(request);
            }
            Err(Rejection::Busy) => log::debug!("New game ignored while a turn is running"),
            Err(Rejection::InvalidOption) => {}
        }
    }

    fn choose(&mut self, position: usize) {
        match self.session.select_option(position) {
            Selection::Request(request) => self.spawn_turn(request),
            Selection::Recover => self.start_new_game(),
            Selection::TurnedPage => {}
            Selection::Rejected(rejection) => {
                log::debug!("Option {position} rejected: {rejection:?}")
            }
        }
    }

    fn spawn_turn(&self, request: TurnRequest) {
        let narrator = Arc::clone(&self.narrator);
        let sender = self.action_sender.clone();
        tokio::spawn(async move {
            let outcome = narrator.next_scene(request).await;
            if sender.send(Action::TurnResolved(outcome)).is_err() {
                log::warn!("Turn finished after the app closed");
            }
        });
    }

    fn notify(&mut self, notice: Notice) {
        self.session.set_notice(notice);
        self.notice_ticks = NOTICE_TICKS;
    }

    fn quit(&mut self) {
        self.running = false;
    }
}
