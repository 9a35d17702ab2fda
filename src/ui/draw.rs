// ui/draw.rs

use ratatui::{
    Frame,
    layout::Alignment,
    style::{Color, Style},
    widgets::Paragraph,
};

use super::game;
use super::spinner::Spinner;
use super::viewport::TextViewport;
use crate::game::GameSession;

pub const MIN_WIDTH: u16 = 80;
pub const MIN_HEIGHT: u16 = 24;

/// Draw one frame. Returns the text viewport that was actually laid out, or `None`
/// when the terminal is too small to hold the scene screen.
pub fn draw(f: &mut Frame, session: &GameSession, spinner: &Spinner) -> Option<TextViewport> {
    let size = f.area();

    if size.width < MIN_WIDTH || size.height < MIN_HEIGHT {
        let warning = Paragraph::new("Terminal too small. Please resize.")
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center);
        f.render_widget(warning, size);
        return None;
    }

    Some(game::draw_in_game(f, session, spinner))
}
