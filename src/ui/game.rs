// ui/game.rs
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::*,
};

use super::spinner::{Spinner, spinner_frame};
use super::viewport::{TextViewport, wrap_dialogue_lines, wrap_narration};
use crate::assets::{avatar_path, background_path, portrait_path};
use crate::game::GameSession;
use crate::scene::Scene;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneLayout {
    pub header: Rect,
    pub stats: Rect,
    pub visuals: Rect,
    pub narration: Rect,
    pub dialogue: Rect,
    pub options: Rect,
    pub footer: Rect,
}

impl SceneLayout {
    pub fn new(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Chapter header
                Constraint::Length(1), // Stats
                Constraint::Min(8),    // Visuals and text
                Constraint::Length(5), // Options
                Constraint::Length(1), // Footer
            ])
            .split(area);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
            .split(rows[2]);

        let text = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(body[1]);

        Self {
            header: rows[0],
            stats: rows[1],
            visuals: body[0],
            narration: text[0],
            dialogue: text[1],
            options: rows[3],
            footer: rows[4],
        }
    }

    /// The inner text areas, i.e. what one page may fill.
    pub fn viewport(&self) -> TextViewport {
        TextViewport::from_areas(
            text_block("").inner(self.narration),
            text_block("").inner(self.dialogue),
        )
    }
}

fn text_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title)
}

fn label(text: &str) -> Span<'_> {
    Span::styled(
        text,
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )
}

pub fn draw_in_game(f: &mut Frame, session: &GameSession, spinner: &Spinner) -> TextViewport {
    let layout = SceneLayout::new(f.area());

    draw_header(f, session, layout.header);
    draw_stats(f, session, layout.stats);
    draw_visuals(f, session, layout.visuals);
    draw_page(f, session, &layout);
    draw_options(f, session, layout.options);
    draw_footer(f, session, spinner, layout.footer);

    layout.viewport()
}

fn draw_header(f: &mut Frame, session: &GameSession, area: Rect) {
    let mut spans = vec![
        Span::styled(
            session.chapter_heading(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::raw(session.scene_heading()),
    ];
    if let Some(chapter) = session.scene().map(|scene| &scene.chapter) {
        let place: Vec<&str> = [chapter.location.as_deref(), chapter.time.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if !place.is_empty() {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                place.join(" · "),
                Style::default().fg(Color::Gray),
            ));
        }
    }

    let header = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(format!(" Ariel v{} ", env!("CARGO_PKG_VERSION"))),
        )
        .alignment(Alignment::Center);
    f.render_widget(header, area);
}

fn draw_stats(f: &mut Frame, session: &GameSession, area: Rect) {
    let stats = session.stats();
    let mut spans = Vec::new();
    for (name, value) in [
        ("Focus ", stats.focus),
        ("Talent ", stats.talent),
        ("Reason ", stats.reason),
        ("Bond ", stats.bond),
    ] {
        spans.push(Span::styled(name, Style::default().fg(Color::Green)));
        spans.push(Span::styled(
            format!("{value}   "),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ));
    }
    f.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}

fn draw_visuals(f: &mut Frame, session: &GameSession, area: Rect) {
    let mut lines = Vec::new();

    if let Some(scene) = session.scene() {
        lines.extend(visual_lines(scene));
        lines.push(Line::from(""));
    }

    let relationships = &session.state().relationships;
    if !relationships.is_empty() {
        lines.push(Line::from(label("Bonds")));
        for (name, bond) in relationships {
            lines.push(Line::from(vec![
                Span::styled(name.as_str(), Style::default().fg(Color::Cyan)),
                Span::raw(format!(
                    "  F{} T{} R{}",
                    bond.friendship, bond.trust, bond.romance
                )),
            ]));
        }
    }

    let visuals = Paragraph::new(lines)
        .block(text_block(" Scene "))
        .wrap(Wrap { trim: true });
    f.render_widget(visuals, area);
}

fn visual_lines(scene: &Scene) -> Vec<Line<'static>> {
    let visuals = &scene.visuals;
    let mut lines = vec![
        Line::from(vec![
            label("Background "),
            Span::raw(
                visuals
                    .bg_key
                    .as_deref()
                    .and_then(background_path)
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]),
        Line::from(vec![label("Avatar "), Span::raw(avatar_path(visuals))]),
    ];
    if let Some(spotlight) = visuals.spotlighted() {
        lines.push(Line::from(vec![
            label("Spotlight "),
            Span::raw(portrait_path(spotlight)),
        ]));
    }
    for character in &visuals.characters {
        let position = character
            .position()
            .map(|p| format!(", {p}"))
            .unwrap_or_default();
        lines.push(Line::from(Span::styled(
            format!(" {} ({}{})", character.id, character.expression(), position),
            Style::default().fg(Color::Gray),
        )));
    }

    let notes = &scene.gm_notes;
    if notes.big_event {
        lines.push(Line::from(Span::styled(
            format!(
                "Major event {}",
                notes.big_event_id.as_deref().unwrap_or_default()
            ),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }
    if let Some(pressure) = notes.pressure() {
        lines.push(Line::from(vec![
            label("Pressure "),
            Span::raw(pressure.to_string()),
        ]));
    }
    lines
}

fn draw_page(f: &mut Frame, session: &GameSession, layout: &SceneLayout) {
    let viewport = layout.viewport();
    let page = session.current_page();

    let narration: Vec<Line> = wrap_narration(&page.narration, viewport.narration.width)
        .into_iter()
        .map(Line::from)
        .collect();
    f.render_widget(
        Paragraph::new(narration)
            .style(Style::default().fg(Color::White))
            .block(text_block(" Narration ")),
        layout.narration,
    );

    let mut dialogue = Vec::new();
    for (line, rows) in page
        .dialogue
        .iter()
        .zip(wrap_dialogue_lines(&page.dialogue, viewport.dialogue.width))
    {
        let prefix = format!("{}:", line.speaker);
        for (i, row) in rows.into_iter().enumerate() {
            let speech = match i {
                0 => row.strip_prefix(prefix.as_str()).map(str::to_string),
                _ => None,
            };
            match speech {
                Some(rest) => dialogue.push(Line::from(vec![
                    Span::styled(
                        prefix.clone(),
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(rest),
                ])),
                None => dialogue.push(Line::from(row)),
            }
        }
    }
    f.render_widget(
        Paragraph::new(dialogue).block(text_block(" Dialogue ")),
        layout.dialogue,
    );
}

fn draw_options(f: &mut Frame, session: &GameSession, area: Rect) {
    let locked = session.is_busy() || session.has_next_page();
    let items: Vec<ListItem> = if session.options().is_empty() {
        vec![ListItem::new(Line::from(vec![
            Span::styled("!  ", Style::default().fg(Color::Red)),
            Span::raw("No options. Press 1 to start a new game "),
            Span::styled("[error]", Style::default().fg(Color::Red)),
        ]))]
    } else {
        session
            .options()
            .iter()
            .enumerate()
            .map(|(i, choice)| {
                let tag_style = if choice.is_risky() {
                    Style::default().fg(Color::Red)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{}  ", i + 1), Style::default().fg(Color::Yellow)),
                    Span::raw(format!("{} ", choice.text)),
                    Span::styled(format!("[{}]", choice.primary_tag()), tag_style),
                ]))
            })
            .collect()
    };

    let style = if locked {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };
    f.render_widget(List::new(items).style(style).block(text_block(" Options ")), area);
}

fn draw_footer(f: &mut Frame, session: &GameSession, spinner: &Spinner, area: Rect) {
    let status = if session.is_busy() {
        Span::styled(spinner_frame(spinner), Style::default().fg(Color::Green))
    } else if session.has_next_page() {
        Span::styled(
            format!(
                " ▼ Space for more ({}/{}) ",
                session.page_index() + 1,
                session.pages().len()
            ),
            Style::default().fg(Color::LightCyan),
        )
    } else {
        Span::styled(" Choose 1-3 ", Style::default().fg(Color::LightCyan))
    };

    let mut spans = vec![status];
    if let Some(notice) = session.notice() {
        spans.push(Span::styled(
            format!(" {notice} "),
            Style::default().fg(Color::Yellow),
        ));
    }
    spans.push(Span::styled(
        " n new game · X clear save · q quit",
        Style::default().fg(Color::DarkGray),
    ));
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
