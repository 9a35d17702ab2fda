// ui/viewport.rs
//
// The narration and dialogue boxes as the pager sees them. Text is wrapped here and
// drawn exactly as wrapped, so a page that measures as fitting also renders as fitting.
use ratatui::layout::{Rect, Size};

use crate::paginate::CapacityOracle;
use crate::scene::DialogueLine;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextViewport {
    pub narration: Size,
    pub dialogue: Size,
}

impl TextViewport {
    pub fn new(narration: Size, dialogue: Size) -> Self {
        Self {
            narration,
            dialogue,
        }
    }

    pub fn from_areas(narration: Rect, dialogue: Rect) -> Self {
        Self::new(Size::from(narration), Size::from(dialogue))
    }
}

impl CapacityOracle for TextViewport {
    fn overflows(&self, narration: &str, dialogue: &[DialogueLine]) -> bool {
        wrap_narration(narration, self.narration.width).len() > self.narration.height as usize
            || wrap_dialogue(dialogue, self.dialogue.width).len() > self.dialogue.height as usize
    }
}

pub fn wrap_narration(text: &str, width: u16) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    if width == 0 {
        // Nothing fits in a zero-width box; report one line per char so it overflows.
        return text.chars().map(String::from).collect();
    }
    textwrap::wrap(text, width as usize)
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}

/// Wrapped rows for each dialogue line, in order.
pub fn wrap_dialogue_lines(dialogue: &[DialogueLine], width: u16) -> Vec<Vec<String>> {
    dialogue
        .iter()
        .map(|line| {
            let rows = wrap_narration(&line.rendered(), width);
            if rows.is_empty() { vec![String::new()] } else { rows }
        })
        .collect()
}

pub fn wrap_dialogue(dialogue: &[DialogueLine], width: u16) -> Vec<String> {
    wrap_dialogue_lines(dialogue, width).into_iter().flatten().collect()
}
