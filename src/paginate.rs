// src/paginate.rs
//
// Reflows a scene's narration and dialogue into pages that fit a fixed viewport
// without scrolling. The viewport is only known through a `CapacityOracle`, so this
// module stays independent of any rendering surface.
use serde::{Deserialize, Serialize};

use crate::scene::DialogueLine;

/// Sentences longer than this (in chars) are broken further at commas.
pub const LONG_FRAGMENT_CHARS: usize = 90;

const TERMINALS: [char; 4] = ['.', '?', '!', '…'];

/// Answers whether a tentative page would overflow the display region.
pub trait CapacityOracle {
    fn overflows(&self, narration: &str, dialogue: &[DialogueLine]) -> bool;
}

impl<F> CapacityOracle for F
where
    F: Fn(&str, &[DialogueLine]) -> bool,
{
    fn overflows(&self, narration: &str, dialogue: &[DialogueLine]) -> bool {
        self(narration, dialogue)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub narration: String,
    pub dialogue: Vec<DialogueLine>,
}

impl Page {
    pub fn is_empty(&self) -> bool {
        self.narration.is_empty() && self.dialogue.is_empty()
    }
}

/// Split narration into sentence fragments, then break over-long sentences at commas.
/// Whitespace is collapsed to single spaces; no other text is dropped.
pub fn split_narration(text: &str) -> Vec<String> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return Vec::new();
    }

    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut after_terminal = false;
    for ch in normalized.chars() {
        if ch == ' ' && after_terminal {
            sentences.push(std::mem::take(&mut current));
            after_terminal = false;
            continue;
        }
        current.push(ch);
        after_terminal = TERMINALS.contains(&ch);
    }
    if !current.is_empty() {
        sentences.push(current);
    }

    sentences
        .into_iter()
        .flat_map(|sentence| {
            if sentence.chars().count() <= LONG_FRAGMENT_CHARS {
                vec![sentence]
            } else {
                split_at_commas(sentence)
            }
        })
        .collect()
}

// The comma stays with the piece before it. A sentence without a usable comma
// boundary is returned whole, however long.
fn split_at_commas(sentence: String) -> Vec<String> {
    let mut pieces: Vec<String> = Vec::new();
    let mut current = String::new();
    for ch in sentence.chars() {
        current.push(ch);
        if ch == ',' {
            let piece = std::mem::take(&mut current);
            let piece = piece.trim();
            match pieces.last_mut() {
                Some(last) if piece == "," => last.push(','),
                _ => pieces.push(piece.to_string()),
            }
        }
    }
    let rest = current.trim();
    if !rest.is_empty() {
        pieces.push(rest.to_string());
    }
    if pieces.len() <= 1 {
        return vec![sentence];
    }
    pieces
}

/// Lay `narration` and `dialogue` out into pages. Always returns at least one page,
/// and never more than one page per fragment plus one per dialogue line.
pub fn paginate<O>(narration: &str, dialogue: &[DialogueLine], oracle: &O) -> Vec<Page>
where
    O: CapacityOracle + ?Sized,
{
    Paginator::new(split_narration(narration), dialogue, oracle).run()
}

/// Which kind of unit the page in progress is taking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Narration,
    Dialogue,
}

struct Paginator<'a, O: ?Sized> {
    fragments: Vec<String>,
    dialogue: &'a [DialogueLine],
    oracle: &'a O,
    fragment_cursor: usize,
    dialogue_cursor: usize,
    phase: Phase,
    page: Page,
    pages: Vec<Page>,
}

impl<'a, O> Paginator<'a, O>
where
    O: CapacityOracle + ?Sized,
{
    fn new(fragments: Vec<String>, dialogue: &'a [DialogueLine], oracle: &'a O) -> Self {
        Self {
            fragments,
            dialogue,
            oracle,
            fragment_cursor: 0,
            dialogue_cursor: 0,
            phase: Phase::Narration,
            page: Page::default(),
            pages: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Page> {
        while self.has_units() {
            self.step();
        }
        if !self.page.is_empty() || self.pages.is_empty() {
            self.close_page();
        }
        self.pages
    }

    fn has_units(&self) -> bool {
        self.fragment_cursor < self.fragments.len() || self.dialogue_cursor < self.dialogue.len()
    }

    /// Place one unit, switch the page to dialogue, or close the page.
    /// A page takes narration until the next fragment overflows, then dialogue
    /// until the next line overflows. It never goes back to narration.
    fn step(&mut self) {
        match self.phase {
            Phase::Narration => match self.fragments.get(self.fragment_cursor) {
                Some(fragment) => {
                    let candidate = join_narration(&self.page.narration, fragment);
                    if self.oracle.overflows(&candidate, &self.page.dialogue) {
                        self.phase = Phase::Dialogue;
                    } else {
                        self.page.narration = candidate;
                        self.fragment_cursor += 1;
                    }
                }
                None => self.phase = Phase::Dialogue,
            },
            Phase::Dialogue => match self.dialogue.get(self.dialogue_cursor) {
                Some(line) => {
                    self.page.dialogue.push(line.clone());
                    if self.oracle.overflows(&self.page.narration, &self.page.dialogue) {
                        self.page.dialogue.pop();
                        self.finish_page();
                    } else {
                        self.dialogue_cursor += 1;
                    }
                }
                None => self.finish_page(),
            },
        }
    }

    // A page that took nothing gets exactly one unit forced in, so every page
    // makes progress.
    fn finish_page(&mut self) {
        if self.page.is_empty() {
            if let Some(fragment) = self.fragments.get(self.fragment_cursor) {
                self.page.narration = fragment.clone();
                self.fragment_cursor += 1;
            } else if let Some(line) = self.dialogue.get(self.dialogue_cursor) {
                self.page.dialogue.push(line.clone());
                self.dialogue_cursor += 1;
            }
        }
        self.close_page();
    }

    fn close_page(&mut self) {
        let mut page = std::mem::take(&mut self.page);
        page.narration = page.narration.trim().to_string();
        self.pages.push(page);
        self.phase = Phase::Narration;
    }
}

fn join_narration(current: &str, fragment: &str) -> String {
    if current.is_empty() {
        fragment.to_string()
    } else {
        format!("{current} {fragment}")
    }
}
