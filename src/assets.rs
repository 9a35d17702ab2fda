// src/assets.rs
//
// Lookup paths for portraits and backgrounds. Whether the file exists is the
// presentation layer's problem.
use crate::scene::{CharacterRef, DEFAULT_EXPRESSION, PROTAGONIST_ID, Visuals};

pub const CHARACTER_DIR: &str = "img/chars";
pub const BACKGROUND_DIR: &str = "img/bg";

pub fn character_path(id: &str, expression: &str) -> String {
    let id = if id.is_empty() { "unknown" } else { id };
    let expression = if expression.is_empty() {
        DEFAULT_EXPRESSION
    } else {
        expression
    };
    format!(
        "{CHARACTER_DIR}/{}/{}.png",
        encode_component(id),
        encode_component(expression)
    )
}

pub fn background_path(bg_key: &str) -> Option<String> {
    if bg_key.is_empty() {
        return None;
    }
    Some(format!("{BACKGROUND_DIR}/{}.jpg", encode_component(bg_key)))
}

pub fn portrait_path(character: &CharacterRef) -> String {
    character_path(&character.id, character.expression())
}

/// Avatar portrait, defaulting to the protagonist's neutral face.
pub fn avatar_path(visuals: &Visuals) -> String {
    visuals
        .avatar()
        .map(portrait_path)
        .unwrap_or_else(|| character_path(PROTAGONIST_ID, DEFAULT_EXPRESSION))
}

// Percent-encodes everything outside the URI unreserved set and !*'().
fn encode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
