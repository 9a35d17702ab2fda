// src/narrator/response.rs
//
// Models like to wrap their JSON in prose or code fences, and to leave trailing
// commas behind. Dig the scene object out before giving up on a reply.
use crate::scene::Scene;

pub fn extract_scene(text: &str) -> Option<Scene> {
    let body = strip_fences(text.trim());
    let first = body.find('{')?;
    let last = body.rfind('}')?;
    if last <= first {
        return None;
    }
    let json = &body[first..=last];

    Scene::from_json(json)
        .or_else(|_| Scene::from_json(&drop_trailing_commas(json)))
        .ok()
}

fn strip_fences(text: &str) -> &str {
    let mut body = text;
    if let Some(rest) = body.strip_prefix("```") {
        body = match rest.get(..4) {
            Some(lang) if lang.eq_ignore_ascii_case("json") => &rest[4..],
            _ => rest,
        };
    }
    body.trim().trim_end_matches("```").trim()
}

// `,}` and `,]` with any whitespace in between lose the comma.
fn drop_trailing_commas(json: &str) -> String {
    let chars: Vec<char> = json.chars().collect();
    let mut out = String::with_capacity(json.len());
    for (i, &ch) in chars.iter().enumerate() {
        if ch == ',' {
            let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        out.push(ch);
    }
    out
}
