//! Entity extraction for the anti-hallucination validator.
//!
//! Two extraction sides feed the comparison in
//! [`validator`](super::validator):
//!
//! - **Ground truth** from [`ToolOutputRecord`]s, via format-aware parsers
//!   keyed by tool name, merged and deduplicated into canonical entities.
//! - **Claims** from agent text, via deterministic pattern parsers: proper
//!   names and `<count> <noun>` phrases.
//!
//! Everything here is pure string/JSON walking so identical inputs always
//! produce identical extractions.

use super::entities::ToolOutputRecord;
use serde_json::Value;

/// A canonical entity derived from tool outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundEntity {
    pub name: String,
    pub status: Option<String>,
}

/// A `<count> <noun>` phrase found in agent text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountClaim {
    pub count: usize,
    /// Singularized, lowercased noun (e.g. "player", "active").
    pub noun: String,
}

/// Nouns that signal the text is talking about entity-type content.
pub const ENTITY_NOUNS: &[&str] = &["player", "member", "record", "participant"];

/// Status words recognized in tally claims and entity attributes.
pub const STATUS_WORDS: &[&str] = &["active", "pending", "inactive", "paid", "unpaid", "overdue"];

/// Tools whose outputs carry named entities. Other tools (e.g. pure
/// calculators) do not ground entity claims.
const ENTITY_TOOLS: &[&str] = &[
    "list_players",
    "player_lookup",
    "payment_lookup",
    "member_lookup",
];

/// Whether a tool's output can ground entity claims.
pub fn is_entity_tool(tool_name: &str) -> bool {
    ENTITY_TOOLS.contains(&tool_name)
}

/// Extract canonical entities from tool outputs.
///
/// Walks arrays of objects (and common wrapper keys like `"players"` /
/// `"records"` / `"items"`), reading `name` (or `player_name` / `title` /
/// `id`) and an optional `status`. Duplicate names are merged; the first
/// status seen wins.
pub fn extract_tool_entities(records: &[ToolOutputRecord]) -> Vec<GroundEntity> {
    let mut entities: Vec<GroundEntity> = Vec::new();

    for record in records {
        if !is_entity_tool(&record.tool_name) {
            continue;
        }
        collect_entities(&record.structured_output, &mut entities);
    }

    entities
}

fn collect_entities(value: &Value, out: &mut Vec<GroundEntity>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_entities(item, out);
            }
        }
        Value::Object(map) => {
            if let Some(name) = entity_name(map) {
                let status = map
                    .get("status")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_lowercase());
                merge_entity(out, name, status);
            } else {
                // Wrapper object: descend into known collection keys.
                for key in ["players", "members", "records", "items", "results"] {
                    if let Some(nested) = map.get(key) {
                        collect_entities(nested, out);
                    }
                }
            }
        }
        _ => {}
    }
}

fn entity_name(map: &serde_json::Map<String, Value>) -> Option<String> {
    for key in ["name", "player_name", "title", "id"] {
        if let Some(name) = map.get(key).and_then(|v| v.as_str()) {
            if !name.is_empty() {
                return Some(name.to_string());
            }
        }
    }
    None
}

fn merge_entity(out: &mut Vec<GroundEntity>, name: String, status: Option<String>) {
    let lower = name.to_lowercase();
    if let Some(existing) = out.iter_mut().find(|e| e.name.to_lowercase() == lower) {
        if existing.status.is_none() {
            existing.status = status;
        }
        return;
    }
    out.push(GroundEntity { name, status });
}

/// Extract proper names from agent text.
///
/// A name is a capitalized word (first char uppercase, rest lowercase
/// letters) that is not sentence-initial and not a recognized common word.
/// Deduplicated, original casing preserved.
pub fn extract_text_names(text: &str) -> Vec<String> {
    const COMMON_WORDS: &[&str] = &[
        "The", "A", "An", "I", "We", "You", "It", "They", "He", "She", "Here", "There", "These",
        "Those", "Our", "Your", "Their", "Please", "Currently", "Also", "However", "Found",
    ];

    let mut names: Vec<String> = Vec::new();
    let mut sentence_start = true;

    for raw in text.split_whitespace() {
        let token = raw.trim_matches(|c: char| !c.is_alphanumeric());
        let ends_sentence = raw.ends_with(['.', '!', '?', ':']);

        if token.len() > 1 && !sentence_start && !COMMON_WORDS.contains(&token) {
            let mut chars = token.chars();
            let first_upper = chars.next().is_some_and(|c| c.is_ascii_uppercase());
            let rest_lower = chars.all(|c| c.is_ascii_lowercase());
            if first_upper && rest_lower && !names.iter().any(|n| n == token) {
                names.push(token.to_string());
            }
        }

        sentence_start = ends_sentence;
    }

    names
}

/// Extract `<count> <noun>` claims from agent text.
///
/// Matches digit tokens immediately followed by a word, e.g. "3 active",
/// "5 players registered". Nouns are lowercased and singularized by
/// trimming a trailing `s`.
pub fn extract_count_claims(text: &str) -> Vec<CountClaim> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut claims = Vec::new();

    for window in tokens.windows(2) {
        let number = window[0].trim_matches(|c: char| !c.is_alphanumeric());
        let Ok(count) = number.parse::<usize>() else {
            continue;
        };
        let noun = window[1]
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        if noun.is_empty() {
            continue;
        }
        let noun = noun.strip_suffix('s').unwrap_or(&noun).to_string();
        claims.push(CountClaim { count, noun });
    }

    claims
}

/// Whether the text references entity-type content at all (by noun or by
/// looking like it names records).
pub fn mentions_entity_content(text: &str) -> bool {
    let lower = text.to_lowercase();
    ENTITY_NOUNS
        .iter()
        .any(|noun| lower.contains(noun) || lower.contains(&format!("{noun}s")))
}
