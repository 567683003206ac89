//! Intent parsing from classifier replies.
//!
//! Two sources, tried in order by the classify use case:
//!
//! 1. [`keyword_classify`] — deterministic table lookup for well-known
//!    commands, no model call.
//! 2. [`parse_intent_response`] — extracts a structured intent from an LLM
//!    reply, supporting ` ```json` fenced blocks and raw JSON.

use super::entities::{Intent, IntentResult};

/// Phrase table for the deterministic fast path. First hit wins, so more
/// specific phrases come first.
const KEYWORD_INTENTS: &[(&str, &str)] = &[
    ("payment status", Intent::PLAYER_STATUS),
    ("list players", Intent::LIST_PLAYERS),
    ("show players", Intent::LIST_PLAYERS),
    ("roster", Intent::LIST_PLAYERS),
    ("create payment", Intent::CREATE_PAYMENT),
    ("new payment", Intent::CREATE_PAYMENT),
    ("charge", Intent::CREATE_PAYMENT),
    ("schedule", Intent::SCHEDULE_EVENT),
];

/// Deterministic keyword classification for well-known commands.
///
/// Returns `None` when no phrase matches, in which case the caller should
/// fall through to the model-driven classifier.
pub fn keyword_classify(text: &str) -> Option<IntentResult> {
    let lower = text.to_lowercase();
    KEYWORD_INTENTS
        .iter()
        .find(|(phrase, _)| lower.contains(phrase))
        .map(|(_, intent)| IntentResult::new(*intent, 0.9))
}

/// Parse an intent from model response text.
///
/// Supports two formats:
/// 1. ` ```json` fenced code blocks containing the intent object
/// 2. Raw JSON (the entire response is valid JSON)
///
/// Expected schema:
/// ```json
/// {
///   "intent": "string",
///   "entities": { ... },
///   "confidence": 0.0
/// }
/// ```
///
/// Returns `None` if no valid intent object is found.
pub fn parse_intent_response(response: &str) -> Option<IntentResult> {
    let mut in_json_block = false;
    let mut current_block = String::new();

    for line in response.lines() {
        if line.trim() == "```json" {
            in_json_block = true;
            current_block.clear();
        } else if in_json_block && line.trim() == "```" {
            in_json_block = false;
            if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(&current_block) {
                return parse_intent_json(&parsed);
            }
        } else if in_json_block {
            current_block.push_str(line);
            current_block.push('\n');
        }
    }

    // Try parsing the entire response as JSON
    if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(response) {
        return parse_intent_json(&parsed);
    }

    None
}

/// Parse an intent from a JSON value. Missing confidence defaults to 0.5;
/// a missing or empty intent label is not a valid result.
pub fn parse_intent_json(json: &serde_json::Value) -> Option<IntentResult> {
    let label = json.get("intent")?.as_str()?;
    if label.is_empty() {
        return None;
    }

    let confidence = json
        .get("confidence")
        .and_then(|v| v.as_f64())
        .unwrap_or(0.5);

    let mut result = IntentResult::new(label, confidence);

    if let Some(entities) = json.get("entities").and_then(|v| v.as_object()) {
        for (key, value) in entities {
            result.entities.insert(key.clone(), value.clone());
        }
    }

    Some(result)
}
