//! Request decomposition strategies.
//!
//! Three strategies behind one entry point, tried by the decompose use case
//! in this order:
//!
//! 1. [`template_decompose`] — fixed subtask shapes for well-known intents,
//!    deterministic, no model call.
//! 2. [`parse_decomposition`] — parses a model-proposed breakdown
//!    (` ```json` fenced block or raw JSON), used for novel/complex requests.
//! 3. [`fallback_decompose`] — wraps the whole request as one subtask tagged
//!    with capabilities inferred by keyword matching against the graph.
//!
//! Decomposition is depth-limited: a decomposed subtask is never itself
//! re-decomposed (see [`can_decompose`]).

use super::entities::Subtask;
use crate::capability::graph::CapabilityGraph;
use crate::core::ids::RequestId;
use crate::intent::entities::{Intent, IntentResult};

/// decomposition happens at most once per request
pub const MAX_DECOMPOSITION_DEPTH: u8 = 1;

/// Recursion guard: only a fresh request (depth 0) may be decomposed.
pub fn can_decompose(depth: u8) -> bool {
    depth < MAX_DECOMPOSITION_DEPTH
}

/// Instantiate subtasks from a predefined template, if the intent has one.
pub fn template_decompose(intent: &IntentResult, request_id: &RequestId) -> Option<Vec<Subtask>> {
    let subtasks = match intent.intent.as_str() {
        Intent::LIST_PLAYERS => vec![
            Subtask::new("st-1", "Look up players and their statuses", request_id.clone())
                .with_capability("player_lookup")
                .critical(),
        ],
        Intent::PLAYER_STATUS => vec![
            Subtask::new("st-1", "Look up the player's record", request_id.clone())
                .with_capability("player_lookup")
                .critical(),
            Subtask::new("st-2", "Summarize payment standing", request_id.clone())
                .with_capability("payment_lookup"),
        ],
        Intent::CREATE_PAYMENT => vec![
            Subtask::new("st-1", "Verify the player exists", request_id.clone())
                .with_capability("player_lookup")
                .critical(),
            Subtask::new("st-2", "Create the payment record", request_id.clone())
                .with_capability("payment_creation")
                .critical(),
        ],
        Intent::SCHEDULE_EVENT => vec![
            Subtask::new("st-1", "Create the scheduled event", request_id.clone())
                .with_capability("event_scheduling")
                .critical(),
        ],
        _ => return None,
    };

    let subtasks = subtasks
        .into_iter()
        .map(|st| {
            // Carry the classifier's extracted entities into each subtask.
            intent
                .entities
                .iter()
                .fold(st, |acc, (k, v)| acc.with_parameter(k.clone(), v.clone()))
        })
        .collect();

    Some(subtasks)
}

/// Parse a model-proposed breakdown from response text.
///
/// Expected schema:
/// ```json
/// {
///   "subtasks": [
///     {
///       "id": "string (optional)",
///       "description": "string",
///       "capabilities": ["capability_id", ...],
///       "parameters": { ... },
///       "critical": false
///     }
///   ]
/// }
/// ```
///
/// Returns `None` on malformed replies or an empty subtask list.
pub fn parse_decomposition(response: &str, request_id: &RequestId) -> Option<Vec<Subtask>> {
    let mut in_json_block = false;
    let mut current_block = String::new();

    for line in response.lines() {
        if line.trim() == "```json" {
            in_json_block = true;
            current_block.clear();
        } else if in_json_block && line.trim() == "```" {
            in_json_block = false;
            if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(&current_block) {
                return parse_decomposition_json(&parsed, request_id);
            }
        } else if in_json_block {
            current_block.push_str(line);
            current_block.push('\n');
        }
    }

    if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(response) {
        return parse_decomposition_json(&parsed, request_id);
    }

    None
}

fn parse_decomposition_json(
    json: &serde_json::Value,
    request_id: &RequestId,
) -> Option<Vec<Subtask>> {
    let entries = json.get("subtasks").and_then(|v| v.as_array())?;
    if entries.is_empty() {
        return None;
    }

    let mut subtasks = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let id = entry
            .get("id")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("st-{}", index + 1));
        let description = entry
            .get("description")
            .and_then(|v| v.as_str())
            .unwrap_or("No description");

        let mut subtask = Subtask::new(id, description, request_id.clone());

        if let Some(caps) = entry.get("capabilities").and_then(|v| v.as_array()) {
            for cap in caps.iter().filter_map(|c| c.as_str()) {
                subtask = subtask.with_capability(cap);
            }
        }

        if let Some(params) = entry.get("parameters").and_then(|v| v.as_object()) {
            for (key, value) in params {
                subtask = subtask.with_parameter(key.clone(), value.clone());
            }
        }

        if entry.get("critical").and_then(|v| v.as_bool()).unwrap_or(false) {
            subtask = subtask.critical();
        }

        subtasks.push(subtask);
    }

    Some(subtasks)
}

/// Rule-based single-subtask fallback: the whole request becomes one subtask
/// tagged with capabilities inferred by keyword matching against the graph.
pub fn fallback_decompose(
    request_text: &str,
    graph: &CapabilityGraph,
    request_id: &RequestId,
) -> Vec<Subtask> {
    let mut subtask = Subtask::new("st-1", request_text, request_id.clone());
    for capability in graph.match_keywords(request_text) {
        subtask = subtask.with_capability(capability);
    }
    vec![subtask]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::entities::{Capability, CapabilityCategory, CapabilityLevel};
    use crate::core::ids::CapabilityId;

    fn request_id() -> RequestId {
        RequestId::new("req-1")
    }

    #[test]
    fn test_depth_guard() {
        assert!(can_decompose(0));
        assert!(!can_decompose(1));
        assert!(!can_decompose(2));
    }

    #[test]
    fn test_template_for_known_intent() {
        let intent = IntentResult::new(Intent::CREATE_PAYMENT, 0.9).with_entity("amount", 25);
        let subtasks = template_decompose(&intent, &request_id()).unwrap();

        assert_eq!(subtasks.len(), 2);
        assert!(subtasks.iter().all(|st| st.request_id == request_id()));
        // Entities propagate into subtask parameters
        assert_eq!(subtasks[0].parameters.get("amount"), Some(&serde_json::json!(25)));
        assert!(subtasks[1].critical);
    }

    #[test]
    fn test_template_unknown_intent_returns_none() {
        let intent = IntentResult::new("novel_intent", 0.4);
        assert!(template_decompose(&intent, &request_id()).is_none());
    }

    #[test]
    fn test_parse_decomposition_fenced_block() {
        let response = r#"
Breaking this down:

```json
{
  "subtasks": [
    {
      "id": "lookup",
      "description": "Find the player",
      "capabilities": ["player_lookup"],
      "parameters": {"player_name": "Alice"},
      "critical": true
    },
    {
      "description": "Draft the reply",
      "capabilities": ["chat_reply"]
    }
  ]
}
```
"#;
        let subtasks = parse_decomposition(response, &request_id()).unwrap();
        assert_eq!(subtasks.len(), 2);
        assert_eq!(subtasks[0].id.as_str(), "lookup");
        assert!(subtasks[0].critical);
        // Missing id gets a sequential one
        assert_eq!(subtasks[1].id.as_str(), "st-2");
        assert_eq!(
            subtasks[1].required_capabilities,
            vec![CapabilityId::new("chat_reply")]
        );
    }

    #[test]
    fn test_parse_decomposition_empty_list_returns_none() {
        let response = r#"{"subtasks": []}"#;
        assert!(parse_decomposition(response, &request_id()).is_none());
    }

    #[test]
    fn test_parse_decomposition_plain_text_returns_none() {
        assert!(parse_decomposition("let me think about this", &request_id()).is_none());
    }

    #[test]
    fn test_fallback_single_subtask_with_keyword_capabilities() {
        let graph = CapabilityGraph::builder()
            .add(
                Capability::new(
                    "player_lookup",
                    CapabilityLevel::Operational,
                    CapabilityCategory::DataManagement,
                )
                .with_keyword("player"),
            )
            .build()
            .unwrap();

        let subtasks = fallback_decompose("which players are active?", &graph, &request_id());
        assert_eq!(subtasks.len(), 1);
        assert_eq!(
            subtasks[0].required_capabilities,
            vec![CapabilityId::new("player_lookup")]
        );
        assert_eq!(subtasks[0].description, "which players are active?");
    }
}
