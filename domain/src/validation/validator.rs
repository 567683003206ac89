//! Anti-hallucination validation.
//!
//! [`validate`] compares an agent's natural-language output against the
//! structured data its tools actually returned, and [`safe_response`] renders
//! a replacement answer built directly and only from those tool outputs.
//! Both functions are pure and deterministic.

use super::entities::{
    ToolOutputRecord, ValidationIssue, ValidationIssueKind, ValidationResult,
};
use super::extract::{
    extract_count_claims, extract_text_names, extract_tool_entities, is_entity_tool,
    mentions_entity_content, GroundEntity, ENTITY_NOUNS, STATUS_WORDS,
};

/// Note appended when the pipeline substitutes a corrected answer.
pub const CORRECTION_NOTE: &str =
    "(The original answer was corrected to match the records returned by the tools.)";

/// Cross-check agent text against tool ground truth.
///
/// Checks, in order: entity content claimed without an entity-producing tool
/// invocation; entities named in text but absent from tool outputs; entity
/// counts exceeding tool-reported counts; status tallies disagreeing with
/// tool-derived tallies.
pub fn validate(agent_text: &str, tool_outputs: &[ToolOutputRecord]) -> ValidationResult {
    let mut tools_used = Vec::new();
    for record in tool_outputs {
        if !tools_used.contains(&record.tool_name) {
            tools_used.push(record.tool_name.clone());
        }
    }

    let has_entity_tool = tool_outputs.iter().any(|r| is_entity_tool(&r.tool_name));
    let ground = extract_tool_entities(tool_outputs);
    let mut issues = Vec::new();

    if mentions_entity_content(agent_text) && !has_entity_tool {
        issues.push(ValidationIssue::new(
            ValidationIssueKind::ToolUsageMissing,
            "response references record data but no entity-producing tool was invoked",
        ));
    }

    if has_entity_tool {
        for name in extract_text_names(agent_text) {
            let known = ground
                .iter()
                .any(|e| e.name.to_lowercase() == name.to_lowercase());
            if !known {
                issues.push(ValidationIssue::new(
                    ValidationIssueKind::FabricatedEntity,
                    format!("'{name}' does not appear in any tool output"),
                ));
            }
        }

        for claim in extract_count_claims(agent_text) {
            if ENTITY_NOUNS.contains(&claim.noun.as_str()) && claim.count > ground.len() {
                issues.push(ValidationIssue::new(
                    ValidationIssueKind::CountInflation,
                    format!(
                        "text claims {} {}(s) but tools returned {}",
                        claim.count,
                        claim.noun,
                        ground.len()
                    ),
                ));
            } else if STATUS_WORDS.contains(&claim.noun.as_str()) {
                let tally = status_tally(&ground, &claim.noun);
                if claim.count != tally {
                    issues.push(ValidationIssue::new(
                        ValidationIssueKind::StatusMismatch,
                        format!(
                            "text claims {} {} but tools report {}",
                            claim.count, claim.noun, tally
                        ),
                    ));
                }
            }
        }
    }

    let recommendations = if issues.is_empty() {
        Vec::new()
    } else {
        vec!["rebuild the response from the structured tool outputs".to_string()]
    };

    ValidationResult::inconsistent(issues, tools_used, recommendations)
}

fn status_tally(ground: &[GroundEntity], status: &str) -> usize {
    ground
        .iter()
        .filter(|e| e.status.as_deref() == Some(status))
        .count()
}

/// Render a replacement answer built only from structured tool outputs,
/// annotated with [`CORRECTION_NOTE`].
pub fn safe_response(tool_outputs: &[ToolOutputRecord]) -> String {
    let ground = extract_tool_entities(tool_outputs);

    if ground.is_empty() {
        return format!(
            "The tools returned no records for this request. {CORRECTION_NOTE}"
        );
    }

    // Group by status: known statuses in a fixed order, then unknown statuses
    // in first-seen order, then entities without a status.
    let mut lines = vec![format!("Found {} record(s):", ground.len())];
    let mut statuses: Vec<String> = STATUS_WORDS.iter().map(|s| s.to_string()).collect();
    for entity in &ground {
        if let Some(status) = &entity.status {
            if !statuses.contains(status) {
                statuses.push(status.clone());
            }
        }
    }

    for status in &statuses {
        let names: Vec<&str> = ground
            .iter()
            .filter(|e| e.status.as_deref() == Some(status.as_str()))
            .map(|e| e.name.as_str())
            .collect();
        if !names.is_empty() {
            lines.push(format!("- {} {}: {}", names.len(), status, names.join(", ")));
        }
    }

    let unstated: Vec<&str> = ground
        .iter()
        .filter(|e| e.status.is_none())
        .map(|e| e.name.as_str())
        .collect();
    if !unstated.is_empty() {
        lines.push(format!("- {}: {}", unstated.len(), unstated.join(", ")));
    }

    lines.push(CORRECTION_NOTE.to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn roster() -> Vec<ToolOutputRecord> {
        vec![ToolOutputRecord::new(
            "list_players",
            json!([
                {"name": "Alice", "status": "active"},
                {"name": "Bob", "status": "active"},
                {"name": "Cara", "status": "active"},
                {"name": "Dave", "status": "pending"}
            ]),
        )]
    }

    #[test]
    fn test_grounded_response_is_consistent() {
        let text = "We have 3 active and 1 pending players: Alice, Bob, Cara and Dave.";
        let result = validate(text, &roster());
        assert!(result.consistent, "issues: {:?}", result.issues);
        assert_eq!(result.tools_used, vec!["list_players"]);
        assert!(result.recommendations.is_empty());
    }

    #[test]
    fn test_fabricated_entity_detected() {
        let text = "Your players are Alice, Bob and Zed.";
        let result = validate(text, &roster());
        assert!(!result.consistent);
        assert!(result.has_issue(ValidationIssueKind::FabricatedEntity));
        assert!(result.issues.iter().any(|i| i.message.contains("Zed")));
    }

    #[test]
    fn test_count_inflation_detected() {
        let tools = vec![ToolOutputRecord::new(
            "list_players",
            json!([{"name": "Alice"}, {"name": "Bob"}]),
        )];
        let result = validate("There are 5 players registered.", &tools);
        assert!(result.has_issue(ValidationIssueKind::CountInflation));
    }

    #[test]
    fn test_status_mismatch_detected() {
        let result = validate("You have 2 pending players.", &roster());
        assert!(result.has_issue(ValidationIssueKind::StatusMismatch));
        // The active tally was not claimed, so no second issue
        assert_eq!(result.issues.len(), 1);
    }

    #[test]
    fn test_tool_usage_missing_detected() {
        let result = validate("Here are your players: everyone is active.", &[]);
        assert!(result.has_issue(ValidationIssueKind::ToolUsageMissing));
        assert!(result.tools_used.is_empty());
    }

    #[test]
    fn test_non_entity_text_without_tools_is_consistent() {
        let result = validate("Practice is on Tuesday at 7pm.", &[]);
        assert!(result.consistent);
    }

    #[test]
    fn test_validate_is_deterministic() {
        let text = "Your players are Alice and Zed, 9 players in total.";
        let first = validate(text, &roster());
        let second = validate(text, &roster());
        assert_eq!(first.consistent, second.consistent);
        assert_eq!(first.issues.len(), second.issues.len());
        for (a, b) in first.issues.iter().zip(second.issues.iter()) {
            assert_eq!(a.kind, b.kind);
            assert_eq!(a.message, b.message);
        }
    }

    #[test]
    fn test_safe_response_renders_tool_tallies() {
        let text = safe_response(&roster());
        assert!(text.contains("Found 4 record(s):"));
        assert!(text.contains("- 3 active: Alice, Bob, Cara"));
        assert!(text.contains("- 1 pending: Dave"));
        assert!(text.contains(CORRECTION_NOTE));
    }

    #[test]
    fn test_safe_response_with_no_records() {
        let text = safe_response(&[]);
        assert!(text.contains("no records"));
        assert!(text.contains(CORRECTION_NOTE));
    }

    #[test]
    fn test_safe_response_passes_validation() {
        // The corrected answer must itself be grounded.
        let corrected = safe_response(&roster());
        let result = validate(&corrected, &roster());
        assert!(result.consistent, "issues: {:?}", result.issues);
    }
}
