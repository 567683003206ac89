//! Response aggregation across subtask outcomes.

use concierge_domain::SubtaskOutcome;

const PARTIAL_NOTE: &str = "Note: part of your request could not be completed.";

/// Combines per-subtask texts into one response, preserving subtask order.
///
/// A failed critical subtask replaces the whole response with a failure
/// notice; failed non-critical subtasks are dropped from the body and
/// surfaced with a partial-completion note instead.
pub fn aggregate(outcomes: &[SubtaskOutcome]) -> String {
    if outcomes.is_empty() {
        return "I wasn't able to produce a response for that request.".to_string();
    }

    if let Some(failed) = outcomes.iter().find(|o| !o.success && o.critical) {
        return format!(
            "I couldn't complete your request: a required step failed ({}). Please try again.",
            failed.subtask_id
        );
    }

    let parts: Vec<&str> = outcomes
        .iter()
        .filter(|o| o.success && !o.text.is_empty())
        .map(|o| o.text.as_str())
        .collect();
    let any_failed = outcomes.iter().any(|o| !o.success);

    let mut response = parts.join("\n\n");
    if response.is_empty() {
        response = "I wasn't able to produce a response for that request.".to_string();
    }
    if any_failed {
        response.push_str("\n\n");
        response.push_str(PARTIAL_NOTE);
    }
    response
}
