//! Per-request pipeline context and step trace.

use crate::complexity::assessor::ComplexityResult;
use crate::core::error::DomainError;
use crate::core::ids::{AgentId, RequestId, SubtaskId};
use crate::intent::entities::IntentResult;
use crate::task::entities::Subtask;
use crate::validation::entities::ToolOutputRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kind of channel the request arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Direct,
    Group,
}

/// Minimal session context supplied by the delivery transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub user_id: String,
    pub session_id: String,
    pub channel: ChannelKind,
    /// One-line summary of the prior conversation turn, if any.
    pub prior_turn_summary: Option<String>,
}

impl SessionInfo {
    pub fn new(
        user_id: impl Into<String>,
        session_id: impl Into<String>,
        channel: ChannelKind,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            session_id: session_id.into(),
            channel,
            prior_turn_summary: None,
        }
    }

    pub fn with_prior_turn(mut self, summary: impl Into<String>) -> Self {
        self.prior_turn_summary = Some(summary.into());
        self
    }

    pub fn is_group_channel(&self) -> bool {
        self.channel == ChannelKind::Group
    }
}

/// Pipeline step identifiers for the trace and analytics keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineStep {
    Classification,
    ComplexityAssessment,
    Decomposition,
    Routing,
    Execution,
    Validation,
    Aggregation,
}

impl PipelineStep {
    pub fn as_str(&self) -> &str {
        match self {
            PipelineStep::Classification => "classification",
            PipelineStep::ComplexityAssessment => "complexity_assessment",
            PipelineStep::Decomposition => "decomposition",
            PipelineStep::Routing => "routing",
            PipelineStep::Execution => "execution",
            PipelineStep::Validation => "validation",
            PipelineStep::Aggregation => "aggregation",
        }
    }
}

impl std::fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a traced step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepOutcome {
    Ok,
    /// The step failed but a fallback produced a usable result.
    Recovered,
    Failed,
}

/// One entry of the step trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: PipelineStep,
    pub duration_ms: u64,
    pub outcome: StepOutcome,
    pub detail: Option<String>,
}

/// Mutable accumulator threaded through all steps for one request.
///
/// Owned exclusively by the pipeline driver; never shared across requests,
/// so no locking is needed.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub request_id: RequestId,
    pub request_text: String,
    pub session: SessionInfo,
    pub intent: Option<IntentResult>,
    pub complexity: Option<ComplexityResult>,
    pub subtasks: Vec<Subtask>,
    pub selected_agents: HashMap<SubtaskId, AgentId>,
    pub tool_outputs: Vec<ToolOutputRecord>,
    pub step_trace: Vec<StepRecord>,
    pub error: Option<String>,
    /// Decomposition recursion guard; the decomposer refuses depth > 0.
    pub decomposition_depth: u8,
}

impl PipelineContext {
    pub fn new(request_text: impl Into<String>, session: SessionInfo) -> Self {
        Self {
            request_id: RequestId::generate(),
            request_text: request_text.into(),
            session,
            intent: None,
            complexity: None,
            subtasks: Vec::new(),
            selected_agents: HashMap::new(),
            tool_outputs: Vec::new(),
            step_trace: Vec::new(),
            error: None,
            decomposition_depth: 0,
        }
    }

    /// Fatal context corruption check. Missing identifiers are never retried;
    /// they surface immediately with the step trace attached by the caller.
    pub fn ensure_valid(&self) -> Result<(), DomainError> {
        if self.request_id.as_str().is_empty() {
            return Err(DomainError::ContextCorrupted(
                "missing request id".to_string(),
            ));
        }
        if self.request_text.trim().is_empty() {
            return Err(DomainError::ContextCorrupted(
                "empty request text".to_string(),
            ));
        }
        Ok(())
    }

    pub fn record_step(
        &mut self,
        step: PipelineStep,
        duration_ms: u64,
        outcome: StepOutcome,
        detail: Option<String>,
    ) {
        self.step_trace.push(StepRecord {
            step,
            duration_ms,
            outcome,
            detail,
        });
    }

    pub fn outputs_for(&self, tool_name: &str) -> Vec<&ToolOutputRecord> {
        self.tool_outputs
            .iter()
            .filter(|r| r.tool_name == tool_name)
            .collect()
    }

    /// Names of all tools invoked so far, deduplicated, in invocation order.
    pub fn tools_used(&self) -> Vec<String> {
        let mut names = Vec::new();
        for record in &self.tool_outputs {
            if !names.contains(&record.tool_name) {
                names.push(record.tool_name.clone());
            }
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> PipelineContext {
        PipelineContext::new(
            "list players",
            SessionInfo::new("user-1", "session-1", ChannelKind::Direct),
        )
    }

    #[test]
    fn test_new_context_is_valid() {
        assert!(context().ensure_valid().is_ok());
    }

    #[test]
    fn test_empty_request_text_is_corrupted() {
        let ctx = PipelineContext::new(
            "   ",
            SessionInfo::new("user-1", "session-1", ChannelKind::Direct),
        );
        assert!(matches!(
            ctx.ensure_valid(),
            Err(DomainError::ContextCorrupted(_))
        ));
    }

    #[test]
    fn test_step_trace_accumulates_in_order() {
        let mut ctx = context();
        ctx.record_step(PipelineStep::Classification, 12, StepOutcome::Ok, None);
        ctx.record_step(
            PipelineStep::Decomposition,
            3,
            StepOutcome::Recovered,
            Some("rule-based fallback".to_string()),
        );

        assert_eq!(ctx.step_trace.len(), 2);
        assert_eq!(ctx.step_trace[0].step, PipelineStep::Classification);
        assert_eq!(ctx.step_trace[1].outcome, StepOutcome::Recovered);
    }

    #[test]
    fn test_tools_used_deduplicates_in_order() {
        let mut ctx = context();
        ctx.tool_outputs.push(ToolOutputRecord::new(
            "list_players",
            serde_json::json!([]),
        ));
        ctx.tool_outputs.push(ToolOutputRecord::new(
            "payment_lookup",
            serde_json::json!([]),
        ));
        ctx.tool_outputs.push(ToolOutputRecord::new(
            "list_players",
            serde_json::json!([]),
        ));

        assert_eq!(ctx.tools_used(), vec!["list_players", "payment_lookup"]);
        assert_eq!(ctx.outputs_for("list_players").len(), 2);
    }
}
