//! Pipeline progress port.
//!
//! Output port that a front end may implement to observe pipeline progress.
//! All methods have default no-op implementations, so implementers only
//! override the callbacks they care about.

use concierge_domain::{AgentId, PipelineStep, Subtask, ValidationResult};

/// Progress notifier for one pipeline run.
pub trait PipelineProgress: Send + Sync {
    /// Called when a pipeline step begins.
    fn on_step_start(&self, _step: PipelineStep) {}

    /// Called when a pipeline step completes.
    fn on_step_complete(&self, _step: PipelineStep, _duration_ms: u64) {}

    /// Called when a subtask has been routed to an agent.
    fn on_subtask_routed(&self, _subtask: &Subtask, _agent: &AgentId, _fallback: bool) {}

    /// Called when a subtask finishes executing.
    fn on_subtask_complete(&self, _subtask: &Subtask, _success: bool) {}

    /// Called after validation, whether or not issues were found.
    fn on_validation(&self, _subtask: &Subtask, _result: &ValidationResult) {}
}

/// No-op progress notifier.
pub struct NoPipelineProgress;

impl PipelineProgress for NoPipelineProgress {}
